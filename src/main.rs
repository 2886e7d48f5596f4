use std::sync::Arc;

use anyhow::Context;

use health_sms::channels::{JoinSmsTransport, SmsTransport};
use health_sms::checkin::CheckInGate;
use health_sms::config::AppConfig;
use health_sms::ingest::IngestionService;
use health_sms::routes::{AppState, app_routes};
use health_sms::store::{LibSqlBackend, SpreadsheetStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  Required: ANDROID_SEND_URL, HEALTH_LOG_SHARE_URL, CRON_SECRET, CHECKIN_RECIPIENT");
        std::process::exit(1);
    });

    eprintln!("🩺 Health SMS v{}", env!("CARGO_PKG_VERSION"));

    // ── Health log ──────────────────────────────────────────────────────
    let store: Arc<dyn SpreadsheetStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path, config.share_url.clone())
            .await
            .with_context(|| format!("Failed to open health log at {}", config.db_path.display()))?,
    );
    let entries = store.count().await.unwrap_or_default();
    eprintln!("   Health log: {} ({} entries)", config.db_path.display(), entries);

    // ── SMS transport ───────────────────────────────────────────────────
    let transport: Arc<dyn SmsTransport> = Arc::new(
        JoinSmsTransport::new(config.sms.send_url.clone(), config.sms.timeout)
            .context("Failed to create SMS transport")?,
    );
    eprintln!("   SMS timeout: {}s", config.sms.timeout.as_secs());

    // ── Services ────────────────────────────────────────────────────────
    let state = AppState {
        ingest: Arc::new(IngestionService::new(Arc::clone(&store), Arc::clone(&transport))),
        checkin: Arc::new(CheckInGate::new(
            config.checkin.secret.clone(),
            config.checkin.recipient.clone(),
            Arc::clone(&transport),
        )),
    };

    eprintln!("   Webhook: POST http://0.0.0.0:{}/android-webhook", config.port);
    eprintln!("   Check-in: GET http://0.0.0.0:{}/trigger-daily-checkin?secret=...", config.port);
    eprintln!("   Health: GET http://0.0.0.0:{}/\n", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Health SMS server started");

    axum::serve(listener, app_routes(state)).await?;
    Ok(())
}
