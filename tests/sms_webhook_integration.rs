//! Integration tests for the SMS webhook + check-in trigger.
//!
//! Each test spins up the app on a random port next to a fake Join
//! endpoint, so outbound SMS go over real HTTP through `JoinSmsTransport`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use health_sms::channels::JoinSmsTransport;
use health_sms::checkin::{CHECKIN_PROMPT, CheckInGate};
use health_sms::ingest::IngestionService;
use health_sms::routes::{AppState, app_routes};
use health_sms::store::{LibSqlBackend, SpreadsheetStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

const SECRET: &str = "daily-tick";
const USER: &str = "+15550100";

type Outbox = Arc<Mutex<Vec<HashMap<String, String>>>>;

struct Harness {
    base: String,
    store: Arc<LibSqlBackend>,
    outbox: Outbox,
    client: reqwest::Client,
    _tmp: tempfile::TempDir,
}

async fn serve(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// Fake Join endpoint: records every send, answers with `status`.
async fn start_fake_join(status: StatusCode) -> (String, Outbox) {
    async fn handler(
        State((status, outbox)): State<(StatusCode, Outbox)>,
        Query(params): Query<HashMap<String, String>>,
    ) -> StatusCode {
        outbox.lock().unwrap().push(params);
        status
    }

    let outbox = Outbox::default();
    let app = Router::new()
        .route("/send", get(handler))
        .with_state((status, Arc::clone(&outbox)));
    let port = serve(app).await;
    (format!("http://127.0.0.1:{port}/send"), outbox)
}

async fn start(join_status: StatusCode) -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(
        LibSqlBackend::new_local(&tmp.path().join("health-log.db"), "https://example.com/log")
            .await
            .unwrap(),
    );

    let (send_url, outbox) = start_fake_join(join_status).await;
    let transport = Arc::new(JoinSmsTransport::new(send_url, Duration::from_secs(5)).unwrap());

    let state = AppState {
        ingest: Arc::new(IngestionService::new(store.clone(), transport.clone())),
        checkin: Arc::new(CheckInGate::new(
            SecretString::from(SECRET),
            USER.to_string(),
            transport,
        )),
    };
    let port = serve(app_routes(state)).await;

    Harness {
        base: format!("http://127.0.0.1:{port}"),
        store,
        outbox,
        client: reqwest::Client::new(),
        _tmp: tmp,
    }
}

impl Harness {
    async fn sms(&self, body: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}/android-webhook", self.base))
            .json(&json!({"sender": USER, "body": body}))
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        (status, resp.json().await.unwrap())
    }

    fn sent_messages(&self) -> Vec<String> {
        self.outbox
            .lock()
            .unwrap()
            .iter()
            .map(|p| p["message"].clone())
            .collect()
    }
}

#[tokio::test]
async fn log_then_summary_round_trip() {
    timeout(TEST_TIMEOUT, async {
        let h = start(StatusCode::OK).await;

        for body in ["2 mild headache", "6 migraine, 3 hours", "4 better", "9 awful", "5 steady"] {
            let (status, json) = h.sms(body).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["status"], "logged");
        }
        assert_eq!(h.store.count().await.unwrap(), 5);

        let (status, json) = h.sms("SUMMARY").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"status": "summary sent"}));

        let sent = h.sent_messages();
        let summary = sent.last().unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Last 3 entries:");
        assert!(lines[1].starts_with("1. ") && lines[1].ends_with("Urgency: 5"));
        assert!(lines[2].starts_with("2. ") && lines[2].ends_with("Urgency: 9"));
        assert!(lines[3].starts_with("3. ") && lines[3].ends_with("Urgency: 4"));
        assert_eq!(lines.len(), 4);

        let outbox = h.outbox.lock().unwrap();
        assert!(outbox.iter().all(|p| p["recipient"] == USER));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn link_request() {
    timeout(TEST_TIMEOUT, async {
        let h = start(StatusCode::OK).await;
        let (status, json) = h.sms(" Link ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"status": "link sent"}));
        assert_eq!(h.sent_messages(), vec!["Health Log Link: https://example.com/log"]);
        assert_eq!(h.store.count().await.unwrap(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failed_confirmation_does_not_remove_entry() {
    timeout(TEST_TIMEOUT, async {
        let h = start(StatusCode::INTERNAL_SERVER_ERROR).await;
        let (status, json) = h.sms("8 fever").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "Failed to send SMS");
        assert_eq!(json["status"], "logged");
        assert_eq!(h.store.count().await.unwrap(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn checkin_trigger() {
    timeout(TEST_TIMEOUT, async {
        let h = start(StatusCode::OK).await;

        let resp = h
            .client
            .get(format!("{}/trigger-daily-checkin", h.base))
            .query(&[("secret", "Daily-Tick")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401);
        assert!(h.sent_messages().is_empty());

        let resp = h
            .client
            .get(format!("{}/trigger-daily-checkin", h.base))
            .query(&[("secret", SECRET)])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), "Triggered");
        assert_eq!(h.sent_messages(), vec![CHECKIN_PROMPT.to_string()]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn checkin_delivery_failure_is_not_unauthorized() {
    timeout(TEST_TIMEOUT, async {
        let h = start(StatusCode::SERVICE_UNAVAILABLE).await;
        let resp = h
            .client
            .get(format!("{}/trigger-daily-checkin", h.base))
            .query(&[("secret", SECRET)])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 500);
    })
    .await
    .expect("test timed out");
}
