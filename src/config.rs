//! Configuration types.
//!
//! Built once at startup from the environment and handed to the services
//! that need it; nothing reads the environment after that.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port for the webhook and trigger endpoints.
    pub port: u16,
    /// libSQL database file holding the health log.
    pub db_path: PathBuf,
    /// URL replied to a "link" request.
    pub share_url: String,
    /// Outbound SMS settings.
    pub sms: SmsConfig,
    /// Daily check-in settings.
    pub checkin: CheckInConfig,
}

/// Outbound SMS (Join/Tasker) settings.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Join endpoint the phone listens on.
    pub send_url: String,
    /// Per-request timeout for the Join call.
    pub timeout: Duration,
}

/// Scheduled check-in settings.
#[derive(Debug, Clone)]
pub struct CheckInConfig {
    /// Shared secret expected on the trigger endpoint.
    pub secret: SecretString,
    /// Phone number the daily prompt goes to.
    pub recipient: String,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 5000;
    pub const DEFAULT_DB_PATH: &'static str = "./data/health-log.db";
    pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let port = parse_or("HEALTH_SMS_PORT", lookup("HEALTH_SMS_PORT"), Self::DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            "HEALTH_SMS_SEND_TIMEOUT_SECS",
            lookup("HEALTH_SMS_SEND_TIMEOUT_SECS"),
            Self::DEFAULT_SEND_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HEALTH_SMS_SEND_TIMEOUT_SECS".into(),
                message: "must be greater than zero".into(),
            });
        }

        let db_path = lookup("HEALTH_SMS_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DB_PATH));

        let send_url = required("ANDROID_SEND_URL")?;
        if !(send_url.starts_with("http://") || send_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "ANDROID_SEND_URL".into(),
                message: "must be an http(s) URL".into(),
            });
        }

        Ok(Self {
            port,
            db_path,
            share_url: required("HEALTH_LOG_SHARE_URL")?,
            sms: SmsConfig {
                send_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            checkin: CheckInConfig {
                // Not trimmed: the trigger compares the secret exactly.
                secret: lookup("CRON_SECRET")
                    .filter(|v| !v.is_empty())
                    .map(SecretString::from)
                    .ok_or_else(|| ConfigError::MissingEnvVar("CRON_SECRET".into()))?,
                recipient: required("CHECKIN_RECIPIENT")?,
            },
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ANDROID_SEND_URL", "https://joinjoaomgcd.appspot.com/_ah/api/messaging/v1/sendPush"),
            ("HEALTH_LOG_SHARE_URL", "https://docs.google.com/spreadsheets/d/abc"),
            ("CRON_SECRET", "s3cret"),
            ("CHECKIN_RECIPIENT", "+15550100"),
        ]
    }

    #[test]
    fn defaults_applied() {
        let config = AppConfig::from_lookup(env(&minimal())).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_path, PathBuf::from("./data/health-log.db"));
        assert_eq!(config.sms.timeout, Duration::from_secs(10));
        assert_eq!(config.checkin.secret.expose_secret(), "s3cret");
        assert_eq!(config.checkin.recipient, "+15550100");
    }

    #[test]
    fn overrides_applied() {
        let mut vars = minimal();
        vars.push(("HEALTH_SMS_PORT", "8088"));
        vars.push(("HEALTH_SMS_DB_PATH", "/var/lib/health/log.db"));
        vars.push(("HEALTH_SMS_SEND_TIMEOUT_SECS", "3"));
        let config = AppConfig::from_lookup(env(&vars)).unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/health/log.db"));
        assert_eq!(config.sms.timeout, Duration::from_secs(3));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let vars: Vec<_> = minimal()
            .into_iter()
            .filter(|(k, _)| *k != "CRON_SECRET")
            .collect();
        let err = AppConfig::from_lookup(env(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "CRON_SECRET"));
    }

    #[test]
    fn blank_required_value_is_missing() {
        let mut vars = minimal();
        vars.retain(|(k, _)| *k != "CHECKIN_RECIPIENT");
        vars.push(("CHECKIN_RECIPIENT", "   "));
        let err = AppConfig::from_lookup(env(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn bad_port_is_invalid() {
        let mut vars = minimal();
        vars.push(("HEALTH_SMS_PORT", "eighty"));
        let err = AppConfig::from_lookup(env(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "HEALTH_SMS_PORT"));
    }

    #[test]
    fn non_http_send_url_is_invalid() {
        let mut vars = minimal();
        vars.retain(|(k, _)| *k != "ANDROID_SEND_URL");
        vars.push(("ANDROID_SEND_URL", "joinjoaomgcd.appspot.com"));
        assert!(AppConfig::from_lookup(env(&vars)).is_err());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut vars = minimal();
        vars.push(("HEALTH_SMS_SEND_TIMEOUT_SECS", "0"));
        assert!(AppConfig::from_lookup(env(&vars)).is_err());
    }
}
