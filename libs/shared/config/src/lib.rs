use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub marketplace_base_url: String,
    pub marketplace_api_key: String,
    /// Wait before the first finalize attempt, absorbing payment
    /// settlement lag (seconds).
    pub reconcile_grace_delay_secs: u64,
    /// Fixed wait between finalize retries (seconds).
    pub reconcile_retry_interval_secs: u64,
    /// Maximum finalize attempts before giving up.
    pub reconcile_max_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            marketplace_base_url: env::var("MARKETPLACE_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("MARKETPLACE_BASE_URL not set, using empty value");
                    String::new()
                }),
            marketplace_api_key: env::var("MARKETPLACE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("MARKETPLACE_API_KEY not set, using empty value");
                    String::new()
                }),
            reconcile_grace_delay_secs: parse_env_or("RECONCILE_GRACE_DELAY_SECS", 2),
            reconcile_retry_interval_secs: parse_env_or("RECONCILE_RETRY_INTERVAL_SECS", 3),
            reconcile_max_attempts: parse_env_or("RECONCILE_MAX_ATTEMPTS", 5),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.marketplace_base_url.is_empty() && !self.marketplace_api_key.is_empty()
    }
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid number, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}
