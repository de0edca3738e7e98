use crate::components::reconciler::MatchStrategy;
use crate::components::sync_driver::RetryPolicy;
use crate::error::{config_error, env_error, SyncResult};
use crate::utils::time::parse_timezone;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default events listing page
pub const DEFAULT_EVENTS_URL: &str = "https://www.ufc.com/events";
/// Default Google Calendar REST base
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Default OAuth token cache location
pub const DEFAULT_TOKEN_PATH: &str = "token.json";
/// Optional retry policy overrides
pub const RETRY_CONFIG_PATH: &str = "config/retry.toml";

/// Main configuration structure for a sync run
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Google Calendar ID to write events into
    pub google_calendar_id: String,
    /// Google Calendar REST base URL
    pub calendar_api_base: String,
    /// Events listing page to scrape
    pub events_url: String,
    /// Where the OAuth tokens are cached
    pub token_path: PathBuf,
    /// Timezone used for payload timestamps and date matching
    pub timezone: Tz,
    /// How scraped events are matched to existing entries
    pub match_strategy: MatchStrategy,
    /// Retry policy for the whole run
    pub retry: RetryPolicy,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> SyncResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;

        if let Ok(content) = fs::read_to_string(RETRY_CONFIG_PATH) {
            config.retry = config.retry.merge_toml(&content)?;
        }

        Ok(config)
    }

    /// Build the configuration from a variable lookup
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| env_error(key));

        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let google_calendar_id = required("GOOGLE_CALENDAR_ID")?;

        let events_url = lookup("EVENTS_URL").unwrap_or_else(|| DEFAULT_EVENTS_URL.to_string());
        url::Url::parse(&events_url)
            .map_err(|e| config_error(&format!("Invalid EVENTS_URL '{}': {}", events_url, e)))?;

        let calendar_api_base = lookup("CALENDAR_API_BASE")
            .unwrap_or_else(|| DEFAULT_CALENDAR_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let token_path = PathBuf::from(
            lookup("TOKEN_PATH").unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_string()),
        );

        // Default timezone
        let timezone = parse_timezone(&lookup("TIMEZONE").unwrap_or_else(|| String::from("UTC")))?;

        let match_strategy = match lookup("MATCH_STRATEGY") {
            Some(value) => value.parse()?,
            None => MatchStrategy::default(),
        };

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            calendar_api_base,
            events_url,
            token_path,
            timezone,
            match_strategy,
            retry: RetryPolicy::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", "secret"),
            ("GOOGLE_CALENDAR_ID", "cal@example.com"),
        ]
    }

    #[test]
    fn defaults_applied() {
        let map = vars(&required());
        let config = Config::from_lookup(|k| map.get(k).cloned()).unwrap();
        assert_eq!(config.events_url, DEFAULT_EVENTS_URL);
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.match_strategy, MatchStrategy::StartDate);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn missing_calendar_id_is_environment_error() {
        let map = vars(&required()[..2]);
        let err = Config::from_lookup(|k| map.get(k).cloned()).unwrap_err();
        assert!(matches!(err, Error::Environment(msg) if msg.contains("GOOGLE_CALENDAR_ID")));
    }

    #[test]
    fn overrides_read() {
        let mut pairs = required();
        pairs.push(("TIMEZONE", "America/Los_Angeles"));
        pairs.push(("MATCH_STRATEGY", "link"));
        pairs.push(("CALENDAR_API_BASE", "http://localhost:9000/"));
        let map = vars(&pairs);
        let config = Config::from_lookup(|k| map.get(k).cloned()).unwrap();
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.match_strategy, MatchStrategy::Link);
        assert_eq!(config.calendar_api_base, "http://localhost:9000");
    }

    #[test]
    fn bad_timezone_rejected() {
        let mut pairs = required();
        pairs.push(("TIMEZONE", "Mars/Olympus"));
        let map = vars(&pairs);
        assert!(matches!(
            Config::from_lookup(|k| map.get(k).cloned()),
            Err(Error::Config(_))
        ));
    }
}
