use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transport-level failure categories, used by the retry policy allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    /// The request or connection timed out
    Timeout,
    /// The response body was cut short or could not be decoded
    TruncatedResponse,
    /// The connection could not be established
    Connect,
    /// Any other transport failure
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::TruncatedResponse => "truncated response",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(fightcal::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(fightcal::config))]
    Config(String),

    #[error("Network error ({kind}): {message}")]
    #[diagnostic(code(fightcal::network))]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    #[error("Authorization error: {0}")]
    #[diagnostic(
        code(fightcal::auth),
        help("run `get_calendar_token` to authorize the calendar again")
    )]
    Auth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(fightcal::google_calendar))]
    GoogleCalendar(String),

    #[error("Scrape error: {0}")]
    #[diagnostic(code(fightcal::scrape))]
    Scrape(String),

    #[error(transparent)]
    #[diagnostic(code(fightcal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(fightcal::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(fightcal::other))]
    Other(String),
}

impl Error {
    /// Network failure category, if this is a transport error
    pub fn network_kind(&self) -> Option<NetworkErrorKind> {
        match self {
            Error::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_body() {
            NetworkErrorKind::TruncatedResponse
        } else if err.is_connect() {
            NetworkErrorKind::Connect
        } else {
            NetworkErrorKind::Other
        };
        Error::Network {
            kind,
            message: err.to_string(),
        }
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SyncResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create auth errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create scrape errors
pub fn scrape_error(message: &str) -> Error {
    Error::Scrape(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

/// Helper to create network errors of a given kind
pub fn network_error(kind: NetworkErrorKind, message: &str) -> Error {
    Error::Network {
        kind,
        message: message.to_string(),
    }
}
