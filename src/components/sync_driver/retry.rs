use crate::error::{config_error, Error, NetworkErrorKind, SyncResult};
use serde::Deserialize;
use std::time::Duration;

/// Default number of attempts for a whole sync run
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Retry policy for the whole extract+reconcile sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for the exponential backoff
    pub max_delay: Duration,
    /// Network failure kinds that are worth another attempt
    pub retry_on: Vec<NetworkErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            retry_on: vec![NetworkErrorKind::Timeout, NetworkErrorKind::TruncatedResponse],
        }
    }
}

/// Overrides read from `config/retry.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryOverrides {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub retry_on: Option<Vec<NetworkErrorKind>>,
}

impl RetryPolicy {
    /// Policy that retries the default kinds without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Apply file overrides on top of this policy
    pub fn with_overrides(mut self, overrides: RetryOverrides) -> SyncResult<Self> {
        if let Some(max_attempts) = overrides.max_attempts {
            self.max_attempts = max_attempts;
        }
        if let Some(ms) = overrides.base_delay_ms {
            self.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = overrides.max_delay_ms {
            self.max_delay = Duration::from_millis(ms);
        }
        if let Some(kinds) = overrides.retry_on {
            self.retry_on = kinds;
        }
        self.validate()?;
        Ok(self)
    }

    /// Parse overrides from TOML text and apply them
    pub fn merge_toml(self, content: &str) -> SyncResult<Self> {
        let overrides: RetryOverrides = toml::from_str(content)?;
        self.with_overrides(overrides)
    }

    fn validate(&self) -> SyncResult<()> {
        if self.max_attempts == 0 {
            return Err(config_error("retry max_attempts must be at least 1"));
        }
        if self.base_delay > self.max_delay {
            return Err(config_error("retry base delay exceeds max delay"));
        }
        Ok(())
    }

    /// Whether the error is on the allow-list
    pub fn is_retryable(&self, err: &Error) -> bool {
        err.network_kind()
            .is_some_and(|kind| self.retry_on.contains(&kind))
    }

    /// Backoff before the attempt following `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}
