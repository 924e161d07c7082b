use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How hard to try the screening endpoint before giving up.
///
/// Only transport failures (no response at all) are retried, with a fixed
/// `delay` between attempts and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Retry without pausing between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Read `SCREENING_MAX_ATTEMPTS` and `SCREENING_RETRY_DELAY_MS`, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let max_attempts = std::env::var("SCREENING_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let delay = std::env::var("SCREENING_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RETRY_DELAY);

        Self::new(max_attempts, delay)
    }
}

/// Everything needed to build an [`AddressVerifier`](crate::AddressVerifier).
#[derive(Debug, Clone, Default)]
pub struct VerifierConfig {
    /// JSON denylist file; empty disables local screening.
    pub denylist_path: PathBuf,
    /// Prefix the address is appended to; empty disables remote screening.
    pub screening_url: String,
    pub retry: RetryPolicy,
}

impl VerifierConfig {
    pub fn new(denylist_path: impl Into<PathBuf>, screening_url: impl Into<String>) -> Self {
        Self {
            denylist_path: denylist_path.into(),
            screening_url: screening_url.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
