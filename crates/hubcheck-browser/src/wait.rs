//! Condition polling.
//!
//! Every wait in the suite is a condition with a timeout; there are no
//! fixed sleeps.

use crate::error::{BrowserError, Result};
use hubcheck_core::TimeoutConfig;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (20 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 20_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Command timeout and poll interval from the suite configuration.
    #[must_use]
    pub fn from_config(timeouts: &TimeoutConfig) -> Self {
        Self {
            timeout_ms: timeouts.command_ms,
            poll_interval_ms: timeouts.poll_interval_ms,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Poll `probe` until it yields a value or the timeout elapses.
///
/// The probe runs at least once. Retryable errors (see
/// [`BrowserError::is_retryable`]) are treated like "not yet"; any other
/// error ends the wait immediately. On timeout the last retryable error, if
/// any, is included in the `Timeout` message.
pub async fn poll_until<T, F, Fut>(options: &WaitOptions, description: &str, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + options.timeout();
    let mut last_error: Option<BrowserError> = None;

    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_retryable() => last_error = Some(e),
            Err(e) => return Err(e),
        }

        if Instant::now() >= deadline {
            let detail = last_error.map(|e| format!(" ({e})")).unwrap_or_default();
            return Err(BrowserError::Timeout(format!(
                "{description} after {}ms{detail}",
                options.timeout_ms
            )));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(200).with_poll_interval(10)
    }

    #[tokio::test]
    async fn test_poll_until_eventually_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let value = poll_until(&fast(), "counter reaches 3", move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((n >= 3).then_some(n))
        })
        .await
        .expect("condition met");
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out_with_last_error() {
        let err = poll_until::<(), _, _>(&fast(), "save button visible", || async {
            Err(BrowserError::SelectorNotFound("testid=save".to_string()))
        })
        .await
        .unwrap_err();
        match err {
            BrowserError::Timeout(msg) => {
                assert!(msg.starts_with("save button visible after 200ms"));
                assert!(msg.contains("testid=save"));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_until_stops_on_fatal_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let err = poll_until::<(), _, _>(&fast(), "anything", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(BrowserError::ChromiumError("connection closed".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, BrowserError::ChromiumError(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config() {
        let options = WaitOptions::from_config(&TimeoutConfig::default());
        assert_eq!(options.timeout(), Duration::from_secs(20));
        assert_eq!(options.poll_interval(), Duration::from_millis(100));
    }
}
