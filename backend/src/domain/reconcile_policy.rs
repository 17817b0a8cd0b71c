//! Retry and lock-wait bounds applied by store adapters.

use std::time::Duration;

/// Bounds on how long a reconciliation may wait and how often it retries.
///
/// # Example
///
/// ```
/// # use inventory_backend::domain::ReconcilePolicy;
/// # use std::time::Duration;
/// let policy = ReconcilePolicy::default();
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.lock_timeout(), Duration::from_millis(5_000));
///
/// let clamped = ReconcilePolicy::new(Some(0), Some(1));
/// assert_eq!(clamped.max_attempts(), 1);
/// assert_eq!(clamped.lock_timeout(), Duration::from_millis(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    max_attempts: u32,
    lock_timeout: Duration,
}

impl ReconcilePolicy {
    const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    const MIN_MAX_ATTEMPTS: u32 = 1;
    const MAX_MAX_ATTEMPTS: u32 = 10;

    const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
    const MIN_LOCK_TIMEOUT_MS: u64 = 10;
    const MAX_LOCK_TIMEOUT_MS: u64 = 60_000;

    /// Build a policy from optional raw settings, applying defaults and
    /// clamping each value to its accepted range.
    pub fn new(max_attempts: Option<u32>, lock_timeout_ms: Option<u64>) -> Self {
        let attempts = max_attempts
            .unwrap_or(Self::DEFAULT_MAX_ATTEMPTS)
            .clamp(Self::MIN_MAX_ATTEMPTS, Self::MAX_MAX_ATTEMPTS);
        let timeout_ms = lock_timeout_ms
            .unwrap_or(Self::DEFAULT_LOCK_TIMEOUT_MS)
            .clamp(Self::MIN_LOCK_TIMEOUT_MS, Self::MAX_LOCK_TIMEOUT_MS);
        Self {
            max_attempts: attempts,
            lock_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Attempts per reconciliation, including the first.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Longest wait for the per-key lock in one attempt.
    pub const fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self::new(None, None)
    }
}
