//! Per-object exponential requeue delays
//!
//! The reconciler never retries on its own; the controller's error policy
//! asks this table how long to wait before the next attempt for a key.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::client::ObjectKey;

/// Exponential backoff state keyed by object identity
#[derive(Debug)]
pub struct Backoff {
    initial_delay: Duration,
    max_delay: Duration,
    attempts: Mutex<HashMap<ObjectKey, u32>>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(300))
    }
}

impl Backoff {
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure for `key` and return the delay before retrying it
    pub fn next_delay(&self, key: &ObjectKey) -> Duration {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        let attempt = attempts.entry(key.clone()).or_insert(0);
        let delay = self.delay_for(*attempt);
        *attempt = attempt.saturating_add(1);
        delay
    }

    /// Forget failures for `key` after it reconciled successfully
    pub fn reset(&self, key: &ObjectKey) {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Number of consecutive failures recorded for `key`
    pub fn failures(&self, key: &ObjectKey) -> u32 {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}
