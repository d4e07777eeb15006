use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::ApiError;

/// Backoff-retry policy for network operations.
///
/// Delay before retry `n` (1-based) is
/// `min(base_delay * backoff_multiplier^(n-1), max_delay)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub retryable_status_codes: Vec<u16>,
}

const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

impl RetryPolicy {
    /// Policy for critical operations: more retries, shorter base delay.
    pub fn critical() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 300,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
        }
    }

    /// Policy for bulk/document operations: fewer retries, longer base delay.
    pub fn document() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
        }
    }

    /// Delay before retry `attempt` (1-based), capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let raw = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = raw.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// An error is retryable if it is a network-layer failure, carries a
    /// status code from the configured list, or indicates a timeout.
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Status(code) => self.retryable_status_codes.contains(code),
            ApiError::Decode(message) => message.to_ascii_lowercase().contains("timeout"),
        }
    }
}
