//! Exponential backoff policy for adapter-internal submission retries.
//!
//! Retrying happens *inside* an adapter, against one ledger, for transient
//! submission errors only. It is independent of the router's failover across
//! networks: by the time the router sees a failed outcome the adapter has
//! already exhausted this policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff: `base_delay_ms` doubled per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "defaults::base_delay_ms")]
    pub base_delay_ms: u64,
}

mod defaults {
    pub fn max_attempts() -> u32 {
        3
    }

    pub fn base_delay_ms() -> u64 {
        500
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            base_delay_ms: defaults::base_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the given zero-based failed attempt.
    ///
    /// The shift is capped so pathological configs cannot overflow.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}
