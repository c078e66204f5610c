#![forbid(unsafe_code)]

use super::CardOpError;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub base_ms: u64,
    pub max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_ms: 50,
            max_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    fn backoff_ms(&self, attempt: u32) -> u64 {
        let shift = attempt.min(16);
        self.base_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_ms)
    }
}

/// Re-runs `op` while it fails with the store-busy signature; anything else
/// propagates on the spot. The final busy error propagates after the retry
/// budget is spent.
pub(crate) fn with_busy_retry<T>(
    policy: &RetryPolicy,
    mut op: impl FnMut() -> Result<T, CardOpError>,
) -> Result<T, CardOpError> {
    let mut attempt = 0u32;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_busy() && attempt < policy.max_retries => {
                std::thread::sleep(Duration::from_millis(policy.backoff_ms(attempt)));
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
