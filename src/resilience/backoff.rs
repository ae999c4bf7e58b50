//! Exponential backoff with jitter for RPC read retries.

use rand::Rng;
use std::time::Duration;

/// Delay before retry number `attempt` (1-based; 0 means no delay).
///
/// Doubles from `base_ms`, caps at `max_ms`, then adds up to 10% jitter so
/// concurrent reads against the same node do not retry in lockstep.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let Some(exponent) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let capped_ms = base_ms
        .saturating_mul(2u64.saturating_pow(exponent))
        .min(max_ms);

    let jitter_ms = match capped_ms / 10 {
        0 => 0,
        range => rand::thread_rng().gen_range(0..range),
    };

    Duration::from_millis(capped_ms + jitter_ms)
}
