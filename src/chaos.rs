//! Artificial response delays.
//!
//! Computes and applies the per-endpoint delay before a response is
//! emitted. The sleep suspends only the request's own task.

use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Compute the delay for one response.
///
/// With `chaos_mode` off the delay is deterministic at `max_wait_ms`;
/// with it on the delay is drawn uniformly from `[0, max_wait_ms]`.
/// A zero bound always yields zero delay.
pub fn compute_delay(max_wait_ms: u64, chaos_mode: bool) -> Duration {
    if max_wait_ms == 0 {
        return Duration::ZERO;
    }
    let millis = if chaos_mode {
        let mut rng = rand::thread_rng();
        rng.gen_range(0..=max_wait_ms)
    } else {
        max_wait_ms
    };
    Duration::from_millis(millis)
}

/// Compute the delay and suspend the current task for it. Never fails;
/// a closed connection during the sleep is the transport's concern.
pub async fn apply_delay(max_wait_ms: u64, chaos_mode: bool) {
    let delay = compute_delay(max_wait_ms, chaos_mode);
    if !delay.is_zero() {
        debug!(delay_ms = delay.as_millis() as u64, chaos_mode, "Applying delay");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_delay() {
        for _ in 0..20 {
            assert_eq!(compute_delay(250, false), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_zero_bound_always_zero() {
        assert_eq!(compute_delay(0, false), Duration::ZERO);
        assert_eq!(compute_delay(0, true), Duration::ZERO);
    }

    #[test]
    fn test_chaos_delay_bounded() {
        for _ in 0..200 {
            let delay = compute_delay(100, true);
            assert!(delay <= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_chaos_delay_varies() {
        let first = compute_delay(1_000_000, true);
        let varied = (0..50).any(|_| compute_delay(1_000_000, true) != first);
        assert!(varied, "uniform draw produced 51 identical values");
    }

    #[tokio::test]
    async fn test_apply_delay_sleeps() {
        let start = tokio::time::Instant::now();
        apply_delay(50, false).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_apply_zero_delay_returns_immediately() {
        let start = tokio::time::Instant::now();
        apply_delay(0, true).await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
