use std::time::Duration;

use emc_model::BackoffStrategy;
use taskvisor::BackoffPolicy;

use super::to_jitter_policy;

/// Millisecond fields become durations; a factor below 1 would shrink delays and is clamped.
pub fn to_backoff_policy(s: &BackoffStrategy) -> BackoffPolicy {
    BackoffPolicy {
        success_delay: s.delay_ms.map(Duration::from_millis),
        first: Duration::from_millis(s.first_ms),
        max: Duration::from_millis(s.max_ms.max(s.first_ms)),
        jitter: to_jitter_policy(s.jitter),
        factor: s.factor.max(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emc_model::JitterStrategy;

    #[test]
    fn converts_and_clamps() {
        let s = BackoffStrategy {
            jitter: JitterStrategy::None,
            delay_ms: Some(50),
            first_ms: 2_000,
            max_ms: 1_000,
            factor: 0.5,
        };
        let p = to_backoff_policy(&s);
        assert_eq!(p.success_delay, Some(Duration::from_millis(50)));
        assert_eq!(p.first, Duration::from_secs(2));
        assert_eq!(p.max, Duration::from_secs(2));
        assert_eq!(p.factor, 1.0);
    }
}
