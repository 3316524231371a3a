//! Account lockout state machine.
//!
//! Pure transitions over `(failed_count, locked_until)` plus "now".
//! Persistence and enforcement live with the caller: the login flow
//! rejects attempts while locked and writes transitions back through the
//! account store's serialization point.

use chrono::{DateTime, Duration, Utc};

use crate::config::LockoutConfig;

/// Per-account lockout counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockoutState {
    /// Consecutive failed login attempts.
    pub failed_count: u32,

    /// Absolute lock expiry; `None` means not locked.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Penalty tier for a given failure count: 0 below the minimum
/// threshold, 1 from the minimum, 2 from the high threshold.
fn tier(failed_count: u32, config: &LockoutConfig) -> u8 {
    if failed_count >= config.high_failure_threshold {
        2
    } else if failed_count >= config.min_failure_threshold {
        1
    } else {
        0
    }
}

/// Record a failed authentication.
///
/// Increments the failure count and, past the configured thresholds,
/// computes a lock window. With `recompute_on_repeat_failure` set,
/// every further failure pushes the window out from `now`; otherwise an
/// existing window is kept while the failure count stays within the
/// same tier. Crossing into a higher tier always applies that tier's
/// penalty from `now`.
pub fn record_failure(
    state: LockoutState,
    config: &LockoutConfig,
    now: DateTime<Utc>,
) -> LockoutState {
    let failed_count = state.failed_count.saturating_add(1);

    let penalty = match tier(failed_count, config) {
        2 => Some(Duration::milliseconds(config.high_penalty_ms as i64)),
        1 => Some(Duration::milliseconds(config.min_penalty_ms as i64)),
        _ => None,
    };

    let escalated = tier(failed_count, config) > tier(state.failed_count, config);
    let locked_until = match penalty {
        Some(penalty)
            if config.recompute_on_repeat_failure
                || escalated
                || state.locked_until.is_none() =>
        {
            Some(now + penalty)
        }
        _ => state.locked_until,
    };

    LockoutState {
        failed_count,
        locked_until,
    }
}

/// Record a successful authentication: counters reset, lock cleared.
pub fn record_success(_state: LockoutState) -> LockoutState {
    LockoutState::default()
}

/// Whether login attempts must be rejected at `now`, independent of
/// credential correctness.
pub fn is_locked(state: LockoutState, now: DateTime<Utc>) -> bool {
    state.locked_until.is_some_and(|until| now < until)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config(recompute: bool) -> LockoutConfig {
        LockoutConfig {
            min_failure_threshold: 3,
            high_failure_threshold: 5,
            min_penalty_ms: 60_000,
            high_penalty_ms: 3_600_000,
            recompute_on_repeat_failure: recompute,
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn test_below_threshold_no_lock() {
        let config = test_config(true);
        let mut state = LockoutState::default();

        state = record_failure(state, &config, at(0));
        state = record_failure(state, &config, at(1));

        assert_eq!(state.failed_count, 2);
        assert_eq!(state.locked_until, None);
        assert!(!is_locked(state, at(2)));
    }

    #[test]
    fn test_min_threshold_applies_short_penalty() {
        let config = test_config(true);
        let mut state = LockoutState::default();

        for t in 0..3 {
            state = record_failure(state, &config, at(t));
        }

        assert_eq!(state.failed_count, 3);
        assert_eq!(state.locked_until, Some(at(2) + Duration::milliseconds(60_000)));
        assert!(is_locked(state, at(3)));
    }

    #[test]
    fn test_high_threshold_applies_long_penalty() {
        let config = test_config(true);
        let mut state = LockoutState::default();

        for t in 0..5 {
            state = record_failure(state, &config, at(t));
        }

        assert_eq!(state.failed_count, 5);
        assert_eq!(
            state.locked_until,
            Some(at(4) + Duration::milliseconds(3_600_000))
        );
    }

    #[test]
    fn test_escalation_with_recompute_pushes_window_out() {
        // Nine consecutive failures; with recompute on, failures 6-9 keep
        // moving the long window forward from each failure's time.
        let config = test_config(true);
        let mut state = LockoutState::default();

        for t in 0..9 {
            state = record_failure(state, &config, at(t));
        }

        assert_eq!(state.failed_count, 9);
        assert_eq!(
            state.locked_until,
            Some(at(8) + Duration::milliseconds(3_600_000))
        );
    }

    #[test]
    fn test_without_recompute_window_holds_within_a_tier() {
        // The short window set at the third failure is kept through the
        // fourth, which stays in the same tier.
        let config = test_config(false);
        let mut state = LockoutState::default();

        for t in 0..4 {
            state = record_failure(state, &config, at(t));
        }

        assert_eq!(state.failed_count, 4);
        assert_eq!(state.locked_until, Some(at(2) + Duration::milliseconds(60_000)));
    }

    #[test]
    fn test_without_recompute_tier_escalation_applies_long_penalty() {
        // Crossing the high threshold replaces the short window with the
        // long penalty from the fifth failure's time; failures 6-9 then
        // leave it untouched.
        let config = test_config(false);
        let mut state = LockoutState::default();

        for t in 0..9 {
            state = record_failure(state, &config, at(t));
        }

        assert_eq!(state.failed_count, 9);
        assert_eq!(
            state.locked_until,
            Some(at(4) + Duration::milliseconds(3_600_000))
        );
    }

    #[test]
    fn test_lock_expires() {
        let config = test_config(true);
        let mut state = LockoutState::default();

        for t in 0..3 {
            state = record_failure(state, &config, at(t));
        }

        let expiry = at(2) + Duration::milliseconds(60_000);
        assert!(is_locked(state, expiry - Duration::seconds(1)));
        assert!(!is_locked(state, expiry));
    }

    #[test]
    fn test_success_resets_count_and_lock() {
        let config = test_config(true);
        let mut state = LockoutState::default();

        for t in 0..5 {
            state = record_failure(state, &config, at(t));
        }
        assert!(is_locked(state, at(5)));

        state = record_success(state);
        assert_eq!(state.failed_count, 0);
        assert_eq!(state.locked_until, None);
        assert!(!is_locked(state, at(5)));
    }
}
