use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

/// Failed-attempt counters tracked for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockoutState {
    pub failed_attempt_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Result of feeding one verification into the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutOutcome {
    Authenticated,
    InvalidCredentials,
    AccountLocked { until: DateTime<Utc> },
}

/// Account lockout rules.
///
/// Pure state transition with no I/O; the caller supplies the clock. A lock
/// is only ever produced by reaching the threshold, the policy never refuses
/// an attempt because an earlier `locked_until` is still in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_failed_attempts: u32,
    lockout_duration: Duration,
}

impl LockoutPolicy {
    pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;
    pub const DEFAULT_LOCKOUT_MINUTES: i64 = 2;

    /// Create a policy with explicit limits.
    ///
    /// # Arguments
    /// * `max_failed_attempts` - Failures that trigger a lock (a value of 0 is treated as 1)
    /// * `lockout_duration` - How long a triggered lock lasts
    pub fn new(max_failed_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            max_failed_attempts: max_failed_attempts.max(1),
            lockout_duration,
        }
    }

    pub fn max_failed_attempts(&self) -> u32 {
        self.max_failed_attempts
    }

    pub fn lockout_duration(&self) -> Duration {
        self.lockout_duration
    }

    /// Compute the next state for a verification result.
    ///
    /// # Arguments
    /// * `state` - Counters currently stored for the account
    /// * `verified` - Whether the presented password matched
    /// * `now` - Time of the attempt
    ///
    /// # Returns
    /// The state to persist and the outcome to report
    pub fn transition(
        &self,
        state: LockoutState,
        verified: bool,
        now: DateTime<Utc>,
    ) -> (LockoutState, LockoutOutcome) {
        if verified {
            self.on_success()
        } else {
            self.on_failure(state, now)
        }
    }

    /// Reset counters after a successful verification.
    pub fn on_success(&self) -> (LockoutState, LockoutOutcome) {
        (LockoutState::default(), LockoutOutcome::Authenticated)
    }

    /// Count a failed verification, locking once the threshold is reached.
    pub fn on_failure(
        &self,
        state: LockoutState,
        now: DateTime<Utc>,
    ) -> (LockoutState, LockoutOutcome) {
        let failed_attempt_count = state.failed_attempt_count.saturating_add(1);

        if failed_attempt_count >= self.max_failed_attempts {
            // Saturate rather than overflow for very long windows
            let until = now
                .checked_add_signed(self.lockout_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            (
                LockoutState {
                    failed_attempt_count,
                    locked_until: Some(until),
                },
                LockoutOutcome::AccountLocked { until },
            )
        } else {
            (
                LockoutState {
                    failed_attempt_count,
                    locked_until: state.locked_until,
                },
                LockoutOutcome::InvalidCredentials,
            )
        }
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_FAILED_ATTEMPTS,
            Duration::minutes(Self::DEFAULT_LOCKOUT_MINUTES),
        )
    }
}
