//! Pacing rules: ad freshness and display cooldown.
//!
//! The two rules are independent.  Expiry decides whether cached content
//! may be shown at all; the throttle decides how often the user is
//! interrupted.  All times are clock readings in milliseconds.

/// An ad older than `max_age_ms` is treated as unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    max_age_ms: u64,
}

impl ExpiryPolicy {
    pub const fn new(max_age_ms: u64) -> Self {
        Self { max_age_ms }
    }

    pub fn max_age_ms(&self) -> u64 {
        self.max_age_ms
    }

    /// `true` while the ad loaded at `loaded_at` is younger than `max_age`.
    pub fn is_fresh(&self, loaded_at: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(loaded_at) < self.max_age_ms
    }
}

/// Tracks the last display attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayThrottle {
    cooldown_ms: u64,
    last_shown_at: Option<u64>,
}

impl DisplayThrottle {
    pub const fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_shown_at: None,
        }
    }

    pub fn last_shown_at(&self) -> Option<u64> {
        self.last_shown_at
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    /// Change the window without forgetting the last display.
    pub fn set_cooldown_ms(&mut self, cooldown_ms: u64) {
        self.cooldown_ms = cooldown_ms;
    }

    /// Milliseconds until the next attempt is allowed; `None` if allowed now.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let last = self.last_shown_at?;
        let elapsed = now_ms.saturating_sub(last);
        (elapsed < self.cooldown_ms).then(|| self.cooldown_ms - elapsed)
    }

    pub fn is_eligible(&self, now_ms: u64) -> bool {
        self.remaining_ms(now_ms).is_none()
    }

    /// Called when a display attempt begins, not when it completes.
    pub fn record(&mut self, now_ms: u64) {
        self.last_shown_at = Some(now_ms);
    }
}
