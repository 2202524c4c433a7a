//! # Client Rate Limiter
//!
//! Sliding-window-with-lockout limiter keyed by action.
//!
//! ## Advisory Only
//!
//! This limiter runs on the client and can be bypassed. Signal creation and
//! reveals are also enforced by authoritative server-side ledgers; this one
//! only saves a round trip and gives the user an early retry-after hint.
//!
//! ## Algorithm
//!
//! Per action key:
//! - `Blocked(until)`: every attempt is rejected until `until` passes, then
//!   the state resets.
//! - The window resets when more than `window` has passed since it opened.
//! - Each accepted attempt increments the count; reaching `max_attempts`
//!   moves the key to `Blocked(now + block_duration)`, or to the end of the
//!   current window when `block_duration` is zero.
//!
//! All comparisons use absolute timestamps supplied by the caller.

use crate::time::Timestamp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Action keys guarded by the client limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitAction {
    Login,
    Signup,
    PasswordReset,
    Report,
    Feedback,
    SignalCreation,
}

impl RateLimitAction {
    /// Key used in errors and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::PasswordReset => "password-reset",
            Self::Report => "report",
            Self::Feedback => "feedback",
            Self::SignalCreation => "signal-creation",
        }
    }

    /// Preset limits for this action.
    #[must_use]
    pub fn default_config(&self) -> RateLimitConfig {
        const MINUTE: u64 = 60_000;
        const HOUR: u64 = 60 * MINUTE;
        match self {
            Self::Login => RateLimitConfig::new(5, 15 * MINUTE, 15 * MINUTE),
            Self::Signup => RateLimitConfig::new(3, HOUR, HOUR),
            Self::PasswordReset => RateLimitConfig::new(3, HOUR, HOUR),
            Self::Report => RateLimitConfig::new(5, HOUR, HOUR),
            Self::Feedback => RateLimitConfig::new(5, HOUR, 30 * MINUTE),
            // Lock only until the rolling hour ends, matching the server ledger.
            Self::SignalCreation => RateLimitConfig::new(10, HOUR, 0),
        }
    }
}

impl fmt::Display for RateLimitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits for one action key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Attempts allowed per window.
    pub max_attempts: u32,
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Lockout length in milliseconds; 0 locks until the window ends.
    pub block_duration_ms: u64,
}

impl RateLimitConfig {
    /// Create a config.
    #[must_use]
    pub const fn new(max_attempts: u32, window_ms: u64, block_duration_ms: u64) -> Self {
        Self {
            max_attempts,
            window_ms,
            block_duration_ms,
        }
    }

    fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    fn block_duration(&self) -> Duration {
        Duration::from_millis(self.block_duration_ms)
    }
}

/// Per-key counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RateLimitState {
    count: u32,
    window_start: Timestamp,
    blocked_until: Option<Timestamp>,
}

impl RateLimitState {
    fn fresh(now: Timestamp) -> Self {
        Self {
            count: 0,
            window_start: now,
            blocked_until: None,
        }
    }

    /// Apply lockout expiry and idle-window reset as of `now`.
    fn roll(&mut self, now: Timestamp, config: &RateLimitConfig) {
        if let Some(until) = self.blocked_until {
            if now >= until {
                *self = Self::fresh(now);
            }
            return;
        }
        if now.duration_since(self.window_start) > config.window() {
            *self = Self::fresh(now);
        }
    }

    /// Count one attempt, locking the key once the budget is spent.
    fn consume(&mut self, now: Timestamp, config: &RateLimitConfig, action: RateLimitAction) {
        self.count += 1;
        if self.count >= config.max_attempts {
            let until = if config.block_duration_ms == 0 {
                self.window_start.saturating_add(config.window())
            } else {
                now.saturating_add(config.block_duration())
            };
            self.blocked_until = Some(until);
            debug!(action = %action, count = self.count, "Client rate limit reached, locking");
        }
    }
}

/// Observable limiter state for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterStatus {
    /// Attempts still available in the current window.
    Open {
        /// Attempts left before lockout.
        remaining: u32,
    },
    /// Locked out.
    Blocked {
        /// Time until the lockout lifts.
        retry_after: Duration,
    },
}

/// Client-side limiter holding one state per action key.
///
/// Owned by a session object; nothing here is global.
#[derive(Debug)]
pub struct ClientRateLimiter {
    configs: HashMap<RateLimitAction, RateLimitConfig>,
    states: Mutex<HashMap<RateLimitAction, RateLimitState>>,
}

impl ClientRateLimiter {
    /// Create a limiter with the preset config for every action.
    #[must_use]
    pub fn new() -> Self {
        let actions = [
            RateLimitAction::Login,
            RateLimitAction::Signup,
            RateLimitAction::PasswordReset,
            RateLimitAction::Report,
            RateLimitAction::Feedback,
            RateLimitAction::SignalCreation,
        ];
        Self {
            configs: actions.iter().map(|a| (*a, a.default_config())).collect(),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Override the config for one action.
    #[must_use]
    pub fn with_config(mut self, action: RateLimitAction, config: RateLimitConfig) -> Self {
        self.configs.insert(action, config);
        self
    }

    /// Config in force for `action`.
    #[must_use]
    pub fn config(&self, action: RateLimitAction) -> RateLimitConfig {
        self.configs
            .get(&action)
            .copied()
            .unwrap_or_else(|| action.default_config())
    }

    /// Try to consume one attempt.
    ///
    /// Returns `Err(retry_after)` while the key is blocked.
    pub fn try_acquire(&self, action: RateLimitAction, now: Timestamp) -> Result<(), Duration> {
        let config = self.config(action);
        let mut states = self.states.lock();
        let state = states
            .entry(action)
            .or_insert_with(|| RateLimitState::fresh(now));
        state.roll(now, &config);

        if let Some(until) = state.blocked_until {
            let retry_after = now.duration_until(until);
            debug!(action = %action, retry_ms = retry_after.as_millis() as u64, "Client rate limit blocked");
            return Err(retry_after);
        }

        state.consume(now, &config, action);
        Ok(())
    }

    /// Count an attempt that has already succeeded.
    ///
    /// Pairs with [`Self::status`] for actions where only completed
    /// attempts spend the budget. A key that is already blocked stays
    /// blocked with its existing deadline.
    pub fn record(&self, action: RateLimitAction, now: Timestamp) {
        let config = self.config(action);
        let mut states = self.states.lock();
        let state = states
            .entry(action)
            .or_insert_with(|| RateLimitState::fresh(now));
        state.roll(now, &config);
        if state.blocked_until.is_none() {
            state.consume(now, &config, action);
        }
    }

    /// Current status without consuming an attempt.
    #[must_use]
    pub fn status(&self, action: RateLimitAction, now: Timestamp) -> LimiterStatus {
        let config = self.config(action);
        let mut states = self.states.lock();
        let Some(state) = states.get_mut(&action) else {
            return LimiterStatus::Open {
                remaining: config.max_attempts,
            };
        };
        state.roll(now, &config);
        match state.blocked_until {
            Some(until) => LimiterStatus::Blocked {
                retry_after: now.duration_until(until),
            },
            None => LimiterStatus::Open {
                remaining: config.max_attempts.saturating_sub(state.count),
            },
        }
    }

    /// Forget all attempts for `action` (e.g. after a successful login).
    pub fn reset(&self, action: RateLimitAction) {
        self.states.lock().remove(&action);
    }
}

impl Default for ClientRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
