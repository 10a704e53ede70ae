//! Typing indicator debounce.
//!
//! Idle -> Typing on the first keystroke, Typing -> Idle once no keystroke
//! arrived for the quiet period, or immediately on send. A single deadline is
//! pushed forward by every keystroke; the owner sleeps until
//! [`TypingController::deadline`] and then calls [`TypingController::expire`].

use std::time::Duration;

use tokio::time::Instant;

/// Quiet period after the last keystroke before `stop typing` is signalled.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(3000);

/// Signal to emit on a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    Start,
    Stop,
}

/// Local typing state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypingState {
    pub typing: bool,
    pub last_keystroke_at: Option<Instant>,
}

#[derive(Debug)]
pub struct TypingController {
    quiet_period: Duration,
    state: TypingState,
}

impl Default for TypingController {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl TypingController {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            state: TypingState::default(),
        }
    }

    /// Records a keystroke. Returns [`TypingSignal::Start`] only on Idle -> Typing.
    pub fn keystroke(&mut self, now: Instant) -> Option<TypingSignal> {
        self.state.last_keystroke_at = Some(now);
        if self.state.typing {
            return None;
        }
        self.state.typing = true;
        Some(TypingSignal::Start)
    }

    /// When the current quiet period ends, if typing.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        if !self.state.typing {
            return None;
        }
        self.state.last_keystroke_at.map(|at| at + self.quiet_period)
    }

    /// Returns [`TypingSignal::Stop`] if typing and the quiet period has elapsed at `now`.
    pub fn expire(&mut self, now: Instant) -> Option<TypingSignal> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.state.typing = false;
        Some(TypingSignal::Stop)
    }

    /// Ends typing regardless of elapsed time (message sent, conversation left).
    pub fn interrupt(&mut self) -> Option<TypingSignal> {
        if !self.state.typing {
            return None;
        }
        self.state.typing = false;
        Some(TypingSignal::Stop)
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.state.typing
    }

    #[must_use]
    pub fn state(&self) -> TypingState {
        self.state
    }

    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }
}
