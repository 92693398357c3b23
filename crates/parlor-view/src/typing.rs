use std::time::{Duration, Instant};

/// Inactivity after the last keystroke before "stopped typing" is sent.
pub const TYPING_IDLE: Duration = Duration::from_secs(2);

/// Debounces local keystrokes into typing transitions.
///
/// Each method returns `Some(is_typing)` only when the state flips, so a
/// burst of keystrokes yields one `true` and idling yields one `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypingDebounce {
    active: bool,
    deadline: Option<Instant>,
}

impl TypingDebounce {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A key other than Enter was pressed; restarts the idle timer.
    pub fn keystroke(&mut self, now: Instant) -> Option<bool> {
        self.deadline = Some(now + TYPING_IDLE);
        if self.active {
            return None;
        }
        self.active = true;
        Some(true)
    }

    /// Fire the idle timer if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<bool> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.stop(),
            _ => None,
        }
    }

    pub fn stop(&mut self) -> Option<bool> {
        self.deadline = None;
        if !self.active {
            return None;
        }
        self.active = false;
        Some(false)
    }
}
