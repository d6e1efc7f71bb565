//! Sleep timer
//!
//! A single countdown that requests a playback stop on expiry. The timer
//! is either disabled or armed with a remaining-seconds count; the
//! once-per-second tick is driven externally (the session service owns
//! the scheduling primitive and cancels it whenever the timer disarms).

/// Outcome of one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepTick {
    /// Timer is not armed; nothing happened
    Disabled,

    /// Still counting down; this many seconds remain
    Running(u32),

    /// Countdown reached zero: the timer disarmed itself and playback
    /// must stop. Emitted exactly once per arming.
    Expired,
}

/// Countdown to an automatic playback stop
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepTimer {
    /// Seconds remaining, `None` when disabled
    remaining: Option<u32>,
}

impl SleepTimer {
    /// Create a disabled timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer for `minutes` minutes. Zero minutes disarms.
    pub fn set_minutes(&mut self, minutes: u32) {
        self.remaining = if minutes == 0 {
            None
        } else {
            Some(minutes * 60)
        };
    }

    /// Disarm without firing
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Whether the timer is armed
    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds remaining, if armed
    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> SleepTick {
        match self.remaining {
            None => SleepTick::Disabled,
            Some(r) if r <= 1 => {
                self.remaining = None;
                SleepTick::Expired
            }
            Some(r) => {
                self.remaining = Some(r - 1);
                SleepTick::Running(r - 1)
            }
        }
    }
}
