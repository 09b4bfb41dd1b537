//! Time-related utilities with clock abstraction for testability.

use chrono::{Local, NaiveTime};

/// Format used for the minute-resolution stamp in front of room lines.
pub const MINUTE_FORMAT: &str = "%H:%M";

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current local wall-clock time of day
    fn now(&self) -> NaiveTime;
}

/// System clock implementation (uses the local wall clock)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Fixed clock implementation for testing (always returns the same time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: NaiveTime,
}

impl FixedClock {
    /// Create a new fixed clock with the given time of day
    pub fn new(fixed_time: NaiveTime) -> Self {
        Self { fixed_time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.fixed_time
    }
}

/// Render a time of day as `HH:MM`
pub fn format_minutes(time: NaiveTime) -> String {
    time.format(MINUTE_FORMAT).to_string()
}
