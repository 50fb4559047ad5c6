use chrono::{Duration, NaiveDateTime};

/// Half-open interval `[start, end)` in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end, "TimeRange start must be before end");
        Self { start, end }
    }

    /// Like `new`, but returns `None` instead of asserting when `start >= end`.
    pub fn checked(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Same duration, new start. `None` if the end would overflow the calendar.
    pub fn moved_to(&self, start: NaiveDateTime) -> Option<Self> {
        let end = start.checked_add_signed(self.duration())?;
        Self::checked(start, end)
    }
}
