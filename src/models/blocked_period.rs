use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::TimeRange;

/// A stretch of time a staff member cannot be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedPeriod {
    pub id: String,
    pub staff_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reason: String,
}

impl BlockedPeriod {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}
