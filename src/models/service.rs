use chrono::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub kind: ServiceKind,
    pub duration_minutes: i64,
}

/// Longest service the catalogue accepts: one full day.
pub const MAX_SERVICE_MINUTES: i64 = 24 * 60;

impl Service {
    /// `None` when the stored minutes do not fit a `Duration`.
    pub fn duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    DrivingLesson,
    Tour,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::DrivingLesson => "driving_lesson",
            ServiceKind::Tour => "tour",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "driving_lesson" => Some(ServiceKind::DrivingLesson),
            "tour" => Some(ServiceKind::Tour),
            _ => None,
        }
    }
}
