use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::TimeRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub staff_id: String,
    pub service_id: String,
    pub resource_id: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub pickup_location: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub google_event_id: Option<String>,
    pub group_size: Option<u32>,
    pub participants: Option<Vec<String>>,
    pub recurring_details: Option<RecurringDetails>,
}

impl Booking {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(BookingStatus::Scheduled),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled bookings are kept for history and never leave that state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    /// Paid out of the customer's prepaid lesson hours.
    PaidCredit,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::PaidCredit => "paid_credit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "paid" => Some(PaymentStatus::Paid),
            "paid_credit" => Some(PaymentStatus::PaidCredit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    BiWeekly,
}

impl RecurrenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceKind::Daily => "daily",
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::BiWeekly => "bi-weekly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(RecurrenceKind::Daily),
            "weekly" => Some(RecurrenceKind::Weekly),
            "bi-weekly" => Some(RecurrenceKind::BiWeekly),
            _ => None,
        }
    }

    /// Gap between the starts of two consecutive occurrences.
    pub fn step(&self) -> Duration {
        match self {
            RecurrenceKind::Daily => Duration::days(1),
            RecurrenceKind::Weekly => Duration::days(7),
            RecurrenceKind::BiWeekly => Duration::days(14),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringDetails {
    /// Shared by every booking generated from the same rule.
    pub group_id: String,
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    pub count: i32,
}
