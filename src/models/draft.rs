use chrono::{Duration, NaiveDateTime};

use super::{Booking, BookingStatus, PaymentStatus, RecurringDetails, Service};
use crate::ids::IdGenerator;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("service duration of {0} minutes is out of range")]
    InvalidDuration(i64),

    #[error("booking must end after it starts ({start} .. {end})")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// A booking being assembled from form input.
///
/// Fields accumulate one at a time; nothing is checked until [`BookingDraft::finalize`].
/// The end instant is never set directly: it follows from the start and the
/// chosen service's duration.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    id: Option<String>,
    customer_id: Option<String>,
    staff_id: Option<String>,
    service_id: Option<String>,
    resource_id: Option<String>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    duration: Option<Duration>,
    bad_service_minutes: Option<i64>,
    pickup_location: Option<String>,
    status: Option<BookingStatus>,
    payment_status: Option<PaymentStatus>,
    google_event_id: Option<String>,
    group_size: Option<u32>,
    participants: Option<Vec<String>>,
    recurring_details: Option<RecurringDetails>,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an edit of an existing booking. Its current duration is kept
    /// until a service is chosen again.
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            id: Some(booking.id.clone()),
            customer_id: Some(booking.customer_id.clone()),
            staff_id: Some(booking.staff_id.clone()),
            service_id: Some(booking.service_id.clone()),
            resource_id: booking.resource_id.clone(),
            start: Some(booking.start),
            end: Some(booking.end),
            duration: Some(booking.duration()),
            bad_service_minutes: None,
            pickup_location: booking.pickup_location.clone(),
            status: Some(booking.status),
            payment_status: Some(booking.payment_status),
            google_event_id: booking.google_event_id.clone(),
            group_size: booking.group_size,
            participants: booking.participants.clone(),
            recurring_details: booking.recurring_details.clone(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    pub fn with_resource(mut self, resource_id: Option<String>) -> Self {
        self.resource_id = resource_id;
        self
    }

    pub fn with_service(mut self, service: &Service) -> Self {
        self.service_id = Some(service.id.clone());
        self.duration = service.duration();
        self.bad_service_minutes = match self.duration {
            Some(_) => None,
            None => Some(service.duration_minutes),
        };
        self.recompute_end();
        self
    }

    pub fn starting_at(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self.recompute_end();
        self
    }

    pub fn with_pickup(mut self, pickup_location: Option<String>) -> Self {
        self.pickup_location = pickup_location;
        self
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    pub fn with_group(mut self, group_size: Option<u32>, participants: Option<Vec<String>>) -> Self {
        self.group_size = group_size;
        self.participants = participants;
        self
    }

    fn recompute_end(&mut self) {
        if let (Some(start), Some(duration)) = (self.start, self.duration) {
            self.end = start.checked_add_signed(duration);
        }
    }

    /// Check required fields and the interval, then produce a booking.
    /// A draft without an id gets a fresh one from `ids`.
    pub fn finalize(self, ids: &dyn IdGenerator) -> Result<Booking, DraftError> {
        let customer_id = self.customer_id.ok_or(DraftError::MissingField("customer_id"))?;
        let staff_id = self.staff_id.ok_or(DraftError::MissingField("staff_id"))?;
        let service_id = self.service_id.ok_or(DraftError::MissingField("service_id"))?;
        if let Some(minutes) = self.bad_service_minutes {
            return Err(DraftError::InvalidDuration(minutes));
        }
        let start = self.start.ok_or(DraftError::MissingField("start"))?;
        let end = self.end.ok_or(DraftError::MissingField("end"))?;
        if end <= start {
            return Err(DraftError::InvalidInterval { start, end });
        }

        Ok(Booking {
            id: self.id.unwrap_or_else(|| ids.next_id()),
            customer_id,
            staff_id,
            service_id,
            resource_id: self.resource_id,
            start,
            end,
            pickup_location: self.pickup_location,
            status: self.status.unwrap_or(BookingStatus::Scheduled),
            payment_status: self.payment_status.unwrap_or(PaymentStatus::Unpaid),
            google_event_id: self.google_event_id,
            group_size: self.group_size,
            participants: self.participants,
            recurring_details: self.recurring_details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::models::ServiceKind;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn lesson(minutes: i64) -> Service {
        Service {
            id: "svc-lesson".to_string(),
            name: "Driving Lesson".to_string(),
            kind: ServiceKind::DrivingLesson,
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_end_follows_service_duration() {
        let ids = SequentialIds::new("b");
        let booking = BookingDraft::new()
            .with_customer("c1")
            .with_staff("s1")
            .starting_at(dt("2024-01-01 09:00"))
            .with_service(&lesson(90))
            .finalize(&ids)
            .unwrap();
        assert_eq!(booking.end, dt("2024-01-01 10:30"));
        assert_eq!(booking.service_id, "svc-lesson");
        assert_eq!(booking.status, BookingStatus::Scheduled);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.id, "b-1");
    }

    #[test]
    fn test_changing_start_moves_end() {
        let ids = SequentialIds::new("b");
        let booking = BookingDraft::new()
            .with_customer("c1")
            .with_staff("s1")
            .with_service(&lesson(60))
            .starting_at(dt("2024-01-01 09:00"))
            .starting_at(dt("2024-01-01 14:15"))
            .finalize(&ids)
            .unwrap();
        assert_eq!(booking.start, dt("2024-01-01 14:15"));
        assert_eq!(booking.end, dt("2024-01-01 15:15"));
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let ids = SequentialIds::new("b");
        let err = BookingDraft::new()
            .with_staff("s1")
            .with_service(&lesson(60))
            .starting_at(dt("2024-01-01 09:00"))
            .finalize(&ids)
            .unwrap_err();
        assert_eq!(err, DraftError::MissingField("customer_id"));

        let err = BookingDraft::new()
            .with_customer("c1")
            .with_staff("s1")
            .with_service(&lesson(60))
            .finalize(&ids)
            .unwrap_err();
        assert_eq!(err, DraftError::MissingField("start"));
    }

    #[test]
    fn test_zero_duration_service_is_rejected() {
        let ids = SequentialIds::new("b");
        let err = BookingDraft::new()
            .with_customer("c1")
            .with_staff("s1")
            .with_service(&lesson(0))
            .starting_at(dt("2024-01-01 09:00"))
            .finalize(&ids)
            .unwrap_err();
        assert!(matches!(err, DraftError::InvalidInterval { .. }));
    }

    #[test]
    fn test_oversized_service_duration_is_rejected() {
        let ids = SequentialIds::new("b");
        let err = BookingDraft::new()
            .with_customer("c1")
            .with_staff("s1")
            .starting_at(dt("2024-01-01 09:00"))
            .with_service(&lesson(9_000_000_000_000_000))
            .finalize(&ids)
            .unwrap_err();
        assert_eq!(err, DraftError::InvalidDuration(9_000_000_000_000_000));

        // picking a sane service afterwards clears the error
        let booking = BookingDraft::new()
            .with_customer("c1")
            .with_staff("s1")
            .starting_at(dt("2024-01-01 09:00"))
            .with_service(&lesson(i64::MAX))
            .with_service(&lesson(30))
            .finalize(&ids)
            .unwrap();
        assert_eq!(booking.end, dt("2024-01-01 09:30"));
    }

    #[test]
    fn test_edit_keeps_identity_and_duration() {
        let ids = SequentialIds::new("b");
        let original = BookingDraft::new()
            .with_customer("c1")
            .with_staff("s1")
            .with_service(&lesson(45))
            .starting_at(dt("2024-01-01 09:00"))
            .with_payment_status(PaymentStatus::Paid)
            .finalize(&ids)
            .unwrap();

        let edited = BookingDraft::from_booking(&original)
            .starting_at(dt("2024-01-02 13:00"))
            .finalize(&ids)
            .unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.end, dt("2024-01-02 13:45"));
        assert_eq!(edited.payment_status, PaymentStatus::Paid);
    }
}
