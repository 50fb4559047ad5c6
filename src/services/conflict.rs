use std::fmt;

use crate::models::{BlockedPeriod, Booking, TimeRange};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictPolicy {
    /// When false, cancelled bookings neither block nor get blocked.
    pub include_cancelled: bool,
}

/// What a conflict check is asked about: an interval plus whoever would be busy in it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Excluded from the comparison so a booking never collides with itself.
    pub id: Option<&'a str>,
    pub staff_id: Option<&'a str>,
    pub resource_id: Option<&'a str>,
    pub range: TimeRange,
    pub cancelled: bool,
}

impl<'a> Candidate<'a> {
    pub fn new(range: TimeRange) -> Self {
        Self {
            id: None,
            staff_id: None,
            resource_id: None,
            range,
            cancelled: false,
        }
    }
}

impl<'a> From<&'a Booking> for Candidate<'a> {
    fn from(booking: &'a Booking) -> Self {
        Self {
            id: Some(&booking.id),
            staff_id: Some(&booking.staff_id),
            resource_id: booking.resource_id.as_deref(),
            range: booking.range(),
            cancelled: booking.is_cancelled(),
        }
    }
}

/// The first thing a candidate collided with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    Booking(String),
    Blocked(String),
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::Booking(id) => write!(f, "conflicts with booking {id}"),
            Conflict::Blocked(id) => write!(f, "falls in blocked period {id}"),
        }
    }
}

/// Read-only view over the bookings and blocked periods a check runs against.
pub struct ConflictChecker<'a> {
    bookings: &'a [Booking],
    blocked: &'a [BlockedPeriod],
    policy: ConflictPolicy,
}

impl<'a> ConflictChecker<'a> {
    pub fn new(bookings: &'a [Booking], blocked: &'a [BlockedPeriod], policy: ConflictPolicy) -> Self {
        Self {
            bookings,
            blocked,
            policy,
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    pub fn has_conflict(&self, candidate: &Candidate<'_>) -> bool {
        self.find_conflict(candidate).is_some()
    }

    pub fn find_conflict(&self, candidate: &Candidate<'_>) -> Option<Conflict> {
        if candidate.cancelled && !self.policy.include_cancelled {
            return None;
        }

        let booking_hit = self.bookings.iter().find(|b| {
            if candidate.id == Some(b.id.as_str()) {
                return false;
            }
            if b.is_cancelled() && !self.policy.include_cancelled {
                return false;
            }
            shares_staff_or_resource(candidate, b) && candidate.range.overlaps(&b.range())
        });
        if let Some(b) = booking_hit {
            return Some(Conflict::Booking(b.id.clone()));
        }

        let staff_id = candidate.staff_id?;
        self.blocked
            .iter()
            .find(|bp| bp.staff_id == staff_id && candidate.range.overlaps(&bp.range()))
            .map(|bp| Conflict::Blocked(bp.id.clone()))
    }
}

fn shares_staff_or_resource(candidate: &Candidate<'_>, existing: &Booking) -> bool {
    let same_staff = candidate.staff_id == Some(existing.staff_id.as_str());
    let same_resource = matches!(
        (candidate.resource_id, existing.resource_id.as_deref()),
        (Some(a), Some(b)) if a == b
    );
    same_staff || same_resource
}

/// True when `candidate` overlaps a booking sharing its staff member or
/// resource, or a blocked period of its staff member. Cancelled bookings are ignored.
pub fn has_conflict(candidate: &Candidate<'_>, bookings: &[Booking], blocked: &[BlockedPeriod]) -> bool {
    ConflictChecker::new(bookings, blocked, ConflictPolicy::default()).has_conflict(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, PaymentStatus};
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn booking(id: &str, staff: &str, resource: Option<&str>, start: &str, end: &str) -> Booking {
        Booking {
            id: id.to_string(),
            customer_id: "cust-1".to_string(),
            staff_id: staff.to_string(),
            service_id: "svc-1".to_string(),
            resource_id: resource.map(str::to_string),
            start: dt(start),
            end: dt(end),
            pickup_location: None,
            status: BookingStatus::Scheduled,
            payment_status: PaymentStatus::Unpaid,
            google_event_id: None,
            group_size: None,
            participants: None,
            recurring_details: None,
        }
    }

    fn blocked(id: &str, staff: &str, start: &str, end: &str) -> BlockedPeriod {
        BlockedPeriod {
            id: id.to_string(),
            staff_id: staff.to_string(),
            start: dt(start),
            end: dt(end),
            reason: "holiday".to_string(),
        }
    }

    fn candidate<'a>(staff: Option<&'a str>, resource: Option<&'a str>, start: &str, end: &str) -> Candidate<'a> {
        Candidate {
            staff_id: staff,
            resource_id: resource,
            ..Candidate::new(TimeRange::new(dt(start), dt(end)))
        }
    }

    #[test]
    fn test_same_staff_overlap_conflicts() {
        let existing = vec![booking("b1", "s1", None, "2024-01-01 10:00", "2024-01-01 11:00")];
        let c = candidate(Some("s1"), None, "2024-01-01 10:30", "2024-01-01 11:30");
        assert!(has_conflict(&c, &existing, &[]));
    }

    #[test]
    fn test_touching_endpoints_do_not_conflict() {
        let existing = vec![booking("b1", "s1", None, "2024-01-01 10:00", "2024-01-01 11:00")];
        let after = candidate(Some("s1"), None, "2024-01-01 11:00", "2024-01-01 12:00");
        let before = candidate(Some("s1"), None, "2024-01-01 09:00", "2024-01-01 10:00");
        assert!(!has_conflict(&after, &existing, &[]));
        assert!(!has_conflict(&before, &existing, &[]));
    }

    #[test]
    fn test_different_staff_and_resource_never_conflict() {
        let existing = vec![booking("b1", "s1", Some("car-1"), "2024-01-01 10:00", "2024-01-01 11:00")];
        let c = candidate(Some("s2"), Some("car-2"), "2024-01-01 10:00", "2024-01-01 11:00");
        assert!(!has_conflict(&c, &existing, &[]));
    }

    #[test]
    fn test_same_resource_different_staff_conflicts() {
        let existing = vec![booking("b1", "s1", Some("car-1"), "2024-01-01 10:00", "2024-01-01 11:00")];
        let c = candidate(Some("s2"), Some("car-1"), "2024-01-01 10:15", "2024-01-01 10:45");
        let checker = ConflictChecker::new(&existing, &[], ConflictPolicy::default());
        assert_eq!(checker.find_conflict(&c), Some(Conflict::Booking("b1".to_string())));
    }

    #[test]
    fn test_missing_resource_on_both_sides_is_not_a_match() {
        let existing = vec![booking("b1", "s1", None, "2024-01-01 10:00", "2024-01-01 11:00")];
        let c = candidate(Some("s2"), None, "2024-01-01 10:00", "2024-01-01 11:00");
        assert!(!has_conflict(&c, &existing, &[]));
    }

    #[test]
    fn test_booking_never_conflicts_with_itself() {
        let existing = vec![booking("b1", "s1", Some("car-1"), "2024-01-01 10:00", "2024-01-01 11:00")];
        let mut edited = existing[0].clone();
        edited.start = dt("2024-01-01 10:15");
        edited.end = dt("2024-01-01 10:45");
        assert!(!has_conflict(&Candidate::from(&edited), &existing, &[]));
    }

    #[test]
    fn test_blocked_period_for_same_staff_conflicts() {
        let periods = vec![blocked("bp1", "s1", "2024-01-01 12:00", "2024-01-01 17:00")];
        let c = candidate(Some("s1"), None, "2024-01-01 16:00", "2024-01-01 17:30");
        let checker = ConflictChecker::new(&[], &periods, ConflictPolicy::default());
        assert_eq!(checker.find_conflict(&c), Some(Conflict::Blocked("bp1".to_string())));
    }

    #[test]
    fn test_blocked_period_ignores_other_staff_and_resources() {
        let periods = vec![blocked("bp1", "s1", "2024-01-01 12:00", "2024-01-01 17:00")];
        let other_staff = candidate(Some("s2"), Some("car-1"), "2024-01-01 13:00", "2024-01-01 14:00");
        let no_staff = candidate(None, Some("car-1"), "2024-01-01 13:00", "2024-01-01 14:00");
        assert!(!has_conflict(&other_staff, &[], &periods));
        assert!(!has_conflict(&no_staff, &[], &periods));
    }

    #[test]
    fn test_cancelled_bookings_are_ignored_by_default() {
        let mut cancelled = booking("b1", "s1", None, "2024-01-01 10:00", "2024-01-01 11:00");
        cancelled.status = BookingStatus::Cancelled;
        let existing = vec![cancelled];
        let c = candidate(Some("s1"), None, "2024-01-01 10:00", "2024-01-01 11:00");

        assert!(!has_conflict(&c, &existing, &[]));

        let strict = ConflictChecker::new(&existing, &[], ConflictPolicy { include_cancelled: true });
        assert!(strict.has_conflict(&c));
    }

    #[test]
    fn test_cancelled_candidate_is_not_blocked() {
        let existing = vec![booking("b1", "s1", None, "2024-01-01 10:00", "2024-01-01 11:00")];
        let mut c = candidate(Some("s1"), None, "2024-01-01 10:00", "2024-01-01 11:00");
        c.cancelled = true;
        assert!(!has_conflict(&c, &existing, &[]));
    }

    #[test]
    fn test_bookings_reported_before_blocked_periods() {
        let existing = vec![booking("b1", "s1", None, "2024-01-01 10:00", "2024-01-01 11:00")];
        let periods = vec![blocked("bp1", "s1", "2024-01-01 09:00", "2024-01-01 18:00")];
        let c = candidate(Some("s1"), None, "2024-01-01 10:00", "2024-01-01 10:30");
        let checker = ConflictChecker::new(&existing, &periods, ConflictPolicy::default());
        assert_eq!(checker.find_conflict(&c), Some(Conflict::Booking("b1".to_string())));
    }
}
