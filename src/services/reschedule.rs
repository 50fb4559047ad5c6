use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::conflict::{Candidate, Conflict, ConflictChecker};
use crate::ids::IdGenerator;
use crate::models::Booking;

/// Time-slot views snap drops to this grid.
pub const SNAP_MINUTES: u32 = 15;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Where a dragged booking was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub date: NaiveDate,
    /// Minutes after midnight, from a time-slot view. Absent for day-granularity
    /// drops (month grid), where the booking keeps its time of day.
    pub minutes_of_day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// The original booking with new start and end; same id.
    Move(Booking),
    /// An additional booking; the original is untouched.
    Copy(Booking),
    Reject(Conflict),
}

/// Round to the nearest multiple of [`SNAP_MINUTES`]; halves round up.
pub fn snap_minutes(minutes: u32) -> u32 {
    minutes.saturating_add(SNAP_MINUTES / 2) / SNAP_MINUTES * SNAP_MINUTES
}

fn drop_start(original: &Booking, target: &DropTarget) -> Option<NaiveDateTime> {
    match target.minutes_of_day {
        Some(minutes) if minutes >= MINUTES_PER_DAY => None,
        Some(minutes) => {
            let midnight = target.date.and_time(NaiveTime::MIN);
            midnight.checked_add_signed(Duration::minutes(snap_minutes(minutes) as i64))
        }
        None => {
            let time = original.start.time();
            let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)?;
            Some(target.date.and_time(time))
        }
    }
}

/// Work out what dropping `original` on `target` should do.
///
/// The duration is preserved exactly. A move keeps every field except the
/// interval; a copy also takes a fresh id. The check skips only the booking
/// whose id the proposed booking carries: the original for a move, nothing
/// for a copy, so a copy can collide with its own original.
///
/// Returns `None` when the target lies outside the representable calendar or
/// `minutes_of_day` is not within the day.
pub fn resolve_drop(
    original: &Booking,
    target: &DropTarget,
    is_copy: bool,
    checker: &ConflictChecker<'_>,
    ids: &dyn IdGenerator,
) -> Option<DropOutcome> {
    let start = drop_start(original, target)?;
    let range = original.range().moved_to(start)?;

    let proposed = Booking {
        id: if is_copy { ids.next_id() } else { original.id.clone() },
        start: range.start,
        end: range.end,
        ..original.clone()
    };

    if let Some(conflict) = checker.find_conflict(&Candidate::from(&proposed)) {
        return Some(DropOutcome::Reject(conflict));
    }

    Some(if is_copy {
        DropOutcome::Copy(proposed)
    } else {
        DropOutcome::Move(proposed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::models::{BlockedPeriod, BookingStatus, PaymentStatus};
    use crate::services::conflict::ConflictPolicy;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn lesson(id: &str, staff: &str, start: &str, end: &str) -> Booking {
        Booking {
            id: id.to_string(),
            customer_id: "cust-1".to_string(),
            staff_id: staff.to_string(),
            service_id: "svc-1".to_string(),
            resource_id: None,
            start: dt(start),
            end: dt(end),
            pickup_location: None,
            status: BookingStatus::Scheduled,
            payment_status: PaymentStatus::Paid,
            google_event_id: Some("gcal-123".to_string()),
            group_size: None,
            participants: None,
            recurring_details: None,
        }
    }

    #[test]
    fn test_snap_minutes() {
        assert_eq!(snap_minutes(127), 120);
        assert_eq!(snap_minutes(128), 135);
        assert_eq!(snap_minutes(120), 120);
        assert_eq!(snap_minutes(7), 0);
        assert_eq!(snap_minutes(8), 15);
        assert_eq!(snap_minutes(u32::MAX), u32::MAX / 15 * 15);
    }

    #[test]
    fn test_move_into_time_slot() {
        let original = lesson("b1", "s1", "2024-01-01 10:00", "2024-01-01 11:30");
        let bookings = vec![original.clone()];
        let checker = ConflictChecker::new(&bookings, &[], ConflictPolicy::default());
        let ids = SequentialIds::new("new");
        let target = DropTarget {
            date: day("2024-01-03"),
            minutes_of_day: Some(6 * 60 + 127),
        };

        let outcome = resolve_drop(&original, &target, false, &checker, &ids).unwrap();

        let DropOutcome::Move(moved) = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(moved.id, "b1");
        assert_eq!(moved.start, dt("2024-01-03 08:00"));
        assert_eq!(moved.end, dt("2024-01-03 09:30"));
        assert_eq!(moved.payment_status, PaymentStatus::Paid);
        assert_eq!(moved.google_event_id.as_deref(), Some("gcal-123"));
    }

    #[test]
    fn test_day_drop_keeps_time_of_day() {
        let mut original = lesson("b1", "s1", "2024-01-01 10:45", "2024-01-01 11:45");
        original.start = original.start.with_second(30).unwrap();
        original.end = original.end.with_second(30).unwrap();
        let checker = ConflictChecker::new(&[], &[], ConflictPolicy::default());
        let ids = SequentialIds::new("new");
        let target = DropTarget {
            date: day("2024-02-10"),
            minutes_of_day: None,
        };

        let Some(DropOutcome::Move(moved)) = resolve_drop(&original, &target, false, &checker, &ids) else {
            panic!("expected a move");
        };
        assert_eq!(moved.start, dt("2024-02-10 10:45"));
        assert_eq!(moved.duration(), original.duration());
    }

    #[test]
    fn test_copy_gets_new_identity() {
        let original = lesson("b1", "s1", "2024-01-01 10:00", "2024-01-01 11:00");
        let bookings = vec![original.clone()];
        let checker = ConflictChecker::new(&bookings, &[], ConflictPolicy::default());
        let ids = SequentialIds::new("new");
        let target = DropTarget {
            date: day("2024-01-02"),
            minutes_of_day: None,
        };

        let Some(DropOutcome::Copy(copy)) = resolve_drop(&original, &target, true, &checker, &ids) else {
            panic!("expected a copy");
        };
        assert_eq!(copy.id, "new-1");
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.start, dt("2024-01-02 10:00"));
        let mut normalized = copy.clone();
        normalized.id = original.id.clone();
        normalized.start = original.start;
        normalized.end = original.end;
        assert_eq!(normalized, original);
    }

    #[test]
    fn test_copy_onto_its_own_slot_conflicts() {
        let original = lesson("b1", "s1", "2024-01-01 10:00", "2024-01-01 11:00");
        let bookings = vec![original.clone()];
        let checker = ConflictChecker::new(&bookings, &[], ConflictPolicy::default());
        let ids = SequentialIds::new("new");
        let target = DropTarget {
            date: day("2024-01-01"),
            minutes_of_day: Some(10 * 60 + 30),
        };

        let moved = resolve_drop(&original, &target, false, &checker, &ids).unwrap();
        assert!(matches!(moved, DropOutcome::Move(_)));

        let copied = resolve_drop(&original, &target, true, &checker, &ids).unwrap();
        assert_eq!(copied, DropOutcome::Reject(Conflict::Booking("b1".to_string())));
    }

    #[test]
    fn test_drop_onto_busy_slot_is_rejected() {
        let original = lesson("b1", "s1", "2024-01-01 10:00", "2024-01-01 11:00");
        let busy = lesson("b2", "s1", "2024-01-05 09:00", "2024-01-05 10:00");
        let bookings = vec![original.clone(), busy];
        let periods = vec![BlockedPeriod {
            id: "bp1".to_string(),
            staff_id: "s1".to_string(),
            start: dt("2024-01-06 00:00"),
            end: dt("2024-01-07 00:00"),
            reason: "training".to_string(),
        }];
        let checker = ConflictChecker::new(&bookings, &periods, ConflictPolicy::default());
        let ids = SequentialIds::new("new");

        let into_booking = DropTarget {
            date: day("2024-01-05"),
            minutes_of_day: Some(9 * 60 + 30),
        };
        assert_eq!(
            resolve_drop(&original, &into_booking, false, &checker, &ids),
            Some(DropOutcome::Reject(Conflict::Booking("b2".to_string())))
        );

        let into_block = DropTarget {
            date: day("2024-01-06"),
            minutes_of_day: None,
        };
        assert_eq!(
            resolve_drop(&original, &into_block, false, &checker, &ids),
            Some(DropOutcome::Reject(Conflict::Blocked("bp1".to_string())))
        );
    }

    #[test]
    fn test_late_slot_rolls_into_next_day() {
        let original = lesson("b1", "s1", "2024-01-01 10:00", "2024-01-01 11:00");
        let checker = ConflictChecker::new(&[], &[], ConflictPolicy::default());
        let ids = SequentialIds::new("new");
        let target = DropTarget {
            date: day("2024-01-01"),
            minutes_of_day: Some(24 * 60 - 5),
        };

        let Some(DropOutcome::Move(moved)) = resolve_drop(&original, &target, false, &checker, &ids) else {
            panic!("expected a move");
        };
        assert_eq!(moved.start, dt("2024-01-02 00:00"));
    }

    #[test]
    fn test_minutes_outside_the_day_are_refused() {
        let original = lesson("b1", "s1", "2024-01-01 10:00", "2024-01-01 11:00");
        let checker = ConflictChecker::new(&[], &[], ConflictPolicy::default());
        let ids = SequentialIds::new("new");

        for minutes in [24 * 60, u32::MAX] {
            let target = DropTarget {
                date: day("2024-01-02"),
                minutes_of_day: Some(minutes),
            };
            assert_eq!(resolve_drop(&original, &target, false, &checker, &ids), None);
        }
    }
}
