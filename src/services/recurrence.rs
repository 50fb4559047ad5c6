use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::conflict::{Candidate, Conflict, ConflictChecker};
use crate::ids::IdGenerator;
use crate::models::{Booking, RecurrenceKind, RecurringDetails};

/// Upper bound on `count` for one series: a year of daily lessons.
pub const MAX_OCCURRENCES: i32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    pub count: i32,
}

/// Which bookings each generated occurrence is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Only what existed before the batch started. Two occurrences of the
    /// same batch may land on the same slot.
    #[default]
    AgainstExisting,
    /// Existing state plus the occurrences accepted so far in this batch.
    Incremental,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOccurrence {
    pub index: usize,
    pub start: NaiveDateTime,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Expansion {
    pub created: Vec<Booking>,
    pub skipped: Vec<SkippedOccurrence>,
}

/// Generate the bookings of a recurring series.
///
/// Occurrence 0 is the seed itself and keeps its id; later occurrences are
/// spaced by the rule's step, keep the seed's duration and get fresh ids.
/// All of them share one group id. Occurrences that conflict are skipped and
/// reported, the rest are still produced.
pub fn expand(
    seed: &Booking,
    rule: &RecurrenceRule,
    checker: &ConflictChecker<'_>,
    ids: &dyn IdGenerator,
    mode: BatchMode,
) -> Expansion {
    let mut expansion = Expansion::default();
    if rule.count <= 0 {
        return expansion;
    }

    let group_id = seed
        .recurring_details
        .as_ref()
        .map(|d| d.group_id.clone())
        .unwrap_or_else(|| ids.next_id());
    let details = RecurringDetails {
        group_id,
        kind: rule.kind,
        count: rule.count,
    };
    let base = seed.range();

    let mut start = seed.start;
    for index in 0..rule.count as usize {
        if index > 0 {
            match start.checked_add_signed(rule.kind.step()) {
                Some(next) => start = next,
                None => {
                    tracing::warn!(index, "recurrence ran past the supported date range");
                    break;
                }
            }
        }
        let Some(range) = base.moved_to(start) else {
            tracing::warn!(index, "recurrence ran past the supported date range");
            break;
        };

        let occurrence = Booking {
            id: if index == 0 { seed.id.clone() } else { ids.next_id() },
            start: range.start,
            end: range.end,
            recurring_details: Some(details.clone()),
            ..seed.clone()
        };

        if let Some(conflict) = occurrence_conflict(&occurrence, checker, &expansion.created, mode) {
            tracing::warn!(
                index,
                start = %occurrence.start,
                reason = %conflict,
                "skipping recurring booking due to conflict"
            );
            expansion.skipped.push(SkippedOccurrence {
                index,
                start: occurrence.start,
                reason: conflict.to_string(),
            });
            continue;
        }
        expansion.created.push(occurrence);
    }

    expansion
}

fn occurrence_conflict(
    occurrence: &Booking,
    checker: &ConflictChecker<'_>,
    accepted: &[Booking],
    mode: BatchMode,
) -> Option<Conflict> {
    let candidate = Candidate::from(occurrence);
    if let Some(conflict) = checker.find_conflict(&candidate) {
        return Some(conflict);
    }
    match mode {
        BatchMode::AgainstExisting => None,
        BatchMode::Incremental => {
            ConflictChecker::new(accepted, &[], checker.policy()).find_conflict(&candidate)
        }
    }
}
