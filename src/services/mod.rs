pub mod conflict;
pub mod recurrence;
pub mod reschedule;
pub mod scheduling;

pub use conflict::{has_conflict, Candidate, Conflict, ConflictChecker, ConflictPolicy};
pub use recurrence::{
    expand, BatchMode, Expansion, RecurrenceRule, SkippedOccurrence, MAX_OCCURRENCES,
};
pub use reschedule::{resolve_drop, snap_minutes, DropOutcome, DropTarget, SNAP_MINUTES};
pub use scheduling::{Scheduler, SchedulingPolicy};
