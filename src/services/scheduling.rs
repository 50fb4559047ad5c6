use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::models::{Booking, BookingDraft, BookingStatus, DraftError};
use crate::store::BookingStore;

use super::conflict::{Candidate, Conflict, ConflictPolicy};
use super::recurrence::{self, BatchMode, Expansion, RecurrenceRule, MAX_OCCURRENCES};
use super::reschedule::{self, DropOutcome, DropTarget};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulingPolicy {
    pub conflicts: ConflictPolicy,
    pub batch_mode: BatchMode,
}

/// Runs the conflict, recurrence and drag-drop logic against a store and
/// writes back whatever they decide. Every operation reads one snapshot up
/// front; a rejected operation leaves the store untouched.
pub struct Scheduler {
    policy: SchedulingPolicy,
    ids: Box<dyn IdGenerator>,
}

impl Scheduler {
    pub fn new(policy: SchedulingPolicy, ids: Box<dyn IdGenerator>) -> Self {
        Self { policy, ids }
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    pub fn check(
        &self,
        store: &dyn BookingStore,
        candidate: &Candidate<'_>,
    ) -> Result<Option<Conflict>, AppError> {
        let snapshot = store.snapshot()?;
        Ok(snapshot.checker(self.policy.conflicts).find_conflict(candidate))
    }

    pub fn create(&self, store: &mut dyn BookingStore, draft: BookingDraft) -> Result<Booking, AppError> {
        let booking = draft.finalize(self.ids.as_ref())?;
        self.ensure_free(store, &booking)?;
        store.insert(booking.clone())?;
        tracing::info!(booking_id = %booking.id, start = %booking.start, "booking created");
        Ok(booking)
    }

    /// Editing a member of a series detaches it from the series.
    pub fn edit(&self, store: &mut dyn BookingStore, draft: BookingDraft) -> Result<Booking, AppError> {
        let id = draft
            .id()
            .ok_or(DraftError::MissingField("id"))?
            .to_string();
        if store.get(&id)?.is_none() {
            return Err(AppError::NotFound(format!("booking {id}")));
        }

        let mut booking = draft.finalize(self.ids.as_ref())?;
        booking.recurring_details = None;
        self.ensure_free(store, &booking)?;
        store.update(booking.clone())?;
        tracing::info!(booking_id = %booking.id, start = %booking.start, "booking updated");
        Ok(booking)
    }

    /// Expand `draft` into a series and store every occurrence that fits.
    /// The first occurrence must fit; later ones that collide are skipped.
    pub fn create_series(
        &self,
        store: &mut dyn BookingStore,
        draft: BookingDraft,
        rule: RecurrenceRule,
    ) -> Result<Expansion, AppError> {
        if rule.count > MAX_OCCURRENCES {
            return Err(AppError::BadRequest(format!(
                "a series may have at most {MAX_OCCURRENCES} occurrences"
            )));
        }
        let seed = draft.finalize(self.ids.as_ref())?;

        let expansion = {
            let snapshot = store.snapshot()?;
            let checker = snapshot.checker(self.policy.conflicts);
            if let Some(conflict) = checker.find_conflict(&Candidate::from(&seed)) {
                tracing::warn!(booking_id = %seed.id, %conflict, "series rejected");
                return Err(AppError::Conflict(conflict));
            }
            recurrence::expand(&seed, &rule, &checker, self.ids.as_ref(), self.policy.batch_mode)
        };

        for booking in &expansion.created {
            if store.get(&booking.id)?.is_some() {
                store.update(booking.clone())?;
            } else {
                store.insert(booking.clone())?;
            }
        }

        tracing::info!(
            created = expansion.created.len(),
            skipped = expansion.skipped.len(),
            kind = rule.kind.as_str(),
            "recurring series created"
        );
        Ok(expansion)
    }

    pub fn reschedule(
        &self,
        store: &mut dyn BookingStore,
        id: &str,
        target: DropTarget,
        is_copy: bool,
    ) -> Result<DropOutcome, AppError> {
        let original = store
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

        let outcome = {
            let snapshot = store.snapshot()?;
            let checker = snapshot.checker(self.policy.conflicts);
            reschedule::resolve_drop(&original, &target, is_copy, &checker, self.ids.as_ref())
                .ok_or_else(|| AppError::BadRequest("drop target is out of range".to_string()))?
        };

        match &outcome {
            DropOutcome::Move(booking) => {
                store.update(booking.clone())?;
                tracing::info!(booking_id = %booking.id, start = %booking.start, "booking moved");
            }
            DropOutcome::Copy(booking) => {
                store.insert(booking.clone())?;
                tracing::info!(booking_id = %booking.id, source_id = %original.id, "booking copied");
            }
            DropOutcome::Reject(conflict) => {
                tracing::warn!(booking_id = %original.id, %conflict, "drop rejected");
            }
        }
        Ok(outcome)
    }

    pub fn set_status(
        &self,
        store: &mut dyn BookingStore,
        id: &str,
        status: BookingStatus,
    ) -> Result<Booking, AppError> {
        let mut booking = store
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

        if !booking.status.can_transition_to(status) {
            return Err(AppError::InvalidTransition {
                from: booking.status,
                to: status,
            });
        }
        if booking.status == status {
            return Ok(booking);
        }

        booking.status = status;
        store.update(booking.clone())?;
        tracing::info!(booking_id = %id, status = status.as_str(), "booking status changed");
        Ok(booking)
    }

    /// Removes one booking. Other members of its series stay.
    pub fn delete(&self, store: &mut dyn BookingStore, id: &str) -> Result<(), AppError> {
        if !store.remove(id)? {
            return Err(AppError::NotFound(format!("booking {id}")));
        }
        tracing::info!(booking_id = %id, "booking deleted");
        Ok(())
    }

    fn ensure_free(&self, store: &dyn BookingStore, booking: &Booking) -> Result<(), AppError> {
        match self.check(store, &Candidate::from(booking))? {
            Some(conflict) => {
                tracing::warn!(booking_id = %booking.id, %conflict, "booking rejected");
                Err(AppError::Conflict(conflict))
            }
            None => Ok(()),
        }
    }
}
