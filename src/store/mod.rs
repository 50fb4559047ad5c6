pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::AppError;
use crate::models::{BlockedPeriod, Booking, Service};
use crate::services::conflict::{ConflictChecker, ConflictPolicy};

/// Where bookings, blocked periods and services live.
///
/// Scheduling code never holds on to the collections; it takes a
/// [`Snapshot`] at the start of an operation and writes back through
/// `insert` / `update` / `remove`.
pub trait BookingStore {
    fn list(&self) -> Result<Vec<Booking>, AppError>;

    fn get(&self, id: &str) -> Result<Option<Booking>, AppError> {
        Ok(self.list()?.into_iter().find(|b| b.id == id))
    }

    fn insert(&mut self, booking: Booking) -> Result<(), AppError>;

    /// Replace the booking with the same id. `NotFound` if there is none.
    fn update(&mut self, booking: Booking) -> Result<(), AppError>;

    /// Returns whether a booking was removed.
    fn remove(&mut self, id: &str) -> Result<bool, AppError>;

    fn list_blocked(&self) -> Result<Vec<BlockedPeriod>, AppError>;

    fn insert_blocked(&mut self, period: BlockedPeriod) -> Result<(), AppError>;

    fn remove_blocked(&mut self, id: &str) -> Result<bool, AppError>;

    fn list_services(&self) -> Result<Vec<Service>, AppError>;

    fn get_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        Ok(self.list_services()?.into_iter().find(|s| s.id == id))
    }

    fn insert_service(&mut self, service: Service) -> Result<(), AppError>;

    fn snapshot(&self) -> Result<Snapshot, AppError> {
        Ok(Snapshot {
            bookings: self.list()?,
            blocked: self.list_blocked()?,
        })
    }
}

/// Bookings and blocked periods as they were when an operation began.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub bookings: Vec<Booking>,
    pub blocked: Vec<BlockedPeriod>,
}

impl Snapshot {
    pub fn checker(&self, policy: ConflictPolicy) -> ConflictChecker<'_> {
        ConflictChecker::new(&self.bookings, &self.blocked, policy)
    }
}
