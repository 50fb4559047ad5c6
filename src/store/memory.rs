use crate::errors::AppError;
use crate::models::{BlockedPeriod, Booking, Service};

use super::BookingStore;

/// Insertion-ordered vectors; nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    bookings: Vec<Booking>,
    blocked: Vec<BlockedPeriod>,
    services: Vec<Service>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookingStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Booking>, AppError> {
        Ok(self.bookings.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Booking>, AppError> {
        Ok(self.bookings.iter().find(|b| b.id == id).cloned())
    }

    fn insert(&mut self, booking: Booking) -> Result<(), AppError> {
        self.bookings.push(booking);
        Ok(())
    }

    fn update(&mut self, booking: Booking) -> Result<(), AppError> {
        let slot = self
            .bookings
            .iter_mut()
            .find(|b| b.id == booking.id)
            .ok_or_else(|| AppError::NotFound(format!("booking {}", booking.id)))?;
        *slot = booking;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool, AppError> {
        let before = self.bookings.len();
        self.bookings.retain(|b| b.id != id);
        Ok(self.bookings.len() != before)
    }

    fn list_blocked(&self) -> Result<Vec<BlockedPeriod>, AppError> {
        Ok(self.blocked.clone())
    }

    fn insert_blocked(&mut self, period: BlockedPeriod) -> Result<(), AppError> {
        self.blocked.push(period);
        Ok(())
    }

    fn remove_blocked(&mut self, id: &str) -> Result<bool, AppError> {
        let before = self.blocked.len();
        self.blocked.retain(|bp| bp.id != id);
        Ok(self.blocked.len() != before)
    }

    fn list_services(&self) -> Result<Vec<Service>, AppError> {
        Ok(self.services.clone())
    }

    fn insert_service(&mut self, service: Service) -> Result<(), AppError> {
        self.services.push(service);
        Ok(())
    }
}
