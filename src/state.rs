use std::sync::{Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::Scheduler;
use crate::store::BookingStore;

pub struct AppState {
    pub store: Mutex<Box<dyn BookingStore + Send>>,
    pub config: AppConfig,
    pub scheduler: Scheduler,
}

impl AppState {
    /// Lock the store for one check-then-write sequence.
    pub fn store(&self) -> Result<MutexGuard<'_, Box<dyn BookingStore + Send>>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal("booking store lock poisoned".to_string()))
    }
}
