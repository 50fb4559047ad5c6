use rusqlite::Connection;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{BlockedPeriod, Booking, Service};

use super::BookingStore;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::init_db(path)?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl BookingStore for SqliteStore {
    fn list(&self) -> Result<Vec<Booking>, AppError> {
        Ok(queries::get_all_bookings(&self.conn)?)
    }

    fn get(&self, id: &str) -> Result<Option<Booking>, AppError> {
        Ok(queries::get_booking_by_id(&self.conn, id)?)
    }

    fn insert(&mut self, booking: Booking) -> Result<(), AppError> {
        Ok(queries::insert_booking(&self.conn, &booking)?)
    }

    fn update(&mut self, booking: Booking) -> Result<(), AppError> {
        if !queries::update_booking(&self.conn, &booking)? {
            return Err(AppError::NotFound(format!("booking {}", booking.id)));
        }
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool, AppError> {
        Ok(queries::delete_booking(&self.conn, id)?)
    }

    fn list_blocked(&self) -> Result<Vec<BlockedPeriod>, AppError> {
        Ok(queries::get_blocked_periods(&self.conn)?)
    }

    fn insert_blocked(&mut self, period: BlockedPeriod) -> Result<(), AppError> {
        Ok(queries::insert_blocked_period(&self.conn, &period)?)
    }

    fn remove_blocked(&mut self, id: &str) -> Result<bool, AppError> {
        Ok(queries::delete_blocked_period(&self.conn, id)?)
    }

    fn list_services(&self) -> Result<Vec<Service>, AppError> {
        Ok(queries::get_services(&self.conn)?)
    }

    fn get_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        Ok(queries::get_service_by_id(&self.conn, id)?)
    }

    fn insert_service(&mut self, service: Service) -> Result<(), AppError> {
        Ok(queries::insert_service(&self.conn, &service)?)
    }
}
