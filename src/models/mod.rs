pub mod blocked_period;
pub mod booking;
pub mod draft;
pub mod service;
pub mod time_range;

pub use blocked_period::BlockedPeriod;
pub use booking::{Booking, BookingStatus, PaymentStatus, RecurrenceKind, RecurringDetails};
pub use draft::{BookingDraft, DraftError};
pub use service::{Service, ServiceKind, MAX_SERVICE_MINUTES};
pub use time_range::TimeRange;
