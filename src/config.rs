use std::env;

use crate::services::conflict::ConflictPolicy;
use crate::services::recurrence::BatchMode;
use crate::services::scheduling::SchedulingPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    /// SQLite path; `:memory:` keeps everything in process memory.
    pub database_url: String,
    pub admin_token: String,
    pub conflicts_include_cancelled: bool,
    pub recurrence_check_within_batch: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "drivedesk.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            conflicts_include_cancelled: env_flag("CONFLICTS_INCLUDE_CANCELLED"),
            recurrence_check_within_batch: env_flag("RECURRENCE_CHECK_WITHIN_BATCH"),
        }
    }

    pub fn scheduling_policy(&self) -> SchedulingPolicy {
        SchedulingPolicy {
            conflicts: ConflictPolicy {
                include_cancelled: self.conflicts_include_cancelled,
            },
            batch_mode: if self.recurrence_check_within_batch {
                BatchMode::Incremental
            } else {
                BatchMode::AgainstExisting
            },
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
