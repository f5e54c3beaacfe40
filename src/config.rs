use crate::error::{RegistrationError, Result};

/// Runtime configuration for the reservation engine.
///
/// Values come from the environment with sensible defaults; expiry windows
/// mirror the production signup flow (5 minutes when players pick their own
/// slots, 15 when slots are created on demand).
#[derive(Debug, Clone)]
pub struct TeesheetConfig {
    pub database_url: String,
    /// Minutes before an unpaid choosable-event reservation expires.
    pub choosable_expiry_minutes: i64,
    /// Minutes before an unpaid non-choosable reservation expires.
    pub non_choosable_expiry_minutes: i64,
    /// Seconds between expiry sweeps.
    pub sweep_interval_seconds: u64,
    /// Capacity of the notification broadcast channel.
    pub notification_capacity: usize,
}

impl Default for TeesheetConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/teesheet_development".to_string(),
            choosable_expiry_minutes: 5,
            non_choosable_expiry_minutes: 15,
            sweep_interval_seconds: 60,
            notification_capacity: 1000,
        }
    }
}

impl TeesheetConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(minutes) = std::env::var("TEESHEET_CHOOSABLE_EXPIRY_MINUTES") {
            config.choosable_expiry_minutes = minutes.parse().map_err(|e| {
                RegistrationError::Configuration(format!("Invalid choosable_expiry_minutes: {e}"))
            })?;
        }

        if let Ok(minutes) = std::env::var("TEESHEET_NON_CHOOSABLE_EXPIRY_MINUTES") {
            config.non_choosable_expiry_minutes = minutes.parse().map_err(|e| {
                RegistrationError::Configuration(format!(
                    "Invalid non_choosable_expiry_minutes: {e}"
                ))
            })?;
        }

        if let Ok(seconds) = std::env::var("TEESHEET_SWEEP_INTERVAL_SECONDS") {
            config.sweep_interval_seconds = seconds.parse().map_err(|e| {
                RegistrationError::Configuration(format!("Invalid sweep_interval_seconds: {e}"))
            })?;
        }

        Ok(config)
    }
}
