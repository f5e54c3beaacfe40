//! # Error Types
//!
//! Structured error handling for the reservation engine using thiserror.
//! Every failure a caller can act on is a distinct variant so upstream
//! controllers can render "slots no longer available" and "window not open"
//! differently.

use thiserror::Error;

/// Errors surfaced by the reservation and admission-control engine.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("The event is not currently open for registration")]
    RegistrationNotOpen,

    #[error("Wave {required_wave} times are not yet open for registration")]
    WaveNotOpen { required_wave: i32 },

    #[error("A course must be included when registering for this event")]
    CourseRequired,

    #[error("Player is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i64 },

    #[error("One or more of the requested slots could not be found")]
    MissingSlots,

    #[error("The event field is full")]
    EventFull,

    #[error("One or more of the slots you requested have already been reserved")]
    SlotConflict,

    #[error("No payment found for id {payment_id}; the registration may have timed out")]
    PaymentNotFound { payment_id: i64 },

    #[error("Hole {hole_id} not found")]
    HoleNotFound { hole_id: i64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RegistrationError {
    /// True when the error is a legitimate race outcome rather than a bug;
    /// callers may retry with a fresh availability read.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SlotConflict)
    }
}

pub type Result<T> = std::result::Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_distinct() {
        let conflict = RegistrationError::SlotConflict;
        let not_open = RegistrationError::RegistrationNotOpen;
        assert_ne!(conflict.to_string(), not_open.to_string());
        assert!(conflict.is_retryable());
        assert!(!not_open.is_retryable());
    }

    #[test]
    fn test_wave_error_carries_required_wave() {
        let err = RegistrationError::WaveNotOpen { required_wave: 3 };
        assert_eq!(
            err.to_string(),
            "Wave 3 times are not yet open for registration"
        );
    }
}
