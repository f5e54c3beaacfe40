//! # Data Layer
//!
//! sqlx-backed models for the reservation engine. Each model owns its own
//! queries; anything touching slot status goes through the locking
//! transaction in `registration::reservation` instead.

pub mod event;
pub mod hole;
pub mod payment;
pub mod registration;
pub mod slot;

pub use event::{ClubEvent, EventType, RegistrationType, StartType};
pub use hole::Hole;
pub use payment::{NewPayment, NewRegistrationFee, Payment, RegistrationFee};
pub use registration::{NewRegistration, Registration};
pub use slot::RegistrationSlot;
