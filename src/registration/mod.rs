//! # Registration Engine
//!
//! The write side of the crate: the locking slot reservation transaction,
//! the lifecycle orchestrator that drives registrations from creation
//! through payment or cancellation, and the background expiry sweeper.

pub mod lifecycle;
pub mod reservation;
pub mod sweeper;

pub use lifecycle::{
    AdminRegistrationRequest, RegistrationLifecycle, ReservationOutcome, ReserveRequest,
    SlotSelection,
};
pub use reservation::reserve_slots;
pub use sweeper::ExpirySweeper;
