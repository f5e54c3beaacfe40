#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Teesheet Core
//!
//! Slot reservation and admission-control engine for golf club events.
//!
//! ## Overview
//!
//! Events publish a fixed grid of reservable slots, either tee times spaced
//! down a tee sheet or letter groups fanned across shotgun holes. Players
//! race for those slots the moment signup opens, so the engine's job is to
//! hand each slot to exactly one registration, hold it while payment is
//! collected, and give it back if payment never arrives.
//!
//! ## Architecture
//!
//! Correctness under concurrency is delegated to PostgreSQL row locks: the
//! reservation transaction in [`registration::reservation`] locks the
//! requested slot rows, re-checks availability under the lock, and commits
//! or conflicts atomically. Everything above that (admission windows,
//! wave eligibility, expiry) is plain sequential logic.
//!
//! ## Module Organization
//!
//! - [`models`] - Data layer over events, slots, registrations, payments
//! - [`state_machine`] - Slot status transitions
//! - [`registration`] - Reservation transaction, lifecycle, expiry sweeper
//! - [`admission`] - Signup windows and priority waves
//! - [`schedule`] - Tee time and shotgun start math
//! - [`grouping`] - Display labels for registration groups
//! - [`payments`] - Gateway trait boundary
//! - [`notifications`] - Fire-and-forget lifecycle broadcasts
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use teesheet_core::config::TeesheetConfig;
//! use teesheet_core::state_machine::SlotStatus;
//!
//! let config = TeesheetConfig::default();
//! assert_eq!(config.choosable_expiry_minutes, 5);
//! assert_eq!(SlotStatus::Available.code(), "A");
//! ```

pub mod admission;
pub mod config;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod payments;
pub mod registration;
pub mod schedule;
pub mod state_machine;

pub use config::TeesheetConfig;
pub use error::{RegistrationError, Result};
pub use registration::{ExpirySweeper, RegistrationLifecycle, ReserveRequest, SlotSelection};
pub use state_machine::{SlotEvent, SlotStatus};
