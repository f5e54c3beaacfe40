//! # Registration Lifecycle
//!
//! Drives the end-to-end state machine for a registration: create/reserve,
//! progress through payment, confirm, cancel, and expire. Composes the
//! admission window, the locking reservation transaction, and the payment
//! and notification collaborators.
//!
//! Eligibility and validation run before any lock is taken; gateway and
//! notification calls run outside the reservation transaction.

use crate::admission::{self, Window};
use crate::config::TeesheetConfig;
use crate::error::{RegistrationError, Result};
use crate::models::{
    ClubEvent, Hole, NewRegistration, Payment, Registration, RegistrationFee, RegistrationSlot,
};
use crate::notifications::{names, NotificationPublisher};
use crate::payments::{PaymentGateway, PaymentIntent};
use crate::registration::reservation;
use crate::state_machine::{target_state, SlotEvent, SlotStatus};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How the caller selects slots: explicit ids for choosable events, a
/// player count for events whose slots are created on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSelection {
    Chosen(Vec<i64>),
    Count(usize),
}

/// A reservation request from an authenticated user.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub event_id: i64,
    pub user_id: i64,
    /// Player record of the requester, attached to the lowest slot.
    pub player_id: Option<i64>,
    pub signed_up_by: String,
    pub course_id: Option<i64>,
    pub selection: SlotSelection,
}

/// An operator-driven registration that bypasses the signup calendar.
#[derive(Debug, Clone)]
pub struct AdminRegistrationRequest {
    pub event_id: i64,
    pub user_id: i64,
    pub signed_up_by: String,
    pub course_id: Option<i64>,
    pub selection: SlotSelection,
    /// Players to place, in slot order.
    pub player_ids: Vec<i64>,
}

/// Result of a successful reservation.
#[derive(Debug, Clone)]
pub struct ReservationOutcome {
    pub registration: Registration,
    pub slot_ids: Vec<i64>,
}

/// Orchestrator for the registration state machine.
pub struct RegistrationLifecycle {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    notifications: NotificationPublisher,
    config: TeesheetConfig,
}

impl RegistrationLifecycle {
    pub fn new(
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        notifications: NotificationPublisher,
        config: TeesheetConfig,
    ) -> Self {
        Self {
            pool,
            gateway,
            notifications,
            config,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    // Reservation
    // =========================================================================

    /// Create a registration and reserve its slots.
    ///
    /// Choosable events validate every requested slot against the current
    /// availability read and wave calendar, then run the locking
    /// transaction. Non-choosable events create fresh pending slots inside
    /// one transaction that also enforces the registration maximum.
    #[instrument(skip(self, request), fields(event_id = request.event_id, user_id = request.user_id))]
    pub async fn create_and_reserve(&self, request: ReserveRequest) -> Result<ReservationOutcome> {
        let now = Utc::now();
        let event = self.load_event(request.event_id).await?;

        let window = admission::classify_window(&event, now);
        if !matches!(window, Window::Open | Window::Priority) {
            debug!(window = %window, "Registration window closed");
            return Err(RegistrationError::RegistrationNotOpen);
        }

        if event.can_choose {
            let Some(course_id) = request.course_id else {
                return Err(RegistrationError::CourseRequired);
            };
            let SlotSelection::Chosen(ref slot_ids) = request.selection else {
                return Err(RegistrationError::Validation(
                    "Slot ids are required for a choosable event".to_string(),
                ));
            };
            self.reserve_choosable(&event, &request, course_id, slot_ids, now)
                .await
        } else {
            let count = match request.selection {
                SlotSelection::Count(count) => count,
                SlotSelection::Chosen(ref ids) => ids.len(),
            };
            self.reserve_non_choosable(&event, &request, count, now)
                .await
        }
    }

    async fn reserve_choosable(
        &self,
        event: &ClubEvent,
        request: &ReserveRequest,
        course_id: i64,
        slot_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<ReservationOutcome> {
        if slot_ids.is_empty() {
            return Err(RegistrationError::MissingSlots);
        }

        let existing = self
            .find_retryable_registration(request.user_id, event.id)
            .await?;

        // Availability read for validation; the authoritative check happens
        // again under row locks.
        let available = RegistrationSlot::find_available(&self.pool, event.id, course_id).await?;
        let available_by_id: HashMap<i64, &RegistrationSlot> =
            available.iter().map(|s| (s.id, s)).collect();

        let holes = Hole::find_by_course(&self.pool, course_id).await?;
        let hole_numbers: HashMap<i64, i32> = holes.iter().map(|h| (h.id, h.number)).collect();

        for slot_id in slot_ids {
            let slot = available_by_id
                .get(slot_id)
                .ok_or(RegistrationError::MissingSlots)?;
            let hole_number = slot.hole_id.and_then(|id| hole_numbers.get(&id)).copied();
            admission::check_reservation_permitted(event, now, slot.starting_order, hole_number)?;
        }

        let expires = now + Duration::minutes(self.config.choosable_expiry_minutes);
        let registration = match existing {
            Some(registration) => {
                Registration::update_for_retry(
                    &self.pool,
                    registration.id,
                    Some(course_id),
                    expires,
                )
                .await?;
                Registration {
                    course_id: Some(course_id),
                    expires: Some(expires),
                    ..registration
                }
            }
            None => {
                Registration::create(
                    &self.pool,
                    NewRegistration {
                        event_id: event.id,
                        course_id: Some(course_id),
                        user_id: request.user_id,
                        signed_up_by: request.signed_up_by.clone(),
                        expires: Some(expires),
                    },
                )
                .await?
            }
        };

        let reserved =
            reservation::reserve_slots(&self.pool, slot_ids, registration.id, request.player_id)
                .await?;

        info!(
            registration_id = registration.id,
            event_id = event.id,
            slot_count = reserved.len(),
            "Reserved chosen slots"
        );

        Ok(ReservationOutcome {
            registration,
            slot_ids: reserved,
        })
    }

    async fn reserve_non_choosable(
        &self,
        event: &ClubEvent,
        request: &ReserveRequest,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<ReservationOutcome> {
        if count == 0 {
            return Err(RegistrationError::MissingSlots);
        }

        let expires = now + Duration::minutes(self.config.non_choosable_expiry_minutes);
        let mut tx = self.pool.begin().await?;

        // Locking the held rows makes the capacity check race-free: a
        // concurrent attempt blocks here until this one commits.
        let held = RegistrationSlot::lock_held_for_event(&mut tx, event.id).await?;
        if let Some(maximum) = event.registration_maximum {
            if held + count as i64 > i64::from(maximum) {
                return Err(RegistrationError::EventFull);
            }
        }

        let existing = Registration::find_by_user_and_event_with_transaction(
            &mut tx,
            request.user_id,
            event.id,
        )
        .await?;

        let registration = match existing {
            Some(registration) => {
                let reserved = RegistrationSlot::find_by_registration_and_status_with_transaction(
                    &mut tx,
                    registration.id,
                    &[SlotStatus::Reserved],
                )
                .await?;
                if !reserved.is_empty() {
                    return Err(RegistrationError::AlreadyRegistered { event_id: event.id });
                }

                // A fresh attempt replaces any prior pending slots.
                Registration::update_expires_with_transaction(
                    &mut tx,
                    registration.id,
                    Some(expires),
                )
                .await?;
                RegistrationSlot::delete_by_registration_with_transaction(&mut tx, registration.id)
                    .await?;
                Registration {
                    expires: Some(expires),
                    ..registration
                }
            }
            None => {
                Registration::create_with_transaction(
                    &mut tx,
                    NewRegistration {
                        event_id: event.id,
                        course_id: None,
                        user_id: request.user_id,
                        signed_up_by: request.signed_up_by.clone(),
                        expires: Some(expires),
                    },
                )
                .await?
            }
        };

        let mut slot_ids = Vec::with_capacity(count);
        for sequence in 0..count {
            let player_id = if sequence == 0 { request.player_id } else { None };
            let slot = RegistrationSlot::create_pending_with_transaction(
                &mut tx,
                event.id,
                registration.id,
                player_id,
                sequence as i32,
            )
            .await?;
            slot_ids.push(slot.id);
        }

        tx.commit().await?;

        info!(
            registration_id = registration.id,
            event_id = event.id,
            slot_count = slot_ids.len(),
            "Created on-demand pending slots"
        );

        Ok(ReservationOutcome {
            registration,
            slot_ids,
        })
    }

    /// Operator override: same slot-status contract, no window or wave
    /// checks, slots land fully reserved with no expiry exposure.
    #[instrument(skip(self, request), fields(event_id = request.event_id))]
    pub async fn create_admin_registration(
        &self,
        request: AdminRegistrationRequest,
    ) -> Result<ReservationOutcome> {
        let event = self.load_event(request.event_id).await?;

        let outcome = if event.can_choose {
            let Some(course_id) = request.course_id else {
                return Err(RegistrationError::CourseRequired);
            };
            let SlotSelection::Chosen(ref slot_ids) = request.selection else {
                return Err(RegistrationError::Validation(
                    "Slot ids are required for a choosable event".to_string(),
                ));
            };

            let registration = Registration::create(
                &self.pool,
                NewRegistration {
                    event_id: event.id,
                    course_id: Some(course_id),
                    user_id: request.user_id,
                    signed_up_by: request.signed_up_by.clone(),
                    expires: None,
                },
            )
            .await?;

            let reserved =
                reservation::reserve_slots(&self.pool, slot_ids, registration.id, None).await?;

            ReservationOutcome {
                registration,
                slot_ids: reserved,
            }
        } else {
            let count = match request.selection {
                SlotSelection::Count(count) => count,
                SlotSelection::Chosen(ref ids) => ids.len(),
            };
            let reserve = ReserveRequest {
                event_id: request.event_id,
                user_id: request.user_id,
                player_id: None,
                signed_up_by: request.signed_up_by.clone(),
                course_id: None,
                selection: SlotSelection::Count(count),
            };
            let outcome = self
                .reserve_non_choosable(&event, &reserve, count, Utc::now())
                .await?;
            Registration::update_expires(&self.pool, outcome.registration.id, None).await?;
            outcome
        };

        // Pending -> awaiting payment -> reserved, applied directly; the
        // operator records payment out of band.
        let through_payment = target_state(SlotStatus::Pending, &SlotEvent::BeginPayment)
            .and_then(|s| target_state(s, &SlotEvent::ConfirmPayment))?;
        RegistrationSlot::update_status(&self.pool, &outcome.slot_ids, through_payment).await?;

        for (slot_id, player_id) in outcome.slot_ids.iter().zip(request.player_ids.iter()) {
            RegistrationSlot::assign_player(&self.pool, *slot_id, Some(*player_id)).await?;
        }

        info!(
            registration_id = outcome.registration.id,
            event_id = event.id,
            "Admin registration created"
        );

        Ok(outcome)
    }

    // =========================================================================
    // Payment transitions
    // =========================================================================

    /// Create a gateway payment intent and move the registration's slots
    /// into payment processing. The gateway call happens before any status
    /// change and never inside a slot lock.
    #[instrument(skip(self))]
    pub async fn begin_payment(
        &self,
        registration_id: i64,
        payment_id: i64,
    ) -> Result<PaymentIntent> {
        let payment = Payment::find_by_id(&self.pool, payment_id)
            .await?
            .ok_or(RegistrationError::PaymentNotFound { payment_id })?;
        let event = self.load_event(payment.event_id).await?;

        let amount_cents = parse_amount_cents(&payment.payment_amount)?;
        let description = format!("Online payment for {} by {}", event.name, payment.user_id);

        let intent = self
            .gateway
            .create_payment_intent(amount_cents, &description)
            .await?;
        Payment::record_intent(&self.pool, payment_id, &intent.intent_id).await?;

        self.payment_processing(registration_id).await?;

        Ok(intent)
    }

    /// Move a registration's pending slots into payment processing and
    /// clear its expiry. A registration with a payment attempt underway is
    /// immune to the expiry sweep; payment failures are handled by the
    /// payment collaborator, not by expiry.
    #[instrument(skip(self))]
    pub async fn payment_processing(&self, registration_id: i64) -> Result<()> {
        let pending = RegistrationSlot::find_by_registration_and_status(
            &self.pool,
            registration_id,
            &[SlotStatus::Pending],
        )
        .await?;
        if pending.is_empty() {
            debug!(registration_id, "No pending slots; nothing to do");
            return Ok(());
        }

        let target = target_state(SlotStatus::Pending, &SlotEvent::BeginPayment)?;
        let slot_ids: Vec<i64> = pending.iter().map(|s| s.id).collect();
        RegistrationSlot::update_status(&self.pool, &slot_ids, target).await?;
        Registration::update_expires(&self.pool, registration_id, None).await?;

        info!(
            registration_id,
            slot_count = slot_ids.len(),
            "Slots awaiting payment; expiry cleared"
        );
        Ok(())
    }

    /// React to the gateway's confirmation signal: slots become reserved,
    /// the payment is marked confirmed, and its fees are marked paid.
    #[instrument(skip(self))]
    pub async fn payment_confirmed(&self, registration_id: i64, payment_id: i64) -> Result<()> {
        let awaiting = RegistrationSlot::find_by_registration_and_status(
            &self.pool,
            registration_id,
            &[SlotStatus::AwaitingPayment],
        )
        .await?;
        if awaiting.is_empty() {
            debug!(registration_id, "No slots awaiting payment; nothing to do");
            return Ok(());
        }

        // Confirm the payment row before touching slot state so an unknown
        // payment id cannot leave reserved slots with no confirmed payment.
        if Payment::mark_confirmed(&self.pool, payment_id).await? == 0 {
            return Err(RegistrationError::PaymentNotFound { payment_id });
        }
        RegistrationFee::mark_paid_by_payment(&self.pool, payment_id).await?;

        let target = target_state(SlotStatus::AwaitingPayment, &SlotEvent::ConfirmPayment)?;
        let slot_ids: Vec<i64> = awaiting.iter().map(|s| s.id).collect();
        RegistrationSlot::update_status(&self.pool, &slot_ids, target).await?;

        info!(
            registration_id,
            payment_id,
            slot_count = slot_ids.len(),
            "Registration confirmed"
        );

        // Fire-and-forget; a delivery failure never rolls back the
        // transition.
        self.notifications.publish(
            names::REGISTRATION_CONFIRMED,
            json!({ "registration_id": registration_id, "payment_id": payment_id }),
        );

        Ok(())
    }

    // =========================================================================
    // Cancellation and expiry
    // =========================================================================

    /// Cancel a registration and release its slots. Idempotent: an absent
    /// registration or empty slot set is success.
    #[instrument(skip(self))]
    pub async fn cancel_registration(
        &self,
        registration_id: i64,
        payment_id: Option<i64>,
        reason: &str,
    ) -> Result<()> {
        let Some(registration) = Registration::find_by_id(&self.pool, registration_id).await?
        else {
            debug!(registration_id, "Registration already gone");
            return Ok(());
        };
        let event = self.load_event(registration.event_id).await?;

        let held = RegistrationSlot::find_by_registration_and_status(
            &self.pool,
            registration_id,
            &SlotStatus::held_statuses(),
        )
        .await?;

        if !held.is_empty() {
            let slot_ids: Vec<i64> = held.iter().map(|s| s.id).collect();
            if event.can_choose {
                RegistrationSlot::release(&self.pool, &slot_ids).await?;
            } else {
                // On-demand slots carry no meaning beyond this attempt.
                RegistrationSlot::delete_by_registration(&self.pool, registration_id).await?;
            }
        }

        if let Some(payment_id) = payment_id {
            RegistrationFee::delete_unpaid_by_payment(&self.pool, payment_id).await?;
        }

        Registration::delete(&self.pool, registration_id).await?;

        info!(registration_id, reason, "Registration cancelled");

        self.notifications.publish(
            names::REGISTRATION_CANCELLED,
            json!({
                "registration_id": registration_id,
                "event_id": registration.event_id,
                "reason": reason,
            }),
        );

        Ok(())
    }

    /// Cancel every registration whose hold has lapsed. Individual
    /// failures are logged and skipped so one bad registration never
    /// starves the rest of the sweep. Returns the number cancelled.
    #[instrument(skip(self))]
    pub async fn clean_up_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = Registration::find_expired(&self.pool, now).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        info!(count = expired.len(), "Cleaning up expired registrations");

        let mut cancelled = 0;
        for registration in expired {
            match self.expire_registration(&registration).await {
                Ok(()) => cancelled += 1,
                Err(e) => {
                    warn!(
                        registration_id = registration.id,
                        error = %e,
                        "Failed to cancel expired registration; skipping"
                    );
                }
            }
        }

        Ok(cancelled)
    }

    /// An expired registration may have created a payment shell before
    /// being abandoned; delete the shell and its fees so neither table
    /// accumulates orphans, then cancel as usual.
    async fn expire_registration(&self, registration: &Registration) -> Result<()> {
        let payments = Payment::find_unconfirmed_for_registration(
            &self.pool,
            registration.event_id,
            registration.user_id,
        )
        .await?;
        for payment in payments {
            debug!(
                registration_id = registration.id,
                payment_id = payment.id,
                "Deleting abandoned payment and its fees"
            );
            RegistrationFee::delete_by_payment(&self.pool, payment.id).await?;
            Payment::delete(&self.pool, payment.id).await?;
        }

        self.cancel_registration(registration.id, None, "expired")
            .await
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    async fn load_event(&self, event_id: i64) -> Result<ClubEvent> {
        ClubEvent::find_by_id(&self.pool, event_id)
            .await?
            .ok_or_else(|| RegistrationError::Validation(format!("Event {event_id} not found")))
    }

    /// An existing registration may be retried while unconfirmed, but any
    /// reserved slot on it means the user already holds a spot.
    async fn find_retryable_registration(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<Option<Registration>> {
        let Some(existing) =
            Registration::find_by_user_and_event(&self.pool, user_id, event_id).await?
        else {
            return Ok(None);
        };

        let reserved = RegistrationSlot::find_by_registration_and_status(
            &self.pool,
            existing.id,
            &[SlotStatus::Reserved],
        )
        .await?;
        if !reserved.is_empty() {
            return Err(RegistrationError::AlreadyRegistered { event_id });
        }

        Ok(Some(existing))
    }
}

/// Parse a decimal amount string like "42.50" into cents.
fn parse_amount_cents(amount: &str) -> Result<i64> {
    let value: f64 = amount
        .trim()
        .parse()
        .map_err(|_| RegistrationError::Validation(format!("Invalid payment amount: {amount}")))?;
    Ok((value * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_cents() {
        assert_eq!(parse_amount_cents("42.50").unwrap(), 4250);
        assert_eq!(parse_amount_cents("0.99").unwrap(), 99);
        assert_eq!(parse_amount_cents(" 10 ").unwrap(), 1000);
        assert!(parse_amount_cents("ten").is_err());
    }

    #[test]
    fn test_selection_count_from_chosen_ids() {
        let selection = SlotSelection::Chosen(vec![4, 5, 6]);
        let count = match selection {
            SlotSelection::Count(count) => count,
            SlotSelection::Chosen(ref ids) => ids.len(),
        };
        assert_eq!(count, 3);
    }
}
