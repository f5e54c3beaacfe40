use super::{events::SlotEvent, states::SlotStatus};
use crate::error::{RegistrationError, Result};

/// Determine the target status for a slot given its current status and a
/// lifecycle event. Invalid combinations are validation errors; no code path
/// can produce a status outside [`SlotStatus::all`].
pub fn target_state(current: SlotStatus, event: &SlotEvent) -> Result<SlotStatus> {
    let target = match (current, event) {
        (SlotStatus::Available, SlotEvent::Reserve) => SlotStatus::Pending,
        (SlotStatus::Pending, SlotEvent::BeginPayment) => SlotStatus::AwaitingPayment,
        (SlotStatus::AwaitingPayment, SlotEvent::ConfirmPayment) => SlotStatus::Reserved,

        // A held slot can always be released back to the pool; for
        // non-choosable events the row is deleted instead, which the
        // lifecycle handles outside the state machine.
        (SlotStatus::Pending, SlotEvent::Release)
        | (SlotStatus::AwaitingPayment, SlotEvent::Release)
        | (SlotStatus::Reserved, SlotEvent::Release) => SlotStatus::Available,

        (from, event) => {
            return Err(RegistrationError::Validation(format!(
                "Invalid slot transition from {from} on {event:?}"
            )))
        }
    };

    Ok(target)
}
