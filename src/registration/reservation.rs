//! # Slot Reservation Transaction
//!
//! The only place true concurrency hazards exist: two callers racing to
//! reserve the same slot. Correctness is delegated entirely to row-level
//! locks; there is no in-process synchronization. The lock scope covers only the
//! status check and the status write; nothing here calls out to the network.

use crate::error::{RegistrationError, Result};
use crate::models::RegistrationSlot;
use crate::state_machine::{target_state, SlotEvent, SlotStatus};
use sqlx::PgPool;
use tracing::{debug, instrument};

/// Dedupe and sort ascending so concurrent callers requesting overlapping
/// sets acquire row locks in the same order and cannot deadlock.
pub(crate) fn normalize_slot_ids(slot_ids: &[i64]) -> Vec<i64> {
    let mut ids = slot_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Atomically move a set of available slots to pending, bound to a
/// registration.
///
/// All-or-nothing: partial success is never observable to other
/// transactions. Of two concurrent calls requesting the same slot, exactly
/// one commits; the other sees [`RegistrationError::SlotConflict`] and may
/// retry with a fresh availability read. The requesting player, when given,
/// is attached to the lowest-`slot` row.
#[instrument(skip(pool))]
pub async fn reserve_slots(
    pool: &PgPool,
    slot_ids: &[i64],
    registration_id: i64,
    lead_player_id: Option<i64>,
) -> Result<Vec<i64>> {
    let ids = normalize_slot_ids(slot_ids);
    if ids.is_empty() {
        return Err(RegistrationError::MissingSlots);
    }

    let target = target_state(SlotStatus::Available, &SlotEvent::Reserve)?;

    let mut tx = pool.begin().await?;

    // Lock exactly the requested rows, in id order, then re-read status
    // under the lock.
    let locked: Vec<RegistrationSlot> = sqlx::query_as(
        r#"
        SELECT id, event_id, hole_id, registration_id, player_id, starting_order, slot, status
        FROM registration_slots
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;

    if locked.len() != ids.len() {
        return Err(RegistrationError::MissingSlots);
    }
    if locked.iter().any(|s| s.status != SlotStatus::Available) {
        // A legitimate race outcome, not a bug; dropping the transaction
        // rolls the locks back.
        debug!(registration_id, "Requested slots no longer available");
        return Err(RegistrationError::SlotConflict);
    }

    sqlx::query("UPDATE registration_slots SET status = $1, registration_id = $2 WHERE id = ANY($3)")
        .bind(target)
        .bind(registration_id)
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

    if let Some(player_id) = lead_player_id {
        // Lowest sequence index gets the requesting player.
        let lead_slot = locked
            .iter()
            .min_by_key(|s| s.slot)
            .map(|s| s.id)
            .ok_or(RegistrationError::MissingSlots)?;
        sqlx::query("UPDATE registration_slots SET player_id = $1 WHERE id = $2")
            .bind(player_id)
            .bind(lead_slot)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    debug!(
        registration_id,
        slot_count = ids.len(),
        "Reserved slots as pending"
    );

    Ok(ids)
}
