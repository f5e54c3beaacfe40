//! # Registration Slot Model
//!
//! The atomic reservable unit. A slot's `status` and `registration_id` move
//! together, and only inside the locking transaction in
//! `registration::reservation`; everything here that mutates status is either
//! called from that transaction or from the lifecycle's own sequential
//! operations on slots it already holds.

use crate::state_machine::SlotStatus;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

/// A reservable slot on an event's start sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RegistrationSlot {
    pub id: i64,
    pub event_id: i64,
    /// Populated for shotgun/choosable events; on-demand slots carry none.
    pub hole_id: Option<i64>,
    pub registration_id: Option<i64>,
    pub player_id: Option<i64>,
    /// 0-based position within a tee time, or 0/1 letter-group position
    /// within a shotgun hole.
    pub starting_order: i32,
    /// Sequence index within the registration.
    pub slot: i32,
    pub status: SlotStatus,
}

const SLOT_COLUMNS: &str =
    "id, event_id, hole_id, registration_id, player_id, starting_order, slot, status";

impl RegistrationSlot {
    pub async fn find_by_ids(
        pool: &PgPool,
        slot_ids: &[i64],
    ) -> Result<Vec<RegistrationSlot>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM registration_slots WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(slot_ids)
        .fetch_all(pool)
        .await
    }

    /// Available slots for an event, restricted to one course's holes.
    pub async fn find_available(
        pool: &PgPool,
        event_id: i64,
        course_id: i64,
    ) -> Result<Vec<RegistrationSlot>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationSlot>(&format!(
            r#"
            SELECT s.{}
            FROM registration_slots s
            JOIN holes h ON h.id = s.hole_id
            WHERE s.event_id = $1 AND h.course_id = $2 AND s.status = $3
            ORDER BY s.id
            "#,
            SLOT_COLUMNS.replace(", ", ", s.")
        ))
        .bind(event_id)
        .bind(course_id)
        .bind(SlotStatus::Available)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_registration_and_status(
        pool: &PgPool,
        registration_id: i64,
        statuses: &[SlotStatus],
    ) -> Result<Vec<RegistrationSlot>, sqlx::Error> {
        let codes: Vec<String> = statuses.iter().map(|s| s.code().to_string()).collect();
        sqlx::query_as::<_, RegistrationSlot>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM registration_slots
            WHERE registration_id = $1 AND status = ANY($2)
            ORDER BY slot
            "#
        ))
        .bind(registration_id)
        .bind(&codes)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_registration_and_status_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
        statuses: &[SlotStatus],
    ) -> Result<Vec<RegistrationSlot>, sqlx::Error> {
        let codes: Vec<String> = statuses.iter().map(|s| s.code().to_string()).collect();
        sqlx::query_as::<_, RegistrationSlot>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM registration_slots
            WHERE registration_id = $1 AND status = ANY($2)
            ORDER BY slot
            "#
        ))
        .bind(registration_id)
        .bind(&codes)
        .fetch_all(&mut **tx)
        .await
    }

    pub async fn assign_player(
        pool: &PgPool,
        slot_id: i64,
        player_id: Option<i64>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE registration_slots SET player_id = $1 WHERE id = $2")
            .bind(player_id)
            .bind(slot_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count of held slots for an event, locking the counted rows. Used
    /// inside the non-choosable capacity check so a concurrent attempt
    /// cannot slip under the maximum.
    pub async fn lock_held_for_event(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let codes: Vec<String> = SlotStatus::held_statuses()
            .iter()
            .map(|s| s.code().to_string())
            .collect();
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM registration_slots
            WHERE event_id = $1 AND status = ANY($2)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(event_id)
        .bind(&codes)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.len() as i64)
    }

    /// Bulk status update. `registration_id`/`player_id` are left untouched;
    /// use [`release`](Self::release) to detach slots from a registration.
    pub async fn update_status(
        pool: &PgPool,
        slot_ids: &[i64],
        status: SlotStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE registration_slots SET status = $1 WHERE id = ANY($2)")
            .bind(status)
            .bind(slot_ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Return slots to the available pool, detached from registration and
    /// player. Choosable events only; non-choosable slots are deleted.
    pub async fn release(pool: &PgPool, slot_ids: &[i64]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE registration_slots
            SET status = $1, registration_id = NULL, player_id = NULL
            WHERE id = ANY($2)
            "#,
        )
        .bind(SlotStatus::Available)
        .bind(slot_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_registration(
        pool: &PgPool,
        registration_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registration_slots WHERE registration_id = $1")
            .bind(registration_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_registration_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registration_slots WHERE registration_id = $1")
            .bind(registration_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// Create a fresh pending slot for a non-choosable event. Slots for
    /// these events are ephemeral: they exist only for the lifetime of one
    /// registration attempt.
    pub async fn create_pending_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        registration_id: i64,
        player_id: Option<i64>,
        sequence: i32,
    ) -> Result<RegistrationSlot, sqlx::Error> {
        sqlx::query_as::<_, RegistrationSlot>(&format!(
            r#"
            INSERT INTO registration_slots
                (event_id, registration_id, player_id, starting_order, slot, status)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING {SLOT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(registration_id)
        .bind(player_id)
        .bind(sequence)
        .bind(SlotStatus::Pending)
        .fetch_one(&mut **tx)
        .await
    }
}
