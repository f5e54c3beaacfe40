//! # Registration Model
//!
//! Groups the slots signed up together. `expires` is non-null exactly while
//! the registration is held but not yet in payment; clearing it makes the
//! registration immune to the expiry sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub course_id: Option<i64>,
    pub user_id: i64,
    pub signed_up_by: String,
    pub expires: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
}

/// New registration for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
    pub event_id: i64,
    pub course_id: Option<i64>,
    pub user_id: i64,
    pub signed_up_by: String,
    pub expires: Option<DateTime<Utc>>,
}

const REGISTRATION_COLUMNS: &str =
    "id, event_id, course_id, user_id, signed_up_by, expires, created_date";

impl Registration {
    pub async fn create(
        pool: &PgPool,
        new_registration: NewRegistration,
    ) -> Result<Registration, sqlx::Error> {
        sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations (event_id, course_id, user_id, signed_up_by, expires, created_date)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(new_registration.event_id)
        .bind(new_registration.course_id)
        .bind(new_registration.user_id)
        .bind(&new_registration.signed_up_by)
        .bind(new_registration.expires)
        .fetch_one(pool)
        .await
    }

    pub async fn create_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        new_registration: NewRegistration,
    ) -> Result<Registration, sqlx::Error> {
        sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations (event_id, course_id, user_id, signed_up_by, expires, created_date)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(new_registration.event_id)
        .bind(new_registration.course_id)
        .bind(new_registration.user_id)
        .bind(&new_registration.signed_up_by)
        .bind(new_registration.expires)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        registration_id: i64,
    ) -> Result<Option<Registration>, sqlx::Error> {
        sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(registration_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user_and_event(
        pool: &PgPool,
        user_id: i64,
        event_id: i64,
    ) -> Result<Option<Registration>, sqlx::Error> {
        sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1 AND event_id = $2"
        ))
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user_and_event_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        event_id: i64,
    ) -> Result<Option<Registration>, sqlx::Error> {
        sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1 AND event_id = $2"
        ))
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Registrations whose hold has lapsed. `expires` is cleared the moment
    /// payment processing begins, so a simple comparison suffices.
    pub async fn find_expired(
        pool: &PgPool,
        before: DateTime<Utc>,
    ) -> Result<Vec<Registration>, sqlx::Error> {
        sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE expires < $1 ORDER BY expires"
        ))
        .bind(before)
        .fetch_all(pool)
        .await
    }

    pub async fn update_expires(
        pool: &PgPool,
        registration_id: i64,
        expires: Option<DateTime<Utc>>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE registrations SET expires = $1 WHERE id = $2")
            .bind(expires)
            .bind(registration_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_for_retry(
        pool: &PgPool,
        registration_id: i64,
        course_id: Option<i64>,
        expires: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE registrations SET course_id = $1, expires = $2 WHERE id = $3")
                .bind(course_id)
                .bind(expires)
                .bind(registration_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_expires_with_transaction(
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
        expires: Option<DateTime<Utc>>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE registrations SET expires = $1 WHERE id = $2")
            .bind(expires)
            .bind(registration_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, registration_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(registration_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
