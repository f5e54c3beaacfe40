//! # Payment Model
//!
//! Payments are owned by the gateway integration; this crate only reacts to
//! the confirmation signal (flip `confirmed`, stamp the confirm date, mark
//! fees paid) and deletes abandoned payment shells when a registration is
//! cancelled or expires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub payment_code: String,
    pub confirmed: bool,
    pub payment_amount: String,
    pub transaction_fee: String,
    pub payment_date: Option<DateTime<Utc>>,
    pub confirm_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub event_id: i64,
    pub user_id: i64,
    pub payment_amount: String,
    pub transaction_fee: String,
}

/// A fee obligation linking one slot to a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RegistrationFee {
    pub id: i64,
    pub event_fee_id: i64,
    pub registration_slot_id: i64,
    pub payment_id: i64,
    pub amount: String,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistrationFee {
    pub event_fee_id: i64,
    pub registration_slot_id: i64,
    pub payment_id: i64,
    pub amount: String,
}

const PAYMENT_COLUMNS: &str = "id, event_id, user_id, payment_code, confirmed, payment_amount, \
                               transaction_fee, payment_date, confirm_date";

impl Payment {
    pub async fn create(pool: &PgPool, new_payment: NewPayment) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments
                (event_id, user_id, payment_code, confirmed, payment_amount, transaction_fee, payment_date)
            VALUES ($1, $2, 'pending', false, $3, $4, NOW())
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(new_payment.event_id)
        .bind(new_payment.user_id)
        .bind(&new_payment.payment_amount)
        .bind(&new_payment.transaction_fee)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, payment_id: i64) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(payment_id)
        .fetch_optional(pool)
        .await
    }

    /// Record the gateway's confirmation. Returns the number of rows
    /// affected so the caller can distinguish a missing payment.
    pub async fn mark_confirmed(pool: &PgPool, payment_id: i64) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE payments SET confirmed = true, confirm_date = NOW() WHERE id = $1")
                .bind(payment_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Unconfirmed payment shells created for a registration's signup
    /// attempt. Payments carry no registration id; the (event, user) pair
    /// identifies them.
    pub async fn find_unconfirmed_for_registration(
        pool: &PgPool,
        event_id: i64,
        user_id: i64,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE event_id = $1 AND user_id = $2 AND confirmed = false"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, payment_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn record_intent(
        pool: &PgPool,
        payment_id: i64,
        payment_code: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE payments SET payment_code = $1 WHERE id = $2")
            .bind(payment_code)
            .bind(payment_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl RegistrationFee {
    pub async fn create(
        pool: &PgPool,
        new_fee: NewRegistrationFee,
    ) -> Result<RegistrationFee, sqlx::Error> {
        sqlx::query_as::<_, RegistrationFee>(
            r#"
            INSERT INTO registration_fees
                (event_fee_id, registration_slot_id, payment_id, amount, is_paid)
            VALUES ($1, $2, $3, $4, false)
            RETURNING id, event_fee_id, registration_slot_id, payment_id, amount, is_paid
            "#,
        )
        .bind(new_fee.event_fee_id)
        .bind(new_fee.registration_slot_id)
        .bind(new_fee.payment_id)
        .bind(&new_fee.amount)
        .fetch_one(pool)
        .await
    }

    pub async fn mark_paid_by_payment(
        pool: &PgPool,
        payment_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE registration_fees SET is_paid = true WHERE payment_id = $1")
            .bind(payment_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every fee attached to a payment. Reserved for payments being
    /// deleted outright; an unconfirmed payment can only carry unpaid fees.
    pub async fn delete_by_payment(pool: &PgPool, payment_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registration_fees WHERE payment_id = $1")
            .bind(payment_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete only fees never paid; confirmed money is outside this crate's
    /// authority and goes through the refund flow instead.
    pub async fn delete_unpaid_by_payment(
        pool: &PgPool,
        payment_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM registration_fees WHERE payment_id = $1 AND is_paid = false")
                .bind(payment_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
