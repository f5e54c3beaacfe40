//! # Payment Gateway Boundary
//!
//! The engine never speaks a gateway protocol. It asks a collaborator for an
//! opaque payment intent before moving slots into payment processing, and it
//! reacts to a confirmation signal carrying nothing but a payment id.

use crate::error::Result;
use async_trait::async_trait;

/// Opaque result of creating a payment intent with the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

/// Trait boundary for the payment gateway collaborator.
///
/// Implementations must not be called while slot locks are held; the
/// lifecycle guarantees gateway calls happen outside the reservation
/// transaction.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for the given amount.
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        description: &str,
    ) -> Result<PaymentIntent>;
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Gateway double that hands back predictable intents.
    pub struct StubGateway;

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_payment_intent(
            &self,
            amount_cents: i64,
            _description: &str,
        ) -> Result<PaymentIntent> {
            Ok(PaymentIntent {
                intent_id: format!("pi_stub_{amount_cents}"),
                client_secret: "secret_stub".to_string(),
            })
        }
    }
}
