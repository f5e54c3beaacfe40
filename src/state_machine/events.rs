use serde::{Deserialize, Serialize};

/// Lifecycle events that drive slot status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotEvent {
    /// A registration takes the slot (available -> pending)
    Reserve,
    /// A payment attempt begins (pending -> awaiting_payment)
    BeginPayment,
    /// The payment gateway confirmed (awaiting_payment -> reserved)
    ConfirmPayment,
    /// The holding registration was cancelled or expired
    Release,
}

impl SlotEvent {
    /// All lifecycle events, for exhaustive transition checks.
    pub fn all() -> [SlotEvent; 4] {
        [
            Self::Reserve,
            Self::BeginPayment,
            Self::ConfirmPayment,
            Self::Release,
        ]
    }
}
