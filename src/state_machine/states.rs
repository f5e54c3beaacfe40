use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use std::fmt;

/// Slot status definitions matching the single-character codes stored on the
/// slot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Slot is open for reservation
    Available,
    /// Slot is held by an in-progress registration
    Pending,
    /// A payment attempt for the holding registration is underway
    AwaitingPayment,
    /// The holding registration is paid and confirmed
    Reserved,
}

impl SlotStatus {
    /// Single-character code persisted in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Available => "A",
            Self::Pending => "P",
            Self::AwaitingPayment => "X",
            Self::Reserved => "R",
        }
    }

    /// Human-readable status name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Pending => "In Progress",
            Self::AwaitingPayment => "Payment Processing",
            Self::Reserved => "Reserved",
        }
    }

    /// Check if a registration currently holds this slot.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Pending | Self::AwaitingPayment | Self::Reserved)
    }

    /// Check if this is the terminal, fully-confirmed state.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Reserved)
    }

    /// Statuses that count against the event's capacity.
    pub fn held_statuses() -> [SlotStatus; 3] {
        [Self::Pending, Self::AwaitingPayment, Self::Reserved]
    }

    /// Every status a slot row may carry.
    pub fn all() -> [SlotStatus; 4] {
        [
            Self::Available,
            Self::Pending,
            Self::AwaitingPayment,
            Self::Reserved,
        ]
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::Available),
            "P" => Ok(Self::Pending),
            "X" => Ok(Self::AwaitingPayment),
            "R" => Ok(Self::Reserved),
            _ => Err(format!("Invalid slot status: {s}")),
        }
    }
}

impl Default for SlotStatus {
    fn default() -> Self {
        Self::Available
    }
}

// The status column is VARCHAR(1); encode/decode by delegating to the string
// implementations rather than a Postgres enum type.
impl sqlx::Type<sqlx::Postgres> for SlotStatus {
    fn type_info() -> PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for SlotStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for SlotStatus {
    fn encode_by_ref(
        &self,
        buf: &mut PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}
