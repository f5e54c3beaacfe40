//! # Club Event Model
//!
//! Events are immutable during a reservation attempt: the lifecycle reads
//! them to decide eligibility, capacity, and scheduling math, and never
//! writes them. The single-character type codes match the legacy schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{FromRow, PgPool};
use std::fmt;

macro_rules! char_code_enum {
    ($name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Code persisted in the database.
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("Invalid ", stringify!($name), ": {}"), s)),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                s.parse().map_err(Into::into)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
            }
        }
    };
}

char_code_enum!(EventType {
    Weeknight => "N",
    WeekendMajor => "W",
    Meeting => "M",
    Other => "O",
    External => "E",
    SeasonRegistration => "R",
    Deadline => "D",
    Open => "P",
    MatchPlay => "S",
});

char_code_enum!(StartType {
    TeeTimes => "TT",
    Shotgun => "SG",
    None => "NA",
});

char_code_enum!(RegistrationType {
    Member => "M",
    MemberGuest => "G",
    Open => "O",
    ReturningMember => "R",
    None => "N",
});

impl EventType {
    /// Event types whose group labels key off the registration id rather
    /// than a course start.
    pub fn is_team_style(&self) -> bool {
        matches!(self, Self::WeekendMajor | Self::Other)
    }
}

/// A scheduled event with its signup calendar and start-sheet configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClubEvent {
    pub id: i64,
    pub name: String,
    pub event_type: EventType,
    pub registration_type: RegistrationType,
    pub start_type: Option<StartType>,
    pub can_choose: bool,
    /// Base start time, "H:MM AM/PM". Required for tee-time math.
    pub start_time: Option<String>,
    /// Comma-separated minute intervals between consecutive tee times, cycled.
    pub tee_time_splits: Option<String>,
    /// Every Nth occupied tee time is followed by one open gap; 0 disables.
    pub starter_time_interval: i32,
    pub team_size: i32,
    pub total_groups: Option<i32>,
    pub registration_maximum: Option<i32>,
    pub signup_start: Option<DateTime<Utc>>,
    pub priority_signup_start: Option<DateTime<Utc>>,
    pub signup_end: Option<DateTime<Utc>>,
    /// Number of priority waves; none means unrestricted priority access.
    pub signup_waves: Option<i32>,
}

impl ClubEvent {
    pub async fn find_by_id(pool: &PgPool, event_id: i64) -> Result<Option<ClubEvent>, sqlx::Error> {
        sqlx::query_as::<_, ClubEvent>(
            r#"
            SELECT id, name, event_type, registration_type, start_type, can_choose,
                   start_time, tee_time_splits, starter_time_interval, team_size,
                   total_groups, registration_maximum, signup_start,
                   priority_signup_start, signup_end, signup_waves
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    /// Whether players pick their own course and slots for this event.
    pub fn is_choosable(&self) -> bool {
        self.can_choose
    }
}
