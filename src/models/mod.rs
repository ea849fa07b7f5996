use chrono::NaiveDateTime;
use serde::{Serialize, Deserialize};

/// Profile snapshot of a monitored account. Upserted on every successful
/// fetch; `account_id` is the remote service's immutable numeric id.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct TrackedAccount {
    pub account_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum PresenceStatus {
    Online,
    Offline,
    Recently,
    Unknown,
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceStatus::Online => write!(f, "online"),
            PresenceStatus::Offline => write!(f, "offline"),
            PresenceStatus::Recently => write!(f, "recently"),
            PresenceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(PresenceStatus::Online),
            "offline" => Ok(PresenceStatus::Offline),
            "recently" => Ok(PresenceStatus::Recently),
            "unknown" => Ok(PresenceStatus::Unknown),
            _ => Err(format!("Unknown presence status: {}", s)),
        }
    }
}

/// One timestamped status reading. The observations table is append-only:
/// a row is written every cycle for every fetched account, even when the
/// status did not change since the previous row.
///
/// Invariant: `was_online` is set if and only if the status is `Offline`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatusObservation {
    pub observation_id: i64,
    pub account_id: i64,
    pub status: PresenceStatus,
    pub was_online: Option<NaiveDateTime>,
    pub recorded_at: NaiveDateTime,
}
