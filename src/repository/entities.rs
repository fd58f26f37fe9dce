use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Event is a single stored record of the append-only log.
/// The `timestamp` is ISO-8601 in UTC with a trailing `Z`.
///
#[derive(FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub timestamp: String,
    pub message: String,
}
