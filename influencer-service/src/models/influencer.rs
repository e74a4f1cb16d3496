use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// List projection of a record: exactly `{id, username}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InfluencerSummary {
    pub id: i64,
    pub username: Option<String>,
}

/// A full row as returned by the store. Columns other than `id` and
/// `ai_analysis` are opaque and passed through as-is.
pub type InfluencerRecord = Map<String, Value>;

/// Key of an analysis row.
///
/// Parsed from the caller-supplied `id` query value. Anything that is not an
/// integer cannot name a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
