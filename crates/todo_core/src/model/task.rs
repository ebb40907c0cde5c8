use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single to-do entry.
///
/// Timestamps are kept as [`OffsetDateTime`] in memory and serialized as
/// RFC 3339 strings, matching the persisted wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}
