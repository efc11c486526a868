use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Assignment record. The stored row doubles as the wire shape, camelCase
/// with RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub is_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial update applied in one statement by `Assignment::update`.
///
/// `description` and `due_date` are doubly optional: the outer `None`
/// means "leave unchanged", `Some(None)` means "clear the field".
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<OffsetDateTime>>,
    pub is_completed: Option<bool>,
}
