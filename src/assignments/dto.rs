use serde::{Deserialize, Deserializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::assignments::repo_types::AssignmentPatch;

/// Body for `POST /assignments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignment {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_due_date")]
    pub due_date: Option<OffsetDateTime>,
}

/// Body for `PUT`/`PATCH /assignments/:id`. Every field is optional; for
/// `description` and `due_date` an explicit `null` clears the stored value,
/// while leaving the key out leaves it unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignment {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "keyed_opt_string")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "keyed_opt_due_date")]
    pub due_date: Option<Option<OffsetDateTime>>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl UpdateAssignment {
    pub fn into_patch(self) -> AssignmentPatch {
        AssignmentPatch {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            is_completed: self.is_completed,
        }
    }
}

/// Due dates arrive either as RFC 3339 or as a bare `YYYY-MM-DD` from a
/// date picker; the bare form means midnight UTC that day.
pub fn parse_due_date(raw: &str) -> Result<OffsetDateTime, String> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, &date_only) {
        return Ok(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc());
    }
    Err(format!("invalid due date: {raw:?}"))
}

fn opt_due_date<'de, D>(de: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    raw.map(|s| parse_due_date(&s).map_err(serde::de::Error::custom))
        .transpose()
}

// The `keyed_` deserializers only run when the key is present, which is
// what lets `Some(None)` stand for an explicit `null`.

fn keyed_opt_due_date<'de, D>(de: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_due_date(de).map(Some)
}

fn keyed_opt_string<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}
