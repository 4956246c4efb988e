//! Wire types returned by the article API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Shown in place of a publication date the server did not provide.
pub const DATE_FALLBACK: &str = "Date not available";

// ============================================================================
// Identifiers
// ============================================================================

/// Record identifier as sent by the server.
///
/// The backend marshals article ids as strings and category ids as integers,
/// so both JSON shapes are accepted and normalized to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
            Raw::Uint(n) => Self(n.to_string()),
        })
    }
}

// ============================================================================
// Article / Category
// ============================================================================

/// A processed news article as listed by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Article {
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_url: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Article {
    /// Long-form publication date, e.g. `January 5, 2024`.
    pub fn formatted_date(&self) -> String {
        format_published_date(self.published_at)
    }
}

/// A category row. The name doubles as display label and API path segment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub category_name: String,
}

/// Format an optional publication timestamp for display.
pub fn format_published_date(published: Option<DateTime<Utc>>) -> String {
    match published {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => DATE_FALLBACK.to_string(),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339, naive date-times, and bare dates. Unparsable values
/// become `None` so one bad row cannot fail the whole list.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = parse_timestamp(raw.trim());
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::debug!(value = %raw, "Unparsable published_at, treating as absent");
    }
    Ok(parsed)
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
