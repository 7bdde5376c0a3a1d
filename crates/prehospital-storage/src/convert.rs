//! Conversions between stored TEXT columns and domain values.

use crate::error::StorageError;

/// Fixed-width UTC text with nanoseconds, so stored timestamps sort
/// chronologically as TEXT.
pub(crate) fn to_text(ts: jiff::Timestamp) -> String {
    format!(
        "{}.{:09}Z",
        ts.strftime("%Y-%m-%dT%H:%M:%S"),
        ts.subsec_nanosecond().rem_euclid(1_000_000_000)
    )
}

pub(crate) fn timestamp(column: &'static str, raw: &str) -> Result<jiff::Timestamp, StorageError> {
    raw.parse().map_err(|e: jiff::Error| StorageError::InvalidColumn {
        column,
        reason: e.to_string(),
    })
}

pub(crate) fn opt_timestamp(
    column: &'static str,
    raw: Option<String>,
) -> Result<Option<jiff::Timestamp>, StorageError> {
    raw.map(|r| timestamp(column, &r)).transpose()
}

pub(crate) fn opt_date(
    column: &'static str,
    raw: Option<String>,
) -> Result<Option<jiff::civil::Date>, StorageError> {
    raw.map(|r| {
        r.parse().map_err(|e: jiff::Error| StorageError::InvalidColumn {
            column,
            reason: e.to_string(),
        })
    })
    .transpose()
}

/// Checkbox groups are stored as JSON arrays; NULL reads as empty.
pub(crate) fn string_list(raw: Option<String>) -> Result<Vec<String>, StorageError> {
    match raw {
        Some(r) if !r.is_empty() => Ok(serde_json::from_str(&r)?),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn opt_u32(column: &'static str, raw: Option<i64>) -> Result<Option<u32>, StorageError> {
    raw.map(|v| {
        u32::try_from(v).map_err(|e| StorageError::InvalidColumn {
            column,
            reason: e.to_string(),
        })
    })
    .transpose()
}
