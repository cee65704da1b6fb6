//! Parsing of raw string fields into typed values.

use chrono::NaiveDate;

use crate::error::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a date as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use evac_core::types::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(format_date(date), "2024-03-09");
/// ```
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn require_id(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingId { field });
    }
    Ok(id.to_owned())
}

/// Blank counts as zero.
pub(crate) fn parse_count(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: value.to_owned(),
        })
}

/// Blank means unknown.
pub(crate) fn parse_optional_number(
    field: &'static str,
    raw: &str,
) -> Result<Option<u32>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_count(field, raw).map(Some)
}

pub(crate) fn parse_date_or(
    field: &'static str,
    raw: &str,
    default: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(default);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_owned(),
    })
}
