//! Fallible field parsers for raw CSV cells.
//!
//! Each parser reports *why* a cell was rejected; the loader decides that any
//! rejection simply leaves the field absent.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

/// Why a single cell could not be turned into a typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("empty cell")]
    Empty,

    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    #[error("negative quantity: {0:?}")]
    NegativeQuantity(String),

    #[error("not a date: {0:?}")]
    InvalidDate(String),
}

/// Day-first formats, tried in order before the ISO fallback.
const DAY_FIRST_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// Date-time layouts accepted by the ISO fallback; only the date is kept.
const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Leading date shapes with a four-digit year. chrono's `%Y` accepts any
/// digit count, so `18-03-24` would otherwise parse as year 24.
const DATE_SHAPE: &str = r"^(\d{1,2}-\d{1,2}-\d{4}$|\d{1,2}/\d{1,2}/\d{4}$|\d{4}-\d{1,2}-\d{1,2}([Tt ]|$))";

// ── Headers ───────────────────────────────────────────────────────────────────

/// Normalise a header name: trim it and collapse inner whitespace runs to `_`.
///
/// ```
/// use invoice_core::parsing::normalize_header;
///
/// assert_eq!(normalize_header("  Total Sales "), "Total_Sales");
/// assert_eq!(normalize_header("Invoice_ID"), "Invoice_ID");
/// ```
pub fn normalize_header(raw: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("regex is valid"));
    re.replace_all(raw.trim(), "_").into_owned()
}

// ── Numbers ───────────────────────────────────────────────────────────────────

/// Parse an integer through a float, truncating toward zero (`"7.0"` → 7).
pub fn parse_int(raw: &str) -> Result<i64, FieldError> {
    let value = parse_finite(raw.trim(), raw)?;
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return Err(FieldError::InvalidNumber(raw.to_string()));
    }
    Ok(truncated as i64)
}

/// Parse a non-negative item count.
pub fn parse_quantity(raw: &str) -> Result<u64, FieldError> {
    let value = parse_int(raw)?;
    u64::try_from(value).map_err(|_| FieldError::NegativeQuantity(raw.to_string()))
}

/// Parse a monetary amount, tolerating thousands separators (`"1,234.5"`).
pub fn parse_float(raw: &str) -> Result<f64, FieldError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    parse_finite(&cleaned, raw)
}

fn parse_finite(cleaned: &str, raw: &str) -> Result<f64, FieldError> {
    if cleaned.is_empty() {
        return Err(FieldError::Empty);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FieldError::InvalidNumber(raw.to_string())),
    }
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Parse a calendar date with the day-first convention.
///
/// Tries `DD-MM-YYYY`, `DD/MM/YYYY` and `YYYY-MM-DD` in that order, then falls
/// back to RFC 3339 and ISO 8601 date-times (keeping the date part). The year
/// must be written with four digits.
pub fn parse_day_first_date(raw: &str) -> Result<NaiveDate, FieldError> {
    static SHAPE: OnceLock<Regex> = OnceLock::new();

    let s = raw.trim();
    if s.is_empty() {
        return Err(FieldError::Empty);
    }
    let shape = SHAPE.get_or_init(|| Regex::new(DATE_SHAPE).expect("regex is valid"));
    if !shape.is_match(s) {
        return Err(FieldError::InvalidDate(raw.to_string()));
    }

    for fmt in DAY_FIRST_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Trailing 'Z' is accepted by chrono's RFC 3339 parser as-is.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    for fmt in ISO_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.date());
        }
    }

    Err(FieldError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    // ── normalize_header ──────────────────────────────────────────────────────

    #[test]
    fn test_normalize_header_collapses_whitespace() {
        assert_eq!(normalize_header("Product   Name"), "Product_Name");
        assert_eq!(normalize_header("\tDate\n"), "Date");
    }

    // ── parse_int / parse_quantity ────────────────────────────────────────────

    #[test]
    fn test_parse_int_truncates_floats() {
        assert_eq!(parse_int("7.0"), Ok(7));
        assert_eq!(parse_int("7.9"), Ok(7));
        assert_eq!(parse_int(" 35 "), Ok(35));
        assert_eq!(parse_int("-3.5"), Ok(-3));
    }

    #[test]
    fn test_parse_int_rejects_garbage() {
        assert_eq!(parse_int(""), Err(FieldError::Empty));
        assert_eq!(parse_int("   "), Err(FieldError::Empty));
        assert!(matches!(parse_int("seven"), Err(FieldError::InvalidNumber(_))));
        assert!(matches!(parse_int("NaN"), Err(FieldError::InvalidNumber(_))));
        assert!(matches!(parse_int("inf"), Err(FieldError::InvalidNumber(_))));
    }

    #[test]
    fn test_parse_quantity_rejects_negative() {
        assert_eq!(parse_quantity("4"), Ok(4));
        assert_eq!(parse_quantity("0.4"), Ok(0));
        assert!(matches!(
            parse_quantity("-2"),
            Err(FieldError::NegativeQuantity(_))
        ));
    }

    // ── parse_float ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_float_strips_thousands_separators() {
        assert_eq!(parse_float("1,234.50"), Ok(1234.5));
        assert_eq!(parse_float("360.68"), Ok(360.68));
        assert_eq!(parse_float("1,000,000"), Ok(1_000_000.0));
    }

    #[test]
    fn test_parse_float_empty_is_not_zero() {
        assert_eq!(parse_float(""), Err(FieldError::Empty));
        assert!(matches!(parse_float("n/a"), Err(FieldError::InvalidNumber(_))));
    }

    // ── parse_day_first_date ──────────────────────────────────────────────────

    #[test]
    fn test_parse_date_day_first_dashes() {
        let d = parse_day_first_date("18-03-2024").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 3, 18));
    }

    #[test]
    fn test_parse_date_day_first_slashes() {
        let d = parse_day_first_date("05/04/2024").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 4, 5));
    }

    #[test]
    fn test_parse_date_iso_formats() {
        let d = parse_day_first_date("2024-03-20").unwrap();
        assert_eq!((d.month(), d.day()), (3, 20));

        let d = parse_day_first_date("2024-03-20T10:15:00Z").unwrap();
        assert_eq!((d.month(), d.day()), (3, 20));

        let d = parse_day_first_date("2024-03-21 08:00:00").unwrap();
        assert_eq!(d.day(), 21);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(
            parse_day_first_date("not-a-date"),
            Err(FieldError::InvalidDate("not-a-date".to_string()))
        );
        assert!(parse_day_first_date("31-02-2024").is_err());
        assert_eq!(parse_day_first_date(""), Err(FieldError::Empty));
    }

    #[test]
    fn test_parse_date_requires_four_digit_year() {
        for raw in ["18-03-24", "18-03-202", "18/03/24", "24-03-18", "18-03-20245"] {
            assert_eq!(
                parse_day_first_date(raw),
                Err(FieldError::InvalidDate(raw.to_string())),
                "{raw}"
            );
        }
        assert!(parse_day_first_date("024-03-18T10:00:00").is_err());
        assert!(parse_day_first_date("0024-03-18").is_ok());
    }
}
