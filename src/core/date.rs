use chrono::{DateTime, NaiveDate};

use crate::error::{NewsError, Result};

/// Formats accepted for publication dates, tried in order.
///
/// `%d %b %Y` is the feed format the scrapers emit ("01 Feb 2024").
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%d %B %Y", "%Y/%m/%d"];

/// Parse a publication date from any of the accepted formats.
///
/// RFC 3339 timestamps are accepted too; only the calendar date is kept.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(NewsError::validation("date is empty"));
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }

    Err(NewsError::validation(format!(
        "unparsable date '{}' (expected YYYY-MM-DD, e.g. 2024-03-31)",
        raw
    )))
}

/// Strict `YYYY-MM-DD` parsing for query bounds.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        NewsError::validation(format!(
            "invalid date '{}': use yyyy-MM-dd format, e.g. 2024-03-31",
            raw
        ))
    })
}
