//! Calendar dates in canonical, sortable `YYYY/MM/DD` form.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Strict shape check; chrono alone would accept `1/1/25`.
static DMY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("date pattern is valid"));

const SOURCE_FORMAT: &str = "%d/%m/%Y";
const CANONICAL_FORMAT: &str = "%Y/%m/%d";

/// A date key shared by both sources.
///
/// Normally `YYYY/MM/DD`, but text that failed normalization is carried
/// through verbatim, so this is compared as a plain string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(String);

impl CalendarDate {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(CANONICAL_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse back into a real date, if this is in canonical form.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, CANONICAL_FORMAT).ok()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CalendarDate {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CalendarDate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Convert `DD/MM/YYYY` into `YYYY/MM/DD`.
///
/// Empty input gives an empty date. Anything else that is not a valid
/// `DD/MM/YYYY` date is logged and returned trimmed but unchanged.
pub fn normalize_date(text: &str) -> CalendarDate {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return CalendarDate::default();
    }

    if !DMY_RE.is_match(trimmed) {
        warn!(date = trimmed, "Unrecognised date format, keeping original text");
        return CalendarDate::new(trimmed);
    }

    match NaiveDate::parse_from_str(trimmed, SOURCE_FORMAT) {
        Ok(date) => CalendarDate::from_naive(date),
        Err(e) => {
            warn!(date = trimmed, error = %e, "Failed to parse date, keeping original text");
            CalendarDate::new(trimmed)
        }
    }
}
