//! Signed minute durations and their text forms.
//!
//! Remote timesheets render durations as `"9h 14m"`, `"-2h 30m"` or as clock
//! text (`"8:30:45"`). Everything is reduced to whole signed minutes.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)h").expect("hours pattern is valid"));
static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)m").expect("minutes pattern is valid"));

/// Errors produced while parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration format: {0:?} (expected something like '9h 14m', '2h' or '30m')")]
    InvalidFormat(String),

    #[error("duration component out of range: {0:?}")]
    OutOfRange(String),
}

/// A signed number of minutes.
///
/// Arithmetic saturates at the `i64` bounds instead of overflowing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DurationMinutes(pub i64);

impl DurationMinutes {
    pub const ZERO: DurationMinutes = DurationMinutes(0);

    pub fn minutes(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl fmt::Display for DurationMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_duration(*self))
    }
}

impl FromStr for DurationMinutes {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

impl Add for DurationMinutes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for DurationMinutes {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for DurationMinutes {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for DurationMinutes {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for DurationMinutes {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Split a leading minus sign (and any whitespace after it) off `text`.
fn split_sign(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    }
}

/// Parse a duration like `"9h 14m"`, `"2h"`, `"30m"` or `"- 2h 15m"`.
///
/// Input is case-insensitive and may carry surrounding whitespace. Missing
/// units count as zero, but at least one of `h` or `m` must be present.
pub fn parse_duration(text: &str) -> Result<DurationMinutes, DurationError> {
    let lowered = text.trim().to_lowercase();
    let (negative, body) = split_sign(&lowered);

    let hours = HOURS_RE.captures(body).map(|c| c[1].to_string());
    let minutes = MINUTES_RE.captures(body).map(|c| c[1].to_string());

    if hours.is_none() && minutes.is_none() {
        return Err(DurationError::InvalidFormat(text.to_string()));
    }

    let component = |digits: Option<String>| -> Result<i64, DurationError> {
        match digits {
            Some(d) => d
                .parse::<i64>()
                .map_err(|_| DurationError::OutOfRange(text.to_string())),
            None => Ok(0),
        }
    };

    let total = component(hours)?
        .checked_mul(60)
        .and_then(|h| h.checked_add(component(minutes).ok()?))
        .ok_or_else(|| DurationError::OutOfRange(text.to_string()))?;

    Ok(DurationMinutes(if negative { -total } else { total }))
}

/// Render minutes as `"{h}h {m}m"`, dropping a zero component. Zero is `"0m"`.
pub fn format_duration(duration: DurationMinutes) -> String {
    let total = duration.0;
    if total == 0 {
        return "0m".to_string();
    }

    let magnitude = total.unsigned_abs();
    let hours = magnitude / 60;
    let minutes = magnitude % 60;

    let body = if hours == 0 {
        format!("{}m", minutes)
    } else if minutes == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, minutes)
    };

    if total < 0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Convert clock text (`"H:MM:SS"` or `"H:MM"`) into [`format_duration`] form.
///
/// Seconds are ignored. Anything that does not parse comes back trimmed but
/// otherwise untouched, since upstream markup is not always well-formed.
pub fn parse_clock_duration(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let (negative, body) = split_sign(trimmed);
    let mut parts = body.split(':');

    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return trimmed.to_string();
    };

    let (Ok(hours), Ok(minutes)) = (hours.parse::<u32>(), minutes.parse::<u32>()) else {
        return trimmed.to_string();
    };

    let total = i64::from(hours) * 60 + i64::from(minutes);
    format_duration(DurationMinutes(if negative { -total } else { total }))
}

/// Parse a duration cell as either source reports it.
///
/// Clock text (`"4:00:00"`) is converted first; everything else goes straight
/// to [`parse_duration`].
pub fn parse_reported_duration(text: &str) -> Result<DurationMinutes, DurationError> {
    if text.contains(':') {
        parse_duration(&parse_clock_duration(text))
    } else {
        parse_duration(text)
    }
}
