//! UTC date helpers -- midnight truncation, day-of-month enumeration and
//! legible timestamp formatting for logs and debugging.

use std::fmt;

use chrono::{
    DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::{Result, TimeframeError};

/// Anything a date can be built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    DateTime(DateTime<Utc>),
    EpochMillis(i64),
    /// RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC), `YYYY-MM-DD`,
    /// or a decimal epoch-millisecond string.
    Text(String),
}

impl DateInput {
    /// Resolve to a UTC instant.
    ///
    /// # Errors
    /// Returns `TimeframeError::InvalidDate` carrying the raw input when it is
    /// out of range or unparseable.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        match self {
            DateInput::DateTime(dt) => Ok(*dt),
            DateInput::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms)
                .ok_or_else(|| TimeframeError::invalid_date(&ms.to_string())),
            DateInput::Text(text) => parse_date_text(text),
        }
    }
}

fn parse_date_text(text: &str) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ndt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    if let Ok(ms) = trimmed.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp_millis(ms) {
            return Ok(dt);
        }
    }
    Err(TimeframeError::invalid_date(text))
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::DateTime(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::EpochMillis(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

// ---------------------------------------------------------------------------
// Midnight truncation
// ---------------------------------------------------------------------------

/// Zero the UTC hours, minutes, seconds and milliseconds of `input`.
///
/// # Errors
/// Returns `TimeframeError::InvalidDate` if `input` is not a valid date.
pub fn truncate_to_utc_midnight(input: impl Into<DateInput>) -> Result<DateTime<Utc>> {
    let dt = input.into().to_datetime()?;
    Ok(utc_midnight_of(dt))
}

/// UTC midnight of the current day.
pub fn utc_midnight_today() -> DateTime<Utc> {
    utc_midnight_of(clock::now())
}

fn utc_midnight_of(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive().and_time(NaiveTime::MIN).and_utc()
}

// ---------------------------------------------------------------------------
// Days of month
// ---------------------------------------------------------------------------

/// One day of a month, with the epoch of its UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub year: i32,
    /// 1-based.
    pub month: u32,
    pub day: u32,
    /// Epoch milliseconds at UTC midnight of this day.
    pub epoch: i64,
}

/// Days 2 through `today`'s UTC day-of-month (inclusive) of `today`'s month.
///
/// Day 1 is skipped, so the first day of a month yields an empty list.
pub fn days_of_month_through(today: DateTime<Utc>) -> Vec<MonthDay> {
    let year = today.year();
    let month = today.month();

    (2..=today.day())
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .map(|date| MonthDay {
            year,
            month,
            day: date.day(),
            epoch: date.and_time(NaiveTime::MIN).and_utc().timestamp_millis(),
        })
        .collect()
}

/// [`days_of_month_through`] for the current UTC day.
pub fn days_of_current_month() -> Vec<MonthDay> {
    days_of_month_through(clock::now())
}

// ---------------------------------------------------------------------------
// Legible formatting
// ---------------------------------------------------------------------------

/// Separator placed between the local and ISO renderings.
pub const ISO_SEPARATOR: &str = "≍";

/// An instant rendered for humans: epoch, local wall-clock, and optionally ISO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legible {
    pub epoch_ms: i64,
    /// e.g. `8/24/2024 @ 10:35:12 PM`
    pub local: String,
    /// e.g. `2024-08-25 @ 02:35:12.842Z`
    pub iso: Option<String>,
}

impl Legible {
    /// `[epoch, local]`, or `[epoch, local, "≍", iso]` when ISO was requested.
    pub fn to_parts(&self) -> Vec<String> {
        let mut parts = vec![self.epoch_ms.to_string(), self.local.clone()];
        if let Some(iso) = &self.iso {
            parts.push(ISO_SEPARATOR.to_string());
            parts.push(iso.clone());
        }
        parts
    }
}

impl fmt::Display for Legible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_parts().join(" "))
    }
}

/// Render `input` using the process' local timezone.
///
/// # Errors
/// Returns `TimeframeError::InvalidDate` if `input` is not a valid date.
pub fn format_legible(input: impl Into<DateInput>, include_iso: bool) -> Result<Legible> {
    format_legible_in(input, &Local, include_iso)
}

/// Render `input` with its wall-clock part in `tz`.
///
/// # Errors
/// Returns `TimeframeError::InvalidDate` if `input` is not a valid date.
pub fn format_legible_in<Tz>(
    input: impl Into<DateInput>,
    tz: &Tz,
    include_iso: bool,
) -> Result<Legible>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let dt = input.into().to_datetime()?;
    Ok(render_legible(dt, tz, include_iso))
}

/// [`format_legible`] for the current instant.
pub fn format_legible_now(include_iso: bool) -> Legible {
    render_legible(clock::now(), &Local, include_iso)
}

fn render_legible<Tz>(dt: DateTime<Utc>, tz: &Tz, include_iso: bool) -> Legible
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let local = dt
        .with_timezone(tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
        .replacen(", ", " @ ", 1);

    let iso = include_iso.then(|| {
        dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
            .replacen('T', " @ ", 1)
    });

    Legible {
        epoch_ms: dt.timestamp_millis(),
        local,
        iso,
    }
}

/// Look up an IANA timezone by name (e.g. `"America/New_York"`).
///
/// # Errors
/// Returns `TimeframeError::InvalidTimezone` for unknown names.
pub fn parse_timezone(name: &str) -> Result<chrono_tz::Tz> {
    name.trim()
        .parse()
        .map_err(|_| TimeframeError::InvalidTimezone(name.to_string()))
}
