//! Timeframe value -- an immutable `(literal, milliseconds)` pair with
//! epoch-aligned period arithmetic.
//!
//! Alignment is relative to the Unix epoch, not the calendar. A `"1D"` timeframe
//! lands on UTC midnight because 86 400 000 divides epoch time evenly; a `"1M"`
//! timeframe is a fixed 30 days and does not follow calendar months.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::batch::{self, Batch};
use crate::clock;
use crate::error::{Result, TimeframeError};
use crate::parser;

/// A period specifier such as `"1m"` or `"4h"` together with its length.
///
/// Invariant: `duration_ms == parse_duration_ms(literal)` and `duration_ms > 0`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Timeframe {
    literal: String,
    duration_ms: i64,
}

impl Timeframe {
    /// Construct directly from a literal, bypassing any registry.
    ///
    /// # Errors
    /// Returns `TimeframeError::Format` if the literal does not parse or
    /// describes a zero-length period.
    pub fn new(literal: &str) -> Result<Self> {
        let duration_ms = parser::parse_duration_ms(literal)?;
        if duration_ms == 0 {
            return Err(TimeframeError::format(literal, "describes a zero-length period"));
        }
        Ok(Self {
            literal: literal.to_string(),
            duration_ms,
        })
    }

    /// Only for literals whose duration is known to be correct (presets).
    pub(crate) fn from_trusted_parts(literal: &'static str, duration_ms: i64) -> Self {
        Self {
            literal: literal.to_string(),
            duration_ms,
        }
    }

    /// Build from a [`TimeframeSource`] without caching.
    ///
    /// An existing instance is returned as the very same `Arc`.
    pub fn from_source(source: TimeframeSource) -> Result<Arc<Self>> {
        match source {
            TimeframeSource::Literal(literal) => Ok(Arc::new(Self::new(&literal)?)),
            TimeframeSource::Existing(timeframe) => Ok(timeframe),
        }
    }

    /// `"1m"`
    pub fn as_literal(&self) -> &str {
        &self.literal
    }

    /// `60000`
    pub fn as_milliseconds(&self) -> i64 {
        self.duration_ms
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms)
    }

    /// `"60000milliseconds"`
    pub fn milliseconds_label(&self) -> String {
        format!("{}milliseconds", self.duration_ms)
    }

    /// Start of the period containing `epoch_ms`: `floor(epoch / d) * d`.
    pub fn congruent_start_key(&self, epoch_ms: i64) -> i64 {
        congruent_start_key(self.duration_ms, epoch_ms)
    }

    pub fn congruent_start_key_now(&self) -> i64 {
        self.congruent_start_key(clock::now_ms())
    }

    /// [`Self::congruent_start_key`] on a `DateTime`.
    pub fn congruent_start(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let key = self.congruent_start_key(at.timestamp_millis());
        DateTime::from_timestamp_millis(key).unwrap_or(at)
    }

    /// Number of complete periods from `start_ms` to `end_ms`. Negative when
    /// `end_ms < start_ms`.
    pub fn elapsed_count(&self, start_ms: i64, end_ms: i64) -> i64 {
        elapsed_count(self.duration_ms, start_ms, end_ms)
    }

    pub fn elapsed_count_until_now(&self, start_ms: i64) -> i64 {
        self.elapsed_count(start_ms, clock::now_ms())
    }

    /// Milliseconds from `now_ms` until the next period boundary, in `1..=duration`.
    pub fn millis_until_next_at(&self, now_ms: i64) -> i64 {
        let d = i128::from(self.duration_ms);
        let key = i128::from(now_ms).div_euclid(d) * d;
        saturate_i64(key + d - i128::from(now_ms))
    }

    pub fn millis_until_next(&self) -> i64 {
        self.millis_until_next_at(clock::now_ms())
    }

    /// Split `[start_ms, end_ms)` into batches of at most `batch_size` periods.
    pub fn plan_batches(&self, start_ms: i64, end_ms: i64, batch_size: usize) -> Vec<Batch> {
        batch::plan_batches(self.duration_ms, start_ms, end_ms, batch_size)
    }
}

/// Start of the period of length `duration_ms` containing `epoch_ms`.
///
/// Uses floor division, so instants before the epoch align downward too.
/// A non-positive `duration_ms` leaves `epoch_ms` unchanged. A key below
/// `i64::MIN` saturates to `i64::MIN`.
pub fn congruent_start_key(duration_ms: i64, epoch_ms: i64) -> i64 {
    if duration_ms <= 0 {
        return epoch_ms;
    }
    let d = i128::from(duration_ms);
    saturate_i64(i128::from(epoch_ms).div_euclid(d) * d)
}

/// Complete periods of length `duration_ms` between two instants (floored).
///
/// A non-positive `duration_ms` yields 0. Counts beyond the `i64` range
/// saturate.
pub fn elapsed_count(duration_ms: i64, start_ms: i64, end_ms: i64) -> i64 {
    if duration_ms <= 0 {
        return 0;
    }
    let span = i128::from(end_ms) - i128::from(start_ms);
    saturate_i64(span.div_euclid(i128::from(duration_ms)))
}

/// Millisecond arithmetic runs in `i128`; results are clamped back to `i64`.
pub(crate) fn saturate_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl fmt::Debug for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timeframe! {} has interval duration of {} ms.",
            self.literal, self.duration_ms
        )
    }
}

impl PartialOrd for Timeframe {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timeframe {
    fn cmp(&self, other: &Self) -> Ordering {
        self.duration_ms
            .cmp(&other.duration_ms)
            .then_with(|| self.literal.cmp(&other.literal))
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Timeframe {
    type Error = TimeframeError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Timeframe {
    type Error = TimeframeError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

// ---------------------------------------------------------------------------
// Serde: `{ "<literal>": <ms> }`
// ---------------------------------------------------------------------------

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.literal, &self.duration_ms)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TimeframeVisitor)
    }
}

struct TimeframeVisitor;

impl<'de> Visitor<'de> for TimeframeVisitor {
    type Value = Timeframe;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a timeframe literal or a single-entry {literal: milliseconds} map")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Timeframe, E> {
        Timeframe::new(v).map_err(E::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Timeframe, A::Error> {
        let (literal, duration_ms): (String, i64) = map
            .next_entry()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        if map.next_key::<String>()?.is_some() {
            return Err(de::Error::custom("timeframe map must have exactly one entry"));
        }

        let timeframe = Timeframe::new(&literal).map_err(de::Error::custom)?;
        if timeframe.duration_ms != duration_ms {
            return Err(de::Error::custom(format!(
                "timeframe {} is {} ms, not {} ms",
                literal, timeframe.duration_ms, duration_ms
            )));
        }
        Ok(timeframe)
    }
}

// ---------------------------------------------------------------------------
// Construction source
// ---------------------------------------------------------------------------

/// What a timeframe can be built or resolved from.
#[derive(Debug, Clone)]
pub enum TimeframeSource {
    Literal(String),
    /// Passed through unchanged.
    Existing(Arc<Timeframe>),
}

impl TimeframeSource {
    /// Interpret a loosely-typed JSON value.
    ///
    /// Strings are literals and single-entry `{literal: ms}` objects are
    /// serialized timeframes. Everything else is unsupported.
    ///
    /// # Errors
    /// Returns `TimeframeError::UnsupportedSource` for numbers, booleans, null,
    /// arrays and objects that are not a valid serialized timeframe.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(literal) => Ok(TimeframeSource::Literal(literal.clone())),
            serde_json::Value::Object(map) if map.len() == 1 => {
                let timeframe: Timeframe = serde_json::from_value(value.clone())
                    .map_err(|e| TimeframeError::UnsupportedSource(e.to_string()))?;
                Ok(TimeframeSource::Existing(Arc::new(timeframe)))
            }
            other => Err(TimeframeError::UnsupportedSource(format!(
                "cannot build a timeframe from JSON {}; period durations are not yet a supported source",
                json_kind(other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl From<&str> for TimeframeSource {
    fn from(value: &str) -> Self {
        TimeframeSource::Literal(value.to_string())
    }
}

impl From<String> for TimeframeSource {
    fn from(value: String) -> Self {
        TimeframeSource::Literal(value)
    }
}

impl From<Arc<Timeframe>> for TimeframeSource {
    fn from(value: Arc<Timeframe>) -> Self {
        TimeframeSource::Existing(value)
    }
}

impl From<&Arc<Timeframe>> for TimeframeSource {
    fn from(value: &Arc<Timeframe>) -> Self {
        TimeframeSource::Existing(Arc::clone(value))
    }
}

impl From<Timeframe> for TimeframeSource {
    fn from(value: Timeframe) -> Self {
        TimeframeSource::Existing(Arc::new(value))
    }
}
