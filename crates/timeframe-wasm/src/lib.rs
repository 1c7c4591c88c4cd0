//! WASM bindings for timeframe-engine.
//!
//! Exposes timeframe parsing, period alignment, batch planning and the date
//! helpers to JavaScript via `wasm-bindgen`. Epoch values cross the boundary as
//! JS numbers (milliseconds); structured results are returned as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p timeframe-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/timeframe-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/timeframe_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use timeframe_engine::{DateInput, Timeframe, TimeframeError};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LegibleDto {
    epoch_ms: i64,
    parts: Vec<String>,
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MidnightDto {
    epoch_ms: i64,
    iso: String,
}

impl From<DateTime<Utc>> for MidnightDto {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            epoch_ms: dt.timestamp_millis(),
            iso: dt.to_rfc3339(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_js_error(e: TimeframeError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Convert a JS number of milliseconds into an integer epoch.
fn epoch_ms(value: f64, name: &str) -> Result<i64, JsValue> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > 8.64e15 {
        return Err(JsValue::from_str(&format!(
            "{} must be an integral epoch in milliseconds, got {}",
            name, value
        )));
    }
    Ok(value as i64)
}

/// Absent → now, number → epoch ms, string → parsed date text.
fn date_input(value: JsValue) -> Result<DateInput, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(DateInput::DateTime(timeframe_engine::clock::now()));
    }
    if let Some(ms) = value.as_f64() {
        return Ok(DateInput::EpochMillis(epoch_ms(ms, "date")?));
    }
    if let Some(text) = value.as_string() {
        return Ok(DateInput::Text(text));
    }
    Err(JsValue::from_str(
        "date must be undefined, an epoch number, or a date string",
    ))
}

fn timeframe(literal: &str) -> Result<Timeframe, JsValue> {
    Timeframe::new(literal).map_err(to_js_error)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Parse a timeframe literal. Returns `{"<literal>": <ms>}` as a JSON string.
#[wasm_bindgen(js_name = "parseTimeframe")]
pub fn parse_timeframe(literal: &str) -> Result<String, JsValue> {
    to_json(&timeframe(literal)?)
}

/// Start of the period containing `epoch` (defaults to now).
#[wasm_bindgen(js_name = "congruentStartKey")]
pub fn congruent_start_key(literal: &str, epoch: Option<f64>) -> Result<f64, JsValue> {
    let tf = timeframe(literal)?;
    let key = match epoch {
        Some(ms) => tf.congruent_start_key(epoch_ms(ms, "epoch")?),
        None => tf.congruent_start_key_now(),
    };
    Ok(key as f64)
}

/// Complete periods between `start` and `end` (defaults to now).
#[wasm_bindgen(js_name = "elapsedCount")]
pub fn elapsed_count(literal: &str, start: f64, end: Option<f64>) -> Result<f64, JsValue> {
    let tf = timeframe(literal)?;
    let start = epoch_ms(start, "start")?;
    let count = match end {
        Some(ms) => tf.elapsed_count(start, epoch_ms(ms, "end")?),
        None => tf.elapsed_count_until_now(start),
    };
    Ok(count as f64)
}

#[wasm_bindgen(js_name = "millisecondsLeftUntilNext")]
pub fn milliseconds_left_until_next(literal: &str) -> Result<f64, JsValue> {
    Ok(timeframe(literal)?.millis_until_next() as f64)
}

/// Split `[start, end)` into batches of at most `batchSize` periods (default 1441).
///
/// Returns a JSON array of `{startTime, endTime}` objects.
#[wasm_bindgen(js_name = "planBatches")]
pub fn plan_batches(
    duration_ms: f64,
    start: f64,
    end: f64,
    batch_size: Option<u32>,
) -> Result<String, JsValue> {
    let batches = timeframe_engine::plan_batches(
        epoch_ms(duration_ms, "durationMs")?,
        epoch_ms(start, "start")?,
        epoch_ms(end, "end")?,
        batch_size.map_or(timeframe_engine::DEFAULT_BATCH_SIZE, |n| n as usize),
    );
    to_json(&batches)
}

/// UTC midnight of `date` as `{epochMs, iso}`.
#[wasm_bindgen(js_name = "truncateToUtcMidnight")]
pub fn truncate_to_utc_midnight(date: JsValue) -> Result<String, JsValue> {
    let midnight =
        timeframe_engine::truncate_to_utc_midnight(date_input(date)?).map_err(to_js_error)?;
    to_json(&MidnightDto::from(midnight))
}

/// Days 2..=today of the current UTC month as a JSON array.
#[wasm_bindgen(js_name = "daysOfCurrentMonth")]
pub fn days_of_current_month() -> Result<String, JsValue> {
    to_json(&timeframe_engine::days_of_current_month())
}

/// Render `date` for humans. `timezone` is an IANA name; UTC when omitted,
/// since a WASM module has no reliable local zone.
#[wasm_bindgen(js_name = "formatLegible")]
pub fn format_legible(
    date: JsValue,
    include_iso: bool,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let input = date_input(date)?;
    let legible = match timezone.as_deref() {
        Some(name) => {
            let tz = timeframe_engine::dates::parse_timezone(name).map_err(to_js_error)?;
            timeframe_engine::format_legible_in(input, &tz, include_iso)
        }
        None => timeframe_engine::format_legible_in(input, &Utc, include_iso),
    }
    .map_err(to_js_error)?;

    to_json(&LegibleDto {
        epoch_ms: legible.epoch_ms,
        parts: legible.to_parts(),
        text: legible.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Registry handle
// ---------------------------------------------------------------------------

/// A timeframe cache owned by the JavaScript caller.
#[wasm_bindgen(js_name = "TimeframeRegistry")]
pub struct TimeframeRegistryHandle {
    inner: timeframe_engine::TimeframeRegistry,
}

#[wasm_bindgen(js_class = "TimeframeRegistry")]
impl TimeframeRegistryHandle {
    /// Create a registry, optionally warmed with the default literal list.
    #[wasm_bindgen(constructor)]
    pub fn new(with_defaults: Option<bool>) -> TimeframeRegistryHandle {
        let inner = if with_defaults.unwrap_or(false) {
            timeframe_engine::TimeframeRegistry::with_defaults()
        } else {
            timeframe_engine::TimeframeRegistry::new()
        };
        TimeframeRegistryHandle { inner }
    }

    /// Resolve a literal (bare `1m` or JSON `"1m"`) or a serialized
    /// `{literal: ms}` JSON object.
    ///
    /// Any other JSON value (e.g. a bare number) is an unsupported source.
    pub fn resolve(&self, source: &str) -> Result<String, JsValue> {
        let value = serde_json::from_str(source)
            .unwrap_or_else(|_| serde_json::Value::String(source.to_string()));
        let tf = self.inner.resolve_json(&value).map_err(to_js_error)?;
        to_json(&*tf)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn size(&self) -> usize {
        self.inner.len()
    }

    /// Cached literals, shortest period first, as a JSON array.
    pub fn literals(&self) -> Result<String, JsValue> {
        to_json(&self.inner.literals())
    }
}
