//! # timeframe-engine
//!
//! Compact timeframe literals (`"1m"`, `"4h"`, `"2D"`) and the period
//! arithmetic built on them.
//!
//! ```rust
//! use timeframe_engine::{plan_batches, TimeframeRegistry};
//!
//! let registry = TimeframeRegistry::new();
//! let tf = registry.resolve("1m").unwrap();
//! assert_eq!(tf.as_milliseconds(), 60_000);
//! assert!(std::sync::Arc::ptr_eq(&tf, &registry.resolve("1m").unwrap()));
//!
//! assert_eq!(tf.congruent_start_key(90_500), 60_000);
//! assert_eq!(tf.elapsed_count(0, 150_000), 2);
//!
//! let batches = plan_batches(60_000, 0, 600_000, 4);
//! assert_eq!(batches.len(), 3);
//! assert_eq!(batches[2].end_time, 600_000);
//! ```
//!
//! ## Modules
//!
//! - [`unit`] — unit symbols and their lengths
//! - [`parser`] — literal → milliseconds
//! - [`timeframe`] — the `Timeframe` value and its alignment math
//! - [`registry`] — one shared instance per literal, plus presets
//! - [`batch`] — split a range into fixed-size contiguous batches
//! - [`dates`] — UTC midnight, days of month, legible formatting
//! - [`config`] — JSON settings
//! - [`clock`] — wall-clock access
//! - [`error`] — Error types

pub mod batch;
pub mod clock;
pub mod config;
pub mod dates;
pub mod error;
pub mod parser;
pub mod registry;
pub mod timeframe;
pub mod unit;

pub use batch::{plan_batches, Batch, BatchPlan, DEFAULT_BATCH_SIZE};
pub use config::Settings;
pub use dates::{
    days_of_current_month, days_of_month_through, format_legible, format_legible_in,
    format_legible_now, truncate_to_utc_midnight, DateInput, Legible, MonthDay,
};
pub use error::TimeframeError;
pub use parser::parse_duration_ms;
pub use registry::{Preset, TimeframeRegistry};
pub use timeframe::{congruent_start_key, elapsed_count, Timeframe, TimeframeSource};
pub use unit::TimeUnit;
