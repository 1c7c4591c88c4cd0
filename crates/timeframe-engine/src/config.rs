//! Settings shared by the CLI and embedding applications.
//!
//! Loaded from JSON; every field has a default so an empty object is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::dates;
use crate::error::{Result, TimeframeError};
use crate::registry::{TimeframeRegistry, DEFAULT_LITERALS};
use crate::timeframe::Timeframe;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Maximum periods per planned batch.
    pub batch_size: usize,
    /// Literals resolved into the registry up front.
    pub preload: Vec<String>,
    /// IANA zone for legible formatting; the process' local zone when absent.
    pub timezone: Option<String>,
    /// Append the ISO rendering to legible output.
    pub include_iso: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            preload: DEFAULT_LITERALS.iter().map(|s| s.to_string()).collect(),
            timezone: None,
            include_iso: false,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document.
    ///
    /// # Errors
    /// Returns `TimeframeError::Config` for malformed JSON or unknown fields,
    /// and whatever [`Settings::validate`] reports.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| TimeframeError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TimeframeError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// # Errors
    /// - `Config` when `batch_size` is zero
    /// - `Format` for a preload literal that does not parse or is zero-length
    /// - `InvalidTimezone` for an unknown zone name
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TimeframeError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        for literal in &self.preload {
            Timeframe::new(literal)?;
        }
        if let Some(tz) = &self.timezone {
            dates::parse_timezone(tz)?;
        }
        Ok(())
    }

    /// A registry warmed with [`Settings::preload`].
    pub fn build_registry(&self) -> Result<TimeframeRegistry> {
        TimeframeRegistry::with_literals(&self.preload)
    }
}
