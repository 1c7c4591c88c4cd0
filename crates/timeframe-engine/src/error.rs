//! Error types for timeframe-engine operations.

use thiserror::Error;

/// Placeholder rendered in messages when the offending input was empty.
pub(crate) const EMPTY_INPUT: &str = "∅";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeframeError {
    /// The literal does not match `<digits><unit>` or cannot form a usable duration.
    #[error("Timeframe format not viable: input ⟦ {input} ⟧ {reason}")]
    Format { input: String, reason: String },

    /// A date-constructible value did not yield a valid instant.
    #[error("Input ⟦ {0} ⟧ is not a valid date")]
    InvalidDate(String),

    /// Construction was attempted from something that is neither a literal nor a timeframe.
    #[error("Unsupported timeframe source: {0}")]
    UnsupportedSource(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TimeframeError {
    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        let input = if input.is_empty() {
            EMPTY_INPUT.to_string()
        } else {
            input.to_string()
        };
        TimeframeError::Format {
            input,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_date(input: &str) -> Self {
        if input.is_empty() {
            TimeframeError::InvalidDate(EMPTY_INPUT.to_string())
        } else {
            TimeframeError::InvalidDate(input.to_string())
        }
    }

    /// True for the malformed-input class: bad literals and bad date values.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            TimeframeError::Format { .. } | TimeframeError::InvalidDate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TimeframeError>;
