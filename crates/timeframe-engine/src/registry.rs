//! Timeframe registry -- hands out one shared instance per distinct literal.
//!
//! The registry is an explicit context object rather than a process global.
//! Within one clear-to-clear epoch, resolving the same literal twice returns the
//! same `Arc`, so callers may compare with [`Arc::ptr_eq`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::timeframe::{Timeframe, TimeframeSource};

/// Literals resolved by [`TimeframeRegistry::with_defaults`].
pub const DEFAULT_LITERALS: [&str; 17] = [
    "1m", "3m", "5m", "15m", "30m", "45m", "1h", "2h", "3h", "4h", "8h", "12h", "16h", "20h",
    "24h", "2d", "2D",
];

/// Commonly used timeframes with known durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    M1,
    M2,
    M3,
    M5,
    M15,
    H1,
    D1,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::M1,
        Preset::M2,
        Preset::M3,
        Preset::M5,
        Preset::M15,
        Preset::H1,
        Preset::D1,
    ];

    pub fn literal(self) -> &'static str {
        match self {
            Preset::M1 => "1m",
            Preset::M2 => "2m",
            Preset::M3 => "3m",
            Preset::M5 => "5m",
            Preset::M15 => "15m",
            Preset::H1 => "1h",
            Preset::D1 => "1D",
        }
    }

    pub fn duration_ms(self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Preset::M1 => MINUTE,
            Preset::M2 => 2 * MINUTE,
            Preset::M3 => 3 * MINUTE,
            Preset::M5 => 5 * MINUTE,
            Preset::M15 => 15 * MINUTE,
            Preset::H1 => 60 * MINUTE,
            Preset::D1 => 24 * 60 * MINUTE,
        }
    }
}

/// Cache of literal → shared [`Timeframe`].
#[derive(Debug, Default)]
pub struct TimeframeRegistry {
    entries: RwLock<HashMap<String, Arc<Timeframe>>>,
}

impl TimeframeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry warmed with [`DEFAULT_LITERALS`].
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        for literal in DEFAULT_LITERALS {
            // Every default literal is well-formed; a failure here is a table bug.
            if let Err(e) = registry.resolve_literal(literal) {
                tracing::error!(literal, error = %e, "default timeframe rejected");
            }
        }
        registry
    }

    /// A registry warmed with caller-provided literals.
    ///
    /// # Errors
    /// Returns the first `TimeframeError::Format` among the literals.
    pub fn with_literals<I, S>(literals: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registry = Self::new();
        for literal in literals {
            registry.resolve_literal(literal.as_ref())?;
        }
        tracing::debug!(entries = registry.len(), "timeframe registry preloaded");
        Ok(registry)
    }

    /// Resolve a literal or existing instance to the registry's shared instance.
    ///
    /// - Literal: returns the cached instance, constructing and caching it on a miss.
    /// - Existing: caches it under its own literal if that slot is empty, and
    ///   returns the argument unchanged either way.
    ///
    /// # Errors
    /// Returns `TimeframeError::Format` for a literal that does not parse.
    pub fn resolve(&self, source: impl Into<TimeframeSource>) -> Result<Arc<Timeframe>> {
        match source.into() {
            TimeframeSource::Literal(literal) => self.resolve_literal(&literal),
            TimeframeSource::Existing(timeframe) => {
                let mut entries = self.write();
                entries
                    .entry(timeframe.as_literal().to_string())
                    .or_insert_with(|| {
                        tracing::debug!(literal = timeframe.as_literal(), "adopted existing timeframe");
                        Arc::clone(&timeframe)
                    });
                Ok(timeframe)
            }
        }
    }

    pub fn resolve_literal(&self, literal: &str) -> Result<Arc<Timeframe>> {
        if let Some(hit) = self.get(literal) {
            return Ok(hit);
        }

        // Parse outside the lock; only the publish step is exclusive.
        let fresh = Arc::new(Timeframe::new(literal)?);

        let mut entries = self.write();
        let shared = entries.entry(literal.to_string()).or_insert_with(|| {
            tracing::debug!(
                literal,
                duration_ms = fresh.as_milliseconds(),
                "cached new timeframe"
            );
            Arc::clone(&fresh)
        });
        Ok(Arc::clone(shared))
    }

    /// Resolve a loosely-typed JSON value (see [`TimeframeSource::from_json`]).
    ///
    /// # Errors
    /// Returns `TimeframeError::UnsupportedSource` for JSON that is neither a
    /// literal nor a serialized timeframe, or `Format` for a bad literal.
    pub fn resolve_json(&self, value: &serde_json::Value) -> Result<Arc<Timeframe>> {
        self.resolve(TimeframeSource::from_json(value)?)
    }

    /// The shared instance for a preset, resolved through this registry.
    pub fn preset(&self, preset: Preset) -> Arc<Timeframe> {
        if let Some(hit) = self.get(preset.literal()) {
            return hit;
        }
        let mut entries = self.write();
        let shared = entries
            .entry(preset.literal().to_string())
            .or_insert_with(|| {
                Arc::new(Timeframe::from_trusted_parts(
                    preset.literal(),
                    preset.duration_ms(),
                ))
            });
        Arc::clone(shared)
    }

    /// Cached instance for `literal`, if any. Never constructs.
    pub fn get(&self, literal: &str) -> Option<Arc<Timeframe>> {
        self.read().get(literal).cloned()
    }

    pub fn contains(&self, literal: &str) -> bool {
        self.read().contains_key(literal)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Cached literals, sorted by duration then literal.
    pub fn literals(&self) -> Vec<String> {
        let mut cached: Vec<Arc<Timeframe>> = self.read().values().cloned().collect();
        cached.sort();
        cached
            .iter()
            .map(|tf| tf.as_literal().to_string())
            .collect()
    }

    /// Drop every cached entry. Instances already handed out stay valid; the
    /// next resolve of the same literal builds a fresh one.
    pub fn clear(&self) {
        let mut entries = self.write();
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(dropped, "timeframe registry cleared");
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Timeframe>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Timeframe>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
