//! Tests for the timeframe registry: reference stability, adoption of existing
//! instances, presets and clearing.

use std::sync::Arc;
use std::thread;

use timeframe_engine::registry::DEFAULT_LITERALS;
use timeframe_engine::{Preset, Timeframe, TimeframeError, TimeframeRegistry};

// ── Resolve by literal ──────────────────────────────────────────────────────

#[test]
fn resolve_returns_known_durations() {
    let registry = TimeframeRegistry::new();
    assert_eq!(registry.resolve("1m").unwrap().as_milliseconds(), 60_000);
    assert_eq!(registry.resolve("3m").unwrap().as_milliseconds(), 180_000);
    assert_eq!(registry.resolve("1h").unwrap().as_milliseconds(), 3_600_000);
    assert_eq!(registry.resolve("1D").unwrap().as_milliseconds(), 86_400_000);
}

#[test]
fn resolving_same_literal_twice_yields_same_instance() {
    let registry = TimeframeRegistry::new();
    let a = registry.resolve("15m").unwrap();
    let b = registry.resolve(String::from("15m")).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 1);
}

#[test]
fn distinct_literals_get_distinct_entries() {
    let registry = TimeframeRegistry::new();
    let lower = registry.resolve("2d").unwrap();
    let upper = registry.resolve("2D").unwrap();
    assert!(!Arc::ptr_eq(&lower, &upper));
    assert_eq!(lower.as_milliseconds(), upper.as_milliseconds());
    assert_eq!(registry.len(), 2);
}

#[test]
fn invalid_literal_is_not_cached() {
    let registry = TimeframeRegistry::new();
    let err = registry.resolve("5x").unwrap_err();
    assert!(err.is_format_error());
    assert!(registry.is_empty());
}

// ── Resolve existing instances ──────────────────────────────────────────────

#[test]
fn existing_instance_is_adopted_when_slot_empty() {
    let registry = TimeframeRegistry::new();
    let outside = Arc::new(Timeframe::new("4h").unwrap());

    let returned = registry.resolve(Arc::clone(&outside)).unwrap();
    assert!(Arc::ptr_eq(&returned, &outside));

    let cached = registry.resolve("4h").unwrap();
    assert!(Arc::ptr_eq(&cached, &outside));
}

#[test]
fn existing_instance_does_not_replace_cached_entry() {
    let registry = TimeframeRegistry::new();
    let cached = registry.resolve("4h").unwrap();
    let outside = Arc::new(Timeframe::new("4h").unwrap());

    let returned = registry.resolve(&outside).unwrap();
    // The argument comes back unchanged...
    assert!(Arc::ptr_eq(&returned, &outside));
    // ...but the registry keeps its original entry.
    assert!(Arc::ptr_eq(&registry.get("4h").unwrap(), &cached));
}

#[test]
fn json_number_source_is_unsupported() {
    let registry = TimeframeRegistry::new();
    let err = registry.resolve_json(&serde_json::json!(60_000)).unwrap_err();
    assert!(matches!(err, TimeframeError::UnsupportedSource(_)));
}

#[test]
fn json_literal_source_resolves_through_cache() {
    let registry = TimeframeRegistry::new();
    let a = registry.resolve_json(&serde_json::json!("1h")).unwrap();
    let b = registry.resolve("1h").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

// ── Clear ───────────────────────────────────────────────────────────────────

#[test]
fn clear_drops_entries_but_not_handed_out_instances() {
    let registry = TimeframeRegistry::new();
    let before = registry.resolve("1m").unwrap();

    registry.clear();
    assert!(registry.is_empty());
    assert!(!registry.contains("1m"));

    // The old handle is still usable.
    assert_eq!(before.as_milliseconds(), 60_000);

    let after = registry.resolve("1m").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);
}

// ── Presets and defaults ────────────────────────────────────────────────────

#[test]
fn presets_match_parsed_durations() {
    for preset in Preset::ALL {
        let parsed = Timeframe::new(preset.literal()).unwrap();
        assert_eq!(parsed.as_milliseconds(), preset.duration_ms(), "{:?}", preset);
    }
}

#[test]
fn preset_shares_instance_with_literal_resolve() {
    let registry = TimeframeRegistry::new();
    let by_preset = registry.preset(Preset::M3);
    let by_literal = registry.resolve("3m").unwrap();
    assert!(Arc::ptr_eq(&by_preset, &by_literal));
    assert_eq!(by_preset.as_milliseconds(), 180_000);
}

#[test]
fn with_defaults_preloads_warm_up_list() {
    let registry = TimeframeRegistry::with_defaults();
    assert_eq!(registry.len(), DEFAULT_LITERALS.len());
    for literal in DEFAULT_LITERALS {
        assert!(registry.contains(literal), "missing {}", literal);
    }
}

#[test]
fn with_literals_fails_on_first_bad_literal() {
    let result = TimeframeRegistry::with_literals(["1m", "nope", "1h"]);
    assert!(result.is_err());
}

#[test]
fn literals_are_sorted_by_duration() {
    let registry = TimeframeRegistry::with_literals(["1D", "1m", "4h"]).unwrap();
    assert_eq!(registry.literals(), vec!["1m", "4h", "1D"]);
}

// ── Concurrency ─────────────────────────────────────────────────────────────

#[test]
fn concurrent_resolvers_observe_single_instance() {
    let registry = Arc::new(TimeframeRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.resolve("5m").unwrap())
        })
        .collect();

    let resolved: Vec<Arc<Timeframe>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for tf in &resolved[1..] {
        assert!(Arc::ptr_eq(&resolved[0], tf));
    }
    assert_eq!(registry.len(), 1);
}
