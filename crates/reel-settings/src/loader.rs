//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ReelSettings::default()`]
//! 2. If `~/.reel/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ReelSettings;

/// Resolve the path to the settings file (`~/.reel/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".reel").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ReelSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ReelSettings> {
    let defaults = serde_json::to_value(ReelSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ReelSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Invalid values are silently ignored (fall back to file/default)
pub fn apply_env_overrides(settings: &mut ReelSettings) {
    // ── Render settings ─────────────────────────────────────────────
    if let Some(v) = read_env_u64("REEL_POLL_INTERVAL_SECS", 1, 3600) {
        settings.render.poll_interval_secs = v;
    }
    if let Some(v) = read_env_u32("REEL_MAX_POLLS", 1, 100_000) {
        settings.render.max_polls = Some(v);
    }
    if let Some(v) = read_env_string("REEL_OUTPUT_URI_PREFIX") {
        settings.render.output_uri_prefix = v;
    }
    if let Some(v) = read_env_string("REEL_STORAGE_SCHEME") {
        settings.render.storage_scheme = v;
    }

    // ── Agent settings ──────────────────────────────────────────────
    if let Some(v) = read_env_u32("REEL_MAX_DELEGATION_DEPTH", 1, 64) {
        settings.agent.max_delegation_depth = v;
    }

    // ── Logging settings ────────────────────────────────────────────
    if let Some(v) = read_env_string("REEL_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Env parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a u64 from a string, requiring it to be within `[min, max]`.
fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    val.parse::<u64>().ok().filter(|v| (min..=max).contains(v))
}

/// Parse a u32 from a string, requiring it to be within `[min, max]`.
fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    val.parse::<u32>().ok().filter(|v| (min..=max).contains(v))
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
