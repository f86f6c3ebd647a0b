//! Layered settings loading.
//!
//! Compiled defaults are serialized to JSON, the user's file is overlaid on
//! top, the result is deserialized back, then `TURNMARK_*` variables win over
//! both and [`TurnmarkSettings::validate`] repairs out-of-range values.
//!
//! Overlay rules: objects merge per key, `null` leaves the base untouched,
//! anything else replaces the base value wholesale.

use std::io::ErrorKind;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::TurnmarkSettings;

/// `$TURNMARK_HOME/settings.json`, falling back to `~/.turnmark/settings.json`.
pub fn settings_path() -> PathBuf {
    let dir = match std::env::var_os("TURNMARK_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home = std::env::var_os("HOME").map_or_else(std::env::temp_dir, PathBuf::from);
            home.join(".turnmark")
        }
    };
    dir.join("settings.json")
}

/// Load from [`settings_path`].
pub fn load_settings() -> Result<TurnmarkSettings> {
    load_settings_from_path(&settings_path())
}

/// Load from `path`. A missing file means defaults; an unreadable or
/// malformed one is an error.
pub fn load_settings_from_path(path: &Path) -> Result<TurnmarkSettings> {
    let mut layered = serde_json::to_value(TurnmarkSettings::default()).map_err(SettingsError::Defaults)?;

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_owned(),
                source,
            })?;
            overlay(&mut layered, user);
            debug!(path = %path.display(), "applied settings file");
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file");
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_owned(),
                source,
            });
        }
    }

    let mut settings: TurnmarkSettings = serde_json::from_value(layered).map_err(|source| SettingsError::Parse {
        path: path.to_owned(),
        source,
    })?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

/// Overlay `patch` onto `base` in place.
pub fn overlay(base: &mut Value, patch: Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None if value.is_null() => {}
                    None => {
                        let _ = base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Apply `TURNMARK_*` overrides. Unparseable values are warned about and skipped.
pub fn apply_env_overrides(settings: &mut TurnmarkSettings) {
    let scheduler = &mut settings.scheduler;
    override_with(&mut scheduler.mutation_debounce_ms, "TURNMARK_MUTATION_DEBOUNCE_MS", |v| {
        parse_in_range(v, 1..=60_000)
    });
    override_with(&mut scheduler.submit_delay_ms, "TURNMARK_SUBMIT_DELAY_MS", |v| {
        parse_in_range(v, 1..=60_000)
    });
    override_with(&mut scheduler.blur_debounce_ms, "TURNMARK_BLUR_DEBOUNCE_MS", |v| {
        parse_in_range(v, 1..=60_000)
    });
    override_with(&mut settings.sidebar.focus_mode, "TURNMARK_FOCUS_MODE", parse_flag);
    override_with(&mut settings.navigation.summary_words, "TURNMARK_SUMMARY_WORDS", |v| {
        parse_in_range(v, 1..=100)
    });
    override_with(&mut settings.logging.level, "TURNMARK_LOG_LEVEL", |v| Some(v.to_owned()));
}

fn override_with<T>(slot: &mut T, var: &str, parse: impl FnOnce(&str) -> Option<T>) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    if raw.is_empty() {
        return;
    }
    match parse(&raw) {
        Some(value) => *slot = value,
        None => warn!(var, value = %raw, "ignoring invalid environment override"),
    }
}

/// `true`/`yes`/`on`/`1` or `false`/`no`/`off`/`0`, any case.
pub fn parse_flag(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    ["true", "yes", "on", "1"]
        .iter()
        .any(|t| raw.eq_ignore_ascii_case(t))
        .then_some(true)
        .or_else(|| {
            ["false", "no", "off", "0"]
                .iter()
                .any(|f| raw.eq_ignore_ascii_case(f))
                .then_some(false)
        })
}

/// Parse a number and accept it only inside `range`.
pub fn parse_in_range<T>(raw: &str, range: RangeInclusive<T>) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    raw.trim().parse().ok().filter(|n| range.contains(n))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
