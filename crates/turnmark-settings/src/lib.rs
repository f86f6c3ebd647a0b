//! # turnmark-settings
//!
//! Configuration management with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`TurnmarkSettings::default()`]
//! 2. **User file**: `~/.turnmark/settings.json` (overlaid on the defaults)
//! 3. **Environment variables**: `TURNMARK_*` overrides (highest priority)
//!
//! Host capability descriptors are not configurable here; they are
//! compiled-in data owned by `turnmark-providers`.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, overlay, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
static SETTINGS: OnceLock<TurnmarkSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.turnmark/settings.json` with env
/// var overrides. If loading fails, logs a warning and returns defaults.
pub fn get_settings() -> &'static TurnmarkSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            TurnmarkSettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns the settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: TurnmarkSettings) -> std::result::Result<(), TurnmarkSettings> {
    SETTINGS.set(settings)
}
