//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and implement
//! [`Default`] with production values. `#[serde(default)]` lets a settings
//! file name only the fields it changes.

mod timing;
mod ui;

pub use timing::*;
pub use ui::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// Loaded from `~/.turnmark/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// ```json
/// {
///   "scheduler": { "mutationDebounceMs": 750 },
///   "sidebar": { "focusMode": false }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TurnmarkSettings {
    /// Settings schema version.
    pub version: String,
    /// Change-detection delays.
    pub scheduler: SchedulerSettings,
    /// Sidebar behavior.
    pub sidebar: SidebarSettings,
    /// Navigation list rendering.
    pub navigation: NavigationSettings,
    /// Layout anchor retry policy.
    pub layout: LayoutSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for TurnmarkSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            scheduler: SchedulerSettings::default(),
            sidebar: SidebarSettings::default(),
            navigation: NavigationSettings::default(),
            layout: LayoutSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl TurnmarkSettings {
    /// Correct values that would stall or break the session engine.
    ///
    /// Called automatically during loading. Out-of-range values are replaced
    /// with a warning rather than rejected.
    pub fn validate(&mut self) {
        fn at_least<T: PartialOrd + Copy + std::fmt::Display>(val: &mut T, min: T, name: &str) {
            if *val < min {
                tracing::warn!("{name} below minimum ({val}), raised to {min}");
                *val = min;
            }
        }

        at_least(&mut self.scheduler.mutation_debounce_ms, 1, "mutation_debounce_ms");
        at_least(&mut self.scheduler.submit_delay_ms, 1, "submit_delay_ms");
        at_least(&mut self.scheduler.blur_debounce_ms, 1, "blur_debounce_ms");
        at_least(&mut self.navigation.summary_words, 1, "summary_words");
        at_least(&mut self.layout.base_delay_ms, 1, "layout.base_delay_ms");

        if self.layout.max_delay_ms < self.layout.base_delay_ms {
            tracing::warn!(
                max = self.layout.max_delay_ms,
                base = self.layout.base_delay_ms,
                "layout.max_delay_ms below base delay, raised to base"
            );
            self.layout.max_delay_ms = self.layout.base_delay_ms;
        }

        if self.navigation.empty_summary.trim().is_empty() {
            tracing::warn!("navigation.empty_summary is blank, restoring default");
            self.navigation.empty_summary = NavigationSettings::default().empty_summary;
        }
    }
}
