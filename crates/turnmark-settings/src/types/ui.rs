//! Sidebar, navigation list, and logging settings.

use serde::{Deserialize, Serialize};
use turnmark_core::constants::{DEFAULT_SUMMARY_WORDS, EMPTY_SUMMARY};

/// Sidebar behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SidebarSettings {
    /// Collapse the sidebar automatically while a host input has focus.
    pub focus_mode: bool,
    /// Start each page view with the sidebar manually collapsed.
    pub start_collapsed: bool,
}

impl Default for SidebarSettings {
    fn default() -> Self {
        Self {
            focus_mode: true,
            start_collapsed: false,
        }
    }
}

/// Navigation list rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationSettings {
    /// Words kept in an entry summary.
    pub summary_words: usize,
    /// Summary shown for blank turns.
    pub empty_summary: String,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            summary_words: DEFAULT_SUMMARY_WORDS,
            empty_summary: EMPTY_SUMMARY.to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive passed to the tracing subscriber.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_defaults() {
        let s = SidebarSettings::default();
        assert!(s.focus_mode);
        assert!(!s.start_collapsed);
    }

    #[test]
    fn navigation_defaults() {
        let n = NavigationSettings::default();
        assert_eq!(n.summary_words, 10);
        assert_eq!(n.empty_summary, "No content");
    }

    #[test]
    fn sidebar_from_partial_json() {
        let s: SidebarSettings = serde_json::from_str(r#"{"focusMode": false}"#).unwrap();
        assert!(!s.focus_mode);
        assert!(!s.start_collapsed);
    }
}
