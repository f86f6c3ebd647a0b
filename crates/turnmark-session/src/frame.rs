//! Render-boundary snapshot.

use serde::Serialize;

use crate::focus::SidebarState;
use crate::layout::LayoutStatus;
use crate::projection::NavigationEntry;

/// Everything the host shell needs to draw the sidebar after a cycle.
///
/// Entries are activated through
/// [`PageSession::activate`](crate::PageSession::activate) by display ordinal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    /// Active provider name; `None` while dormant.
    pub provider: Option<&'static str>,
    /// Every entry, hidden ones flagged `visible: false`.
    pub entries: Vec<NavigationEntry>,
    /// Sidebar visibility.
    pub sidebar: SidebarState,
    /// Current search query.
    pub filter: String,
    /// Display ordinal of the highlighted entry.
    pub cursor: Option<usize>,
    /// Layout adjustment status.
    pub layout: LayoutStatus,
    /// Number of cycles run so far.
    pub cycle: u64,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self {
            provider: None,
            entries: Vec::new(),
            sidebar: SidebarState::default(),
            filter: String::new(),
            cursor: None,
            layout: LayoutStatus::Inactive,
            cycle: 0,
        }
    }
}

impl RenderFrame {
    /// Entries passing the search filter.
    pub fn visible_entries(&self) -> impl Iterator<Item = &NavigationEntry> {
        self.entries.iter().filter(|e| e.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_frame_serializes_camel_case() {
        let json = serde_json::to_value(RenderFrame::default()).unwrap();
        assert_eq!(json["provider"], serde_json::Value::Null);
        assert_eq!(json["sidebar"], "expanded");
        assert_eq!(json["layout"]["status"], "inactive");
        assert_eq!(json["cycle"], 0);
        assert!(json["entries"].as_array().unwrap().is_empty());
    }

    #[test]
    fn applied_layout_fields_are_camel_case() {
        let frame = RenderFrame {
            layout: LayoutStatus::Applied {
                margin: 272,
                top_offset: 48,
            },
            ..RenderFrame::default()
        };
        let json = serde_json::to_value(frame).unwrap();
        assert_eq!(json["layout"]["status"], "applied");
        assert_eq!(json["layout"]["topOffset"], 48);
    }
}
