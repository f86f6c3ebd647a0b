//! Capability descriptors.
//!
//! A descriptor is the whole of what turnmark knows about one host: which
//! addresses it serves and the selector patterns that find turns, inputs,
//! submit controls and the scroll container. Descriptors are compiled-in
//! `'static` data and never change for the lifetime of a page view.

use serde::Serialize;

/// One structured way of reading a turn's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "selector")]
pub enum TextPath {
    /// Rendered text of the first descendant matching the selector.
    First(&'static str),
    /// Rendered text of every matching descendant, joined by the separator.
    Joined(&'static str, &'static str),
}

impl TextPath {
    /// The selector pattern this path reads from.
    pub fn selector(self) -> &'static str {
        match self {
            Self::First(selector) | Self::Joined(selector, _) => selector,
        }
    }
}

/// Where the host shell should place the sidebar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutHints {
    /// Sidebar width in pixels.
    pub sidebar_width: u32,
    /// Gap between the sidebar and the transcript, in pixels.
    pub gap: u32,
    /// Offset from the top of the viewport, in pixels.
    pub top_offset: u32,
}

impl LayoutHints {
    /// Margin the scroll container needs to clear the sidebar.
    pub fn margin(self) -> u32 {
        self.sidebar_width + self.gap
    }
}

/// Immutable per-host capability data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    /// Short host name, e.g. `chatgpt`.
    pub name: &'static str,
    /// Substrings of the page address this host serves.
    pub address_patterns: &'static [&'static str],
    /// User turn elements.
    pub turns: &'static [&'static str],
    /// Attribute carrying the host's own id for a turn, if it has one.
    pub turn_id_attr: Option<&'static str>,
    /// Structured text paths, tried in order before the full-text fallback.
    pub text_paths: &'static [TextPath],
    /// Subtrees whose text is never part of a turn (screen-reader labels, buttons).
    pub text_exclusions: &'static [&'static str],
    /// The scrollable transcript container.
    pub scroll_container: &'static [&'static str],
    /// Prompt input elements.
    pub inputs: &'static [&'static str],
    /// Controls that submit the prompt.
    pub submit_controls: &'static [&'static str],
    /// Sidebar placement.
    pub layout: LayoutHints,
}

impl CapabilityDescriptor {
    /// Whether this host serves `address`.
    pub fn serves(&self, address: &str) -> bool {
        self.address_patterns.iter().any(|p| address.contains(p))
    }
}
