//! Navigation projection.
//!
//! Entries are rebuilt wholesale from the store every cycle; nothing is
//! patched incrementally. The search filter hides entries without removing
//! them, and the keyboard cursor walks only the visible subset.

use serde::Serialize;
use turnmark_core::ids::TurnId;
use turnmark_core::text::{contains_folded, summarize};
use turnmark_dom::HostTree;
use turnmark_settings::NavigationSettings;

use crate::record::{RenderTarget, TurnSnapshot};
use crate::store::SessionStore;

/// One row of the navigation list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    /// 1-based position among all entries of this rebuild.
    pub display_ordinal: usize,
    /// Creation ordinal of the backing record.
    pub ordinal: u64,
    /// Logical id of the backing record.
    pub turn_id: TurnId,
    /// First words of the text.
    pub summary: String,
    /// Complete turn text.
    pub full_text: String,
    /// Whether the turn is currently rendered nowhere in the tree.
    pub is_placeholder: bool,
    /// Whether the entry passes the current search filter.
    pub visible: bool,
    /// Where activation scrolls to.
    #[serde(skip)]
    pub target: RenderTarget,
}

impl NavigationEntry {
    fn matches(&self, needle_lower: &str) -> bool {
        contains_folded(&self.summary, needle_lower) || contains_folded(&self.full_text, needle_lower)
    }
}

/// Keys the navigation list reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    /// Move the highlight up.
    Up,
    /// Move the highlight down.
    Down,
    /// Activate the highlighted entry.
    Enter,
    /// Clear the highlight.
    Escape,
}

/// Where keyboard focus was when a key was pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusContext {
    /// Not inside any text control.
    #[default]
    Elsewhere,
    /// In the sidebar's search field.
    SearchField,
    /// In some other text-input-like control.
    TextInput,
}

/// State a key press is interpreted against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyContext {
    /// Whether the sidebar is collapsed.
    pub sidebar_collapsed: bool,
    /// Focus location.
    pub focus: FocusContext,
}

/// What a key press did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was not for the navigation list.
    Ignored,
    /// The highlight moved to this entry.
    Moved {
        /// Display ordinal of the highlighted entry.
        display_ordinal: usize,
    },
    /// The highlighted entry should be activated.
    Activate {
        /// Display ordinal of the entry.
        display_ordinal: usize,
    },
    /// The highlight was cleared.
    Cleared {
        /// Whether the search filter was cleared as well.
        filter_cleared: bool,
    },
}

/// The filterable, keyboard-navigable list of turns.
#[derive(Debug)]
pub struct NavigationProjection {
    entries: Vec<NavigationEntry>,
    filter: String,
    /// Position within the visible subset.
    cursor: Option<usize>,
    summary_words: usize,
    empty_summary: String,
}

impl NavigationProjection {
    /// An empty projection.
    pub fn new(settings: &NavigationSettings) -> Self {
        Self {
            entries: Vec::new(),
            filter: String::new(),
            cursor: None,
            summary_words: settings.summary_words,
            empty_summary: settings.empty_summary.clone(),
        }
    }

    fn summary(&self, text: &str) -> String {
        if text.trim().is_empty() {
            self.empty_summary.clone()
        } else {
            summarize(text, self.summary_words)
        }
    }

    /// Discard every entry and build one per record, in ordinal order.
    pub fn rebuild<T: HostTree + ?Sized>(
        &mut self,
        store: &SessionStore,
        tree: &T,
        snapshot: &TurnSnapshot,
    ) {
        let needle = self.filter.to_lowercase();
        let entries: Vec<NavigationEntry> = store
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let target = store.resolve_target(tree, snapshot, record);
                let mut entry = NavigationEntry {
                    display_ordinal: index + 1,
                    ordinal: record.ordinal(),
                    turn_id: record.id().clone(),
                    summary: self.summary(record.text()),
                    full_text: record.text().to_owned(),
                    is_placeholder: target.is_placeholder(),
                    visible: true,
                    target,
                };
                entry.visible = entry.matches(&needle);
                entry
            })
            .collect();
        self.entries = entries;
        if self.cursor.is_some_and(|c| c >= self.visible_count()) {
            self.cursor = None;
        }
    }

    /// Drop every entry and the cursor. The filter is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Set the search query. Returns whether it changed.
    ///
    /// Any change invalidates the cursor.
    pub fn set_filter(&mut self, query: &str) -> bool {
        if self.filter == query {
            return false;
        }
        query.clone_into(&mut self.filter);
        let needle = self.filter.to_lowercase();
        for entry in &mut self.entries {
            entry.visible = entry.matches(&needle);
        }
        self.cursor = None;
        true
    }

    /// Current search query.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Every entry, hidden ones included.
    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    /// Entries passing the filter, in order.
    pub fn visible_entries(&self) -> impl Iterator<Item = &NavigationEntry> {
        self.entries.iter().filter(|e| e.visible)
    }

    fn visible_count(&self) -> usize {
        self.visible_entries().count()
    }

    /// Entry by display ordinal.
    pub fn entry(&self, display_ordinal: usize) -> Option<&NavigationEntry> {
        display_ordinal
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
    }

    /// The highlighted entry.
    pub fn highlighted(&self) -> Option<&NavigationEntry> {
        self.visible_entries().nth(self.cursor?)
    }

    /// Display ordinal of the highlighted entry.
    pub fn cursor(&self) -> Option<usize> {
        self.highlighted().map(|e| e.display_ordinal)
    }

    /// Interpret a key press.
    pub fn handle_key(&mut self, key: NavKey, ctx: KeyContext) -> KeyOutcome {
        if key == NavKey::Escape && ctx.focus == FocusContext::SearchField {
            let filter_cleared = self.set_filter("");
            self.cursor = None;
            return KeyOutcome::Cleared { filter_cleared };
        }
        if ctx.sidebar_collapsed || ctx.focus != FocusContext::Elsewhere {
            return KeyOutcome::Ignored;
        }

        let count = self.visible_count();
        match key {
            NavKey::Up | NavKey::Down if count > 0 => {
                let next = match (key, self.cursor) {
                    (NavKey::Down, None) => 0,
                    (NavKey::Down, Some(c)) => (c + 1) % count,
                    (_, None) => count - 1,
                    (_, Some(c)) => (c + count - 1) % count,
                };
                self.cursor = Some(next);
                self.cursor()
                    .map_or(KeyOutcome::Ignored, |display_ordinal| KeyOutcome::Moved { display_ordinal })
            }
            NavKey::Enter => self
                .cursor()
                .map_or(KeyOutcome::Ignored, |display_ordinal| KeyOutcome::Activate { display_ordinal }),
            NavKey::Escape if self.cursor.is_some() => {
                self.cursor = None;
                KeyOutcome::Cleared {
                    filter_cleared: false,
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
