//! Host events fed into a session, and what they produced.

use turnmark_dom::ElementHandle;

use crate::projection::{KeyOutcome, NavKey};

/// Keys the session cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Enter / Return.
    Enter,
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Escape.
    Escape,
    /// Anything else.
    Other,
}

impl Key {
    /// The navigation key this maps to, if any.
    pub fn nav(self) -> Option<NavKey> {
        match self {
            Self::Enter => Some(NavKey::Enter),
            Self::ArrowUp => Some(NavKey::Up),
            Self::ArrowDown => Some(NavKey::Down),
            Self::Escape => Some(NavKey::Escape),
            Self::Other => None,
        }
    }
}

/// Where a key press originated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyOrigin {
    /// The host page.
    #[default]
    Page,
    /// The sidebar's search field.
    SearchField,
}

/// A key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Event target on the page.
    pub target: Option<ElementHandle>,
    /// Shift held: Enter inserts a newline instead of submitting.
    pub shift: bool,
    /// IME composition in progress.
    pub composing: bool,
    /// Page or sidebar search field.
    pub origin: KeyOrigin,
}

impl KeyEvent {
    /// A plain key press on the page.
    pub fn page(key: Key, target: Option<ElementHandle>) -> Self {
        Self {
            key,
            target,
            shift: false,
            composing: false,
            origin: KeyOrigin::Page,
        }
    }

    /// A key press in the sidebar's search field.
    pub fn search_field(key: Key) -> Self {
        Self {
            key,
            target: None,
            shift: false,
            composing: false,
            origin: KeyOrigin::SearchField,
        }
    }

    /// Whether this press would send the prompt if it lands in an input.
    pub fn is_plain_enter(&self) -> bool {
        self.key == Key::Enter && !self.shift && !self.composing
    }
}

/// Everything the host environment reports to a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Global key press.
    KeyDown(KeyEvent),
    /// Pointer click on a page element.
    Click {
        /// Clicked element.
        target: ElementHandle,
    },
    /// An element gained focus.
    FocusIn {
        /// Focused element.
        target: ElementHandle,
    },
    /// An element lost focus.
    FocusOut {
        /// Blurred element.
        target: ElementHandle,
    },
    /// The page address changed (history push/replace, back/forward).
    Navigated,
    /// The page was backgrounded or foregrounded.
    VisibilityChanged {
        /// Whether the page is now visible.
        visible: bool,
    },
    /// The user clicked the sidebar's collapse/expand control.
    ToggleSidebar,
    /// Focus mode switched on or off.
    SetFocusMode(bool),
    /// The search query changed.
    Search(String),
    /// A navigation entry was clicked.
    Activate(usize),
}

/// Result of activating a navigation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Scroll requested for the entry's element.
    Scrolled {
        /// Display ordinal of the entry.
        display_ordinal: usize,
        /// Element scrolled to.
        element: ElementHandle,
    },
    /// The entry is a placeholder; nothing to scroll to.
    Placeholder {
        /// Display ordinal of the entry.
        display_ordinal: usize,
    },
    /// The entry's element left the tree since the last cycle.
    Unavailable {
        /// Display ordinal of the entry.
        display_ordinal: usize,
    },
    /// No entry has that display ordinal.
    NotFound,
}

/// What handling one host event did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// A reconciliation cycle ran synchronously.
    pub cycle_ran: bool,
    /// How the navigation list interpreted a key press.
    pub key: Option<KeyOutcome>,
    /// Result of an entry activation.
    pub activation: Option<ActivationOutcome>,
}
