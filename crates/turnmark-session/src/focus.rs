//! Focus-mode sidebar state machine.
//!
//! While focus mode is on, focusing a prompt input collapses an expanded
//! sidebar. Blurring arms a short deadline; if focus has not returned to any
//! input by then, the sidebar expands again. A manual toggle always wins.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;
use turnmark_settings::SidebarSettings;

/// Sidebar visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SidebarState {
    /// Visible.
    #[default]
    Expanded,
    /// Collapsed by the user.
    CollapsedManual,
    /// Collapsed because a prompt input gained focus.
    CollapsedByFocus,
}

impl SidebarState {
    /// Whether the sidebar is hidden.
    pub fn is_collapsed(self) -> bool {
        self != Self::Expanded
    }
}

/// Drives [`SidebarState`] from focus events, toggles and the blur deadline.
#[derive(Debug)]
pub struct SidebarController {
    state: SidebarState,
    focus_mode: bool,
    blur_debounce: Duration,
    blur_deadline: Option<Instant>,
}

impl SidebarController {
    /// Start in the configured state.
    pub fn new(settings: &SidebarSettings, blur_debounce: Duration) -> Self {
        Self {
            state: if settings.start_collapsed {
                SidebarState::CollapsedManual
            } else {
                SidebarState::Expanded
            },
            focus_mode: settings.focus_mode,
            blur_debounce,
            blur_deadline: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SidebarState {
        self.state
    }

    /// Whether focus mode is enabled.
    pub fn focus_mode(&self) -> bool {
        self.focus_mode
    }

    /// Pending blur deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.blur_deadline
    }

    fn transition(&mut self, to: SidebarState) -> bool {
        if self.state == to {
            return false;
        }
        debug!(from = ?self.state, to = ?to, "sidebar transition");
        self.state = to;
        true
    }

    /// A prompt input gained focus. Returns whether the state changed.
    pub fn input_focused(&mut self) -> bool {
        self.blur_deadline = None;
        if self.focus_mode && self.state == SidebarState::Expanded {
            return self.transition(SidebarState::CollapsedByFocus);
        }
        false
    }

    /// Focus left an element. Arms the blur deadline if focus collapsed us.
    pub fn input_blurred(&mut self, now: Instant) {
        if self.state == SidebarState::CollapsedByFocus {
            self.blur_deadline = Some(now + self.blur_debounce);
        }
    }

    /// Fire the blur deadline if due.
    ///
    /// `focus_in_input` is whether focus currently sits in any prompt input.
    /// Returns whether the state changed.
    pub fn poll(&mut self, now: Instant, focus_in_input: bool) -> bool {
        match self.blur_deadline {
            Some(deadline) if deadline <= now => {
                self.blur_deadline = None;
                if !focus_in_input && self.state == SidebarState::CollapsedByFocus {
                    return self.transition(SidebarState::Expanded);
                }
                false
            }
            _ => false,
        }
    }

    /// Manual collapse/expand. A focus-driven collapse becomes expanded and
    /// loses its focus origin.
    pub fn toggle(&mut self) -> SidebarState {
        self.blur_deadline = None;
        let to = match self.state {
            SidebarState::Expanded => SidebarState::CollapsedManual,
            SidebarState::CollapsedManual | SidebarState::CollapsedByFocus => SidebarState::Expanded,
        };
        let _ = self.transition(to);
        self.state
    }

    /// Enable or disable focus mode. Disabling undoes a focus-driven collapse.
    pub fn set_focus_mode(&mut self, enabled: bool) -> bool {
        self.focus_mode = enabled;
        if !enabled && self.state == SidebarState::CollapsedByFocus {
            self.blur_deadline = None;
            return self.transition(SidebarState::Expanded);
        }
        false
    }
}
