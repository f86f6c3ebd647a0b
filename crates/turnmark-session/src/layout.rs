//! Layout adjustment.
//!
//! The host shell shifts the transcript's scroll container so the sidebar
//! does not cover it. Hosts often mount the container after the first
//! paint, so a missing container is retried with exponential backoff and
//! eventually abandoned. The sidebar works either way.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};
use turnmark_dom::{ElementHandle, HostTree};
use turnmark_providers::Provider;
use turnmark_settings::LayoutSettings;

/// Delay before retry number `attempt` (0-based): `base * 2^attempt`, capped.
pub fn backoff_delay_ms(attempt: u32, base_delay_ms: u64, max_delay_ms: u64) -> u64 {
    base_delay_ms
        .saturating_mul(1u64 << attempt.min(31))
        .min(max_delay_ms)
}

/// A located scroll container and the offsets to apply to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedLayout {
    /// The scroll container.
    pub container: ElementHandle,
    /// Margin clearing the sidebar: width plus gap.
    pub margin: u32,
    /// Sidebar offset from the top of the viewport.
    pub top_offset: u32,
}

/// Render-boundary view of the layout state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum LayoutStatus {
    /// No provider is active.
    Inactive,
    /// Still looking for the scroll container.
    Pending {
        /// Failed attempts so far.
        attempts: u32,
    },
    /// Offsets applied.
    #[serde(rename_all = "camelCase")]
    Applied {
        /// Margin in pixels.
        margin: u32,
        /// Top offset in pixels.
        top_offset: u32,
    },
    /// Gave up; the sidebar runs without layout adjustment.
    Abandoned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Inactive,
    Pending {
        attempts: u32,
        retry_at: Option<Instant>,
    },
    Applied(AppliedLayout),
    Abandoned,
}

/// Bounded-retry scroll container lookup.
#[derive(Debug)]
pub struct LayoutAdjuster {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    state: State,
}

impl LayoutAdjuster {
    /// Build from settings. Starts inactive.
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay_ms: settings.base_delay_ms,
            max_delay_ms: settings.max_delay_ms,
            state: State::Inactive,
        }
    }

    /// Forget any applied layout and stop retrying.
    pub fn deactivate(&mut self) {
        self.state = State::Inactive;
    }

    /// Start over for a newly active provider and try immediately.
    pub fn activate<T: HostTree + ?Sized>(&mut self, provider: &Provider, tree: &T, now: Instant) {
        self.state = State::Pending {
            attempts: 0,
            retry_at: None,
        };
        self.attempt(provider, tree, now);
    }

    /// The applied layout, if any.
    pub fn applied(&self) -> Option<AppliedLayout> {
        match self.state {
            State::Applied(layout) => Some(layout),
            _ => None,
        }
    }

    /// Current status.
    pub fn status(&self) -> LayoutStatus {
        match self.state {
            State::Inactive => LayoutStatus::Inactive,
            State::Pending { attempts, .. } => LayoutStatus::Pending { attempts },
            State::Applied(layout) => LayoutStatus::Applied {
                margin: layout.margin,
                top_offset: layout.top_offset,
            },
            State::Abandoned => LayoutStatus::Abandoned,
        }
    }

    /// Pending retry deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Pending { retry_at, .. } => retry_at,
            _ => None,
        }
    }

    /// Retry if the backoff deadline has passed. Returns whether the status changed.
    pub fn poll<T: HostTree + ?Sized>(&mut self, provider: &Provider, tree: &T, now: Instant) -> bool {
        match self.state {
            State::Pending {
                retry_at: Some(at), ..
            } if at <= now => {
                let before = self.status();
                self.attempt(provider, tree, now);
                self.status() != before
            }
            _ => false,
        }
    }

    /// Re-locate the container if the applied one left the tree.
    pub fn revalidate<T: HostTree + ?Sized>(&mut self, provider: &Provider, tree: &T, now: Instant) {
        if let State::Applied(layout) = self.state {
            if !tree.is_live(layout.container) {
                debug!(provider = provider.name(), "scroll container replaced; re-applying layout");
                self.activate(provider, tree, now);
            }
        }
    }

    fn attempt<T: HostTree + ?Sized>(&mut self, provider: &Provider, tree: &T, now: Instant) {
        let State::Pending { attempts, .. } = self.state else {
            return;
        };
        if let Some(container) = provider.locate_scroll_container(tree) {
            let hints = provider.layout_hints();
            self.state = State::Applied(AppliedLayout {
                container,
                margin: hints.margin(),
                top_offset: hints.top_offset,
            });
            debug!(provider = provider.name(), attempts, "layout applied");
            return;
        }

        let attempts = attempts + 1;
        if attempts >= self.max_attempts {
            warn!(
                provider = provider.name(),
                attempts, "scroll container not found; continuing without layout adjustment"
            );
            self.state = State::Abandoned;
            return;
        }
        let delay = backoff_delay_ms(attempts - 1, self.base_delay_ms, self.max_delay_ms);
        self.state = State::Pending {
            attempts,
            retry_at: Some(now + Duration::from_millis(delay)),
        };
    }
}
