//! The page-view context object.
//!
//! [`PageSession`] owns everything that lives exactly as long as one page
//! view: the active provider, the record store, the navigation projection,
//! the sidebar state machine and the pending timers. It is synchronous and
//! clock-agnostic; callers pass `now` in, and [`SessionDriver`] supplies it
//! from the tokio clock.
//!
//! [`SessionDriver`]: crate::SessionDriver

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};
use turnmark_dom::{ElementHandle, HostPage, HostTree};
use turnmark_providers::{Provider, ProviderIndex, ProviderRegistry};
use turnmark_settings::TurnmarkSettings;

use crate::events::{ActivationOutcome, EventOutcome, HostEvent, KeyEvent, KeyOrigin};
use crate::focus::{SidebarController, SidebarState};
use crate::frame::RenderFrame;
use crate::layout::LayoutAdjuster;
use crate::projection::{FocusContext, KeyContext, KeyOutcome, NavigationProjection};
use crate::record::{RenderTarget, TurnSnapshot};
use crate::scheduler::CycleScheduler;
use crate::store::{RevalidationReport, SessionStore};

/// Summary of one reconciliation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// Cycle number, starting at 1.
    pub cycle: u64,
    /// Turn elements located this cycle.
    pub located: usize,
    /// Revalidation outcome.
    pub revalidation: RevalidationReport,
    /// Records created this cycle.
    pub ingested: usize,
    /// Entries after the rebuild.
    pub entries: usize,
}

/// Reconciliation state for one page view.
#[derive(Debug)]
pub struct PageSession {
    registry: ProviderRegistry,
    active: Option<ProviderIndex>,
    address: Option<String>,
    visible: bool,
    store: SessionStore,
    projection: NavigationProjection,
    sidebar: SidebarController,
    scheduler: CycleScheduler,
    layout: LayoutAdjuster,
    cycles: u64,
}

impl PageSession {
    /// A detached session. Call [`attach`](Self::attach) with the page.
    pub fn new(registry: ProviderRegistry, settings: &TurnmarkSettings) -> Self {
        Self {
            registry,
            active: None,
            address: None,
            visible: true,
            store: SessionStore::new(),
            projection: NavigationProjection::new(&settings.navigation),
            sidebar: SidebarController::new(
                &settings.sidebar,
                Duration::from_millis(settings.scheduler.blur_debounce_ms),
            ),
            scheduler: CycleScheduler::new(&settings.scheduler),
            layout: LayoutAdjuster::new(&settings.layout),
            cycles: 0,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    /// The active provider, if the page is supported.
    pub fn provider(&self) -> Option<&Provider> {
        self.active.and_then(|index| self.registry.get(index))
    }

    /// Whether no provider serves the current address.
    pub fn is_dormant(&self) -> bool {
        self.provider().is_none()
    }

    /// The address the session last resolved.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// The record store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The navigation projection.
    pub fn projection(&self) -> &NavigationProjection {
        &self.projection
    }

    /// Sidebar visibility.
    pub fn sidebar_state(&self) -> SidebarState {
        self.sidebar.state()
    }

    /// Cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Render-boundary snapshot.
    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            provider: self.provider().map(Provider::name),
            entries: self.projection.entries().to_vec(),
            sidebar: self.sidebar.state(),
            filter: self.projection.filter().to_owned(),
            cursor: self.projection.cursor(),
            layout: self.layout.status(),
            cycle: self.cycles,
        }
    }

    /// Earliest pending timer across scheduler, sidebar and layout.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.scheduler.next_deadline(),
            self.sidebar.next_deadline(),
            self.layout.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    /// Resolve the page's provider and run the first cycle.
    pub fn attach<P: HostPage + ?Sized>(&mut self, page: &mut P, now: Instant) -> EventOutcome {
        EventOutcome {
            cycle_ran: self.check_address(page, now),
            ..EventOutcome::default()
        }
    }

    /// Run one `revalidate → ingest → rebuild` cycle. `None` while dormant.
    pub fn run_cycle<P: HostTree + ?Sized>(&mut self, page: &mut P, now: Instant) -> Option<CycleReport> {
        let provider = self.active.and_then(|index| self.registry.get(index))?;
        let snapshot = TurnSnapshot::capture(provider, &*page);
        let revalidation = self.store.revalidate(page, &snapshot);
        let ingested = self.store.ingest(page, &snapshot);
        self.projection.rebuild(&self.store, &*page, &snapshot);
        self.layout.revalidate(provider, &*page, now);
        self.cycles += 1;

        let report = CycleReport {
            cycle: self.cycles,
            located: snapshot.len(),
            revalidation,
            ingested,
            entries: self.projection.entries().len(),
        };
        debug!(
            provider = provider.name(),
            cycle = report.cycle,
            located = report.located,
            ingested,
            missing = revalidation.missing,
            records = self.store.len(),
            "reconciliation cycle"
        );
        Some(report)
    }

    /// A subtree mutation was observed: restart the debounce.
    pub fn notify_mutation(&mut self, now: Instant) {
        if !self.is_dormant() {
            self.scheduler.notify_mutation(now);
        }
    }

    /// Fire every timer that is due. Returns whether anything changed.
    pub fn poll<P: HostTree + ?Sized>(&mut self, page: &mut P, now: Instant) -> bool {
        let focus_in_input = page
            .focused()
            .is_some_and(|focused| self.is_input(&*page, focused));
        let mut changed = self.sidebar.poll(now, focus_in_input);

        if let Some(provider) = self.active.and_then(|index| self.registry.get(index)) {
            changed |= self.layout.poll(provider, &*page, now);
        }
        if self.scheduler.due(now) {
            changed |= self.run_cycle(page, now).is_some();
        }
        changed
    }

    /// Re-resolve after an address change. Returns whether a cycle ran.
    fn check_address<P: HostPage + ?Sized>(&mut self, page: &mut P, now: Instant) -> bool {
        if self.address.as_deref() == Some(page.address()) {
            return false;
        }
        let address = page.address().to_owned();
        let resolved = self.registry.resolve(&address);
        self.address = Some(address);

        self.store.clear();
        self.projection.clear();
        self.scheduler.cancel_all();

        let Some(index) = resolved else {
            if self.active.take().is_some() {
                info!(address = self.address.as_deref(), "no provider for page; going dormant");
            } else {
                debug!(address = self.address.as_deref(), "unsupported page");
            }
            self.layout.deactivate();
            return false;
        };

        if self.active == Some(index) {
            debug!("address changed within provider; starting fresh");
        } else {
            self.active = Some(index);
            if let Some(provider) = self.registry.get(index) {
                info!(provider = provider.name(), "provider activated");
                self.layout.activate(provider, &*page, now);
            }
        }
        self.run_cycle(page, now).is_some()
    }

    // ── events ───────────────────────────────────────────────────────────

    fn is_input<T: HostTree + ?Sized>(&self, tree: &T, target: ElementHandle) -> bool {
        self.provider()
            .is_some_and(|provider| provider.is_input_target(tree, target))
    }

    fn key_context<T: HostTree + ?Sized>(&self, tree: &T, key: &KeyEvent) -> KeyContext {
        let focus = if key.origin == KeyOrigin::SearchField {
            FocusContext::SearchField
        } else if key
            .target
            .or_else(|| tree.focused())
            .is_some_and(|el| tree.is_text_input(el))
        {
            FocusContext::TextInput
        } else {
            FocusContext::Elsewhere
        };
        KeyContext {
            sidebar_collapsed: self.sidebar.state().is_collapsed(),
            focus,
        }
    }

    /// Apply one host event.
    pub fn handle_event<P: HostPage + ?Sized>(
        &mut self,
        page: &mut P,
        event: HostEvent,
        now: Instant,
    ) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        match event {
            HostEvent::KeyDown(key) => {
                if key.is_plain_enter() && key.target.is_some_and(|t| self.is_input(&*page, t)) {
                    debug!("prompt submitted from keyboard");
                    self.scheduler.schedule_submit(now);
                }
                if let Some(nav) = key.key.nav() {
                    let ctx = self.key_context(&*page, &key);
                    let result = self.projection.handle_key(nav, ctx);
                    if let KeyOutcome::Activate { display_ordinal } = result {
                        outcome.activation = Some(self.activate(page, display_ordinal));
                    }
                    outcome.key = Some(result);
                }
            }
            HostEvent::Click { target } => {
                if self
                    .provider()
                    .is_some_and(|provider| provider.is_submit_target(&*page, target))
                {
                    debug!("prompt submitted from control");
                    self.scheduler.schedule_submit(now);
                }
            }
            HostEvent::FocusIn { target } => {
                if self.is_input(&*page, target) {
                    let _ = self.sidebar.input_focused();
                }
            }
            HostEvent::FocusOut { .. } => self.sidebar.input_blurred(now),
            HostEvent::Navigated => outcome.cycle_ran = self.check_address(page, now),
            HostEvent::VisibilityChanged { visible } => {
                let regained = visible && !self.visible;
                self.visible = visible;
                if regained {
                    let navigated = self.check_address(page, now);
                    outcome.cycle_ran = navigated || self.run_cycle(page, now).is_some();
                }
            }
            HostEvent::ToggleSidebar => {
                let _ = self.sidebar.toggle();
            }
            HostEvent::SetFocusMode(enabled) => {
                let _ = self.sidebar.set_focus_mode(enabled);
            }
            HostEvent::Search(query) => {
                let _ = self.projection.set_filter(&query);
            }
            HostEvent::Activate(display_ordinal) => {
                outcome.activation = Some(self.activate(page, display_ordinal));
            }
        }
        outcome
    }

    /// Scroll to a navigation entry.
    ///
    /// Placeholders only log a notice: there is no element to scroll to.
    pub fn activate<T: HostTree + ?Sized>(&mut self, page: &mut T, display_ordinal: usize) -> ActivationOutcome {
        let Some(entry) = self.projection.entry(display_ordinal) else {
            return ActivationOutcome::NotFound;
        };
        match entry.target {
            RenderTarget::Live(element) => {
                if page.scroll_into_view(element) {
                    ActivationOutcome::Scrolled {
                        display_ordinal,
                        element,
                    }
                } else {
                    info!(display_ordinal, "turn element left the page since the last cycle");
                    ActivationOutcome::Unavailable { display_ordinal }
                }
            }
            RenderTarget::Placeholder(_) => {
                info!(display_ordinal, "turn is not rendered right now; scroll the transcript to load it");
                ActivationOutcome::Placeholder { display_ordinal }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use turnmark_dom::HtmlPage;

    use crate::events::Key;

    const CLAUDE_PAGE: &str = r#"<html><body><main><div class="overflow-y-auto">
        <div data-testid="user-message"><p>first question</p></div>
        <div data-testid="user-message"><p>second question</p></div>
      </div>
      <fieldset><div class="ProseMirror" contenteditable="true"></div>
        <button aria-label="Send message">send</button></fieldset>
    </main></body></html>"#;

    fn session() -> PageSession {
        PageSession::new(ProviderRegistry::builtin().unwrap(), &TurnmarkSettings::default())
    }

    fn attached(address: &str) -> (PageSession, HtmlPage, Instant) {
        let mut page = HtmlPage::new(address, CLAUDE_PAGE);
        let mut session = session();
        let now = Instant::now();
        let _ = session.attach(&mut page, now);
        (session, page, now)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ── attach ───────────────────────────────────────────────────────────

    #[test]
    fn attach_runs_first_cycle() {
        let (session, _page, _) = attached("https://claude.ai/chat/1");
        assert_eq!(session.provider().map(Provider::name), Some("claude"));
        assert_eq!(session.cycles(), 1);
        assert_eq!(session.store().len(), 2);
        let frame = session.frame();
        assert_eq!(frame.provider, Some("claude"));
        assert_eq!(frame.entries.len(), 2);
    }

    #[test]
    fn unsupported_page_is_dormant() {
        let (mut session, mut page, now) = attached("https://example.org/");
        assert!(session.is_dormant());
        assert_eq!(session.cycles(), 0);
        session.notify_mutation(now);
        assert_eq!(session.next_deadline(), None);
        assert!(session.run_cycle(&mut page, now).is_none());
    }

    // ── scheduling ───────────────────────────────────────────────────────

    #[test]
    fn mutation_debounce_runs_one_cycle() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let list = page.query_first("div.overflow-y-auto").unwrap().unwrap();
        let _ = page
            .append_html(list, r#"<div data-testid="user-message"><p>third question</p></div>"#)
            .unwrap();
        session.notify_mutation(t0);
        session.notify_mutation(t0 + ms(500));
        assert!(!session.poll(&mut page, t0 + ms(1000)));
        assert!(session.poll(&mut page, t0 + ms(1500)));
        assert_eq!(session.cycles(), 2);
        assert_eq!(session.store().len(), 3);
    }

    #[test]
    fn enter_in_prompt_schedules_submit_cycle() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let input = page.query_first(".ProseMirror").unwrap().unwrap();
        let _ = session.handle_event(&mut page, HostEvent::KeyDown(KeyEvent::page(Key::Enter, Some(input))), t0);
        assert_eq!(session.next_deadline(), Some(t0 + ms(200)));
        assert!(session.poll(&mut page, t0 + ms(200)));
    }

    #[test]
    fn shift_enter_does_not_submit() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let input = page.query_first(".ProseMirror").unwrap().unwrap();
        let key = KeyEvent {
            shift: true,
            ..KeyEvent::page(Key::Enter, Some(input))
        };
        let _ = session.handle_event(&mut page, HostEvent::KeyDown(key), t0);
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn send_button_click_schedules_submit_cycle() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let button = page.query_first("button").unwrap().unwrap();
        let _ = session.handle_event(&mut page, HostEvent::Click { target: button }, t0);
        assert_eq!(session.next_deadline(), Some(t0 + ms(200)));
    }

    // ── focus mode ───────────────────────────────────────────────────────

    #[test]
    fn focus_in_prompt_collapses_and_blur_restores() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let input = page.query_first(".ProseMirror").unwrap().unwrap();
        page.set_focus(Some(input));
        let _ = session.handle_event(&mut page, HostEvent::FocusIn { target: input }, t0);
        assert_eq!(session.sidebar_state(), SidebarState::CollapsedByFocus);

        page.set_focus(None);
        let _ = session.handle_event(&mut page, HostEvent::FocusOut { target: input }, t0);
        assert!(!session.poll(&mut page, t0 + ms(299)));
        assert!(session.poll(&mut page, t0 + ms(300)));
        assert_eq!(session.sidebar_state(), SidebarState::Expanded);
    }

    #[test]
    fn focus_on_non_prompt_element_is_ignored() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let turn = page.query_first("[data-testid=user-message]").unwrap().unwrap();
        let _ = session.handle_event(&mut page, HostEvent::FocusIn { target: turn }, t0);
        assert_eq!(session.sidebar_state(), SidebarState::Expanded);
    }

    // ── navigation ───────────────────────────────────────────────────────

    #[test]
    fn keyboard_navigation_activates_entry() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let down = HostEvent::KeyDown(KeyEvent::page(Key::ArrowDown, None));
        let _ = session.handle_event(&mut page, down.clone(), t0);
        let _ = session.handle_event(&mut page, down, t0);
        let outcome = session.handle_event(&mut page, HostEvent::KeyDown(KeyEvent::page(Key::Enter, None)), t0);
        assert_matches!(
            outcome.activation,
            Some(ActivationOutcome::Scrolled { display_ordinal: 2, .. })
        );
        assert_eq!(page.scroll_log().len(), 1);
    }

    #[test]
    fn typing_in_prompt_does_not_navigate() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let input = page.query_first(".ProseMirror").unwrap().unwrap();
        let outcome = session.handle_event(
            &mut page,
            HostEvent::KeyDown(KeyEvent::page(Key::ArrowDown, Some(input))),
            t0,
        );
        assert_eq!(outcome.key, Some(KeyOutcome::Ignored));
    }

    #[test]
    fn activating_placeholder_is_inert() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let first = page.query_first("[data-testid=user-message]").unwrap().unwrap();
        assert!(page.remove(first));
        let _ = session.run_cycle(&mut page, t0);
        let outcome = session.handle_event(&mut page, HostEvent::Activate(1), t0);
        assert_eq!(
            outcome.activation,
            Some(ActivationOutcome::Placeholder { display_ordinal: 1 })
        );
        assert!(page.scroll_log().is_empty());
        assert_eq!(session.activate(&mut page, 9), ActivationOutcome::NotFound);
    }

    #[test]
    fn search_event_filters_frame() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let _ = session.handle_event(&mut page, HostEvent::Search("SECOND".into()), t0);
        let frame = session.frame();
        assert_eq!(frame.filter, "SECOND");
        let visible: Vec<usize> = frame.visible_entries().map(|e| e.display_ordinal).collect();
        assert_eq!(visible, vec![2]);
    }

    // ── address changes ──────────────────────────────────────────────────

    #[test]
    fn navigation_to_unsupported_page_goes_dormant() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        page.navigate("https://example.org/", "<p>hi</p>");
        let outcome = session.handle_event(&mut page, HostEvent::Navigated, t0);
        assert!(!outcome.cycle_ran);
        assert!(session.is_dormant());
        assert!(session.store().is_empty());
        assert_eq!(session.frame().provider, None);
    }

    #[test]
    fn navigated_without_address_change_is_noop() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let outcome = session.handle_event(&mut page, HostEvent::Navigated, t0);
        assert!(!outcome.cycle_ran);
        assert_eq!(session.cycles(), 1);
    }

    #[test]
    fn visibility_regain_forces_refresh() {
        let (mut session, mut page, t0) = attached("https://claude.ai/chat/1");
        let hidden = session.handle_event(&mut page, HostEvent::VisibilityChanged { visible: false }, t0);
        assert!(!hidden.cycle_ran);
        let shown = session.handle_event(&mut page, HostEvent::VisibilityChanged { visible: true }, t0);
        assert!(shown.cycle_ran);
        assert_eq!(session.cycles(), 2);
    }
}
