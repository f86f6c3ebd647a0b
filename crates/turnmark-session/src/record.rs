//! Turn records and per-cycle snapshots of the live tree.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use turnmark_core::ids::TurnId;
use turnmark_dom::{ElementHandle, HostTree, IdentityToken};
use turnmark_providers::Provider;

/// One user-authored turn, as remembered by the session.
///
/// The text never changes after creation. A host element whose text changes
/// becomes a new candidate rather than an edit of this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    id: TurnId,
    host_id: Option<String>,
    text: String,
    bound: Option<IdentityToken>,
    first_seen_at: DateTime<Utc>,
    ordinal: u64,
}

impl TurnRecord {
    pub(crate) fn new(
        host_id: Option<String>,
        text: String,
        bound: Option<IdentityToken>,
        ordinal: u64,
    ) -> Self {
        let id = host_id.as_deref().map_or_else(TurnId::generate, TurnId::from_host);
        Self {
            id,
            host_id,
            text,
            bound,
            first_seen_at: Utc::now(),
            ordinal,
        }
    }

    /// Logical id: the host's turn id when it exposes one, otherwise generated.
    pub fn id(&self) -> &TurnId {
        &self.id
    }

    /// The host's own id for this turn.
    pub fn host_id(&self) -> Option<&str> {
        self.host_id.as_deref()
    }

    /// Trimmed, non-empty turn text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Identity token of the element last confirmed to render this turn.
    pub fn bound(&self) -> Option<IdentityToken> {
        self.bound
    }

    pub(crate) fn rebind(&mut self, token: IdentityToken) {
        self.bound = Some(token);
    }

    /// When the turn was first extracted.
    pub fn first_seen_at(&self) -> DateTime<Utc> {
        self.first_seen_at
    }

    /// Discovery ordinal. Strictly increasing, never reused within a page view.
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }
}

/// A turn element found in the live tree this cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedTurn {
    /// The element.
    pub handle: ElementHandle,
    /// Its extracted, trimmed text. May be empty.
    pub text: String,
    /// The host's own id for the turn, if any.
    pub host_id: Option<String>,
}

/// Every turn element located in one cycle, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnSnapshot {
    turns: Vec<LocatedTurn>,
}

impl TurnSnapshot {
    /// Locate and read every turn on the page.
    ///
    /// Elements whose text cannot be extracted are logged and skipped.
    pub fn capture<T: HostTree + ?Sized>(provider: &Provider, tree: &T) -> Self {
        let turns = provider
            .locate_turns(tree)
            .into_iter()
            .filter_map(|handle| match provider.extract_text(tree, handle) {
                Ok(text) => Some(LocatedTurn {
                    handle,
                    text,
                    host_id: provider.host_turn_id(tree, handle),
                }),
                Err(error) => {
                    warn!(provider = provider.name(), %error, "skipping unreadable turn element");
                    None
                }
            })
            .collect();
        Self { turns }
    }

    /// Located turns in document order.
    pub fn turns(&self) -> &[LocatedTurn] {
        &self.turns
    }

    /// First located turn whose text equals `text` exactly.
    pub fn find_text(&self, text: &str) -> Option<&LocatedTurn> {
        self.turns.iter().find(|t| t.text == text)
    }

    /// The located turn for a specific element.
    pub fn find_handle(&self, handle: ElementHandle) -> Option<&LocatedTurn> {
        self.turns.iter().find(|t| t.handle == handle)
    }

    /// Number of located turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing was located.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Where a navigation entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// A live element that can be scrolled to.
    Live(ElementHandle),
    /// The turn is not currently rendered (virtualized or removed).
    Placeholder(String),
}

impl RenderTarget {
    /// Whether this target is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnmark_core::logging::capture_logs;
    use turnmark_dom::HtmlPage;
    use turnmark_providers::hosts::CLAUDE;

    #[test]
    fn host_id_becomes_logical_id() {
        let record = TurnRecord::new(Some("m-7".into()), "hi".into(), None, 1);
        assert_eq!(record.id().as_str(), "m-7");
        assert_eq!(record.host_id(), Some("m-7"));
    }

    #[test]
    fn generated_id_without_host_id() {
        let a = TurnRecord::new(None, "hi".into(), None, 1);
        let b = TurnRecord::new(None, "hi".into(), None, 2);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.host_id(), None);
    }

    #[test]
    fn capture_reads_turns_in_order() {
        let page = HtmlPage::new(
            "https://claude.ai/chat/1",
            r#"<div data-testid="user-message"><p>one</p></div>
               <div data-testid="user-message"><p>two</p></div>"#,
        );
        let provider = Provider::compile(&CLAUDE).unwrap();
        let snapshot = TurnSnapshot::capture(&provider, &page);
        let texts: Vec<&str> = snapshot.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(snapshot.find_text("two").map(|t| t.handle), Some(snapshot.turns()[1].handle));
        assert!(snapshot.find_text("three").is_none());
    }

    /// Tree that reports one extra, already-detached turn element.
    struct WithStaleTurn {
        page: HtmlPage,
        stale: ElementHandle,
    }

    impl HostTree for WithStaleTurn {
        fn select(&self, locator: &turnmark_dom::Locator) -> Vec<ElementHandle> {
            let mut found = self.page.select(locator);
            found.insert(0, self.stale);
            found
        }
        fn select_within(&self, scope: ElementHandle, locator: &turnmark_dom::Locator) -> Vec<ElementHandle> {
            self.page.select_within(scope, locator)
        }
        fn rendered_text(&self, el: ElementHandle, exclude: Option<&turnmark_dom::Locator>) -> Option<String> {
            self.page.rendered_text(el, exclude)
        }
        fn attr(&self, el: ElementHandle, name: &str) -> Option<String> {
            self.page.attr(el, name)
        }
        fn is_live(&self, el: ElementHandle) -> bool {
            self.page.is_live(el)
        }
        fn contains(&self, ancestor: ElementHandle, node: ElementHandle) -> bool {
            self.page.contains(ancestor, node)
        }
        fn is_text_input(&self, el: ElementHandle) -> bool {
            self.page.is_text_input(el)
        }
        fn identity(&self, el: ElementHandle) -> Option<IdentityToken> {
            self.page.identity(el)
        }
        fn tag_identity(&mut self, el: ElementHandle) -> Option<IdentityToken> {
            self.page.tag_identity(el)
        }
        fn find_by_identity(&self, token: IdentityToken) -> Option<ElementHandle> {
            self.page.find_by_identity(token)
        }
        fn focused(&self) -> Option<ElementHandle> {
            self.page.focused()
        }
        fn scroll_into_view(&mut self, el: ElementHandle) -> bool {
            self.page.scroll_into_view(el)
        }
        fn observe(&self) -> turnmark_dom::MutationObserver {
            self.page.observe()
        }
    }

    #[test]
    fn unreadable_turn_is_logged_and_skipped() {
        let (logs, _guard) = capture_logs();
        let mut page = HtmlPage::new(
            "https://claude.ai/chat/1",
            r#"<div data-testid="user-message"><p>gone</p></div>
               <div data-testid="user-message"><p>kept</p></div>"#,
        );
        let provider = Provider::compile(&CLAUDE).unwrap();
        let stale = provider.locate_turns(&page)[0];
        assert!(page.remove(stale));

        let tree = WithStaleTurn { page, stale };
        let snapshot = TurnSnapshot::capture(&provider, &tree);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.turns()[0].text, "kept");
        assert!(logs.has_event(tracing::Level::WARN, "skipping unreadable turn element"));
    }

    #[test]
    fn placeholder_flag() {
        assert!(RenderTarget::Placeholder("x".into()).is_placeholder());
    }
}
