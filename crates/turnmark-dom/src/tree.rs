//! Host tree traits and element identity.

use std::fmt;

use ego_tree::NodeId;
use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::observer::MutationObserver;

/// Opaque reference to an element in a host tree.
///
/// Handles are cheap to copy and compare. A handle outlives the element it
/// points at: after the host removes or re-renders the element the handle
/// still exists but [`HostTree::is_live`] reports `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    pub(crate) generation: u64,
    pub(crate) node: NodeId,
}

/// Stable identity tag assigned to an element on first encounter.
///
/// Rendered as `tm-<n>`, the way a content script would stamp a data
/// attribute onto a DOM node. Tokens are never reused within a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(pub(crate) u64);

impl IdentityToken {
    /// Numeric value of the token.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tm-{}", self.0)
    }
}

/// A queryable, observable, mutable tree of UI elements.
///
/// Every query returns elements in document order and only ever returns
/// live (attached) elements.
pub trait HostTree {
    /// All elements matching the first locator alternative that matches anything.
    fn select(&self, locator: &Locator) -> Vec<ElementHandle>;

    /// Like [`select`](Self::select) but restricted to descendants of `scope`.
    fn select_within(&self, scope: ElementHandle, locator: &Locator) -> Vec<ElementHandle>;

    /// Rendered text of an element, skipping subtrees matched by `exclude`.
    ///
    /// Block-level elements are separated by newlines. Returns `None` for a
    /// stale handle.
    fn rendered_text(&self, el: ElementHandle, exclude: Option<&Locator>) -> Option<String>;

    /// Rendered text of an element with nothing excluded.
    fn text(&self, el: ElementHandle) -> Option<String> {
        self.rendered_text(el, None)
    }

    /// Attribute value, if the element is live and carries it.
    fn attr(&self, el: ElementHandle, name: &str) -> Option<String>;

    /// Whether the element is still attached to the current document.
    fn is_live(&self, el: ElementHandle) -> bool;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementHandle, node: ElementHandle) -> bool;

    /// Whether the element accepts typed text (input, textarea, contenteditable).
    fn is_text_input(&self, el: ElementHandle) -> bool;

    /// The identity token already assigned to the element, if any.
    fn identity(&self, el: ElementHandle) -> Option<IdentityToken>;

    /// Assign an identity token if the element has none; return its token.
    ///
    /// Returns `None` for a stale handle.
    fn tag_identity(&mut self, el: ElementHandle) -> Option<IdentityToken>;

    /// The live element carrying `token`, if it is still attached.
    fn find_by_identity(&self, token: IdentityToken) -> Option<ElementHandle>;

    /// The element that currently has keyboard focus.
    fn focused(&self) -> Option<ElementHandle>;

    /// Request that the host scroll `el` into view. Fire-and-forget.
    fn scroll_into_view(&mut self, el: ElementHandle) -> bool;

    /// Start observing subtree mutations.
    fn observe(&self) -> MutationObserver;
}

/// A host tree that also knows the address of the page it renders.
pub trait HostPage: HostTree {
    /// Current page address.
    fn address(&self) -> &str;
}
