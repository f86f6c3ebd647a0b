//! HTML-backed host page.
//!
//! [`HtmlPage`] parses markup with `scraper` and exposes the mutations a
//! chat host performs on its transcript: streaming new turns in, removing
//! turns that scrolled out of a virtualized list, re-rendering a container,
//! and replacing the whole document on navigation. Every mutation is
//! published to observers.
//!
//! Identity tokens live in side tables keyed by node. Nodes created by a
//! mutation start untagged, so a re-rendered turn loses its identity exactly
//! like a re-created DOM node would.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeMut, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{DomError, Result};
use crate::locator::Locator;
use crate::observer::{MUTATION_CHANNEL_CAPACITY, MutationObserver, TreeMutation};
use crate::tree::{ElementHandle, HostPage, HostTree, IdentityToken};

/// Elements that start a new line in rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "dt", "dd", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

/// `<input type=...>` values that accept free text.
const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "email", "url", "tel", "password"];

/// A mutable HTML document standing in for a live host page.
pub struct HtmlPage {
    address: String,
    html: Html,
    generation: u64,
    identities: HashMap<NodeId, IdentityToken>,
    by_token: HashMap<IdentityToken, NodeId>,
    next_token: u64,
    focused: Option<ElementHandle>,
    scroll_log: Vec<ElementHandle>,
    mutations: broadcast::Sender<TreeMutation>,
}

impl HtmlPage {
    /// Parse a full document served at `address`.
    pub fn new(address: impl Into<String>, markup: &str) -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            address: address.into(),
            html: Html::parse_document(markup),
            generation: 0,
            identities: HashMap::new(),
            by_token: HashMap::new(),
            next_token: 1,
            focused: None,
            scroll_log: Vec::new(),
            mutations,
        }
    }

    /// Document generation; bumped by every full re-render.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Elements matching a single CSS selector, in document order.
    pub fn query(&self, css: &str) -> Result<Vec<ElementHandle>> {
        let locator = Locator::parse(&[css])?;
        Ok(self.select(&locator))
    }

    /// First element matching a CSS selector.
    pub fn query_first(&self, css: &str) -> Result<Option<ElementHandle>> {
        Ok(self.query(css)?.into_iter().next())
    }

    /// Append parsed markup as the last children of `parent`.
    ///
    /// Returns handles to the appended top-level elements.
    pub fn append_html(&mut self, parent: ElementHandle, fragment: &str) -> Result<Vec<ElementHandle>> {
        if !self.is_live(parent) {
            return Err(DomError::Stale(parent));
        }
        let appended = self.graft_fragment(parent.node, fragment);
        self.notify(TreeMutation::Inserted);
        Ok(appended)
    }

    /// Detach an element and its subtree. Returns `false` for a stale handle.
    pub fn remove(&mut self, el: ElementHandle) -> bool {
        if !self.is_live(el) {
            return false;
        }
        self.forget_subtree(el.node);
        if let Some(mut node) = self.html.tree.get_mut(el.node) {
            node.detach();
        }
        self.clear_focus_within(el);
        self.notify(TreeMutation::Removed);
        true
    }

    /// Replace every child of `el` with freshly parsed markup.
    pub fn replace_children(&mut self, el: ElementHandle, fragment: &str) -> Result<Vec<ElementHandle>> {
        if !self.is_live(el) {
            return Err(DomError::Stale(el));
        }
        let children: Vec<NodeId> = self
            .html
            .tree
            .get(el.node)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default();
        for child in children {
            self.forget_subtree(child);
            if let Some(mut node) = self.html.tree.get_mut(child) {
                node.detach();
            }
        }
        if self.focused.is_some_and(|f| !self.is_live(f)) {
            self.focused = None;
        }
        let appended = self.graft_fragment(el.node, fragment);
        self.notify(TreeMutation::ChildrenReplaced);
        Ok(appended)
    }

    /// Re-render the whole document. Every existing handle becomes stale.
    pub fn replace_document(&mut self, markup: &str) {
        self.html = Html::parse_document(markup);
        self.generation += 1;
        self.identities.clear();
        self.by_token.clear();
        self.focused = None;
        debug!(generation = self.generation, "document replaced");
        self.notify(TreeMutation::DocumentReplaced);
    }

    /// Change the address without re-rendering (history push/replace).
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// Navigate: new address and a freshly rendered document.
    pub fn navigate(&mut self, address: impl Into<String>, markup: &str) {
        self.set_address(address);
        self.replace_document(markup);
    }

    /// Move keyboard focus. Stale handles clear focus.
    pub fn set_focus(&mut self, el: Option<ElementHandle>) {
        self.focused = el.filter(|e| self.is_live(*e));
    }

    /// Elements the page was asked to scroll into view, oldest first.
    pub fn scroll_log(&self) -> &[ElementHandle] {
        &self.scroll_log
    }

    fn notify(&self, mutation: TreeMutation) {
        // No receivers is fine: nobody is observing yet.
        let _ = self.mutations.send(mutation);
    }

    fn handle(&self, node: NodeId) -> ElementHandle {
        ElementHandle {
            generation: self.generation,
            node,
        }
    }

    fn node(&self, el: ElementHandle) -> Option<NodeRef<'_, Node>> {
        if el.generation != self.generation {
            return None;
        }
        self.html.tree.get(el.node)
    }

    fn element(&self, el: ElementHandle) -> Option<ElementRef<'_>> {
        if !self.is_live(el) {
            return None;
        }
        self.node(el).and_then(ElementRef::wrap)
    }

    fn clear_focus_within(&mut self, removed: ElementHandle) {
        if let Some(focused) = self.focused {
            if focused == removed || !self.is_live(focused) {
                self.focused = None;
            }
        }
    }

    /// Drop identity entries for `root` and everything below it.
    fn forget_subtree(&mut self, root: NodeId) {
        let Some(node) = self.html.tree.get(root) else {
            return;
        };
        for id in node.descendants().map(|n| n.id()) {
            if let Some(token) = self.identities.remove(&id) {
                let _ = self.by_token.remove(&token);
            }
        }
    }

    fn graft_fragment(&mut self, parent: NodeId, fragment: &str) -> Vec<ElementHandle> {
        let parsed = Html::parse_fragment(fragment);
        let sources: Vec<NodeRef<'_, Node>> = parsed.root_element().children().collect();
        let mut appended: Vec<NodeId> = Vec::new();
        let Some(mut dest) = self.html.tree.get_mut(parent) else {
            return Vec::new();
        };
        for source in sources {
            let id = graft(&mut dest, source);
            if source.value().is_element() {
                appended.push(id);
            }
        }
        appended.into_iter().map(|id| self.handle(id)).collect()
    }

    fn matching(&self, root: NodeRef<'_, Node>, skip_root: bool, selector: &Selector) -> Vec<ElementHandle> {
        root.descendants()
            .skip(usize::from(skip_root))
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| self.handle(el.id()))
            .collect()
    }

    fn select_from(&self, root: NodeRef<'_, Node>, skip_root: bool, locator: &Locator) -> Vec<ElementHandle> {
        for selector in locator.selectors() {
            let found = self.matching(root, skip_root, selector);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}

/// Deep-copy `source` as the last child of `dest`; returns the new node's id.
fn graft(dest: &mut NodeMut<'_, Node>, source: NodeRef<'_, Node>) -> NodeId {
    let mut copy = dest.append(source.value().clone());
    for child in source.children() {
        let _ = graft(&mut copy, child);
    }
    copy.id()
}

fn collect_text(node: NodeRef<'_, Node>, exclude: Option<&Locator>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if let (Some(exclude), Some(el)) = (exclude, ElementRef::wrap(child)) {
                    if exclude.matches_any(&el) {
                        continue;
                    }
                }
                let name = element.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                collect_text(child, exclude, out);
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

impl HostTree for HtmlPage {
    fn select(&self, locator: &Locator) -> Vec<ElementHandle> {
        self.select_from(self.html.tree.root(), false, locator)
    }

    fn select_within(&self, scope: ElementHandle, locator: &Locator) -> Vec<ElementHandle> {
        if !self.is_live(scope) {
            return Vec::new();
        }
        match self.node(scope) {
            Some(root) => self.select_from(root, true, locator),
            None => Vec::new(),
        }
    }

    fn rendered_text(&self, el: ElementHandle, exclude: Option<&Locator>) -> Option<String> {
        if !self.is_live(el) {
            return None;
        }
        let node = self.node(el)?;
        let mut out = String::new();
        collect_text(node, exclude, &mut out);
        Some(out)
    }

    fn attr(&self, el: ElementHandle, name: &str) -> Option<String> {
        self.element(el)?.value().attr(name).map(str::to_owned)
    }

    fn is_live(&self, el: ElementHandle) -> bool {
        let Some(node) = self.node(el) else {
            return false;
        };
        let root = self.html.tree.root().id();
        node.id() == root || node.ancestors().any(|a| a.id() == root)
    }

    fn contains(&self, ancestor: ElementHandle, node: ElementHandle) -> bool {
        if !self.is_live(ancestor) || !self.is_live(node) {
            return false;
        }
        let Some(node_ref) = self.node(node) else {
            return false;
        };
        node_ref.id() == ancestor.node || node_ref.ancestors().any(|a| a.id() == ancestor.node)
    }

    fn is_text_input(&self, el: ElementHandle) -> bool {
        let Some(element) = self.element(el) else {
            return false;
        };
        let value = element.value();
        match value.name() {
            "textarea" => true,
            "input" => value
                .attr("type")
                .is_none_or(|t| TEXT_INPUT_TYPES.contains(&t.to_ascii_lowercase().as_str())),
            _ => {
                value
                    .attr("contenteditable")
                    .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
                    || value.attr("role") == Some("textbox")
            }
        }
    }

    fn identity(&self, el: ElementHandle) -> Option<IdentityToken> {
        if !self.is_live(el) {
            return None;
        }
        self.identities.get(&el.node).copied()
    }

    fn tag_identity(&mut self, el: ElementHandle) -> Option<IdentityToken> {
        if !self.is_live(el) {
            return None;
        }
        if let Some(token) = self.identities.get(&el.node) {
            return Some(*token);
        }
        let token = IdentityToken(self.next_token);
        self.next_token += 1;
        let _ = self.identities.insert(el.node, token);
        let _ = self.by_token.insert(token, el.node);
        Some(token)
    }

    fn find_by_identity(&self, token: IdentityToken) -> Option<ElementHandle> {
        let node = *self.by_token.get(&token)?;
        let handle = self.handle(node);
        self.is_live(handle).then_some(handle)
    }

    fn focused(&self) -> Option<ElementHandle> {
        self.focused.filter(|f| self.is_live(*f))
    }

    fn scroll_into_view(&mut self, el: ElementHandle) -> bool {
        if !self.is_live(el) {
            return false;
        }
        self.scroll_log.push(el);
        true
    }

    fn observe(&self) -> MutationObserver {
        MutationObserver::new(self.mutations.subscribe())
    }
}

impl HostPage for HtmlPage {
    fn address(&self) -> &str {
        &self.address
    }
}

impl std::fmt::Debug for HtmlPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlPage")
            .field("address", &self.address)
            .field("generation", &self.generation)
            .field("tagged", &self.identities.len())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
