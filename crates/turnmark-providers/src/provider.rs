//! Compiled capability providers.

use tracing::trace;
use turnmark_dom::{ElementHandle, HostTree, Locator};

use crate::descriptor::{CapabilityDescriptor, LayoutHints, TextPath};
use crate::errors::{ExtractionError, ProviderError, Result};

#[derive(Clone, Debug)]
enum CompiledPath {
    First(Locator),
    Joined(Locator, &'static str),
}

/// A descriptor with every selector compiled, ready to run against a tree.
#[derive(Clone, Debug)]
pub struct Provider {
    descriptor: &'static CapabilityDescriptor,
    turns: Locator,
    text_paths: Vec<CompiledPath>,
    exclusions: Locator,
    scroll_container: Locator,
    inputs: Locator,
    submit_controls: Locator,
}

fn compile_field(
    descriptor: &CapabilityDescriptor,
    field: &'static str,
    patterns: &[&str],
) -> Result<Locator> {
    Locator::parse(patterns).map_err(|source| ProviderError::InvalidLocator {
        provider: descriptor.name,
        field,
        source,
    })
}

impl Provider {
    /// Compile a descriptor. Fails on the first invalid selector.
    pub fn compile(descriptor: &'static CapabilityDescriptor) -> Result<Self> {
        let text_paths = descriptor
            .text_paths
            .iter()
            .map(|path| {
                let locator = compile_field(descriptor, "text path", &[path.selector()])?;
                Ok(match *path {
                    TextPath::First(_) => CompiledPath::First(locator),
                    TextPath::Joined(_, separator) => CompiledPath::Joined(locator, separator),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            descriptor,
            turns: compile_field(descriptor, "turn", descriptor.turns)?,
            text_paths,
            exclusions: compile_field(descriptor, "text exclusion", descriptor.text_exclusions)?,
            scroll_container: compile_field(
                descriptor,
                "scroll container",
                descriptor.scroll_container,
            )?,
            inputs: compile_field(descriptor, "input", descriptor.inputs)?,
            submit_controls: compile_field(descriptor, "submit control", descriptor.submit_controls)?,
        })
    }

    /// Host name.
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// The underlying descriptor.
    pub fn descriptor(&self) -> &'static CapabilityDescriptor {
        self.descriptor
    }

    /// User turn elements in document order.
    pub fn locate_turns<T: HostTree + ?Sized>(&self, tree: &T) -> Vec<ElementHandle> {
        tree.select(&self.turns)
    }

    /// The host's own id for a turn, when the descriptor declares one.
    pub fn host_turn_id<T: HostTree + ?Sized>(&self, tree: &T, turn: ElementHandle) -> Option<String> {
        let attr = self.descriptor.turn_id_attr?;
        tree.attr(turn, attr).filter(|id| !id.trim().is_empty())
    }

    /// Read a turn's text.
    ///
    /// Tries each structured text path in order, then the element's text
    /// without excluded subtrees, then its raw text. The result is trimmed
    /// and may be empty. Fails only when the element is no longer attached.
    pub fn extract_text<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        turn: ElementHandle,
    ) -> std::result::Result<String, ExtractionError> {
        if !tree.is_live(turn) {
            return Err(ExtractionError::Stale(turn));
        }
        let exclude = (!self.exclusions.is_empty()).then_some(&self.exclusions);

        for (index, path) in self.text_paths.iter().enumerate() {
            let text = match path {
                CompiledPath::First(locator) => tree
                    .select_within(turn, locator)
                    .first()
                    .and_then(|el| tree.rendered_text(*el, exclude))
                    .map(|t| t.trim().to_owned())
                    .unwrap_or_default(),
                CompiledPath::Joined(locator, separator) => tree
                    .select_within(turn, locator)
                    .into_iter()
                    .filter_map(|el| tree.rendered_text(el, exclude))
                    .map(|t| t.trim().to_owned())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(separator),
            };
            if !text.is_empty() {
                return Ok(text);
            }
            trace!(provider = self.name(), path = index, "text path yielded nothing");
        }

        if exclude.is_some() {
            if let Some(text) = tree.rendered_text(turn, exclude) {
                let text = text.trim();
                if !text.is_empty() {
                    return Ok(text.to_owned());
                }
            }
        }

        tree.text(turn)
            .map(|t| t.trim().to_owned())
            .ok_or(ExtractionError::Stale(turn))
    }

    /// The scrollable transcript container, if one is present.
    pub fn locate_scroll_container<T: HostTree + ?Sized>(&self, tree: &T) -> Option<ElementHandle> {
        tree.select(&self.scroll_container).into_iter().next()
    }

    /// Prompt input elements.
    pub fn locate_inputs<T: HostTree + ?Sized>(&self, tree: &T) -> Vec<ElementHandle> {
        tree.select(&self.inputs)
    }

    /// Submit controls.
    pub fn locate_submit_controls<T: HostTree + ?Sized>(&self, tree: &T) -> Vec<ElementHandle> {
        tree.select(&self.submit_controls)
    }

    /// Whether `target` is, or lies inside, one of the prompt inputs.
    pub fn is_input_target<T: HostTree + ?Sized>(&self, tree: &T, target: ElementHandle) -> bool {
        self.locate_inputs(tree)
            .into_iter()
            .any(|input| tree.contains(input, target))
    }

    /// Whether `target` is, or lies inside, one of the submit controls.
    pub fn is_submit_target<T: HostTree + ?Sized>(&self, tree: &T, target: ElementHandle) -> bool {
        self.locate_submit_controls(tree)
            .into_iter()
            .any(|control| tree.contains(control, target))
    }

    /// Sidebar placement hints.
    pub fn layout_hints(&self) -> LayoutHints {
        self.descriptor.layout
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::{CHATGPT, CLAUDE};
    use assert_matches::assert_matches;
    use turnmark_dom::HtmlPage;

    static BROKEN: CapabilityDescriptor = CapabilityDescriptor {
        name: "broken",
        address_patterns: &["broken.test"],
        turns: &[".turn"],
        turn_id_attr: None,
        text_paths: &[],
        text_exclusions: &[],
        scroll_container: &["main"],
        inputs: &["textarea[["],
        submit_controls: &["button"],
        layout: LayoutHints {
            sidebar_width: 1,
            gap: 1,
            top_offset: 1,
        },
    };

    const CHATGPT_PAGE: &str = r#"<html><body><main><div class="react-scroll-to-bottom--css">
        <article data-testid="conversation-turn-1">
          <h5 class="sr-only">You said:</h5>
          <div data-message-author-role="user" data-message-id="m-1">
            <div class="whitespace-pre-wrap">Hello world</div>
          </div>
        </article>
        <article data-testid="conversation-turn-2">
          <div data-message-author-role="assistant"><p>Hi! How can I help?</p></div>
        </article>
        <article data-testid="conversation-turn-3">
          <div data-message-author-role="user" data-message-id="m-3">
            <p>First paragraph</p><p>Second paragraph</p>
          </div>
        </article>
        <article data-testid="conversation-turn-4">
          <div data-message-author-role="user"><span class="sr-only">You said:</span>bare text</div>
        </article>
      </div>
      <form><textarea id="prompt-textarea"></textarea>
        <button data-testid="send-button"><svg></svg></button></form>
    </main></body></html>"#;

    fn chatgpt() -> Provider {
        Provider::compile(&CHATGPT).unwrap()
    }

    // ── compile ──────────────────────────────────────────────────────────

    #[test]
    fn builtins_compile() {
        assert_eq!(chatgpt().name(), "chatgpt");
        assert_eq!(Provider::compile(&CLAUDE).unwrap().name(), "claude");
    }

    #[test]
    fn invalid_selector_names_field() {
        let err = Provider::compile(&BROKEN).unwrap_err();
        assert_matches!(
            err,
            ProviderError::InvalidLocator { provider: "broken", field: "input", .. }
        );
        assert!(err.to_string().contains("textarea[["));
    }

    // ── locate ───────────────────────────────────────────────────────────

    #[test]
    fn locates_only_user_turns() {
        let page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let turns = chatgpt().locate_turns(&page);
        assert_eq!(turns.len(), 3);
    }

    #[test]
    fn host_turn_id_reads_attribute() {
        let page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let provider = chatgpt();
        let turns = provider.locate_turns(&page);
        assert_eq!(provider.host_turn_id(&page, turns[0]).as_deref(), Some("m-1"));
        assert_eq!(provider.host_turn_id(&page, turns[2]), None);
    }

    #[test]
    fn locates_scroll_container_and_controls() {
        let page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let provider = chatgpt();
        let container = provider.locate_scroll_container(&page).unwrap();
        assert!(page.attr(container, "class").unwrap().contains("react-scroll-to-bottom"));
        assert_eq!(provider.locate_inputs(&page).len(), 1);
        assert_eq!(provider.locate_submit_controls(&page).len(), 1);
    }

    #[test]
    fn submit_target_includes_descendants() {
        let page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let provider = chatgpt();
        let icon = page.query_first("button svg").unwrap().unwrap();
        let input = page.query_first("#prompt-textarea").unwrap().unwrap();
        assert!(provider.is_submit_target(&page, icon));
        assert!(!provider.is_submit_target(&page, input));
        assert!(provider.is_input_target(&page, input));
    }

    #[test]
    fn missing_scroll_container_is_none() {
        let page = HtmlPage::new("https://claude.ai/chat/1", "<div></div>");
        assert_eq!(Provider::compile(&CLAUDE).unwrap().locate_scroll_container(&page), None);
    }

    // ── extract_text ─────────────────────────────────────────────────────

    #[test]
    fn primary_path_wins() {
        let page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let provider = chatgpt();
        let turns = provider.locate_turns(&page);
        assert_eq!(provider.extract_text(&page, turns[0]).unwrap(), "Hello world");
    }

    #[test]
    fn fallback_path_joins_paragraphs() {
        let page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let provider = chatgpt();
        let turns = provider.locate_turns(&page);
        assert_eq!(
            provider.extract_text(&page, turns[1]).unwrap(),
            "First paragraph\nSecond paragraph"
        );
    }

    #[test]
    fn full_text_fallback_skips_exclusions() {
        let page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let provider = chatgpt();
        let turns = provider.locate_turns(&page);
        assert_eq!(provider.extract_text(&page, turns[2]).unwrap(), "bare text");
    }

    #[test]
    fn empty_turn_extracts_empty_string() {
        let page = HtmlPage::new(
            "https://claude.ai/chat/1",
            r#"<div data-testid="user-message"><p>   </p></div>"#,
        );
        let provider = Provider::compile(&CLAUDE).unwrap();
        let turns = provider.locate_turns(&page);
        assert_eq!(provider.extract_text(&page, turns[0]).unwrap(), "");
    }

    #[test]
    fn stale_turn_is_an_error() {
        let mut page = HtmlPage::new("https://chatgpt.com/c/1", CHATGPT_PAGE);
        let provider = chatgpt();
        let turn = provider.locate_turns(&page)[0];
        assert!(page.remove(turn));
        assert_matches!(provider.extract_text(&page, turn), Err(ExtractionError::Stale(_)));
    }

    #[test]
    fn claude_fallback_to_selector_alternative() {
        let page = HtmlPage::new(
            "https://claude.ai/chat/1",
            r#"<div class="font-user-message"><p>Explain recursion</p><p>simply</p></div>"#,
        );
        let provider = Provider::compile(&CLAUDE).unwrap();
        let turns = provider.locate_turns(&page);
        assert_eq!(turns.len(), 1);
        assert_eq!(provider.extract_text(&page, turns[0]).unwrap(), "Explain recursion\nsimply");
    }
}
