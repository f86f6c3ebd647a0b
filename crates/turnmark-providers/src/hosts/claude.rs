use crate::descriptor::{CapabilityDescriptor, LayoutHints, TextPath};

/// Claude conversation pages.
pub static CLAUDE: CapabilityDescriptor = CapabilityDescriptor {
    name: "claude",
    address_patterns: &["claude.ai"],
    turns: &[r#"[data-testid="user-message"]"#, "div.font-user-message"],
    turn_id_attr: None,
    text_paths: &[
        TextPath::Joined("p", "\n"),
        TextPath::First(".whitespace-pre-wrap"),
    ],
    text_exclusions: &[".sr-only"],
    scroll_container: &["div.overflow-y-scroll", "div.overflow-y-auto", "main"],
    inputs: &[
        r#"div.ProseMirror[contenteditable="true"]"#,
        "fieldset textarea",
        r#"[contenteditable="true"]"#,
    ],
    submit_controls: &[
        r#"button[aria-label="Send message"]"#,
        r#"fieldset button[aria-label*="Send"]"#,
    ],
    layout: LayoutHints {
        sidebar_width: 260,
        gap: 12,
        top_offset: 48,
    },
};
