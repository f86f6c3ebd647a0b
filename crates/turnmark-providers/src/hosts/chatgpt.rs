use crate::descriptor::{CapabilityDescriptor, LayoutHints, TextPath};

/// ChatGPT conversation pages.
pub static CHATGPT: CapabilityDescriptor = CapabilityDescriptor {
    name: "chatgpt",
    address_patterns: &["chatgpt.com", "chat.openai.com"],
    turns: &[
        r#"[data-message-author-role="user"]"#,
        r#"article[data-testid^="conversation-turn"] div.user-message"#,
    ],
    turn_id_attr: Some("data-message-id"),
    text_paths: &[
        TextPath::First(".whitespace-pre-wrap"),
        TextPath::Joined("p", "\n"),
    ],
    text_exclusions: &[".sr-only", "button"],
    scroll_container: &[
        r#"main div[class*="react-scroll-to-bottom"]"#,
        "main div.overflow-y-auto",
        "main",
    ],
    inputs: &["#prompt-textarea", "form textarea", r#"form [contenteditable="true"]"#],
    submit_controls: &[
        r#"button[data-testid="send-button"]"#,
        r#"form button[aria-label*="Send"]"#,
    ],
    layout: LayoutHints {
        sidebar_width: 280,
        gap: 16,
        top_offset: 56,
    },
};
