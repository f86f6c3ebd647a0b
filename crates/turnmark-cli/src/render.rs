//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use turnmark_providers::ProviderRegistry;
use turnmark_session::RenderFrame;

/// One line per visible entry: display ordinal, placeholder marker, summary.
pub fn entries(frame: &RenderFrame) -> String {
    let mut out = String::new();
    for entry in frame.visible_entries() {
        let marker = if entry.is_placeholder { "[not rendered] " } else { "" };
        let _ = writeln!(out, "{:>3}  {marker}{}", entry.display_ordinal, entry.summary);
    }
    let shown = frame.visible_entries().count();
    if frame.filter.is_empty() {
        let _ = writeln!(out, "{shown} turn(s)");
    } else {
        let _ = writeln!(
            out,
            "{shown} of {} turn(s) match \"{}\"",
            frame.entries.len(),
            frame.filter
        );
    }
    out
}

/// Providers in resolution order with their address patterns.
pub fn providers(registry: &ProviderRegistry) -> String {
    let mut out = String::new();
    for (_, provider) in registry.iter() {
        let patterns = provider.descriptor().address_patterns.join(", ");
        let _ = writeln!(out, "{:<8} {patterns}", provider.name());
    }
    out
}
