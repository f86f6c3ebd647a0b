//! turnmark command-line tool.
//!
//! Loads a saved transcript page, runs one reconciliation cycle against it
//! and prints the navigation entries the sidebar would show.

#![deny(unsafe_code)]

mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::time::Instant;
use tracing::info;
use turnmark_dom::HtmlPage;
use turnmark_providers::ProviderRegistry;
use turnmark_session::{HostEvent, PageSession};
use turnmark_settings::TurnmarkSettings;

/// Sidebar index for chat transcripts.
#[derive(Parser, Debug)]
#[command(name = "turnmark", about = "Index user turns in saved chat transcripts")]
struct Cli {
    /// Log filter, overriding the configured level.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index a saved page and print its navigation entries.
    Inspect {
        /// HTML snapshot of the transcript page.
        file: PathBuf,

        /// Address the page was saved from; selects the provider.
        #[arg(long)]
        address: String,

        /// Apply a search filter before printing.
        #[arg(long)]
        search: Option<String>,

        /// Print the render frame as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List built-in providers in resolution order.
    Providers {
        /// Print descriptors as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = turnmark_settings::get_settings();
    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    turnmark_core::logging::init_subscriber(level);

    let registry = ProviderRegistry::builtin().context("Failed to compile built-in providers")?;
    let output = match cli.command {
        Command::Inspect {
            file,
            address,
            search,
            json,
        } => inspect(registry, settings, &file, &address, search, json)?,
        Command::Providers { json } => {
            if json {
                let descriptors: Vec<_> = registry.iter().map(|(_, p)| p.descriptor()).collect();
                let mut out = serde_json::to_string_pretty(&descriptors)?;
                out.push('\n');
                out
            } else {
                render::providers(&registry)
            }
        }
    };
    print!("{output}");
    Ok(())
}

fn inspect(
    registry: ProviderRegistry,
    settings: &TurnmarkSettings,
    file: &Path,
    address: &str,
    search: Option<String>,
    json: bool,
) -> Result<String> {
    let markup =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read page snapshot {}", file.display()))?;
    let mut page = HtmlPage::new(address, &markup);
    let mut session = PageSession::new(registry, settings);
    let now = Instant::now();
    let _ = session.attach(&mut page, now);

    let Some(provider) = session.provider().map(turnmark_providers::Provider::name) else {
        return Ok(format!("no provider serves {address}\n"));
    };
    info!(provider, file = %file.display(), "indexed page");

    if let Some(query) = search {
        let _ = session.handle_event(&mut page, HostEvent::Search(query), now);
    }
    let frame = session.frame();
    if json {
        let mut out = serde_json::to_string_pretty(&frame)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(format!("{provider}\n{}", render::entries(&frame)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn snapshot(markup: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(markup.as_bytes()).unwrap();
        file
    }

    const CHATGPT_PAGE: &str = r#"<main>
        <div data-message-author-role="user" data-message-id="m-1"><div class="whitespace-pre-wrap">Explain borrowing</div></div>
        <div data-message-author-role="assistant"><p>Sure.</p></div>
        <div data-message-author-role="user" data-message-id="m-2"><div class="whitespace-pre-wrap">And lifetimes?</div></div>
    </main>"#;

    #[test]
    fn cli_parses_inspect() {
        let cli = Cli::try_parse_from([
            "turnmark",
            "inspect",
            "page.html",
            "--address",
            "https://chatgpt.com/c/1",
            "--json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Inspect { file, address, json, search } => {
                assert_eq!(file, PathBuf::from("page.html"));
                assert_eq!(address, "https://chatgpt.com/c/1");
                assert!(json);
                assert!(search.is_none());
            }
            Command::Providers { .. } => panic!("expected inspect"),
        }
    }

    #[test]
    fn inspect_prints_table() {
        let file = snapshot(CHATGPT_PAGE);
        let out = inspect(
            ProviderRegistry::builtin().unwrap(),
            &TurnmarkSettings::default(),
            file.path(),
            "https://chatgpt.com/c/1",
            None,
            false,
        )
        .unwrap();
        assert_eq!(out, "chatgpt\n  1  Explain borrowing\n  2  And lifetimes?\n2 turn(s)\n");
    }

    #[test]
    fn inspect_json_carries_host_ids() {
        let file = snapshot(CHATGPT_PAGE);
        let out = inspect(
            ProviderRegistry::builtin().unwrap(),
            &TurnmarkSettings::default(),
            file.path(),
            "https://chatgpt.com/c/1",
            Some("lifetimes".into()),
            true,
        )
        .unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(frame["provider"], "chatgpt");
        assert_eq!(frame["filter"], "lifetimes");
        assert_eq!(frame["entries"][1]["turnId"], "m-2");
        assert_eq!(frame["entries"][0]["visible"], false);
    }

    #[test]
    fn inspect_unsupported_address() {
        let file = snapshot("<main></main>");
        let out = inspect(
            ProviderRegistry::builtin().unwrap(),
            &TurnmarkSettings::default(),
            file.path(),
            "https://example.org/",
            None,
            false,
        )
        .unwrap();
        assert_eq!(out, "no provider serves https://example.org/\n");
    }

    #[test]
    fn inspect_missing_file_has_context() {
        let err = inspect(
            ProviderRegistry::builtin().unwrap(),
            &TurnmarkSettings::default(),
            Path::new("/nonexistent/turnmark/page.html"),
            "https://claude.ai/chat/1",
            None,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read page snapshot"));
    }
}
