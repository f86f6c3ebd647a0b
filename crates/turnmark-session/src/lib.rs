//! # turnmark-session
//!
//! The session reconciliation engine for one page view.
//!
//! - [`record`]: [`TurnRecord`], [`TurnSnapshot`], [`RenderTarget`]
//! - [`store`]: [`SessionStore`]: dedup, revalidation, ingestion
//! - [`projection`]: [`NavigationProjection`]: entries, search filter, keyboard cursor
//! - [`focus`]: [`SidebarController`], the focus-mode state machine
//! - [`scheduler`]: [`CycleScheduler`], debounce and submit deadlines
//! - [`layout`]: [`LayoutAdjuster`], bounded scroll-container lookup
//! - [`session`]: [`PageSession`], the page-view context object
//! - [`driver`]: [`SessionDriver`], the single-threaded async event loop
//!
//! Every cycle runs revalidation, then ingestion, then the projection
//! rebuild, to completion. Nothing in a session is fatal: unsupported pages
//! go dormant, unreadable turns are skipped, vanished turns become
//! placeholders.
//!
//! ## Crate Position
//!
//! Depends on: turnmark-core, turnmark-settings, turnmark-dom, turnmark-providers.
//! Depended on by: turnmark-cli.

#![deny(unsafe_code)]

pub mod driver;
pub mod events;
pub mod focus;
pub mod frame;
pub mod layout;
pub mod projection;
pub mod record;
pub mod scheduler;
pub mod session;
pub mod store;

pub use driver::SessionDriver;
pub use events::{ActivationOutcome, EventOutcome, HostEvent, Key, KeyEvent, KeyOrigin};
pub use focus::{SidebarController, SidebarState};
pub use frame::RenderFrame;
pub use layout::{AppliedLayout, LayoutAdjuster, LayoutStatus};
pub use projection::{FocusContext, KeyContext, KeyOutcome, NavKey, NavigationEntry, NavigationProjection};
pub use record::{LocatedTurn, RenderTarget, TurnRecord, TurnSnapshot};
pub use scheduler::CycleScheduler;
pub use session::{CycleReport, PageSession};
pub use store::{RevalidationReport, SessionStore};
