//! # turnmark-dom
//!
//! The host tree boundary the session engine reconciles against.
//!
//! - [`tree`]: [`HostTree`] / [`HostPage`] traits, [`ElementHandle`], [`IdentityToken`]
//! - [`locator`]: [`Locator`], an ordered list of CSS selector alternatives
//! - [`observer`]: [`MutationObserver`] and [`TreeMutation`] notifications
//! - [`html`]: [`HtmlPage`], a mutable page backed by `scraper`
//! - [`error`]: [`DomError`]
//!
//! Element identity is deliberately fragile: re-rendering a subtree produces
//! new elements with no identity token, the same way a host page that
//! re-creates DOM nodes loses any attributes tagged onto the old ones.
//!
//! ## Crate Position
//!
//! Depends on: nothing turnmark-specific.
//! Depended on by: turnmark-providers, turnmark-session, turnmark-cli.

#![deny(unsafe_code)]

pub mod error;
pub mod html;
pub mod locator;
pub mod observer;
pub mod tree;

pub use error::{DomError, Result};
pub use html::HtmlPage;
pub use locator::Locator;
pub use observer::{MutationObserver, TreeMutation};
pub use tree::{ElementHandle, HostPage, HostTree, IdentityToken};
