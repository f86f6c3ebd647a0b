//! Host tree error types.

use thiserror::Error;

use crate::tree::ElementHandle;

/// Errors raised by locator compilation and page mutation.
#[derive(Debug, Error)]
pub enum DomError {
    /// A CSS selector pattern failed to parse.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        /// The offending pattern.
        selector: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The element is no longer attached to the live document.
    #[error("stale element handle {0:?}")]
    Stale(ElementHandle),
}

/// Result type for host tree operations.
pub type Result<T> = std::result::Result<T, DomError>;
