//! Provider error types.

use thiserror::Error;
use turnmark_dom::{DomError, ElementHandle};

/// Errors raised while compiling a descriptor.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// One of the descriptor's selector patterns is invalid.
    #[error("provider `{provider}` has an invalid {field} locator: {source}")]
    InvalidLocator {
        /// Descriptor name.
        provider: &'static str,
        /// Which locator field failed.
        field: &'static str,
        /// Underlying selector error.
        #[source]
        source: DomError,
    },
}

/// A single turn element could not be read.
///
/// Missing substructure is never an error: extraction degrades to the
/// element's full text. Only an element that left the tree fails.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The element was detached or re-rendered before it could be read.
    #[error("turn element {0:?} is no longer attached")]
    Stale(ElementHandle),
}

/// Result type for provider compilation.
pub type Result<T> = std::result::Result<T, ProviderError>;
