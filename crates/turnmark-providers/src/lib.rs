//! # turnmark-providers
//!
//! Capability providers: how to find and read user turns on one chat host.
//!
//! - [`descriptor`]: [`CapabilityDescriptor`], pure `'static` data per host
//! - [`hosts`]: the built-in descriptors
//! - [`provider`]: [`Provider`], a compiled descriptor with extraction logic
//! - [`registry`]: [`ProviderRegistry`], first-match address resolution
//!
//! A markup change on a host only ever touches that host's descriptor.
//!
//! ## Crate Position
//!
//! Depends on: turnmark-dom.
//! Depended on by: turnmark-session, turnmark-cli.

#![deny(unsafe_code)]

pub mod descriptor;
pub mod errors;
pub mod hosts;
pub mod provider;
pub mod registry;

pub use descriptor::{CapabilityDescriptor, LayoutHints, TextPath};
pub use errors::{ExtractionError, ProviderError, Result};
pub use provider::Provider;
pub use registry::{ProviderIndex, ProviderRegistry};
