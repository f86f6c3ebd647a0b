//! Provider registry and address resolution.
//!
//! Resolution is a plain first-match scan in registration order. No scoring,
//! no partial matches: a page either belongs to exactly one provider or to
//! none, and "none" is an ordinary state rather than an error.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::descriptor::CapabilityDescriptor;
use crate::errors::Result;
use crate::hosts::BUILTIN;
use crate::provider::Provider;

/// Position of a provider inside its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProviderIndex(usize);

impl ProviderIndex {
    /// Zero-based priority position.
    pub fn position(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProviderIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered set of compiled providers.
#[derive(Clone, Debug)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Compile the given descriptors, keeping their order as priority.
    pub fn new(descriptors: &[&'static CapabilityDescriptor]) -> Result<Self> {
        let providers = descriptors
            .iter()
            .map(|&d| Provider::compile(d))
            .collect::<Result<Vec<_>>>()?;
        debug!(count = providers.len(), "compiled provider registry");
        Ok(Self { providers })
    }

    /// The built-in hosts.
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN)
    }

    /// First provider whose address patterns match `address`.
    pub fn resolve(&self, address: &str) -> Option<ProviderIndex> {
        self.providers
            .iter()
            .position(|p| p.descriptor().serves(address))
            .map(ProviderIndex)
    }

    /// Provider at `index`.
    pub fn get(&self, index: ProviderIndex) -> Option<&Provider> {
        self.providers.get(index.0)
    }

    /// Providers in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderIndex, &Provider)> {
        self.providers
            .iter()
            .enumerate()
            .map(|(i, p)| (ProviderIndex(i), p))
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
