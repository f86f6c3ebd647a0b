//! Built-in host descriptors, in resolution priority order.

mod chatgpt;
mod claude;

pub use chatgpt::CHATGPT;
pub use claude::CLAUDE;

use crate::descriptor::CapabilityDescriptor;

/// Every built-in descriptor. Earlier entries win address ties.
pub static BUILTIN: &[&CapabilityDescriptor] = &[&CHATGPT, &CLAUDE];
