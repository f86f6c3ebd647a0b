//! Turn identifiers.
//!
//! A [`TurnId`] either echoes the id the host put on the turn element or,
//! when the host has none, is minted locally as a UUID v7 so ids sort by
//! discovery time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Logical identifier of a user turn within one page view.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(String);

impl TurnId {
    /// Mint a fresh local id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Adopt the host's own turn id.
    pub fn from_host(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id has the shape of a locally minted one.
    pub fn is_generated(&self) -> bool {
        Uuid::parse_str(&self.0).is_ok_and(|u| u.get_version_num() == 7)
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TurnId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
