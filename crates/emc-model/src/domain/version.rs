use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic per-object resource version as delivered by the change feed.
///
/// Only the ordering matters: an event whose version is not newer than what is
/// already recorded for its key is considered stale.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVersion(pub u64);

impl ResourceVersion {
    /// Wrap a raw version number.
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// Raw version number.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ResourceVersion {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
