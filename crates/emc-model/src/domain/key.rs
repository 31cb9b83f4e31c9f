use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    domain::KEY_SEPARATOR,
    error::{ModelError, ModelResult},
};

/// Stable, cluster-qualified identity of a placement, location or endpoint.
///
/// Rendered and parsed as `"<cluster>|<name>"`. Both parts must be non-empty
/// and the name must not contain the separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    cluster: String,
    name: String,
}

impl ObjectKey {
    /// Build a key from its two parts, validating both.
    pub fn new(cluster: impl Into<String>, name: impl Into<String>) -> ModelResult<Self> {
        let cluster = cluster.into();
        let name = name.into();

        if cluster.trim().is_empty() {
            return Err(ModelError::InvalidKey(format!("empty cluster in key for {name:?}")));
        }
        if name.trim().is_empty() {
            return Err(ModelError::InvalidKey(format!("empty name in key for cluster {cluster:?}")));
        }
        if cluster.contains(KEY_SEPARATOR) || name.contains(KEY_SEPARATOR) {
            return Err(ModelError::InvalidKey(format!(
                "'{KEY_SEPARATOR}' is reserved: {cluster}{KEY_SEPARATOR}{name}"
            )));
        }
        Ok(Self { cluster, name })
    }

    /// Logical cluster (workspace) the object lives in.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Object name within its cluster.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.cluster, self.name)
    }
}

impl FromStr for ObjectKey {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((cluster, name)) = s.split_once(KEY_SEPARATOR) else {
            return Err(ModelError::InvalidKey(format!(
                "missing '{KEY_SEPARATOR}' separator: {s:?}"
            )));
        };
        Self::new(cluster, name)
    }
}

impl Serialize for ObjectKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
