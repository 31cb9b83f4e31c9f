use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Relation used by a [`super::SelectorRequirement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SelectorOperator {
    /// Label present with one of the listed values.
    In,
    /// Label absent, or present with none of the listed values.
    NotIn,
    /// Label present, any value.
    Exists,
    /// Label absent.
    DoesNotExist,
}

impl SelectorOperator {
    /// Returns `true` if the operator takes a value list.
    pub fn takes_values(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl FromStr for SelectorOperator {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "notin" => Ok(Self::NotIn),
            "exists" => Ok(Self::Exists),
            "doesnotexist" => Ok(Self::DoesNotExist),
            _ => Err(ModelError::UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for SelectorOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Exists => "Exists",
            Self::DoesNotExist => "DoesNotExist",
        };
        f.write_str(s)
    }
}
