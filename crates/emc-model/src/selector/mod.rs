//! Wire-level label selector as declared by a placement.
//!
//! This is the unvalidated shape delivered by the change feed. Validation and
//! normalization happen when the core compiles it into an evaluable selector.
mod operator;
pub use operator::SelectorOperator;

mod parse;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Single set-based requirement (`key <operator> values`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorRequirement {
    /// Label key the requirement applies to.
    pub key: String,
    /// Relation between the key and `values`.
    pub operator: SelectorOperator,
    /// Values for `In` / `NotIn`; must be empty for `Exists` / `DoesNotExist`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl SelectorRequirement {
    pub fn new<K, I, V>(key: K, operator: SelectorOperator, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Label selector in the familiar `matchLabels` / `matchExpressions` shape.
///
/// All terms are ANDed. A selector with no terms selects everything.
/// The textual form (`"env=dev,tier in (edge,core),!legacy"`) is accepted via [`std::str::FromStr`].
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorSpec {
    /// Exact `key=value` matches.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    /// Set-based requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<SelectorRequirement>,
}

impl SelectorSpec {
    /// Selector with no terms.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Returns `true` if the selector carries no terms at all.
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty() && self.match_expressions.is_empty()
    }

    /// Add an exact-match term. Builder-style.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.into(), value.into());
        self
    }

    /// Add a set-based term. Builder-style.
    pub fn with_expression(mut self, req: SelectorRequirement) -> Self {
        self.match_expressions.push(req);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_kubernetes_shape() {
        let json = r#"{
            "matchLabels": {"env": "dev"},
            "matchExpressions": [
                {"key": "tier", "operator": "In", "values": ["edge", "core"]},
                {"key": "legacy", "operator": "DoesNotExist"}
            ]
        }"#;
        let spec: SelectorSpec = serde_json::from_str(json).unwrap();

        assert_eq!(spec.match_labels.get("env").map(String::as_str), Some("dev"));
        assert_eq!(spec.match_expressions.len(), 2);
        assert_eq!(spec.match_expressions[0].operator, SelectorOperator::In);
        assert!(spec.match_expressions[1].values.is_empty());
    }

    #[test]
    fn missing_fields_mean_everything() {
        let spec: SelectorSpec = serde_json::from_str("{}").unwrap();
        assert!(spec.is_empty());
        assert_eq!(spec, SelectorSpec::everything());
    }

    #[test]
    fn builder_collects_terms() {
        let spec = SelectorSpec::everything()
            .with_label("env", "dev")
            .with_expression(SelectorRequirement::new(
                "zone",
                SelectorOperator::NotIn,
                ["eu-1"],
            ));
        assert!(!spec.is_empty());
        assert_eq!(spec.match_expressions[0].values, vec!["eu-1".to_string()]);
    }
}
