use serde::{Deserialize, Serialize};

use crate::ObjectKey;

/// Resolved assignment: `endpoint` is scheduled onto `location`.
///
/// Ordered by endpoint first, then location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub endpoint: ObjectKey,
    pub location: ObjectKey,
}

impl Binding {
    pub fn new(endpoint: ObjectKey, location: ObjectKey) -> Self {
        Self { endpoint, location }
    }
}

/// Single step of a [`BindingDelta`] as seen by a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOp<'a> {
    Remove(&'a Binding),
    Add(&'a Binding),
}

/// Change in one placement's binding set since the previous resolution.
///
/// Consumers must apply `removed` before `added`; [`BindingDelta::ops`] yields them in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingDelta {
    pub placement: ObjectKey,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<Binding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<Binding>,
}

impl BindingDelta {
    /// Empty delta for a placement.
    pub fn new(placement: ObjectKey) -> Self {
        Self {
            placement,
            removed: Vec::new(),
            added: Vec::new(),
        }
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Removals first, then additions.
    pub fn ops(&self) -> impl Iterator<Item = BindingOp<'_>> {
        self.removed
            .iter()
            .map(BindingOp::Remove)
            .chain(self.added.iter().map(BindingOp::Add))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new("root", name).unwrap()
    }

    #[test]
    fn ops_yield_removals_before_additions() {
        let delta = BindingDelta {
            placement: key("p"),
            removed: vec![Binding::new(key("e1"), key("l1"))],
            added: vec![
                Binding::new(key("e1"), key("l2")),
                Binding::new(key("e2"), key("l2")),
            ],
        };

        let ops: Vec<_> = delta.ops().collect();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], BindingOp::Remove(_)));
        assert!(ops[1..].iter().all(|op| matches!(op, BindingOp::Add(_))));
    }

    #[test]
    fn empty_delta_serializes_without_lists() {
        let delta = BindingDelta::new(key("p"));
        assert!(delta.is_empty());
        assert_eq!(serde_json::to_string(&delta).unwrap(), r#"{"placement":"root|p"}"#);
    }

    #[test]
    fn bindings_order_by_endpoint_then_location() {
        let a = Binding::new(key("e1"), key("l2"));
        let b = Binding::new(key("e2"), key("l1"));
        assert!(a < b);
    }
}
