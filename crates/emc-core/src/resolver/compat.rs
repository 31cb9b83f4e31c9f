use std::sync::Arc;

use emc_model::{LABEL_AFFINITY, Labels, ObjectKey};

/// One side of a candidate pair as seen by a [`Compatibility`] rule.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRef<'a> {
    pub key: &'a ObjectKey,
    pub labels: &'a Labels,
}

/// Placement-level filter applied to every (endpoint, location) pair that
/// both selectors already match.
///
/// Must be pure: the resolver may call it any number of times for the same pair.
pub trait Compatibility: Send + Sync + 'static {
    /// Rule name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `true` if `endpoint` may be bound to `location` under `placement`.
    fn admits(
        &self,
        placement: &ObjectKey,
        endpoint: CandidateRef<'_>,
        location: CandidateRef<'_>,
    ) -> bool;
}

/// Shared handle to a compatibility rule.
pub type CompatHandle = Arc<dyn Compatibility>;

/// Accepts every pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Compatibility for PassThrough {
    fn name(&self) -> &'static str {
        "pass-through"
    }

    #[inline(always)]
    fn admits(&self, _: &ObjectKey, _: CandidateRef<'_>, _: CandidateRef<'_>) -> bool {
        true
    }
}

/// Requires equal values for one label key when both sides carry it.
///
/// A side without the label is unconstrained.
#[derive(Debug, Clone)]
pub struct LabelAffinity {
    key: String,
}

impl LabelAffinity {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for LabelAffinity {
    fn default() -> Self {
        Self::new(LABEL_AFFINITY)
    }
}

impl Compatibility for LabelAffinity {
    fn name(&self) -> &'static str {
        "label-affinity"
    }

    fn admits(&self, _: &ObjectKey, endpoint: CandidateRef<'_>, location: CandidateRef<'_>) -> bool {
        match (endpoint.labels.get(&self.key), location.labels.get(&self.key)) {
            (Some(want), Some(have)) => want == have,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affinity_only_constrains_when_both_sides_labelled() {
        let key = ObjectKey::new("root", "x").unwrap();
        let a: Labels = [(LABEL_AFFINITY, "gpu")].into_iter().collect();
        let b: Labels = [(LABEL_AFFINITY, "cpu")].into_iter().collect();
        let none = Labels::new();
        let r = |labels| CandidateRef { key: &key, labels };

        let rule = LabelAffinity::default();
        assert!(rule.admits(&key, r(&a), r(&a)));
        assert!(!rule.admits(&key, r(&a), r(&b)));
        assert!(rule.admits(&key, r(&a), r(&none)));
        assert!(rule.admits(&key, r(&none), r(&b)));
        assert!(PassThrough.admits(&key, r(&a), r(&b)));
    }
}
