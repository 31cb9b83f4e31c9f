use emc_model::{Labels, SelectorOperator};

use super::{Requirement, Selector};

/// Returns `true` if every requirement of `selector` holds for `labels`.
///
/// Pure and total: the result depends only on the two arguments, and an
/// empty label set simply fails every positive term.
pub fn matches(selector: &Selector, labels: &Labels) -> bool {
    selector.requirements.iter().all(|req| req.holds(labels))
}

impl Requirement {
    fn holds(&self, labels: &Labels) -> bool {
        let actual = labels.get(&self.key);
        match self.op {
            SelectorOperator::In => actual.is_some_and(|v| self.values.contains(v)),
            SelectorOperator::NotIn => actual.is_none_or(|v| !self.values.contains(v)),
            SelectorOperator::Exists => actual.is_some(),
            SelectorOperator::DoesNotExist => actual.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().copied().collect()
    }

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn empty_selector_matches_anything() {
        assert!(matches(&Selector::everything(), &Labels::new()));
        assert!(matches(&Selector::everything(), &labels(&[("env", "dev")])));
    }

    #[test]
    fn empty_labels_fail_positive_terms() {
        let empty = Labels::new();
        assert!(!matches(&sel("env=dev"), &empty));
        assert!(!matches(&sel("tier in (edge,core)"), &empty));
        assert!(!matches(&sel("gpu"), &empty));
    }

    #[test]
    fn negative_terms_accept_absent_keys() {
        let l = labels(&[("env", "dev")]);
        assert!(matches(&sel("zone!=eu-1"), &l));
        assert!(matches(&sel("zone notin (eu-1,eu-2)"), &l));
        assert!(matches(&sel("!zone"), &l));
        assert!(!matches(&sel("!env"), &l));
        assert!(!matches(&sel("env!=dev"), &l));
    }

    #[test]
    fn terms_are_anded() {
        let l = labels(&[("env", "dev"), ("tier", "edge")]);
        assert!(matches(&sel("env=dev,tier=edge"), &l));
        assert!(!matches(&sel("env=dev,tier=core"), &l));
        assert!(matches(&sel("env in (dev,prod),tier,!legacy"), &l));
    }

    #[test]
    fn empty_value_matches_only_empty_label() {
        assert!(matches(&sel("env="), &labels(&[("env", "")])));
        assert!(!matches(&sel("env="), &labels(&[("env", "dev")])));
        assert!(!matches(&sel("env="), &Labels::new()));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let s = sel("env=dev,!legacy");
        let l = labels(&[("env", "dev")]);
        let first = matches(&s, &l);
        for _ in 0..10 {
            assert_eq!(matches(&s, &l), first);
        }
    }
}
