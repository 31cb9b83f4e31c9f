//! Compiled label selectors and the evaluator over them.
//!
//! A [`Selector`] is built from a wire-level [`SelectorSpec`] once, validated and
//! normalized; afterwards it is immutable and cheap to evaluate. Two specs that
//! express the same terms (in any order, with duplicates) compile to equal selectors.
mod eval;
pub use eval::matches;

mod validate;

use std::{collections::BTreeSet, fmt};

use emc_model::{SelectorOperator, SelectorSpec};

use crate::error::CoreError;

/// Single normalized term of a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Requirement {
    key: String,
    op: SelectorOperator,
    values: BTreeSet<String>,
}

impl Requirement {
    /// Label key this term applies to.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> SelectorOperator {
        self.op
    }

    /// Sorted value set (empty for `Exists` / `DoesNotExist`).
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = || self.values.iter().cloned().collect::<Vec<_>>().join(",");
        match (self.op, self.values.len()) {
            (SelectorOperator::In, 1) => write!(f, "{}={}", self.key, list()),
            (SelectorOperator::In, _) => write!(f, "{} in ({})", self.key, list()),
            (SelectorOperator::NotIn, 1) => write!(f, "{}!={}", self.key, list()),
            (SelectorOperator::NotIn, _) => write!(f, "{} notin ({})", self.key, list()),
            (SelectorOperator::Exists, _) => write!(f, "{}", self.key),
            (SelectorOperator::DoesNotExist, _) => write!(f, "!{}", self.key),
        }
    }
}

/// Immutable predicate over label sets: every requirement must hold.
///
/// The empty selector has no requirements and matches every label set.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    /// Selector that matches everything.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Validate and normalize a wire-level selector.
    ///
    /// Fails with [`CoreError::Validation`] on:
    /// - malformed label keys or values;
    /// - `In` / `NotIn` without values;
    /// - `Exists` / `DoesNotExist` with values.
    pub fn compile(spec: &SelectorSpec) -> Result<Self, CoreError> {
        let mut requirements = Vec::with_capacity(spec.match_labels.len() + spec.match_expressions.len());

        for (key, value) in &spec.match_labels {
            validate::key(key)?;
            validate::value(key, value)?;
            requirements.push(Requirement {
                key: key.clone(),
                op: SelectorOperator::In,
                values: BTreeSet::from([value.clone()]),
            });
        }

        for expr in &spec.match_expressions {
            validate::key(&expr.key)?;
            for value in &expr.values {
                validate::value(&expr.key, value)?;
            }
            match (expr.operator.takes_values(), expr.values.is_empty()) {
                (true, true) => {
                    return Err(CoreError::Validation(format!(
                        "{} requirement on {:?} needs at least one value",
                        expr.operator, expr.key
                    )));
                }
                (false, false) => {
                    return Err(CoreError::Validation(format!(
                        "{} requirement on {:?} must not carry values",
                        expr.operator, expr.key
                    )));
                }
                _ => {}
            }
            requirements.push(Requirement {
                key: expr.key.clone(),
                op: expr.operator,
                values: expr.values.iter().cloned().collect(),
            });
        }

        requirements.sort();
        requirements.dedup();
        Ok(Self { requirements })
    }

    /// Parse the textual form and compile it.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let spec: SelectorSpec = s
            .parse()
            .map_err(|e: emc_model::ModelError| CoreError::Validation(e.to_string()))?;
        Self::compile(&spec)
    }

    /// Returns `true` if the selector has no requirements.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Evaluate against a label set. See [`matches`].
    #[inline]
    pub fn matches(&self, labels: &emc_model::Labels) -> bool {
        eval::matches(self, labels)
    }
}

/// Canonical textual form; parses back to an equal selector.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, req) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{req}")?;
        }
        Ok(())
    }
}
