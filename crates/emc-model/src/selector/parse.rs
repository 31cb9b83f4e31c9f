//! Textual selector syntax.
//!
//! ```text
//! selector := "" | term ("," term)*
//! term     := key | "!" key | key ("=" | "==" | "!=") value
//!           | key ("in" | "notin") "(" value ("," value)* ")"
//! ```
//!
//! The parser only checks structure; key and value syntax is validated when the
//! selector is compiled.
use std::str::FromStr;

use super::{SelectorOperator, SelectorRequirement, SelectorSpec};
use crate::error::ModelError;

impl FromStr for SelectorSpec {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(SelectorSpec::everything());
        }

        let mut spec = SelectorSpec::everything();
        for term in split_terms(s)? {
            spec.match_expressions.push(parse_term(term)?);
        }
        Ok(spec)
    }
}

/// Split on commas that are not inside a value list.
fn split_terms(s: &str) -> Result<Vec<&str>, ModelError> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid(s, "unbalanced ')'"))?;
            }
            ',' if depth == 0 => {
                terms.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid(s, "unclosed '('"));
    }
    terms.push(&s[start..]);
    Ok(terms)
}

fn parse_term(raw: &str) -> Result<SelectorRequirement, ModelError> {
    let term = raw.trim();
    if term.is_empty() {
        return Err(invalid(raw, "empty term"));
    }

    if let Some(rest) = term.strip_prefix('!') {
        let key = bare_key(rest, term)?;
        return Ok(SelectorRequirement::new(
            key,
            SelectorOperator::DoesNotExist,
            Vec::<String>::new(),
        ));
    }

    if let Some((key, value)) = term.split_once("!=") {
        return equality(key, value, SelectorOperator::NotIn, term);
    }
    if let Some((key, value)) = term.split_once("==") {
        return equality(key, value, SelectorOperator::In, term);
    }
    if let Some((key, value)) = term.split_once('=') {
        return equality(key, value, SelectorOperator::In, term);
    }

    match term.split_once(char::is_whitespace) {
        Some((key, rest)) => set_term(key, rest.trim_start(), term),
        None => {
            let key = bare_key(term, term)?;
            Ok(SelectorRequirement::new(
                key,
                SelectorOperator::Exists,
                Vec::<String>::new(),
            ))
        }
    }
}

fn equality(
    key: &str,
    value: &str,
    op: SelectorOperator,
    term: &str,
) -> Result<SelectorRequirement, ModelError> {
    let key = bare_key(key, term)?;
    let value = value.trim();
    if value.contains(|c: char| c.is_whitespace() || "=!(),".contains(c)) {
        return Err(invalid(term, "malformed value"));
    }
    Ok(SelectorRequirement::new(key, op, [value]))
}

fn set_term(key: &str, rest: &str, term: &str) -> Result<SelectorRequirement, ModelError> {
    let (op, list) = if let Some(list) = rest.strip_prefix("notin") {
        (SelectorOperator::NotIn, list)
    } else if let Some(list) = rest.strip_prefix("in") {
        (SelectorOperator::In, list)
    } else {
        return Err(invalid(term, "expected 'in' or 'notin'"));
    };

    let list = list.trim();
    let inner = list
        .strip_prefix('(')
        .and_then(|l| l.strip_suffix(')'))
        .ok_or_else(|| invalid(term, "value list must be wrapped in parentheses"))?;

    let values: Vec<&str> = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(str::trim).collect()
    };
    if values
        .iter()
        .any(|v| v.contains(|c: char| c.is_whitespace() || "=!()".contains(c)))
    {
        return Err(invalid(term, "malformed value in list"));
    }

    Ok(SelectorRequirement::new(bare_key(key, term)?, op, values))
}

fn bare_key<'a>(key: &'a str, term: &str) -> Result<&'a str, ModelError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid(term, "missing key"));
    }
    if key.contains(|c: char| c.is_whitespace() || "=!(),".contains(c)) {
        return Err(invalid(term, "malformed key"));
    }
    Ok(key)
}

fn invalid(input: &str, reason: &str) -> ModelError {
    ModelError::Invalid(format!("selector {input:?}: {reason}"))
}
