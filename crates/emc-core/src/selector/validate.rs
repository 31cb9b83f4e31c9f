//! Label key / value syntax checks.
//!
//! Keys are `[prefix/]name`: the optional prefix is a DNS subdomain of at most
//! 253 characters, the name at most 63 characters of `[A-Za-z0-9._-]`,
//! starting and ending with an alphanumeric. Values follow the name rules but may be empty.
use crate::error::CoreError;

const MAX_NAME: usize = 63;
const MAX_PREFIX: usize = 253;

pub(super) fn key(key: &str) -> Result<(), CoreError> {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() || prefix.len() > MAX_PREFIX || !prefix.split('.').all(dns_label) {
            return Err(invalid_key(key, "prefix must be a DNS subdomain"));
        }
    }
    if name.is_empty() {
        return Err(invalid_key(key, "name must not be empty"));
    }
    if !qualified_name(name) {
        return Err(invalid_key(
            key,
            "name must be at most 63 characters of [A-Za-z0-9._-], alphanumeric at both ends",
        ));
    }
    Ok(())
}

pub(super) fn value(key: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() || qualified_name(value) {
        return Ok(());
    }
    Err(CoreError::Validation(format!(
        "invalid value {value:?} for label {key:?}"
    )))
}

fn qualified_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            s.len() <= MAX_NAME
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}

fn dns_label(s: &str) -> bool {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            s.len() <= MAX_NAME
                && (first.is_ascii_lowercase() || first.is_ascii_digit())
                && (last.is_ascii_lowercase() || last.is_ascii_digit())
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        }
        _ => false,
    }
}

fn invalid_key(key: &str, reason: &str) -> CoreError {
    CoreError::Validation(format!("invalid label key {key:?}: {reason}"))
}
