//! Purpose: Decode a URL (or bare query) back into a typed `StateSnapshot`.
//! Exports: `parse`, `infer_value`.
//! Role: Read side of the codec; runs on page load before controls are built.
//! Invariants: Missing/empty query yields an empty snapshot, never an error.
//! Invariants: Values under one key re-pair positionally: even = param, odd = value.
//! Invariants: Odd-length groups and malformed list literals are `Corrupt` errors.
//! Notes: Any value starting with `[` is treated as a list; there is no type tag on the wire.
use url::{Url, form_urlencoded};

use crate::core::error::{Error, ErrorKind};
use crate::core::literal::parse_list_literal;
use crate::core::snapshot::StateSnapshot;
use crate::core::value::FieldValue;

pub fn parse(input: &str) -> Result<StateSnapshot, Error> {
    let query = extract_query(input);
    let mut snapshot = StateSnapshot::new();
    if query.is_empty() {
        return Ok(snapshot);
    }

    for (key, tokens) in group_by_key(&query) {
        if tokens.len() % 2 != 0 {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message(format!(
                    "query has {} entries for `{key}`; expected param/value pairs",
                    tokens.len()
                ))
                .with_component(key)
                .with_hint("The query string was truncated or edited by hand."));
        }
        for pair in tokens.chunks_exact(2) {
            let value = infer_value(&pair[1]).map_err(|err| err.with_component(key.clone()))?;
            snapshot.push(&key, pair[0].clone(), value);
        }
    }

    tracing::debug!(components = snapshot.len(), "parsed state");
    Ok(snapshot)
}

/// Types one raw query value: list literal, then number, then plain string.
pub fn infer_value(raw: &str) -> Result<FieldValue, Error> {
    if raw.starts_with('[') {
        return parse_list_literal(raw);
    }
    if !looks_numeric(raw) {
        return Ok(FieldValue::Str(raw.to_string()));
    }
    if raw.contains('.') {
        let float = raw.parse::<f64>().map_err(|err| {
            Error::new(ErrorKind::Corrupt)
                .with_message(format!("invalid float `{raw}`"))
                .with_source(err)
        })?;
        if !float.is_finite() {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message(format!("float `{raw}` is out of range")));
        }
        Ok(FieldValue::Float(float))
    } else {
        raw.parse::<i64>().map(FieldValue::Int).map_err(|err| {
            Error::new(ErrorKind::Corrupt)
                .with_message(format!("integer `{raw}` is out of range"))
                .with_source(err)
        })
    }
}

// One optional leading `-`, at most one `.`, and otherwise ASCII digits.
fn looks_numeric(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let digits = unsigned.replacen('.', "", 1);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn extract_query(input: &str) -> String {
    let input = input.trim();
    if let Ok(url) = Url::parse(input) {
        return url.query().unwrap_or_default().to_string();
    }
    let without_fragment = input.split_once('#').map_or(input, |(head, _)| head);
    match without_fragment.split_once('?') {
        Some((_, query)) => query.to_string(),
        None if without_fragment.contains('=') => without_fragment.to_string(),
        None => String::new(),
    }
}

fn group_by_key(query: &str) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, tokens)) => tokens.push(value.into_owned()),
            None => groups.push((key.into_owned(), vec![value.into_owned()])),
        }
    }
    groups
}
