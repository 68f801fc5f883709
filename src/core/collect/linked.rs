//! Linked message references (`@:key`, `@.lower:key`, `@:(key)`).
//!
//! A key referenced from another message's text counts as used even if no
//! source file mentions it. References are followed one level only.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde_json::Value;

static LINKED_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:\.[a-zA-Z]+)?:(?:\(([\w\-|.]+)\)|([\w\-|.]+))").unwrap()
});

/// Keys referenced from a single message string.
pub fn linked_keys_in(message: &str) -> impl Iterator<Item = &str> {
    LINKED_KEY_REGEX.captures_iter(message).filter_map(|caps| {
        let key = caps.get(1).or_else(|| caps.get(2))?.as_str();
        // A sentence-ending period is not part of the key.
        let key = key.trim_end_matches('.');
        (!key.is_empty()).then_some(key)
    })
}

/// Every key referenced from any string leaf of `messages`, including
/// strings inside arrays.
pub fn collect_linked_keys(messages: &Value, out: &mut BTreeSet<String>) {
    match messages {
        Value::String(s) => out.extend(linked_keys_in(s).map(String::from)),
        Value::Array(items) => items.iter().for_each(|v| collect_linked_keys(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_linked_keys(v, out)),
        _ => {}
    }
}
