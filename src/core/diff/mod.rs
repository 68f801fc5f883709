//! Structural diff between the expected key set and a locale tree.
//!
//! Both sides are flattened to sorted sets of dotted leaf paths and walked in
//! lockstep. A path present on only one side is `Added` or `Removed`, unless
//! the other side holds a leaf where this side holds a branch (or the reverse).
//! That shape conflict is one `Changed` entry at the shorter path, and it is
//! never reported as unused or missing.

use std::{collections::BTreeSet, ops::Bound};

use serde_json::Value;

use crate::core::locale::{LocaleKeyMode, LocaleMessage};

/// Dotted key paths, sorted.
pub type KeySet = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Change {
    /// Only in the locale tree.
    Added(String),
    /// Only in the expected keys.
    Removed(String),
    /// Leaf on one side, branch on the other.
    Changed(String),
}

impl Change {
    pub fn path(&self) -> &str {
        match self {
            Change::Added(p) | Change::Removed(p) | Change::Changed(p) => p,
        }
    }
}

/// A diff result mapped back to a locale.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyFinding {
    pub locale: String,
    /// Key relative to the locale root.
    pub key: String,
    /// Path inside the file. Differs from `key` in `key` mode, where it
    /// starts with the locale.
    pub path: String,
}

/// Every leaf path of a JSON tree. Arrays are leaves and empty objects
/// contribute nothing. A non-object root has no paths.
pub fn flatten_value(value: &Value) -> KeySet {
    let mut out = KeySet::new();
    if let Value::Object(map) = value {
        for (key, child) in map {
            flatten_into(key.clone(), child, &mut out);
        }
    }
    out
}

fn flatten_into(path: String, value: &Value, out: &mut KeySet) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(format!("{path}.{key}"), child, out);
            }
        }
        _ => {
            out.insert(path);
        }
    }
}

/// Prefix every key with each locale: `hello` → `en.hello`, `ja.hello`.
pub fn fan_out<'a>(keys: &KeySet, locales: impl IntoIterator<Item = &'a str>) -> KeySet {
    locales
        .into_iter()
        .flat_map(|locale| keys.iter().map(move |key| format!("{locale}.{key}")))
        .collect()
}

/// Diff the expected keys against `actual`.
pub fn diff(expected: &KeySet, actual: &Value) -> Vec<Change> {
    diff_paths(expected, &flatten_value(actual))
}

/// Diff two flattened path sets.
pub fn diff_paths(expected: &KeySet, actual: &KeySet) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut changed: BTreeSet<String> = BTreeSet::new();
    let mut record_conflict = |path: String, changes: &mut Vec<Change>| {
        if changed.insert(path.clone()) {
            changes.push(Change::Changed(path));
        }
    };

    let mut e = expected.iter().peekable();
    let mut a = actual.iter().peekable();
    loop {
        match (e.peek().copied(), a.peek().copied()) {
            (Some(ek), Some(ak)) if ek == ak => {
                e.next();
                a.next();
            }
            (Some(ek), Some(ak)) if ek < ak => {
                match shape_conflict(ek, actual) {
                    Some(at) => record_conflict(at, &mut changes),
                    None => changes.push(Change::Removed(ek.clone())),
                }
                e.next();
            }
            (Some(ek), None) => {
                match shape_conflict(ek, actual) {
                    Some(at) => record_conflict(at, &mut changes),
                    None => changes.push(Change::Removed(ek.clone())),
                }
                e.next();
            }
            (_, Some(ak)) => {
                match shape_conflict(ak, expected) {
                    Some(at) => record_conflict(at, &mut changes),
                    None => changes.push(Change::Added(ak.clone())),
                }
                a.next();
            }
            (None, None) => break,
        }
    }

    changes
}

/// The shorter path where `path` and `other` disagree on shape, if any:
/// either an ancestor of `path` is a leaf in `other`, or `path` itself is a
/// branch in `other`.
fn shape_conflict(path: &str, other: &KeySet) -> Option<String> {
    for (i, _) in path.match_indices('.') {
        let ancestor = &path[..i];
        if other.contains(ancestor) {
            return Some(ancestor.to_string());
        }
    }

    let prefix = format!("{path}.");
    let has_descendant = other
        .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
        .next()
        .is_some_and(|k| k.starts_with(&prefix));
    has_descendant.then(|| path.to_string())
}

/// Expected paths for one locale file: `keys` as-is in `file` mode, fanned
/// out over the file's locales in `key` mode.
pub fn expected_paths(keys: &KeySet, message: &LocaleMessage) -> KeySet {
    match message.locale_key {
        LocaleKeyMode::File => keys.clone(),
        LocaleKeyMode::Key => fan_out(keys, message.locales.iter().map(String::as_str)),
    }
}

fn to_finding(path: &str, message: &LocaleMessage) -> Option<KeyFinding> {
    match message.locale_key {
        LocaleKeyMode::File => Some(KeyFinding {
            locale: message.locales.first()?.clone(),
            key: path.to_string(),
            path: path.to_string(),
        }),
        LocaleKeyMode::Key => {
            let (locale, key) = path.split_once('.')?;
            Some(KeyFinding {
                locale: locale.to_string(),
                key: key.to_string(),
                path: path.to_string(),
            })
        }
    }
}

/// Keys in `message` that nothing expects.
pub fn unused_keys(expected: &KeySet, message: &LocaleMessage) -> Vec<KeyFinding> {
    diff(&expected_paths(expected, message), &message.messages)
        .iter()
        .filter_map(|change| match change {
            Change::Added(path) => to_finding(path, message),
            _ => None,
        })
        .collect()
}

/// Expected keys that `message` lacks, per locale.
pub fn missing_keys(expected: &KeySet, message: &LocaleMessage) -> Vec<KeyFinding> {
    diff(&expected_paths(expected, message), &message.messages)
        .iter()
        .filter_map(|change| match change {
            Change::Removed(path) => to_finding(path, message),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn keys(list: &[&str]) -> KeySet {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn message(name: &str, mode: LocaleKeyMode, value: Value) -> LocaleMessage {
        LocaleMessage::from_text(
            PathBuf::from(format!("locales/{name}")),
            format!("locales/{name}"),
            mode,
            value.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_flatten_value() {
        let value = json!({
            "a": { "b": "x", "c": { "d": 1 } },
            "list": ["one", "two"],
            "empty": {},
            "flag": null
        });
        assert_eq!(
            flatten_value(&value),
            keys(&["a.b", "a.c.d", "flag", "list"])
        );
    }

    #[test]
    fn test_round_trip_is_empty() {
        let value = json!({
            "messages": { "hello": "Hello", "nested": { "deep": "x" } },
            "list": [1, 2]
        });
        assert_eq!(diff(&flatten_value(&value), &value), vec![]);
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(
            diff(&keys(&["messages.hello"]), &json!({})),
            vec![Change::Removed("messages.hello".into())]
        );
    }

    #[test]
    fn test_unused_keys() {
        let actual = json!({ "messages": { "hello": "hi", "bye": "bye" } });
        assert_eq!(
            diff(&KeySet::new(), &actual),
            vec![
                Change::Added("messages.bye".into()),
                Change::Added("messages.hello".into()),
            ]
        );
    }

    #[test]
    fn test_shape_change_is_recorded_once() {
        // expected uses `a` as a leaf, the file has it as a branch
        let actual = json!({ "a": { "b": "x", "c": "y" } });
        assert_eq!(
            diff(&keys(&["a"]), &actual),
            vec![Change::Changed("a".into())]
        );

        // expected goes deeper than the file's leaf
        let actual = json!({ "a": "x" });
        assert_eq!(
            diff(&keys(&["a.b", "a.c.d"]), &actual),
            vec![Change::Changed("a".into())]
        );
    }

    #[test]
    fn test_prefix_siblings_are_not_conflicts() {
        let actual = json!({ "ab": "x" });
        assert_eq!(
            diff(&keys(&["a", "a.b"]), &actual)
                .iter()
                .filter(|c| matches!(c, Change::Added(_)))
                .count(),
            1
        );
        assert!(diff(&keys(&["a"]), &actual).contains(&Change::Removed("a".into())));
    }

    #[test]
    fn test_fan_out() {
        assert_eq!(
            fan_out(&keys(&["hello", "a.b"]), ["en", "ja"]),
            keys(&["en.a.b", "en.hello", "ja.a.b", "ja.hello"])
        );
    }

    #[test]
    fn test_key_mode_missing_per_locale() {
        let combined = message(
            "messages.json",
            LocaleKeyMode::Key,
            json!({ "en": { "hello": "Hello" }, "ja": {} }),
        );
        assert_eq!(
            missing_keys(&keys(&["hello"]), &combined),
            vec![KeyFinding {
                locale: "ja".into(),
                key: "hello".into(),
                path: "ja.hello".into(),
            }]
        );
    }

    #[test]
    fn test_key_mode_unused_strips_locale() {
        let combined = message(
            "messages.json",
            LocaleKeyMode::Key,
            json!({ "en": { "hello": "Hello", "bye": "Bye" }, "ja": { "hello": "こんにちは" } }),
        );
        assert_eq!(
            unused_keys(&keys(&["hello"]), &combined),
            vec![KeyFinding {
                locale: "en".into(),
                key: "bye".into(),
                path: "en.bye".into(),
            }]
        );
    }

    #[test]
    fn test_file_mode_findings() {
        let en = message(
            "en.json",
            LocaleKeyMode::File,
            json!({ "messages": { "hello": "hi", "extra": "x" } }),
        );
        let expected = keys(&["messages.hello", "messages.gone"]);

        assert_eq!(
            missing_keys(&expected, &en),
            vec![KeyFinding {
                locale: "en".into(),
                key: "messages.gone".into(),
                path: "messages.gone".into(),
            }]
        );
        assert_eq!(
            unused_keys(&expected, &en)
                .into_iter()
                .map(|f| f.key)
                .collect::<Vec<_>>(),
            vec!["messages.extra"]
        );
    }

    #[test]
    fn test_linked_key_exemption() {
        let en = message("en.json", LocaleKeyMode::File, json!({ "a": "@:b", "b": "value" }));
        let mut expected = keys(&["a"]);
        crate::core::collect::collect_linked_keys(&en.messages, &mut expected);

        assert!(unused_keys(&expected, &en).is_empty());
    }
}
