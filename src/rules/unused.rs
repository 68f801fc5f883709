//! Unused translation key detection rule.
//!
//! A key is unused when no source file references it and no locale message
//! links to it with `@:key`.

use tracing::debug;

use crate::{
    core::{
        CheckContext, LocaleMessages, MessageContext, MessageLocation,
        diff::{KeySet, unused_keys},
        parsers::json::{JsonDocument, LocateTarget},
    },
    issues::UnusedKeyIssue,
};

pub fn check_unused_keys_issues(ctx: &CheckContext) -> Vec<UnusedKeyIssue> {
    if ctx.config_error().is_some() {
        return Vec::new();
    }
    check_unused_keys(&ctx.expected_keys(), ctx.locale_messages())
}

/// Check every locale file for keys outside `expected`.
///
/// Issues point at the property name inside the file. A key the locator
/// cannot find is skipped.
pub fn check_unused_keys(expected: &KeySet, messages: &LocaleMessages) -> Vec<UnusedKeyIssue> {
    let mut issues = Vec::new();

    for message in messages.messages() {
        let findings = unused_keys(expected, message);
        if findings.is_empty() {
            continue;
        }
        let Ok(document) = JsonDocument::parse(&message.text) else {
            continue;
        };

        for finding in findings {
            let Some(property) = document.property(&finding.path) else {
                debug!("{}: cannot locate '{}'", message.display_path, finding.path);
                continue;
            };
            let Some(position) = document.locate(&finding.path, LocateTarget::Key) else {
                continue;
            };
            let value = serde_json::to_string(&property.value.to_value()).unwrap_or_default();
            issues.push(UnusedKeyIssue {
                context: MessageContext::new(
                    MessageLocation::new(&message.display_path, position.line, position.col),
                    finding.key,
                    finding.locale,
                    value,
                ),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use crate::core::{LocaleKeyMode, LocaleMessage, LocaleMessageSource};
    use crate::rules::unused::*;

    fn messages(files: &[(&str, LocaleKeyMode, &str)]) -> LocaleMessages {
        let loaded = files
            .iter()
            .map(|(name, mode, text)| {
                LocaleMessage::from_text(
                    PathBuf::from(format!("locales/{name}")),
                    format!("locales/{name}"),
                    *mode,
                    text.to_string(),
                )
                .unwrap()
            })
            .collect();
        LocaleMessages::from_messages(
            vec![LocaleMessageSource::new("locales/*.json", LocaleKeyMode::File)],
            loaded,
        )
    }

    fn keys(list: &[&str]) -> KeySet {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn summary(issues: &[UnusedKeyIssue]) -> Vec<String> {
        issues
            .iter()
            .map(|i| {
                format!(
                    "{}:{}:{} {} {} {}",
                    i.context.file_path(),
                    i.context.line(),
                    i.context.col(),
                    i.context.locale,
                    i.context.key,
                    i.context.value
                )
            })
            .collect()
    }

    #[test]
    fn test_unused_keys_point_at_property_name() {
        let en = "{\n  \"messages\": {\n    \"hello\": \"Hello\",\n    \"bye\": \"Bye\"\n  }\n}";
        let issues = check_unused_keys(
            &keys(&["messages.hello"]),
            &messages(&[("en.json", LocaleKeyMode::File, en)]),
        );

        assert_eq!(
            summary(&issues),
            vec!["locales/en.json:4:5 en messages.bye \"Bye\""]
        );
    }

    #[test]
    fn test_nothing_used_reports_every_leaf() {
        let en = r#"{"messages":{"hello":"hi","bye":"bye"}}"#;
        let issues = check_unused_keys(
            &KeySet::new(),
            &messages(&[("en.json", LocaleKeyMode::File, en)]),
        );
        let keys: Vec<&str> = issues.iter().map(|i| i.context.key.as_str()).collect();
        assert_eq!(keys, vec!["messages.bye", "messages.hello"]);
    }

    #[test]
    fn test_key_mode_reports_relative_key() {
        let combined = "{\n  \"en\": { \"hello\": \"Hello\", \"bye\": \"Bye\" },\n  \"ja\": { \"hello\": \"こんにちは\" }\n}";
        let issues = check_unused_keys(
            &keys(&["hello"]),
            &messages(&[("messages.json", LocaleKeyMode::Key, combined)]),
        );

        assert_eq!(
            summary(&issues),
            vec!["locales/messages.json:2:29 en bye \"Bye\""]
        );
    }

    #[test]
    fn test_shape_conflicts_are_not_unused() {
        let en = r#"{"a":{"b":"x"}}"#;
        let issues = check_unused_keys(
            &keys(&["a"]),
            &messages(&[("en.json", LocaleKeyMode::File, en)]),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_array_values_are_shown_as_json() {
        let en = r#"{"list":["one","two"]}"#;
        let issues = check_unused_keys(
            &KeySet::new(),
            &messages(&[("en.json", LocaleKeyMode::File, en)]),
        );
        assert_eq!(issues[0].context.value, r#"["one","two"]"#);
        assert_eq!(issues[0].context.col(), 2);
    }
}
