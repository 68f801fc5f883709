//! Missing translation key detection rule.
//!
//! A used key is missing from a locale when none of the files providing that
//! locale defines it. A locale split across several files only needs the key
//! in one of them.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    core::{CheckContext, LocaleMessages, UsedKeys, diff::missing_keys},
    issues::MissingKeyIssue,
};

pub fn check_missing_keys_issues(ctx: &CheckContext) -> Vec<MissingKeyIssue> {
    if ctx.config_error().is_some() {
        return Vec::new();
    }
    check_missing_keys(ctx.used_keys(), ctx.locale_messages())
}

/// One issue per (usage, locale) where the locale lacks the used key.
pub fn check_missing_keys(used: &UsedKeys, messages: &LocaleMessages) -> Vec<MissingKeyIssue> {
    let mut missing_by_locale: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();

    for message in messages.messages() {
        let mut missing: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for finding in missing_keys(used.keys(), message) {
            missing.entry(finding.locale).or_default().insert(finding.key);
        }

        for locale in &message.locales {
            let here = missing.remove(locale).unwrap_or_default();
            missing_by_locale
                .entry(locale.as_str())
                .and_modify(|keys| keys.retain(|k| here.contains(k)))
                .or_insert(here);
        }
    }

    let mut issues = Vec::new();
    for usage in used.usages() {
        for (locale, keys) in &missing_by_locale {
            if keys.contains(&usage.key) {
                issues.push(MissingKeyIssue {
                    context: usage.context.clone(),
                    key: usage.key.clone(),
                    locale: locale.to_string(),
                });
            }
        }
    }

    issues
}
