//! Locale tree model.
//!
//! Loads the configured locale sources into `LocaleMessage`s, one per physical
//! file, and answers which file holds which locale. Two layouts are supported:
//!
//! - `file` mode: `locales/en.json`, `locales/ja.json`, one locale per file,
//!   named by the file stem
//! - `key` mode: a single file whose top-level keys are locale identifiers,
//!   e.g. `{"en": {...}, "ja": {...}}`

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{
    CheckError,
    parsers::json::JsonDocument,
    utils::{display_path, normalize_path, resolve_path},
};

/// How a locale file maps to locale identifiers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LocaleKeyMode {
    /// The file stem is the locale (`en.json` → `en`).
    #[default]
    File,
    /// Top-level keys of the file are the locales.
    Key,
}

/// One configured locale-data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleMessageSource {
    /// Glob pattern, relative to the project root unless absolute.
    pub pattern: String,
    pub locale_key: LocaleKeyMode,
}

impl LocaleMessageSource {
    pub fn new(pattern: impl Into<String>, locale_key: LocaleKeyMode) -> Self {
        Self {
            pattern: pattern.into(),
            locale_key,
        }
    }
}

/// A physical locale file bound to the locales it provides.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleMessage {
    /// Normalized path used for lookups.
    pub path: PathBuf,
    /// Path relative to the project root, for reports.
    pub display_path: String,
    pub locale_key: LocaleKeyMode,
    pub locales: Vec<String>,
    /// Raw file text, kept for position lookups.
    pub text: String,
    pub messages: Value,
}

impl LocaleMessage {
    /// Build from file content. Fails when the text is not valid JSON.
    pub fn from_text(
        path: PathBuf,
        display_path: String,
        locale_key: LocaleKeyMode,
        text: String,
    ) -> Result<Self, CheckError> {
        let messages = JsonDocument::parse(&text)
            .map_err(|e| CheckError::parse(display_path.clone(), e.to_string()))?
            .to_value();

        let locales = match locale_key {
            LocaleKeyMode::File => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| vec![s.to_string()])
                .unwrap_or_default(),
            LocaleKeyMode::Key => messages
                .as_object()
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default(),
        };

        Ok(Self {
            path: normalize_path(&path),
            display_path,
            locale_key,
            locales,
            text,
            messages,
        })
    }
}

/// Every locale file loaded for one run, plus the per-file load errors.
#[derive(Debug, Default)]
pub struct LocaleMessages {
    sources: Vec<LocaleMessageSource>,
    messages: Vec<LocaleMessage>,
    errors: Vec<CheckError>,
}

impl LocaleMessages {
    /// Expand each source pattern under `root` and load the matching files.
    ///
    /// A file that cannot be read or parsed is recorded in `errors()` and
    /// skipped; the remaining files load normally.
    pub fn load(root: &Path, sources: &[LocaleMessageSource]) -> Self {
        let mut result = LocaleMessages {
            sources: sources.to_vec(),
            ..Default::default()
        };
        let mut seen: BTreeSet<PathBuf> = BTreeSet::new();

        for source in sources {
            let full_pattern = resolve_path(root, &source.pattern);
            let paths = match glob::glob(&full_pattern.to_string_lossy()) {
                Ok(paths) => paths,
                Err(e) => {
                    result.errors.push(CheckError::Configuration(format!(
                        "Invalid locale pattern '{}': {}",
                        source.pattern, e
                    )));
                    continue;
                }
            };

            for entry in paths {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("cannot access locale path: {}", e);
                        continue;
                    }
                };
                if !path.is_file() || !seen.insert(normalize_path(&path)) {
                    continue;
                }
                let shown = display_path(root, &path);
                let loaded = fs::read_to_string(&path)
                    .map_err(|e| CheckError::parse(shown.clone(), e.to_string()))
                    .and_then(|text| {
                        LocaleMessage::from_text(path.clone(), shown.clone(), source.locale_key, text)
                    });
                match loaded {
                    Ok(message) => {
                        debug!(
                            "loaded locale file {} ({})",
                            message.display_path,
                            message.locales.join(", ")
                        );
                        result.messages.push(message);
                    }
                    Err(e) => {
                        debug!("failed to load locale file: {}", e);
                        result.errors.push(e);
                    }
                }
            }
        }

        result
    }

    /// Build directly from already-loaded messages.
    pub fn from_messages(sources: Vec<LocaleMessageSource>, messages: Vec<LocaleMessage>) -> Self {
        Self {
            sources,
            messages,
            errors: Vec::new(),
        }
    }

    /// Fail when nothing is configured or no locale could be resolved.
    ///
    /// Matched files that all failed to load are not a configuration error;
    /// each of them is already in `errors()`.
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.sources.is_empty() {
            return Err(CheckError::no_locale_source());
        }
        let has_unloadable_files = self
            .errors
            .iter()
            .any(|e| matches!(e, CheckError::Parse { .. }));
        if self.locales().is_empty() && !has_unloadable_files {
            let patterns: Vec<&str> = self.sources.iter().map(|s| s.pattern.as_str()).collect();
            return Err(CheckError::Configuration(format!(
                "No locale messages found for '{}'",
                patterns.join("', '")
            )));
        }
        Ok(())
    }

    /// The locale file at `path`, if it is one.
    ///
    /// Errors only when no locale source is configured; a path that simply is
    /// not a locale file yields `Ok(None)`.
    pub fn find_locale_message_for(&self, path: &Path) -> Result<Option<&LocaleMessage>, CheckError> {
        if self.sources.is_empty() {
            return Err(CheckError::no_locale_source());
        }
        let path = normalize_path(path);
        Ok(self.messages.iter().find(|message| {
            if message.path != path {
                return false;
            }
            match message.locale_key {
                LocaleKeyMode::File => path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| message.locales.iter().any(|l| l == stem)),
                LocaleKeyMode::Key => true,
            }
        }))
    }

    /// All locale identifiers across every loaded file.
    pub fn locales(&self) -> BTreeSet<&str> {
        self.messages
            .iter()
            .flat_map(|m| m.locales.iter().map(String::as_str))
            .collect()
    }

    pub fn messages(&self) -> &[LocaleMessage] {
        &self.messages
    }

    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }
}
