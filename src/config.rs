use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{LocaleKeyMode, LocaleMessageSource};

pub const CONFIG_FILE_NAME: &str = ".keycheckrc.json";

/// `localeDir` as written in the config file.
///
/// Accepts a glob (`"./locales/*.json"`), an object with an explicit
/// `localeKey`, or a list mixing both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LocaleDirConfig {
    One(LocaleDirEntry),
    Many(Vec<LocaleDirEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LocaleDirEntry {
    Pattern(String),
    Source(LocaleSourceConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocaleSourceConfig {
    pub pattern: String,
    #[serde(default)]
    pub locale_key: LocaleKeyMode,
}

impl LocaleDirEntry {
    fn to_source(&self) -> LocaleMessageSource {
        match self {
            LocaleDirEntry::Pattern(pattern) => {
                LocaleMessageSource::new(pattern.clone(), LocaleKeyMode::File)
            }
            LocaleDirEntry::Source(source) => {
                LocaleMessageSource::new(source.pattern.clone(), source.locale_key)
            }
        }
    }
}

impl LocaleDirConfig {
    pub fn sources(&self) -> Vec<LocaleMessageSource> {
        match self {
            LocaleDirConfig::One(entry) => vec![entry.to_source()],
            LocaleDirConfig::Many(entries) => entries.iter().map(LocaleDirEntry::to_source).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_dir: Option<LocaleDirConfig>,
    #[serde(default = "default_src")]
    pub src: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_translation_functions")]
    pub translation_functions: Vec<String>,
}

fn default_src() -> String {
    ".".to_string()
}

fn default_extensions() -> Vec<String> {
    [".js", ".vue"].map(String::from).to_vec()
}

fn default_ignores() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}

fn default_translation_functions() -> Vec<String> {
    ["$t", "t", "$tc", "tc"].map(String::from).to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale_dir: None,
            src: default_src(),
            extensions: default_extensions(),
            ignores: default_ignores(),
            translation_functions: default_translation_functions(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern in `ignores` or `localeDir` is
    /// invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for source in self.locale_sources() {
            Pattern::new(&source.pattern).with_context(|| {
                format!("Invalid glob pattern in 'localeDir': \"{}\"", source.pattern)
            })?;
        }

        Ok(())
    }

    /// Configured locale sources; empty when `localeDir` is not set.
    pub fn locale_sources(&self) -> Vec<LocaleMessageSource> {
        self.locale_dir
            .as_ref()
            .map(LocaleDirConfig::sources)
            .unwrap_or_default()
    }
}

/// The config `keycheck init` writes: defaults plus a `./locales/*.json`
/// locale source.
pub fn default_config_json() -> Result<String> {
    let config = Config {
        locale_dir: Some(LocaleDirConfig::One(LocaleDirEntry::Pattern(
            "./locales/*.json".to_string(),
        ))),
        ..Default::default()
    };
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Where the config came from; `None` when using defaults.
    pub path: Option<PathBuf>,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
