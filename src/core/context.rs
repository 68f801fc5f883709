//! Per-run analysis state.
//!
//! `CheckContext` owns the resolved configuration and lazily builds what the
//! rules share: the loaded locale files, the used-key aggregate and the keys
//! referenced from inside locale messages. Each is computed at most once.

use std::{cell::OnceCell, path::PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::{
        CheckError, LocaleKeyMode, LocaleMessageSource, LocaleMessages,
        collect::{CollectOptions, UsedKeyCache, UsedKeys, collect_linked_keys, collect_used_keys},
        diff::KeySet,
        utils::display_path,
    },
};

pub struct CheckContext {
    pub config: Config,
    pub root_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    locale_sources: Vec<LocaleMessageSource>,
    locale_messages: OnceCell<LocaleMessages>,
    used_keys: UsedKeyCache,
    linked_keys: OnceCell<KeySet>,
}

impl CheckContext {
    /// Load config from `--root` and apply command-line overrides.
    pub fn new(common: &CommonArgs) -> Result<Self> {
        let root_dir = common.root.clone();
        let loaded = load_config(&root_dir)?;
        match &loaded.path {
            Some(path) => debug!("using config {}", path.display()),
            None => debug!("no config file found, using defaults"),
        }

        let mut config = loaded.config;
        if let Some(src) = &common.src {
            config.src = src.clone();
        }
        if !common.extensions.is_empty() {
            config.extensions = common.extensions.clone();
        }

        let mut locale_sources = match &common.locale_dir {
            Some(pattern) => vec![LocaleMessageSource::new(pattern.clone(), LocaleKeyMode::default())],
            None => config.locale_sources(),
        };
        if let Some(mode) = common.locale_key {
            for source in &mut locale_sources {
                source.locale_key = mode;
            }
        }

        let mut ctx = Self::with_config(root_dir, config);
        ctx.config_path = loaded.path;
        ctx.locale_sources = locale_sources;
        Ok(ctx)
    }

    /// Context over an explicit config, with locale sources taken from it.
    pub fn with_config(root_dir: impl Into<PathBuf>, config: Config) -> Self {
        let locale_sources = config.locale_sources();
        Self {
            config,
            root_dir: root_dir.into(),
            config_path: None,
            locale_sources,
            locale_messages: OnceCell::new(),
            used_keys: UsedKeyCache::new(),
            linked_keys: OnceCell::new(),
        }
    }

    pub fn locale_sources(&self) -> &[LocaleMessageSource] {
        &self.locale_sources
    }

    pub fn locale_messages(&self) -> &LocaleMessages {
        self.locale_messages
            .get_or_init(|| LocaleMessages::load(&self.root_dir, &self.locale_sources))
    }

    /// The configuration problem that stops locale analysis, if any.
    pub fn config_error(&self) -> Option<CheckError> {
        self.locale_messages().validate().err()
    }

    pub fn used_keys(&self) -> &UsedKeys {
        self.used_keys.get_or_collect(|| {
            collect_used_keys(&CollectOptions {
                root: &self.root_dir,
                src: &self.config.src,
                extensions: &self.config.extensions,
                ignores: &self.config.ignores,
                functions: &self.config.translation_functions,
            })
        })
    }

    /// The used-key aggregate if a rule already scanned the sources.
    pub fn scanned_used_keys(&self) -> Option<&UsedKeys> {
        self.used_keys.get()
    }

    /// Keys referenced by `@:key` links inside any locale message.
    pub fn linked_keys(&self) -> &KeySet {
        self.linked_keys.get_or_init(|| {
            let mut keys = KeySet::new();
            for message in self.locale_messages().messages() {
                collect_linked_keys(&message.messages, &mut keys);
            }
            keys
        })
    }

    /// Keys a locale file is expected to define: used keys plus linked keys.
    pub fn expected_keys(&self) -> KeySet {
        self.used_keys()
            .keys()
            .iter()
            .chain(self.linked_keys())
            .cloned()
            .collect()
    }

    /// Where configuration diagnostics are reported: the config file, or `.`.
    pub fn config_display_path(&self) -> String {
        self.config_path
            .as_deref()
            .map(|path| display_path(&self.root_dir, path))
            .unwrap_or_else(|| ".".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::config::{CONFIG_FILE_NAME, LocaleDirConfig, LocaleDirEntry};

    fn common(root: &std::path::Path) -> CommonArgs {
        CommonArgs {
            root: root.to_path_buf(),
            locale_dir: None,
            locale_key: None,
            src: None,
            extensions: Vec::new(),
            verbose: false,
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "localeDir": "locales/*.json", "src": "src" }"#,
        )
        .unwrap();

        let args = CommonArgs {
            locale_dir: Some("i18n/messages.json".to_string()),
            locale_key: Some(LocaleKeyMode::Key),
            extensions: vec![".ts".to_string()],
            ..common(dir.path())
        };
        let ctx = CheckContext::new(&args).unwrap();

        assert_eq!(
            ctx.locale_sources(),
            &[LocaleMessageSource::new("i18n/messages.json", LocaleKeyMode::Key)]
        );
        assert_eq!(ctx.config.src, "src");
        assert_eq!(ctx.config.extensions, vec![".ts"]);
        assert_eq!(ctx.config_display_path(), CONFIG_FILE_NAME);
    }

    #[test]
    fn test_missing_locale_source_is_config_error() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let ctx = CheckContext::new(&common(dir.path())).unwrap();
        assert_eq!(ctx.config_error(), Some(CheckError::no_locale_source()));
        assert_eq!(ctx.config_display_path(), ".");
    }

    #[test]
    fn test_expected_keys_include_linked() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("locales")).unwrap();
        fs::write(
            dir.path().join("locales/en.json"),
            r#"{ "a": "@:b", "b": "value", "c": "x" }"#,
        )
        .unwrap();
        fs::write(dir.path().join("main.js"), "t('a')").unwrap();

        let config = Config {
            locale_dir: Some(LocaleDirConfig::One(LocaleDirEntry::Pattern(
                "locales/*.json".to_string(),
            ))),
            ..Default::default()
        };
        let ctx = CheckContext::with_config(dir.path(), config);

        assert!(ctx.config_error().is_none());
        assert_eq!(
            ctx.expected_keys().into_iter().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(ctx.used_keys().files_scanned(), 1);
    }
}
