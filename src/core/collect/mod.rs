//! Used-key collection.
//!
//! Scans the configured source tree and extracts every statically known key
//! reference, together with where it appears. Script files go through the
//! swc visitor in [`script`], Vue files through [`vue`]. Keys referenced from
//! inside locale messages (`@:key`) are found by [`linked`].

pub mod files;
pub mod linked;
pub mod script;
pub mod vue;

use std::{cell::OnceCell, collections::BTreeSet, fs, path::Path};

use tracing::{debug, warn};

use crate::core::{
    CheckError, SourceContext,
    parsers::script::ScriptLang,
    utils::{display_path, resolve_path},
};

pub use files::{ScanResult, scan_files};
pub use linked::{collect_linked_keys, linked_keys_in};

/// One statically resolved key reference in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsage {
    pub key: String,
    pub context: SourceContext,
}

/// What to scan and which calls count as translations.
#[derive(Debug, Clone)]
pub struct CollectOptions<'a> {
    pub root: &'a Path,
    /// Scan root, relative to `root` unless absolute.
    pub src: &'a str,
    pub extensions: &'a [String],
    pub ignores: &'a [String],
    pub functions: &'a [String],
}

/// Aggregate of every key usage found in one run.
#[derive(Debug, Clone, Default)]
pub struct UsedKeys {
    keys: BTreeSet<String>,
    usages: Vec<KeyUsage>,
    errors: Vec<CheckError>,
    files_scanned: usize,
}

impl UsedKeys {
    pub fn from_usages(usages: Vec<KeyUsage>) -> Self {
        let keys = usages.iter().map(|u| u.key.clone()).collect();
        Self {
            keys,
            usages,
            errors: Vec::new(),
            files_scanned: 0,
        }
    }

    /// Distinct keys, sorted.
    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    /// Every usage in scan order: files sorted by path, usages by position.
    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    /// Files that could not be read or parsed.
    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }
}

/// Scan the source tree and collect every key usage.
///
/// A file that fails to read or parse is recorded in `errors()` and
/// contributes no keys.
pub fn collect_used_keys(options: &CollectOptions) -> UsedKeys {
    let src_dir = resolve_path(options.root, options.src);
    let scan = scan_files(options.root, &src_dir, options.extensions, options.ignores);

    if scan.skipped_count > 0 {
        warn!("{} paths under {} could not be read", scan.skipped_count, src_dir.display());
    }

    let mut used = UsedKeys {
        files_scanned: scan.files.len(),
        ..Default::default()
    };

    for path in &scan.files {
        let file_path = display_path(options.root, path);
        match collect_file_usages(path, &file_path, options.functions) {
            Ok(usages) => {
                debug!("{}: {} key usages", file_path, usages.len());
                used.keys.extend(usages.iter().map(|u| u.key.clone()));
                used.usages.extend(usages);
            }
            Err(e) => {
                debug!("skipping {}: {}", file_path, e);
                used.errors.push(e);
            }
        }
    }

    used
}

/// Read one file and collect its usages. `file_path` is the reported path.
pub fn collect_file_usages(
    path: &Path,
    file_path: &str,
    functions: &[String],
) -> Result<Vec<KeyUsage>, CheckError> {
    let text =
        fs::read_to_string(path).map_err(|e| CheckError::parse(file_path, e.to_string()))?;
    collect_text_usages(&text, file_path, functions)
}

/// Collect usages from file content. The dialect follows `file_path`'s
/// extension.
pub fn collect_text_usages(
    text: &str,
    file_path: &str,
    functions: &[String],
) -> Result<Vec<KeyUsage>, CheckError> {
    let ext = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "vue" => vue::collect_vue_usages(text, file_path, functions),
        _ => script::collect_script_usages(
            text,
            file_path,
            ScriptLang::from_extension(ext),
            functions,
        ),
    }
}

/// Run-scoped cache of the used-key aggregate.
///
/// The scan runs at most once however many rules ask for it.
#[derive(Debug, Default)]
pub struct UsedKeyCache {
    used: OnceCell<UsedKeys>,
}

impl UsedKeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_collect(&self, collect: impl FnOnce() -> UsedKeys) -> &UsedKeys {
        self.used.get_or_init(collect)
    }

    pub fn get(&self) -> Option<&UsedKeys> {
        self.used.get()
    }

    /// Drop the cached aggregate so the next access scans again.
    pub fn clear(&mut self) {
        self.used = OnceCell::new();
    }
}
