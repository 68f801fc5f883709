use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::Pattern;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::utils::{display_path, normalize_path};

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning the source tree.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Matching files, sorted.
    pub files: Vec<PathBuf>,
    pub skipped_count: usize,
}

/// Walk `src_dir` and return every file whose name ends with one of
/// `extensions`, minus anything matched by `ignores`.
///
/// Ignore globs are matched against both the absolute path and the path
/// relative to `root`. Ignores without wildcards are literal path prefixes
/// relative to `root`.
pub fn scan_files(
    root: &Path,
    src_dir: &Path,
    extensions: &[String],
    ignores: &[String],
) -> ScanResult {
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignores {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => warn!("invalid ignore pattern '{}': {}", p, e),
            }
        } else {
            literal_ignore_paths.push(normalize_path(&root.join(p)));
        }
    }

    let suffixes: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();

    for entry in WalkDir::new(src_dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                skipped_count += 1;
                warn!("cannot access path: {}", e);
                continue;
            }
        };
        let path = entry.path();
        let normalized = normalize_path(path);

        if literal_ignore_paths
            .iter()
            .any(|ignore_path| normalized.starts_with(ignore_path))
        {
            continue;
        }

        let absolute = path.to_string_lossy();
        let relative = display_path(root, path);
        if glob_patterns
            .iter()
            .any(|p| p.matches(&absolute) || p.matches(&relative))
        {
            continue;
        }

        if entry.file_type().is_file() && has_extension(path, &suffixes) {
            files.insert(path.to_path_buf());
        }
    }

    debug!("scanned {} source files under {}", files.len(), src_dir.display());

    ScanResult {
        files: files.into_iter().collect(),
        skipped_count,
    }
}

/// `vue` and `.vue` both mean "ends with `.vue`".
fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

fn has_extension(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| suffixes.iter().any(|s| name.ends_with(s.as_str())))
}
