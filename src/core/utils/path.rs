use std::path::{Component, Path, PathBuf};

/// Drop `.` components so `./locales/en.json` and `locales/en.json` compare equal.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Path relative to `root` with forward slashes, for stable report output.
pub fn display_path(root: &Path, path: &Path) -> String {
    let root = normalize_path(root);
    let path = normalize_path(path);
    let relative = path.strip_prefix(&root).unwrap_or(&path);
    let shown = relative.to_string_lossy().replace('\\', "/");
    if shown.is_empty() {
        ".".to_string()
    } else {
        shown
    }
}

/// Join `rel` onto `root` unless it is already absolute.
pub fn resolve_path(root: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        let joined = normalize_path(&root.join(p));
        if joined.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            joined
        }
    }
}
