// src/paths/path_utils.rs

use std::path::{Path, PathBuf};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    // macOS reports watcher events under /private/var/... for /var/... roots.
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_slash(rel));
        }
    }

    None
}

pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Replace the extension of `rel`, e.g. `logo.png` -> `logo.webp`.
pub fn with_extension(rel: &Path, ext: &str) -> PathBuf {
    rel.with_extension(ext.trim_start_matches('.'))
}

/// Insert `suffix` before the extension and optionally swap the extension,
/// e.g. `app.js` + `.min` -> `app.min.js`.
pub fn with_suffix(rel: &Path, suffix: &str, extname: Option<&str>) -> PathBuf {
    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = match extname {
        Some(ext) => ext.trim_start_matches('.').to_string(),
        None => rel
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let file_name = if ext.is_empty() {
        format!("{stem}{suffix}")
    } else {
        format!("{stem}{suffix}.{ext}")
    };
    rel.with_file_name(file_name)
}
