use std::path::{Path, PathBuf};

/// Resolves `arg` against the logical directory `current_dir`.
///
/// Absolute arguments start from `/`. Returns `None` when `..` would climb
/// above the root.
pub fn resolve_path(current_dir: &str, arg: &str) -> Option<String> {
    let mut parts: Vec<&str> = if arg.starts_with('/') {
        Vec::new()
    } else {
        current_dir.split('/').filter(|p| !p.is_empty()).collect()
    };

    for component in arg.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            name => parts.push(name),
        }
    }

    Some(format!("/{}", parts.join("/")))
}

/// Maps a normalized logical path onto the filesystem below `base_path`.
pub fn construct_path(base_path: &Path, logical: &str) -> PathBuf {
    let relative = logical.trim_start_matches('/');
    if relative.is_empty() {
        base_path.to_path_buf()
    } else {
        base_path.join(relative)
    }
}

/// Checks that `path`, or its parent when it does not exist yet, lives under
/// the canonical `base_path` once symlinks are resolved.
pub fn is_within_root(base_path: &Path, path: &Path) -> bool {
    let checked = if path.exists() {
        path
    } else {
        match path.parent() {
            Some(parent) => parent,
            None => return false,
        }
    };
    checked
        .canonicalize()
        .map(|resolved| resolved.starts_with(base_path))
        .unwrap_or(false)
}

/// Resolves a command argument to a filesystem path inside the root.
pub fn resolve_fs_path(base_path: &Path, current_dir: &str, arg: &str) -> Option<PathBuf> {
    let logical = resolve_path(current_dir, arg)?;
    let path = construct_path(base_path, &logical);
    is_within_root(base_path, &path).then_some(path)
}

/// Last component of a slash separated name.
pub fn file_name(arg: &str) -> &str {
    arg.rsplit('/').find(|p| !p.is_empty()).unwrap_or(arg)
}
