//! Path utilities.
//!
//! This module provides utilities for working with file paths.

use std::path::{Component, Path, PathBuf};

/// Get the snapvc configuration directory.
///
/// This follows XDG conventions on Linux/macOS:
/// - `$XDG_CONFIG_HOME/snapvc` if set
/// - `~/.config/snapvc` otherwise
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("snapvc"))
}

/// Check if a path is `base` itself or lies beneath it.
///
/// The comparison is lexical and component-wise, so `/repo/.store-notes` is
/// not within `/repo/.store`. Neither path needs to exist.
pub fn is_within(path: &Path, base: &Path) -> bool {
    normalize(path).starts_with(normalize(base))
}

/// Normalize a path by removing `.` and `..` components.
///
/// Unlike `canonicalize`, this doesn't require the path to exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            _ => {
                result.push(component);
            }
        }
    }

    result
}

/// Make a path relative to a base directory.
///
/// Returns `None` if the path is not within the base directory.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Check that a path is non-empty, relative, and made only of normal
/// components, so that joining it onto a base can never leave the base.
pub fn is_safe_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return false;
    }
    components.all(|c| matches!(c, Component::Normal(_)))
}

/// Join a relative path onto a base, refusing anything that could escape it.
pub fn safe_join(base: &Path, path: &Path) -> Option<PathBuf> {
    is_safe_relative(path).then(|| base.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        if let Some(dir) = config_dir() {
            assert!(dir.ends_with("snapvc"));
        }
    }

    #[test]
    fn test_is_within() {
        let base = Path::new("/home/user/project/.snapvc");
        assert!(is_within(Path::new("/home/user/project/.snapvc"), base));
        assert!(is_within(Path::new("/home/user/project/.snapvc/abc.json"), base));
        assert!(!is_within(Path::new("/home/user/project/src"), base));
    }

    #[test]
    fn test_is_within_is_not_substring_match() {
        let base = Path::new("/repo/.snapvc");
        assert!(!is_within(Path::new("/repo/.snapvc-notes/a.txt"), base));
        assert!(!is_within(Path::new("/repo/docs/.snapvc.md"), base));
        assert!(!is_within(Path::new("/repo/nested/.snapvc/file"), base));
    }

    #[test]
    fn test_normalize() {
        let path = Path::new("/home/user/./project/../project/src");
        let normalized = normalize(path);
        assert_eq!(normalized, PathBuf::from("/home/user/project/src"));
    }

    #[test]
    fn test_relative_to() {
        let base = Path::new("/home/user/project");
        let path = Path::new("/home/user/project/src/main.rs");
        let relative = relative_to(path, base);
        assert_eq!(relative, Some(PathBuf::from("src/main.rs")));
        assert_eq!(relative_to(Path::new("/etc/passwd"), base), None);
    }

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative(Path::new("src/main.rs")));
        assert!(is_safe_relative(Path::new(".snapvc")));
        assert!(!is_safe_relative(Path::new("")));
        assert!(!is_safe_relative(Path::new("/etc/passwd")));
        assert!(!is_safe_relative(Path::new("../outside")));
        assert!(!is_safe_relative(Path::new("src/../../outside")));
        assert!(!is_safe_relative(Path::new("./src")));
    }

    #[test]
    fn test_safe_join() {
        let base = PathBuf::from("/home/user/project");

        let result = safe_join(&base, Path::new("src/main.rs"));
        assert_eq!(result, Some(PathBuf::from("/home/user/project/src/main.rs")));

        let result = safe_join(&base, Path::new("../../../etc/passwd"));
        assert!(result.is_none());
    }
}
