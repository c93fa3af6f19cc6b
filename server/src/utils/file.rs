//! Filesystem path helpers

use std::path::PathBuf;

/// Expand a leading `~` to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base) = directories::BaseDirs::new()
    {
        return base.home_dir().join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/tmp/x"), PathBuf::from("/tmp/x"));
        assert_eq!(expand_path("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/data");
        assert!(expanded.ends_with("data"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
