use std::path::{Path, PathBuf};

/// Expand a leading tilde (~) to the current user's home directory.
///
/// Supports `~` and `~/path`; anything else passes through unchanged.
/// Returns `None` only when expansion is required but `HOME` is unset.
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_str()?;

    if !path_str.starts_with('~') {
        return Some(path.to_path_buf());
    }

    let after_tilde = &path_str[1..];
    if after_tilde.is_empty() || after_tilde.starts_with('/') {
        let home = std::env::var("HOME").ok()?;
        return Some(PathBuf::from(home).join(after_tilde.trim_start_matches('/')));
    }

    // ~username expansion is not supported; leave the path as written.
    Some(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_expand_tilde_current_user() {
        let home = env::var("HOME").unwrap();

        let expanded = expand_tilde("~").unwrap();
        assert_eq!(expanded, PathBuf::from(&home));

        let expanded = expand_tilde("~/templates").unwrap();
        assert_eq!(expanded, PathBuf::from(format!("{}/templates", home)));
    }

    #[test]
    fn test_expand_tilde_no_tilde() {
        let expanded = expand_tilde("/absolute/path").unwrap();
        assert_eq!(expanded, PathBuf::from("/absolute/path"));

        let expanded = expand_tilde("relative/path").unwrap();
        assert_eq!(expanded, PathBuf::from("relative/path"));
    }

    #[test]
    #[serial_test::serial]
    fn test_expand_tilde_no_home_env() {
        let original_home = env::var("HOME").ok();
        env::remove_var("HOME");

        let expanded = expand_tilde("~/file");
        assert!(expanded.is_none());

        if let Some(home) = original_home {
            env::set_var("HOME", home);
        }
    }

    #[test]
    fn test_expand_tilde_mid_path_not_expanded() {
        let expanded = expand_tilde("/path/~user/file").unwrap();
        assert_eq!(expanded, PathBuf::from("/path/~user/file"));
    }
}
