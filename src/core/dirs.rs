use crate::core::error::{RepoScoutError, Result};
use std::path::PathBuf;

/// Environment override for the data directory, used by tests and scripting.
pub const DATA_DIR_ENV: &str = "REPO_SCOUT_DATA_DIR";

pub fn get_data_directory() -> Result<PathBuf> {
    if let Ok(override_dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(override_dir));
    }

    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_default()
                    .join(".local/share")
            }),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        "windows" => dirs::data_dir().unwrap_or_default(),
        _ => dirs::data_dir().ok_or(RepoScoutError::DataDirectoryNotFound)?,
    };

    Ok(base.join("repo-scout"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        std::env::set_var(DATA_DIR_ENV, "/tmp/repo-scout-test-data");
        let dir = get_data_directory().unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/repo-scout-test-data"));
        std::env::remove_var(DATA_DIR_ENV);

        let dir = get_data_directory().unwrap();
        assert!(dir.ends_with("repo-scout"));
    }
}
