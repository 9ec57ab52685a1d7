//! Path resolution for folio's local data.
//!
//! XDG-compliant, with an explicit override taking precedence.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "folio";
const STORE_FILE: &str = "working-copy.json";

/// Data directory for folio.
///
/// Resolution order:
/// 1. `override_dir` (from `--data-dir` / `FOLIO_DATA_DIR`)
/// 2. `$XDG_DATA_HOME/folio`
/// 3. `$HOME/.local/share/folio`
/// 4. `./.folio` when neither variable is set
pub fn get_data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir;
    }

    env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share"))
        })
        .map(|base| base.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".folio"))
}

/// Working-copy file inside the data directory.
pub fn get_store_path(override_dir: Option<PathBuf>) -> PathBuf {
    get_data_dir(override_dir).join(STORE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = PathBuf::from("/tmp/custom-folio");
        assert_eq!(get_data_dir(Some(dir.clone())), dir);
    }

    #[test]
    fn test_default_ends_with_app_dir() {
        // Env vars are unreliable in parallel tests; only check the suffix.
        let path = get_data_dir(None);
        assert!(path.ends_with("folio") || path.ends_with(".folio"));
    }

    #[test]
    fn test_store_path_ends_with_file_name() {
        let path = get_store_path(Some(PathBuf::from("/tmp/x")));
        assert_eq!(path, PathBuf::from("/tmp/x/working-copy.json"));
    }
}
