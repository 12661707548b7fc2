//! Session history: the full editor buffer, one plain-text file per directory.
//!
//! Persistence is best effort. Read and write failures are logged and
//! swallowed so the session always starts and always exits cleanly.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// History file for `cwd` under `home`: `<home>/.<sha256(cwd)>.replo`.
pub fn history_file_path(home: &Path, cwd: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(cwd.as_os_str().as_encoded_bytes());
    let digest = hex::encode(hasher.finalize());
    home.join(format!(".{digest}.replo"))
}

/// Default history path for the current process, or `None` when the working
/// directory or home directory cannot be resolved.
pub fn default_history_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let home = dirs::home_dir()?;
    Some(history_file_path(&home, &cwd))
}

/// Read the saved buffer, if there is one.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn load_buffer(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let contents = match String::from_utf8(bytes) {
                Ok(contents) => contents,
                Err(err) => {
                    warn!(path = %path.display(), "history is not valid UTF-8, replacing bad bytes");
                    String::from_utf8_lossy(err.as_bytes()).into_owned()
                }
            };
            debug!(path = %path.display(), bytes = contents.len(), "history loaded");
            Some(contents)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no history file");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), err = %err, "failed to read history");
            None
        }
    }
}

/// Overwrite the history file with `buffer`.
pub fn save_buffer(path: &Path, buffer: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create history dir {}", parent.display()))?;
    }
    fs::write(path, buffer).with_context(|| format!("write history {}", path.display()))?;
    debug!(path = %path.display(), bytes = buffer.len(), "history saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_path_is_stable_per_directory() {
        let home = Path::new("/home/gopher");
        let a = history_file_path(home, Path::new("/work/a"));
        let again = history_file_path(home, Path::new("/work/a"));
        let b = history_file_path(home, Path::new("/work/b"));
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(home));
        let name = a.file_name().and_then(|n| n.to_str()).expect("file name");
        assert!(name.starts_with('.'));
        assert!(name.ends_with(".replo"));
        assert_eq!(name.len(), 1 + 64 + ".replo".len());
    }

    #[test]
    fn missing_history_loads_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_buffer(&temp.path().join("none.replo")), None);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("h.replo");
        save_buffer(&path, "first\nsecond\n").expect("save");
        save_buffer(&path, "third").expect("save");
        assert_eq!(load_buffer(&path).as_deref(), Some("third"));
    }

    #[test]
    fn non_utf8_history_still_loads() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("h.replo");
        fs::write(&path, b"x := 1\ns := \"\xff\"\n").expect("write");
        assert_eq!(
            load_buffer(&path).as_deref(),
            Some("x := 1\ns := \"\u{FFFD}\"\n")
        );
    }

    #[test]
    fn save_creates_parent_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("a").join("b").join("h.replo");
        save_buffer(&path, "x := 1").expect("save");
        assert!(path.exists());
    }
}
