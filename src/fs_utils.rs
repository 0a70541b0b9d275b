//! Filesystem utility functions
//!
//! Write helpers shared by the config store and the SSH config merger.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

/// Write a file atomically: write to a sibling temp file, then rename.
///
/// A reader never observes a partially written file, even if the process
/// dies half-way through the write.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;

    let mut temp_name = path.file_name().map(OsString::from).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content).map_err(|e| Error::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
}

/// Write a file in place, creating it with mode 0600 on Unix if it does not exist.
///
/// Existing files keep their mode, owner and any symlink pointing at them.
pub fn write_private(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| Error::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))?;
    file.sync_all().map_err(|e| Error::io(path, e))
}

/// `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

/// Copy `path` byte-for-byte to `<path>.backup`, overwriting any earlier backup.
///
/// Returns the backup location, or `None` when there was nothing to back up.
pub fn backup_file(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let backup = backup_path(path);
    fs::copy(path, &backup).map_err(|e| Error::io(&backup, e))?;
    tracing::debug!(from = %path.display(), to = %backup.display(), "backup written");
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/config.json");

        atomic_write(&path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(!temp.path().join("nested/dir/config.json.tmp").exists());
    }

    #[test]
    fn test_backup_missing_file_is_noop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        assert!(backup_file(&path).unwrap().is_none());
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_backup_overwrites_previous_backup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");

        fs::write(&path, "first").unwrap();
        backup_file(&path).unwrap();
        fs::write(&path, "second").unwrap();
        let backup = backup_file(&path).unwrap().unwrap();

        assert_eq!(backup, temp.path().join("config.backup"));
        assert_eq!(fs::read_to_string(backup).unwrap(), "second");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_sets_mode_on_create() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".ssh/config");
        write_private(&path, "Host x\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Host x\n");
    }
}
