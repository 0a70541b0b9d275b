use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// All computed paths used by gh-switch
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~
    pub home: PathBuf,
    /// ~/.gh-switch
    pub base_dir: PathBuf,
    /// ~/.gh-switch/config.json
    pub config_file: PathBuf,
    /// ~/.ssh
    pub ssh_dir: PathBuf,
    /// ~/.ssh/config
    pub ssh_config: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        Ok(Self::from_home(base_dirs.home_dir()))
    }

    /// Build every path relative to an explicit home directory
    pub fn from_home(home: &Path) -> Self {
        let base_dir = home.join(".gh-switch");
        let config_file = base_dir.join("config.json");
        let ssh_dir = home.join(".ssh");
        let ssh_config = ssh_dir.join("config");

        Self {
            home: home.to_path_buf(),
            base_dir,
            config_file,
            ssh_dir,
            ssh_config,
        }
    }

    /// Path of the one-slot backup written before the SSH config is rewritten
    pub fn ssh_config_backup(&self) -> PathBuf {
        crate::fs_utils::backup_path(&self.ssh_config)
    }

    /// Expand a leading `~` to the home directory.
    ///
    /// Only `~` and `~/...` are expanded; `~user` forms are returned unchanged.
    pub fn expand_tilde(&self, input: &str) -> PathBuf {
        if input == "~" {
            return self.home.clone();
        }
        match input.strip_prefix("~/") {
            Some(rest) => self.home.join(rest),
            None => PathBuf::from(input),
        }
    }

    /// Expand `~`, then make the path absolute against the current directory
    pub fn resolve_path(&self, input: &str) -> Result<PathBuf> {
        let expanded = self.expand_tilde(input.trim());
        std::path::absolute(&expanded)
            .with_context(|| format!("Failed to resolve path: {}", expanded.display()))
    }

    /// Ensure the gh-switch base directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create config directory: {:?}", self.base_dir)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_layout_from_home() {
        let paths = Paths::from_home(Path::new("/home/alice"));
        assert_eq!(paths.config_file, PathBuf::from("/home/alice/.gh-switch/config.json"));
        assert_eq!(paths.ssh_config, PathBuf::from("/home/alice/.ssh/config"));
        assert_eq!(
            paths.ssh_config_backup(),
            PathBuf::from("/home/alice/.ssh/config.backup")
        );
    }

    #[test]
    fn test_expand_tilde() {
        let paths = Paths::from_home(Path::new("/home/alice"));
        assert_eq!(
            paths.expand_tilde("~/.ssh/id_ed25519"),
            PathBuf::from("/home/alice/.ssh/id_ed25519")
        );
        assert_eq!(paths.expand_tilde("~"), PathBuf::from("/home/alice"));
        assert_eq!(paths.expand_tilde("/etc/key"), PathBuf::from("/etc/key"));
        assert_eq!(paths.expand_tilde("~bob/key"), PathBuf::from("~bob/key"));
    }

    #[test]
    fn test_resolve_path_is_absolute() {
        let paths = Paths::from_home(Path::new("/home/alice"));
        assert_eq!(
            paths.resolve_path(" ~/.ssh/id_work ").unwrap(),
            PathBuf::from("/home/alice/.ssh/id_work")
        );

        let relative = paths.resolve_path("keys/id_rel").unwrap();
        assert!(relative.is_absolute());
        assert!(relative.ends_with("keys/id_rel"));
    }

    #[test]
    #[serial]
    fn test_new_uses_home_env() {
        let temp = TempDir::new().unwrap();
        let previous = std::env::var_os("HOME");
        unsafe { std::env::set_var("HOME", temp.path()) };

        let paths = Paths::new().unwrap();
        assert!(paths.config_file.starts_with(temp.path()));
        assert!(paths.ssh_config.ends_with(".ssh/config"));

        match previous {
            Some(home) => unsafe { std::env::set_var("HOME", home) },
            None => unsafe { std::env::remove_var("HOME") },
        }
    }

    #[test]
    fn test_ensure_dirs() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_home(temp.path());
        paths.ensure_dirs().unwrap();
        assert!(paths.base_dir.is_dir());
    }
}
