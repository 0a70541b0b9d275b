//! Profile switching logic.
//!
//! This module implements the state transitions of gh-switch:
//! - Activating a profile (global git identity first, then the store pointer).
//! - Registering a profile in the store together with its SSH host entry.
//! - Unregistering a profile and its SSH host entry.

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::profiles::Profile;
use crate::ssh_config::{SshConfigFile, SshHostEntry};
use crate::system::System;

/// Make `name` the active identity.
///
/// The global git identity is set before the store is touched; if git fails
/// the active pointer is left as it was.
pub fn use_profile(store: &ConfigStore, system: &dyn System, name: &str) -> Result<Profile> {
    let profile = store
        .load()?
        .get(name)
        .cloned()
        .ok_or_else(|| Error::NotFound(name.to_string()))?;

    system.set_global_identity(&profile.git_name, &profile.git_email)?;

    store.update(|doc| doc.set_active(name))?;
    tracing::info!(profile = name, "switched active profile");

    Ok(profile)
}

/// Outcome of [`register_profile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// A profile with the same name was replaced
    pub replaced: bool,
    /// The profile is the active one after registration
    pub active: bool,
    /// Another profile already uses the same key
    pub key_shared_with: Option<String>,
}

/// Write `profile`'s SSH host entry, then store the profile.
///
/// A failed SSH write leaves the store untouched.
pub fn register_profile(
    store: &ConfigStore,
    ssh: &SshConfigFile,
    profile: Profile,
) -> Result<Registration> {
    let mut doc = store.load()?;

    let key_shared_with = doc
        .find_by_key_path(&profile.ssh_key_path, Some(profile.name.as_str()))
        .map(|p| p.name.clone());
    if let Some(other) = &key_shared_with {
        tracing::warn!(profile = %profile.name, other = %other, "ssh key shared between profiles");
    }

    let replaced = doc.contains(&profile.name);
    let entry = SshHostEntry::github(&profile.ssh_host, &profile.ssh_key_path);
    let name = profile.name.clone();

    ssh.upsert_entry(&entry)?;
    doc.add_or_update_profile(profile);
    store.save(&doc)?;

    Ok(Registration {
        replaced,
        active: doc.active_profile.as_deref() == Some(name.as_str()),
        key_shared_with,
    })
}

/// Outcome of [`unregister_profile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub profile: Profile,
    /// An SSH host entry was found and removed
    pub ssh_entry_removed: bool,
    /// Active profile after the removal
    pub active_profile: Option<String>,
}

/// Remove a profile's SSH host entry, then the profile itself.
///
/// The key file is never deleted.
pub fn unregister_profile(store: &ConfigStore, ssh: &SshConfigFile, name: &str) -> Result<Removal> {
    let mut doc = store.load()?;
    let host = doc
        .get(name)
        .map(|p| p.ssh_host.clone())
        .ok_or_else(|| Error::NotFound(name.to_string()))?;

    let ssh_entry_removed = ssh.remove_entry(&host)?;

    let profile = doc.remove_profile(name)?;
    store.save(&doc)?;
    tracing::info!(profile = name, "profile removed");

    Ok(Removal {
        profile,
        ssh_entry_removed,
        active_profile: doc.active_profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh_config::{END_MARKER, START_MARKER};
    use crate::test_utils::{Call, FakeSystem, setup_test_paths, store_for, test_profile};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_use_profile_sets_git_then_store() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let store = store_for(&paths);
        let ssh = SshConfigFile::new(&paths.ssh_config);

        register_profile(&store, &ssh, test_profile(&paths, "a")).unwrap();
        register_profile(&store, &ssh, test_profile(&paths, "b")).unwrap();

        let system = FakeSystem::default();
        let profile = use_profile(&store, &system, "b").unwrap();

        assert_eq!(profile.name, "b");
        assert_eq!(
            system.calls(),
            vec![Call::SetGlobal {
                name: "b user".into(),
                email: "b@example.com".into()
            }]
        );
        assert_eq!(store.load().unwrap().active_profile.as_deref(), Some("b"));
    }

    #[test]
    fn test_use_profile_git_failure_keeps_active() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let store = store_for(&paths);
        let ssh = SshConfigFile::new(&paths.ssh_config);

        register_profile(&store, &ssh, test_profile(&paths, "a")).unwrap();
        register_profile(&store, &ssh, test_profile(&paths, "b")).unwrap();

        let system = FakeSystem {
            fail_set_global: true,
            ..FakeSystem::default()
        };
        assert!(matches!(
            use_profile(&store, &system, "b"),
            Err(Error::Subprocess { .. })
        ));
        assert_eq!(store.load().unwrap().active_profile.as_deref(), Some("a"));
    }

    #[test]
    fn test_use_unknown_profile() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let system = FakeSystem::default();

        let result = use_profile(&store_for(&paths), &system, "ghost");
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(system.calls().is_empty());
    }

    #[test]
    fn test_register_first_profile_is_active_and_writes_ssh() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let store = store_for(&paths);
        let ssh = SshConfigFile::new(&paths.ssh_config);

        let reg = register_profile(&store, &ssh, test_profile(&paths, "work")).unwrap();
        assert!(reg.active);
        assert!(!reg.replaced);
        assert!(reg.key_shared_with.is_none());

        let content = fs::read_to_string(&paths.ssh_config).unwrap();
        assert!(content.contains(START_MARKER));
        assert!(content.contains("Host github.com-work"));
        assert!(content.contains(END_MARKER));
    }

    #[test]
    fn test_register_reports_shared_key() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let store = store_for(&paths);
        let ssh = SshConfigFile::new(&paths.ssh_config);

        let work = test_profile(&paths, "work");
        let mut personal = test_profile(&paths, "personal");
        personal.ssh_key_path = work.ssh_key_path.clone();

        register_profile(&store, &ssh, work).unwrap();
        let reg = register_profile(&store, &ssh, personal).unwrap();

        assert_eq!(reg.key_shared_with.as_deref(), Some("work"));
        assert!(!reg.active);
        assert_eq!(store.load().unwrap().profiles.len(), 2);
    }

    #[test]
    fn test_register_same_name_replaces() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let store = store_for(&paths);
        let ssh = SshConfigFile::new(&paths.ssh_config);

        register_profile(&store, &ssh, test_profile(&paths, "work")).unwrap();
        let mut updated = test_profile(&paths, "work");
        updated.git_email = "new@example.com".into();
        let reg = register_profile(&store, &ssh, updated).unwrap();

        assert!(reg.replaced);
        assert!(reg.key_shared_with.is_none());
        let doc = store.load().unwrap();
        assert_eq!(doc.profiles.len(), 1);
        assert_eq!(doc.profiles[0].git_email, "new@example.com");
        assert_eq!(ssh.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_unregister_moves_active_and_cleans_ssh() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let store = store_for(&paths);
        let ssh = SshConfigFile::new(&paths.ssh_config);
        fs::create_dir_all(&paths.ssh_dir).unwrap();
        fs::write(&paths.ssh_config, "Host foo\n  HostName bar\n").unwrap();

        register_profile(&store, &ssh, test_profile(&paths, "a")).unwrap();
        register_profile(&store, &ssh, test_profile(&paths, "b")).unwrap();

        let removal = unregister_profile(&store, &ssh, "a").unwrap();
        assert!(removal.ssh_entry_removed);
        assert_eq!(removal.active_profile.as_deref(), Some("b"));
        assert!(removal.profile.ssh_key_path.exists());

        let removal = unregister_profile(&store, &ssh, "b").unwrap();
        assert!(removal.active_profile.is_none());
        assert_eq!(
            fs::read_to_string(&paths.ssh_config).unwrap(),
            "Host foo\n  HostName bar\n"
        );
    }

    #[test]
    fn test_register_ssh_failure_leaves_store_untouched() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let store = store_for(&paths);
        fs::create_dir_all(&paths.ssh_config).unwrap();
        let ssh = SshConfigFile::new(&paths.ssh_config);

        let err = register_profile(&store, &ssh, test_profile(&paths, "work")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(store.load().unwrap().profiles.is_empty());
        assert!(!store.exists());
    }

    #[test]
    fn test_unregister_unknown() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let result = unregister_profile(
            &store_for(&paths),
            &SshConfigFile::new(&paths.ssh_config),
            "ghost",
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
