//! Diagnostic tool for gh-switch.
//!
//! This module implements the `gh-switch doctor` command, which checks the system
//! for common issues:
//! - git availability.
//! - Validity of the configuration file.
//! - Agreement between profiles and the managed SSH config entries.
//! - SSH key files, their permissions and key reuse across profiles.
//!
//! It only reads; nothing is repaired.

use anstyle::AnsiColor;
use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::config::{ConfigDocument, ConfigStore};
use crate::keys::{key_permissions_ok, public_key_path};
use crate::paths::Paths;
use crate::ssh_config::SshConfigFile;
use crate::system::System;
use crate::ui::Ui;

/// Run the doctor diagnostics; returns the number of checks that found issues
pub fn run_doctor(paths: &Paths, system: &dyn System, ui: &Ui) -> usize {
    ui.section("gh-switch Doctor");
    ui.newline();

    let mut failed = 0;

    // 1. Tools
    failed += check_step(ui, "Tools", || {
        if system.git_available() {
            ui.println(format!("  {} git is installed", ui.icon_ok()));
            true
        } else {
            ui.println(format!("  {} git is not installed or not on PATH", ui.icon_err()));
            false
        }
    });

    // 2. Configuration file
    let store = ConfigStore::new(&paths.config_file);
    let mut doc: Option<ConfigDocument> = None;
    failed += check_step(ui, "Configuration File", || {
        if !store.exists() {
            ui.println(format!(
                "  {} {} missing (fresh install?)",
                ui.icon_warn(),
                store.path().display()
            ));
            return true;
        }

        match store.load() {
            Ok(loaded) => {
                ui.println(format!("  {} Configuration readable (version {})", ui.icon_ok(), loaded.version));
                match loaded.active() {
                    Some(p) => ui.println(format!("  {} Active profile: {}", ui.icon_info(), p.name)),
                    None => ui.println(format!("  {} No active profile set", ui.icon_info())),
                }
                doc = Some(loaded);
                true
            }
            Err(e) => {
                ui.println(format!("  {} {}", ui.icon_err(), e));
                false
            }
        }
    });

    let doc = doc.unwrap_or_default();

    // 3. SSH config
    failed += check_step(ui, "SSH Config", || check_ssh_config(paths, &doc, ui));

    // 4. Keys
    failed += check_step(ui, "SSH Keys", || check_keys(&doc, ui));

    // 5. Environment
    check_step(ui, "Environment", || {
        match env::var("EDITOR") {
            Ok(e) => ui.println(format!("  {} EDITOR set to: {}", ui.icon_ok(), e)),
            Err(_) => ui.println(format!(
                "  {} EDITOR not set ('config --edit' falls back to $VISUAL or nano)",
                ui.icon_info()
            )),
        }
        true
    });

    failed
}

fn check_ssh_config(paths: &Paths, doc: &ConfigDocument, ui: &Ui) -> bool {
    let ssh = SshConfigFile::new(&paths.ssh_config);
    let entries = match ssh.entries() {
        Ok(entries) => entries,
        Err(e) => {
            ui.println(format!("  {} {}", ui.icon_err(), e));
            return false;
        }
    };

    if !ssh.path().exists() {
        ui.println(format!("  {} {} does not exist", ui.icon_info(), ssh.path().display()));
    }
    let backup = paths.ssh_config_backup();
    if backup.exists() {
        ui.println(format!("  {} Last backup: {}", ui.icon_info(), backup.display()));
    }

    let mut ok = true;
    for profile in &doc.profiles {
        match entries.iter().find(|e| e.host == profile.ssh_host) {
            Some(entry) if Path::new(&entry.identity_file) == profile.ssh_key_path => {
                ui.println(format!("  {} {} → {}", ui.icon_ok(), profile.ssh_host, entry.identity_file));
            }
            Some(entry) => {
                ui.println(format!(
                    "  {} {} uses {} but profile '{}' expects {}",
                    ui.icon_warn(),
                    profile.ssh_host,
                    entry.identity_file,
                    profile.name,
                    profile.ssh_key_path.display()
                ));
            }
            None => {
                ui.println(format!(
                    "  {} No managed entry for {} (profile '{}')",
                    ui.icon_err(),
                    profile.ssh_host,
                    profile.name
                ));
                ok = false;
            }
        }
    }

    for entry in entries.iter().filter(|e| !doc.profiles.iter().any(|p| p.ssh_host == e.host)) {
        ui.println(format!(
            "  {} Managed entry {} belongs to no profile",
            ui.icon_warn(),
            entry.host
        ));
    }

    if !ok {
        ui.println(format!(
            "  {} Re-add the profile with 'gh-switch add --force' to restore its entry",
            ui.icon_info()
        ));
    }
    ok
}

fn check_keys(doc: &ConfigDocument, ui: &Ui) -> bool {
    if doc.profiles.is_empty() {
        ui.println(format!("  {} No profiles configured", ui.icon_info()));
        return true;
    }

    let mut ok = true;
    let mut owners: HashMap<&Path, Vec<&str>> = HashMap::new();

    for profile in &doc.profiles {
        let key = profile.ssh_key_path.as_path();
        owners.entry(key).or_default().push(&profile.name);

        if !key.is_file() {
            ui.println(format!(
                "    {} {}: key missing at {}",
                ui.icon_err(),
                profile.name,
                key.display()
            ));
            ok = false;
            continue;
        }

        if key_permissions_ok(key) {
            ui.println(format!("    {} {}: {}", ui.icon_ok(), profile.name, key.display()));
        } else {
            ui.println(format!(
                "    {} {}: {} should have mode 600 or 400 (chmod 600 {})",
                ui.icon_warn(),
                profile.name,
                key.display(),
                key.display()
            ));
        }

        if !public_key_path(key).exists() {
            ui.println(format!(
                "    {} {}: no public key next to the private key",
                ui.icon_info(),
                profile.name
            ));
        }
    }

    let mut shared: Vec<_> = owners.into_iter().filter(|(_, names)| names.len() > 1).collect();
    shared.sort();
    for (key, names) in shared {
        ui.println(format!(
            "  {} {} is shared by {} (GitHub accepts a key on one account only)",
            ui.icon_warn(),
            key.display(),
            names.join(", ")
        ));
    }

    ok
}

/// Run one titled check; returns 1 when it reported issues
fn check_step<F>(ui: &Ui, name: &str, check_fn: F) -> usize
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
    usize::from(!success)
}
