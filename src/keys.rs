//! SSH key discovery and hygiene.
//!
//! Finds existing private keys in `~/.ssh` to offer as defaults, reads the
//! public half of a key, and checks/fixes private key permissions.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const KEY_PREFIXES: [&str; 4] = ["id_ed25519", "id_rsa", "id_ecdsa", "id_dsa"];

/// A private key found in the SSH directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedKey {
    pub path: PathBuf,
    pub name: String,
    pub has_public_key: bool,
}

/// `id_<algo>` or `id_<algo>_<suffix>`
fn is_key_name(name: &str) -> bool {
    KEY_PREFIXES.iter().any(|prefix| match name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.strip_prefix('_').is_some_and(|suffix| !suffix.is_empty()),
        None => false,
    })
}

fn rank(name: &str) -> u8 {
    if name.starts_with("id_ed25519") {
        0
    } else if name.starts_with("id_rsa") {
        1
    } else {
        2
    }
}

/// `<private>.pub`
pub fn public_key_path(private: &Path) -> PathBuf {
    let mut name = private.as_os_str().to_os_string();
    name.push(".pub");
    PathBuf::from(name)
}

/// Scan `ssh_dir` for private keys.
///
/// Ed25519 keys sort first, then RSA, then everything else by name.
/// A missing or unreadable directory yields an empty list.
pub fn detect_ssh_keys(ssh_dir: &Path) -> Vec<DetectedKey> {
    let Ok(read_dir) = fs::read_dir(ssh_dir) else {
        return Vec::new();
    };

    let mut keys: Vec<DetectedKey> = read_dir
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            if name.ends_with(".pub") || !is_key_name(&name) {
                return None;
            }
            let path = e.path();
            Some(DetectedKey {
                has_public_key: public_key_path(&path).exists(),
                path,
                name,
            })
        })
        .collect();

    keys.sort_by(|a, b| rank(&a.name).cmp(&rank(&b.name)).then_with(|| a.name.cmp(&b.name)));
    keys
}

/// The key to suggest by default: the first one with a `.pub`, else the first one
pub fn default_key(keys: &[DetectedKey]) -> Option<&DetectedKey> {
    keys.iter().find(|k| k.has_public_key).or_else(|| keys.first())
}

/// Content of `<private>.pub`, trimmed
pub fn read_public_key(private: &Path) -> Option<String> {
    fs::read_to_string(public_key_path(private))
        .ok()
        .map(|s| s.trim().to_string())
}

/// A private key should be readable by its owner only (600 or 400)
#[cfg(unix)]
pub fn key_permissions_ok(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| matches!(m.permissions().mode() & 0o777, 0o600 | 0o400))
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn key_permissions_ok(_path: &Path) -> bool {
    true
}

#[cfg(unix)]
pub fn fix_key_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
pub fn fix_key_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
