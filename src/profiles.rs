//! Profile data model and input validation.
//!
//! A profile bundles a git identity (`user.name` / `user.email`), the GitHub
//! account it belongs to, the private key used to authenticate and the SSH
//! host alias that routes `github.com` traffic through that key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::ValidateEmail;

use crate::error::{Error, Result};

/// Real host every managed alias points at
pub const GITHUB_HOST: &str = "github.com";

const MAX_NAME_LENGTH: usize = 64;

/// One git/GitHub identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique profile name
    pub name: String,
    /// git `user.name`
    pub git_name: String,
    /// git `user.email`
    pub git_email: String,
    pub github_username: String,
    /// Absolute path to the private key
    pub ssh_key_path: PathBuf,
    /// `github.com-<slug(name)>`
    pub ssh_host: String,
}

impl Profile {
    /// Build a validated profile, deriving its SSH host alias from the name.
    ///
    /// `ssh_key_path` must already be tilde-expanded.
    pub fn new(
        name: &str,
        git_name: &str,
        git_email: &str,
        github_username: &str,
        ssh_key_path: PathBuf,
    ) -> Result<Self> {
        validate_profile_name(name)?;
        validate_git_name(git_name)?;
        validate_email(git_email)?;
        validate_github_username(github_username)?;

        Ok(Self {
            name: name.to_string(),
            git_name: git_name.trim().to_string(),
            git_email: git_email.trim().to_string(),
            github_username: github_username.trim().to_string(),
            ssh_key_path,
            ssh_host: ssh_host_for(name),
        })
    }

    /// One-line summary used in selection prompts
    pub fn label(&self) -> String {
        format!("{} ({} - {})", self.name, self.github_username, self.git_email)
    }
}

/// Lowercase and replace every character outside `[a-z0-9-]` with `-`
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// SSH host alias for a profile name
pub fn ssh_host_for(name: &str) -> String {
    format!("{}-{}", GITHUB_HOST, slug(name))
}

/// File name of the key generated for a profile
pub fn key_file_name(name: &str) -> String {
    format!("id_ed25519_{}", slug(name))
}

/// Validate profile name
///
/// Only allows alphanumeric characters, underscores, and hyphens.
pub fn validate_profile_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation(
            "Profile name cannot be empty",
            "Pick a short name such as 'personal' or 'work'.",
        ));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::validation(
            format!("Profile name cannot be longer than {MAX_NAME_LENGTH} characters"),
            "Use a shorter name.",
        ));
    }

    // Allow a-z, A-Z, 0-9, -, _
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::validation(
            format!("Invalid profile name '{name}'"),
            "Only letters, numbers, hyphens (-) and underscores (_) are allowed.",
        ));
    }

    Ok(())
}

pub fn validate_git_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation(
            "Git user name is required",
            "This becomes git's user.name, e.g. 'Jane Doe'.",
        ));
    }
    Ok(())
}

/// Accepts `local@domain.tld`
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation(
            "Git user email is required",
            "This becomes git's user.email.",
        ));
    }

    let has_tld = email
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit_once('.'))
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());

    if !has_tld || !email.validate_email() {
        return Err(Error::validation(
            format!("Invalid email address '{email}'"),
            "Use the form name@example.com.",
        ));
    }
    Ok(())
}

pub fn validate_github_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::validation(
            "GitHub username is required",
            "Use the account name shown in your GitHub profile URL.",
        ));
    }
    Ok(())
}

/// The private key must exist and be a regular file
pub fn validate_key_path(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::validation(
            format!("SSH key not found at {}", path.display()),
            "Point to an existing private key (not the .pub file), or let gh-switch generate one.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_profile_name_validation() {
        assert!(validate_profile_name("work").is_ok());
        assert!(validate_profile_name("my-profile").is_ok());
        assert!(validate_profile_name("Test_123").is_ok());

        assert!(validate_profile_name("").is_err());
        assert!(validate_profile_name("invalid name").is_err());
        assert!(validate_profile_name("test/profile").is_err());
        assert!(validate_profile_name("emoji😊").is_err());
        assert!(validate_profile_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("jane.doe+work@corp.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("jane").is_err());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("jane doe@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_slug_and_host() {
        assert_eq!(slug("Work_Main"), "work-main");
        assert_eq!(slug("side-project2"), "side-project2");
        assert_eq!(ssh_host_for("Work"), "github.com-work");
        assert_eq!(key_file_name("My_Org"), "id_ed25519_my-org");
    }

    #[test]
    fn test_profile_new_derives_host() {
        let profile = Profile::new(
            "Work_1",
            "Jane Doe",
            " jane@corp.com ",
            "jane-corp",
            PathBuf::from("/home/jane/.ssh/id_work"),
        )
        .unwrap();

        assert_eq!(profile.ssh_host, "github.com-work-1");
        assert_eq!(profile.git_email, "jane@corp.com");
    }

    #[test]
    fn test_profile_new_rejects_bad_input() {
        let key = PathBuf::from("/k");
        assert!(Profile::new("bad name", "J", "j@x.io", "j", key.clone()).is_err());
        assert!(Profile::new("ok", "  ", "j@x.io", "j", key.clone()).is_err());
        assert!(Profile::new("ok", "J", "nope", "j", key.clone()).is_err());
        assert!(Profile::new("ok", "J", "j@x.io", "", key).is_err());
    }

    #[test]
    fn test_profile_json_uses_camel_case() {
        let profile = Profile::new("work", "J", "j@x.io", "jx", PathBuf::from("/k")).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["gitEmail"], "j@x.io");
        assert_eq!(json["sshKeyPath"], "/k");
        assert_eq!(json["sshHost"], "github.com-work");
    }

    #[test]
    fn test_validate_key_path() {
        let temp = TempDir::new().unwrap();
        let key = temp.path().join("id_ed25519");
        assert!(validate_key_path(&key).is_err());

        std::fs::write(&key, "key").unwrap();
        assert!(validate_key_path(&key).is_ok());
        assert!(validate_key_path(temp.path()).is_err());
    }
}
