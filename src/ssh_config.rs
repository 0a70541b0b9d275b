//! Managed region of the OpenSSH client config.
//!
//! gh-switch owns exactly one block of `~/.ssh/config`, bracketed by
//! [`START_MARKER`] and [`END_MARKER`]. Everything outside the markers is the
//! user's ("foreign" content) and is carried through every rewrite untouched,
//! apart from whitespace trimming where it meets the managed block.
//!
//! Rewrites always regenerate the managed block from parsed entries, so any
//! stanza inside the markers that lacks `Host`, `HostName`, `User` or
//! `IdentityFile` is dropped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs_utils::{backup_file, backup_path, write_private};
use crate::profiles::GITHUB_HOST;

pub const START_MARKER: &str = "# --- gh-switch managed entries START ---";
pub const END_MARKER: &str = "# --- gh-switch managed entries END ---";

/// One `Host` stanza inside the managed region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshHostEntry {
    pub host: String,
    pub hostname: String,
    pub user: String,
    pub identity_file: String,
    pub identities_only: bool,
}

impl SshHostEntry {
    /// Entry routing `host` to github.com with a single identity
    pub fn github(host: &str, identity_file: &Path) -> Self {
        Self {
            host: host.to_string(),
            hostname: GITHUB_HOST.to_string(),
            user: "git".to_string(),
            identity_file: identity_file.display().to_string(),
            identities_only: true,
        }
    }

    /// Render the stanza without a trailing newline
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Host {}", self.host),
            format!("  HostName {}", self.hostname),
            format!("  User {}", self.user),
            format!("  IdentityFile {}", self.identity_file),
        ];
        if self.identities_only {
            lines.push("  IdentitiesOnly yes".to_string());
        }
        lines.join("\n")
    }
}

/// A config file cut at the managed markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Text outside the markers, trimmed, before/after joined by a blank line
    pub foreign: String,
    /// Text strictly between the markers, trimmed
    pub managed: String,
    /// Whether both markers were found in order
    pub has_markers: bool,
}

/// Cut `content` into foreign and managed text.
///
/// The region is the first end marker paired with the closest start marker
/// before it, so a stray start marker earlier in the file stays foreign text.
/// If no end marker has a start marker before it, the whole file is foreign
/// and the managed region is empty.
pub fn split(content: &str) -> Split {
    let bounds = content.match_indices(END_MARKER).find_map(|(end, _)| {
        content[..end]
            .rfind(START_MARKER)
            .map(|start| (start, start + START_MARKER.len(), end))
    });

    let Some((start, managed_from, end)) = bounds else {
        return Split {
            foreign: content.trim().to_string(),
            managed: String::new(),
            has_markers: false,
        };
    };

    let before = content[..start].trim();
    let after = content[end + END_MARKER.len()..].trim();
    let foreign = [before, after]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Split {
        foreign,
        managed: content[managed_from..end].trim().to_string(),
        has_markers: true,
    }
}

/// Parse the managed region into entries, dropping incomplete stanzas
pub fn parse_entries(managed: &str) -> Vec<SshHostEntry> {
    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in managed.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                match parse_block(&block) {
                    Some(entry) => entries.push(entry),
                    None => tracing::debug!(lines = block.len(), "dropping incomplete managed stanza"),
                }
                block.clear();
            }
        } else {
            block.push(line);
        }
    }

    entries
}

fn parse_block(lines: &[&str]) -> Option<SshHostEntry> {
    let mut host = None;
    let mut hostname = None;
    let mut user = None;
    let mut identity_file = None;
    let mut identities_only = false;

    for line in lines {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("Host ") {
            host = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("HostName ") {
            hostname = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("User ") {
            user = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("IdentityFile ") {
            identity_file = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("IdentitiesOnly ") {
            identities_only = value.trim().eq_ignore_ascii_case("yes");
        }
    }

    Some(SshHostEntry {
        host: host.filter(|v| !v.is_empty())?,
        hostname: hostname.filter(|v| !v.is_empty())?,
        user: user.filter(|v| !v.is_empty())?,
        identity_file: identity_file.filter(|v| !v.is_empty())?,
        identities_only,
    })
}

/// Assemble a full config from foreign text and managed entries.
///
/// With no entries the markers are dropped and only foreign text remains.
pub fn render(foreign: &str, entries: &[SshHostEntry]) -> String {
    if entries.is_empty() {
        return if foreign.is_empty() {
            String::new()
        } else {
            format!("{foreign}\n")
        };
    }

    let managed = entries
        .iter()
        .map(SshHostEntry::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut parts: Vec<&str> = Vec::with_capacity(4);
    if !foreign.is_empty() {
        parts.push(foreign);
    }
    parts.push(START_MARKER);
    parts.push(&managed);
    parts.push(END_MARKER);

    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

/// Entries currently in the managed region of `content`
pub fn entries_in(content: &str) -> Vec<SshHostEntry> {
    parse_entries(&split(content).managed)
}

/// Add `entry`, replacing any entry with the same host. New entries go last.
pub fn upsert_in(content: &str, entry: &SshHostEntry) -> String {
    let Split {
        foreign, managed, ..
    } = split(content);

    let mut entries = parse_entries(&managed);
    entries.retain(|e| e.host != entry.host);
    entries.push(entry.clone());

    render(&foreign, &entries)
}

/// Remove the entry for `host`. Returns `None` if no such entry exists.
pub fn remove_in(content: &str, host: &str) -> Option<String> {
    let Split {
        foreign, managed, ..
    } = split(content);

    let mut entries = parse_entries(&managed);
    let before = entries.len();
    entries.retain(|e| e.host != host);
    if entries.len() == before {
        return None;
    }

    Some(render(&foreign, &entries))
}

/// The SSH client config file on disk
#[derive(Debug, Clone)]
pub struct SshConfigFile {
    path: PathBuf,
}

impl SshConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path(&self.path)
    }

    /// File content, or an empty string if the file doesn't exist
    pub fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    pub fn entries(&self) -> Result<Vec<SshHostEntry>> {
        Ok(entries_in(&self.read()?))
    }

    pub fn find(&self, host: &str) -> Result<Option<SshHostEntry>> {
        Ok(self.entries()?.into_iter().find(|e| e.host == host))
    }

    /// Add or replace the entry for `entry.host`
    pub fn upsert_entry(&self, entry: &SshHostEntry) -> Result<()> {
        let current = self.read()?;
        let updated = upsert_in(&current, entry);
        self.write(&updated)?;
        tracing::info!(host = %entry.host, path = %self.path.display(), "ssh host entry written");
        Ok(())
    }

    /// Remove the entry for `host`; returns whether one was removed.
    ///
    /// The file is left untouched when there is nothing to remove.
    pub fn remove_entry(&self, host: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        let current = self.read()?;
        let Some(updated) = remove_in(&current, host) else {
            tracing::debug!(host, "no managed entry to remove");
            return Ok(false);
        };

        self.write(&updated)?;
        tracing::info!(host, path = %self.path.display(), "ssh host entry removed");
        Ok(true)
    }

    fn write(&self, content: &str) -> Result<()> {
        backup_file(&self.path)?;
        write_private(&self.path, content)
    }
}
