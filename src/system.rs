//! External tools gh-switch drives: `git`, `ssh` and `ssh-keygen`.
//!
//! Command logic talks to the [`System`] trait so the store and the SSH
//! config merger can be exercised without spawning anything. [`ProcessSystem`]
//! is the real implementation. Every call is attempted exactly once.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Upper bound on `ssh -T` before it is abandoned
pub const SSH_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Substring GitHub prints on a successful `ssh -T`
const AUTH_SUCCESS: &str = "successfully authenticated";

/// git `user.name` / `user.email`; empty strings when unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl GitIdentity {
    pub fn is_set(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty()
    }
}

/// Outcome of an SSH connectivity probe.
///
/// GitHub closes `ssh -T` with a non-zero status even when the key is
/// accepted, so success is decided from the output text only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshProbe {
    pub success: bool,
    pub raw_message: String,
}

impl SshProbe {
    pub fn from_output(output: &str) -> Self {
        let raw_message = output.trim().to_string();
        Self {
            success: raw_message.contains(AUTH_SUCCESS),
            raw_message: if raw_message.is_empty() {
                "Connection failed".to_string()
            } else {
                raw_message
            },
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            raw_message: message.into(),
        }
    }
}

/// Synchronous calls into the machine's git and SSH tooling
pub trait System {
    /// `git --version` succeeds
    fn git_available(&self) -> bool;

    /// `git config --global user.name|user.email`
    fn global_identity(&self) -> Result<GitIdentity>;

    fn set_global_identity(&self, name: &str, email: &str) -> Result<()>;

    /// `git config user.name|user.email` inside `repo`
    fn set_local_identity(&self, repo: &Path, name: &str, email: &str) -> Result<()>;

    /// `git clone <url> [dest]`
    fn clone_repo(&self, url: &str, dest: Option<&Path>) -> Result<()>;

    /// `ssh -T git@<host>`, abandoned after `timeout`
    fn probe_ssh(&self, host: &str, timeout: Duration) -> SshProbe;

    /// `ssh-keygen -t ed25519 -C <email> -f <path> -N ""`
    fn generate_key(&self, email: &str, path: &Path) -> Result<()>;
}

/// [`System`] backed by real subprocesses
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSystem;

impl ProcessSystem {
    fn run(program: &str, command: &mut Command) -> Result<Output> {
        tracing::debug!(program, args = ?command.get_args().collect::<Vec<_>>(), "running");
        let output = command
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::subprocess(program, format!("could not start: {e}")))?;
        tracing::debug!(program, status = ?output.status.code(), "finished");
        Ok(output)
    }

    /// Run and require a zero exit status
    fn run_ok(program: &str, command: &mut Command) -> Result<Output> {
        let output = Self::run(program, command)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(Error::subprocess(program, message));
        }
        Ok(output)
    }

    /// Read a global git value; an unset key yields an empty string
    fn git_global_get(key: &str) -> Result<String> {
        let output = Self::run("git", Command::new("git").args(["config", "--global", key]))?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl System for ProcessSystem {
    fn git_available(&self) -> bool {
        Self::run_ok("git", Command::new("git").arg("--version")).is_ok()
    }

    fn global_identity(&self) -> Result<GitIdentity> {
        Ok(GitIdentity {
            name: Self::git_global_get("user.name")?,
            email: Self::git_global_get("user.email")?,
        })
    }

    fn set_global_identity(&self, name: &str, email: &str) -> Result<()> {
        Self::run_ok(
            "git",
            Command::new("git").args(["config", "--global", "user.name", name]),
        )?;
        Self::run_ok(
            "git",
            Command::new("git").args(["config", "--global", "user.email", email]),
        )?;
        Ok(())
    }

    fn set_local_identity(&self, repo: &Path, name: &str, email: &str) -> Result<()> {
        Self::run_ok(
            "git",
            Command::new("git")
                .args(["config", "user.name", name])
                .current_dir(repo),
        )?;
        Self::run_ok(
            "git",
            Command::new("git")
                .args(["config", "user.email", email])
                .current_dir(repo),
        )?;
        Ok(())
    }

    fn clone_repo(&self, url: &str, dest: Option<&Path>) -> Result<()> {
        let mut command = Command::new("git");
        command.arg("clone").arg(url);
        if let Some(dest) = dest {
            command.arg(dest);
        }
        Self::run_ok("git", &mut command)?;
        Ok(())
    }

    fn probe_ssh(&self, host: &str, timeout: Duration) -> SshProbe {
        let spawned = Command::new("ssh")
            .arg("-T")
            .arg(format!("git@{host}"))
            .args(["-o", "StrictHostKeyChecking=accept-new", "-o", "BatchMode=yes"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        match spawned {
            Ok(child) => wait_with_timeout(child, timeout),
            Err(e) => SshProbe::failed(format!("could not start ssh: {e}")),
        }
    }

    fn generate_key(&self, email: &str, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        Self::run_ok(
            "ssh-keygen",
            Command::new("ssh-keygen")
                .args(["-t", "ed25519", "-C", email, "-f"])
                .arg(path)
                .args(["-N", ""]),
        )?;
        Ok(())
    }
}

/// Collect the child's combined output, killing it once `timeout` elapses
fn wait_with_timeout(mut child: Child, timeout: Duration) -> SshProbe {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let timed_out = loop {
        match child.try_wait() {
            Ok(Some(_)) => break false,
            Ok(None) if Instant::now() >= deadline => break true,
            Ok(None) => thread::sleep(Duration::from_millis(50)),
            Err(e) => return SshProbe::failed(format!("failed waiting for ssh: {e}")),
        }
    };

    if timed_out {
        let _ = child.kill();
        let _ = child.wait();
        tracing::warn!(timeout_secs = timeout.as_secs(), "ssh probe timed out");
        return SshProbe::failed(format!(
            "Connection timed out after {} seconds",
            timeout.as_secs()
        ));
    }

    let mut combined = String::new();
    for reader in [stderr, stdout].into_iter().flatten() {
        if let Ok(text) = reader.join() {
            combined.push_str(&text);
        }
    }
    SshProbe::from_output(&combined)
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_success_detected_from_text() {
        let probe = SshProbe::from_output(
            "Hi jane! You've successfully authenticated, but GitHub does not provide shell access.\n",
        );
        assert!(probe.success);
        assert!(probe.raw_message.starts_with("Hi jane!"));
    }

    #[test]
    fn test_probe_failure() {
        let probe = SshProbe::from_output("git@github.com: Permission denied (publickey).");
        assert!(!probe.success);
        assert_eq!(probe.raw_message, "git@github.com: Permission denied (publickey).");

        let empty = SshProbe::from_output("  \n");
        assert!(!empty.success);
        assert_eq!(empty.raw_message, "Connection failed");
    }

    #[test]
    fn test_identity_is_set() {
        assert!(!GitIdentity::default().is_set());
        let id = GitIdentity {
            name: "Jane".into(),
            email: String::new(),
        };
        assert!(!id.is_set());
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_kills_slow_child() {
        let child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let started = Instant::now();
        let probe = wait_with_timeout(child, Duration::from_millis(200));
        assert!(!probe.success);
        assert!(probe.raw_message.contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_reads_stderr() {
        let child = Command::new("sh")
            .args(["-c", "echo 'Hi x! You have successfully authenticated' >&2; exit 1"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let probe = wait_with_timeout(child, Duration::from_secs(5));
        assert!(probe.success);
    }
}
