use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the profile store, the SSH config merger and the
/// system collaborator.
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced profile does not exist
    #[error("Profile '{0}' not found.\nHint: Use 'gh-switch list' to see available profiles.")]
    NotFound(String),

    /// The persisted config exists but is not a valid document
    #[error(
        "Corrupt configuration file {}: {reason}\nHint: Fix it with 'gh-switch config --edit' or move it aside to start fresh.",
        path.display()
    )]
    CorruptConfig { path: PathBuf, reason: String },

    /// Filesystem access failure
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// External tool missing, exited non-zero or produced unusable output
    #[error("{program} failed: {message}")]
    Subprocess { program: String, message: String },

    /// Malformed user input
    #[error("{message}\nHint: {hint}")]
    Validation { message: String, hint: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptConfig {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn subprocess(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Subprocess {
            program: program.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: hint.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
