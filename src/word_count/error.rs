use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Counting,
    Sorting,
    Merging,
    Cleanup,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Counting => "counting",
            Phase::Sorting => "sorting",
            Phase::Merging => "merging",
            Phase::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum WordFreqError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{phase} phase failed on {}: {source}", path.display())]
    Io {
        phase: Phase,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{phase} phase found corrupt data in {} (line {line}): {reason}", path.display())]
    Corrupt {
        phase: Phase,
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to remove scratch directory {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WordFreqError {
    pub fn corrupt(phase: Phase, path: &Path, line: usize, reason: impl Into<String>) -> Self {
        WordFreqError::Corrupt {
            phase,
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            WordFreqError::Config(_) => Phase::Setup,
            WordFreqError::Io { phase, .. } | WordFreqError::Corrupt { phase, .. } => *phase,
            WordFreqError::Cleanup { .. } => Phase::Cleanup,
        }
    }
}

pub type Result<T> = std::result::Result<T, WordFreqError>;

/// Attaches the phase and file to a raw I/O failure.
pub trait IoResultExt<T> {
    fn in_phase(self, phase: Phase, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn in_phase(self, phase: Phase, path: &Path) -> Result<T> {
        self.map_err(|source| WordFreqError::Io {
            phase,
            path: path.to_path_buf(),
            source,
        })
    }
}
