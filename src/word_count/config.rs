use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use anyhow::Result;

use crate::constants::{BYTES_PER_KB, DEFAULT_PROGRESS_INTERVAL_SECONDS};
use crate::word_count::constants::*;
use crate::word_count::error::WordFreqError;
use crate::word_count::merger::MergeStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordFreqConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub chunk_size: usize,
    pub scratch_dir: PathBuf,
    pub io_buffer_size_kb: usize,
    pub merge_strategy: MergeStrategy,
    pub progress_interval_seconds: u64,
    pub verbose: bool,
}

impl Default for WordFreqConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_path: PathBuf::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            io_buffer_size_kb: DEFAULT_IO_BUFFER_SIZE_KB,
            merge_strategy: MergeStrategy::default(),
            progress_interval_seconds: DEFAULT_PROGRESS_INTERVAL_SECONDS,
            verbose: false,
        }
    }
}

impl WordFreqConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ..Default::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }

    pub fn with_merge_strategy(mut self, merge_strategy: MergeStrategy) -> Self {
        self.merge_strategy = merge_strategy;
        self
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Checks everything that can be rejected before the scratch directory is
    /// touched. Nothing on disk is modified here.
    pub fn validate(&self) -> std::result::Result<(), WordFreqError> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(WordFreqError::Config(format!(
                "chunk size must be at least {}, got {}",
                MIN_CHUNK_SIZE, self.chunk_size
            )));
        }

        if self.io_buffer_size_kb < MIN_IO_BUFFER_SIZE_KB
            || self.io_buffer_size_kb > MAX_IO_BUFFER_SIZE_KB {
            return Err(WordFreqError::Config(format!(
                "I/O buffer size must be between {} and {} KB",
                MIN_IO_BUFFER_SIZE_KB, MAX_IO_BUFFER_SIZE_KB
            )));
        }

        if !self.input_path.is_file() {
            return Err(WordFreqError::Config(format!(
                "input file {} does not exist",
                self.input_path.display()
            )));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(WordFreqError::Config("output path is empty".to_string()));
        }

        if self.scratch_dir.as_os_str().is_empty() {
            return Err(WordFreqError::Config("scratch directory path is empty".to_string()));
        }

        if is_within(&self.output_path, &self.scratch_dir) {
            return Err(WordFreqError::Config(format!(
                "output file {} lies inside scratch directory {}",
                self.output_path.display(),
                self.scratch_dir.display()
            )));
        }

        if self.scratch_dir.exists() {
            let occupied = match std::fs::read_dir(&self.scratch_dir) {
                Ok(mut entries) => entries.next().is_some(),
                Err(_) => true,
            };
            if occupied {
                return Err(WordFreqError::Config(format!(
                    "scratch directory {} already exists and is not empty",
                    self.scratch_dir.display()
                )));
            }
        }

        Ok(())
    }

    pub fn io_buffer_size_bytes(&self) -> usize {
        self.io_buffer_size_kb * BYTES_PER_KB
    }
}

fn is_within(path: &Path, dir: &Path) -> bool {
    resolve(path).starts_with(resolve(dir))
}

/// Absolute form of `path` with symlinks resolved for the part that exists
/// and `.`/`..` removed from the rest.
fn resolve(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    let base = loop {
        if let Ok(canonical) = existing.canonicalize() {
            break canonical;
        }
        match (existing.parent(), existing.components().next_back()) {
            (Some(parent), Some(last)) => {
                missing.push(last.as_os_str().to_os_string());
                existing = parent;
            }
            _ => break existing.to_path_buf(),
        }
    };

    let unresolved: PathBuf = std::iter::once(base.into_os_string())
        .chain(missing.into_iter().rev())
        .collect();

    let mut resolved = PathBuf::new();
    for component in unresolved.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}
