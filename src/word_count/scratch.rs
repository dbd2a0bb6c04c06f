use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::word_count::constants::{CELLS_DIR_NAME, RUNS_DIR_NAME};
use crate::word_count::error::{IoResultExt, Phase, Result, WordFreqError};

/// Owns the scratch directory for the duration of one run.
///
/// The directory is created by [`ScratchDir::create`] and removed either by
/// [`ScratchDir::close`] on the success path or by `Drop` when a phase fails,
/// so nothing under it outlives the run.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
    removed: bool,
}

impl ScratchDir {
    pub fn create(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root).in_phase(Phase::Setup, root)?;
        // From here on the guard is responsible for removal, even if the
        // subdirectories below cannot be created.
        let scratch = Self {
            root: root.to_path_buf(),
            removed: false,
        };

        let cells = scratch.cells_dir();
        std::fs::create_dir_all(&cells).in_phase(Phase::Setup, &cells)?;
        let runs = scratch.runs_dir();
        std::fs::create_dir_all(&runs).in_phase(Phase::Setup, &runs)?;

        debug!("Created scratch directory {}", scratch.root.display());
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn cells_dir(&self) -> PathBuf {
        self.root.join(CELLS_DIR_NAME)
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.root.join(RUNS_DIR_NAME)
    }

    /// Removes the directory and reports failure to the caller.
    pub fn close(mut self) -> Result<()> {
        self.removed = true;
        remove_tree(&self.root).map_err(|source| WordFreqError::Cleanup {
            path: self.root.clone(),
            source,
        })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            warn!("Failed to remove scratch directory {}: {}", self.root.display(), e);
        }
    }
}

fn remove_tree(root: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(root) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
