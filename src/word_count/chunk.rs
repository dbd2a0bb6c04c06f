use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::word_count::counter::CellStore;
use crate::word_count::constants::{RUN_FILE_EXTENSION, RUN_FILE_PREFIX};
use crate::word_count::error::{IoResultExt, Phase, Result};
use crate::word_count::record::WordCount;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub run_id: usize,
    pub file_path: PathBuf,
    pub record_count: usize,
    pub file_size_bytes: u64,
}

/// Turns the cell store into sorted runs of at most `chunk_size` records.
pub struct ChunkSorter {
    chunk_size: usize,
    io_buffer_size: usize,
    runs_dir: PathBuf,
}

impl ChunkSorter {
    pub fn new(chunk_size: usize, io_buffer_size: usize, runs_dir: PathBuf) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            io_buffer_size,
            runs_dir,
        }
    }

    /// Returns the runs in the order they were written. Every cell lands in
    /// exactly one run, so runs never share a word.
    pub fn sort_cells(&self, store: &CellStore) -> Result<Vec<RunMetadata>> {
        let mut runs = Vec::new();
        let mut current_chunk: Vec<WordCount> = Vec::with_capacity(self.chunk_size);

        for cell in store.cells()? {
            current_chunk.push(cell?);

            if current_chunk.len() >= self.chunk_size {
                let run = self.sort_and_write_run(runs.len(), std::mem::take(&mut current_chunk))?;
                runs.push(run);
            }
        }

        if !current_chunk.is_empty() {
            let run = self.sort_and_write_run(runs.len(), current_chunk)?;
            runs.push(run);
        }

        Ok(runs)
    }

    pub fn sort_and_write_run(&self, run_id: usize, mut records: Vec<WordCount>) -> Result<RunMetadata> {
        records.sort_unstable_by(WordCount::frequency_order);

        let run_file = self.runs_dir.join(format!(
            "{}{:06}{}",
            RUN_FILE_PREFIX,
            run_id,
            RUN_FILE_EXTENSION
        ));

        let file = File::create(&run_file).in_phase(Phase::Sorting, &run_file)?;
        let mut writer = BufWriter::with_capacity(self.io_buffer_size, file);

        for record in &records {
            writeln!(writer, "{}", record).in_phase(Phase::Sorting, &run_file)?;
        }

        writer.flush().in_phase(Phase::Sorting, &run_file)?;
        let file_size = std::fs::metadata(&run_file).in_phase(Phase::Sorting, &run_file)?.len();

        debug!("Wrote run {} with {} records", run_file.display(), records.len());

        Ok(RunMetadata {
            run_id,
            file_path: run_file,
            record_count: records.len(),
            file_size_bytes: file_size,
        })
    }
}
