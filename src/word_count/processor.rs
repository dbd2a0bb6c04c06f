use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::constants::BYTES_PER_MB;
use crate::utils::process_memory_bytes;
use crate::word_count::{WordFreqConfig, WordFreqStats};
use crate::word_count::chunk::ChunkSorter;
use crate::word_count::counter::{CellStore, DiskCounter};
use crate::word_count::error::Result;
use crate::word_count::merger::RunMerger;
use crate::word_count::scratch::ScratchDir;

/// Runs counting, sorting and merging back to back. Each phase finishes
/// before the next starts.
pub struct WordFreqProcessor {
    config: WordFreqConfig,
}

impl WordFreqProcessor {
    pub fn new(config: WordFreqConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WordFreqConfig {
        &self.config
    }

    /// Produces the output file. The scratch directory is created here and
    /// is gone again when this returns, whether or not the run succeeded.
    pub fn process(&self) -> Result<WordFreqStats> {
        self.config.validate()?;
        let start_time = Instant::now();

        if self.config.verbose {
            info!("Input: {}", self.config.input_path.display());
            info!("Output: {}", self.config.output_path.display());
            info!("Scratch directory: {}", self.config.scratch_dir.display());
            info!("Chunk size: {}, merge strategy: {}", self.config.chunk_size, self.config.merge_strategy);
        }

        let mut stats = WordFreqStats::default();
        let scratch = ScratchDir::create(&self.config.scratch_dir)?;
        self.run_phases(&scratch, &mut stats)?;
        scratch.close()?;

        stats.processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Processing completed: {} distinct words written in {} ms",
            stats.records_written, stats.processing_time_ms
        );

        Ok(stats)
    }

    fn run_phases(&self, scratch: &ScratchDir, stats: &mut WordFreqStats) -> Result<()> {
        let chunk_size = self.config.chunk_size;
        let io_buffer_size = self.config.io_buffer_size_bytes();
        let progress_interval = self.config.progress_interval_seconds;

        let phase_start = Instant::now();
        info!("Counting words in {}", self.config.input_path.display());
        let counter = DiskCounter::new(
            CellStore::new(scratch.cells_dir()),
            chunk_size,
            io_buffer_size,
            progress_interval,
        );
        let count_stats = counter.count_file(&self.config.input_path)?;
        stats.lines_read = count_stats.lines_read;
        stats.empty_lines_skipped = count_stats.empty_lines_skipped;
        stats.words_counted = count_stats.words_counted;
        stats.flushes = count_stats.flushes;
        stats.distinct_words = count_stats.distinct_words;
        stats.count_time_ms = phase_start.elapsed().as_millis() as u64;
        sample_memory(stats);
        info!(
            "Counting completed: {} words, {} distinct, {} batches",
            stats.words_counted, stats.distinct_words, stats.flushes
        );

        let phase_start = Instant::now();
        let sorter = ChunkSorter::new(chunk_size, io_buffer_size, scratch.runs_dir());
        let runs = sorter.sort_cells(counter.store())?;
        stats.runs_created = runs.len();
        stats.sort_time_ms = phase_start.elapsed().as_millis() as u64;
        sample_memory(stats);
        info!("Sorting completed: {} runs", runs.len());

        let phase_start = Instant::now();
        let merger = RunMerger::new(io_buffer_size, self.config.merge_strategy, progress_interval);
        let run_files: Vec<PathBuf> = runs.into_iter().map(|run| run.file_path).collect();
        let merge_stats = merger.merge_runs(&run_files, &self.config.output_path)?;
        stats.records_written = merge_stats.records_written;
        stats.merge_time_ms = phase_start.elapsed().as_millis() as u64;
        sample_memory(stats);
        info!("Merge completed: {} records written", stats.records_written);

        Ok(())
    }
}

fn sample_memory(stats: &mut WordFreqStats) {
    if let Some(bytes) = process_memory_bytes() {
        let mb = bytes as f64 / BYTES_PER_MB as f64;
        stats.peak_memory_mb = stats.peak_memory_mb.max(mb);
    }
}
