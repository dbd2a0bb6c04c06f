pub mod config;
pub mod constants;
pub mod error;
pub mod record;
pub mod scratch;
pub mod counter;
pub mod chunk;
pub mod merger;
pub mod processor;


pub use config::WordFreqConfig;
pub use error::{Phase, WordFreqError};
pub use merger::MergeStrategy;
pub use processor::WordFreqProcessor;
pub use record::WordCount;

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct WordFreqStats {
    pub lines_read: usize,
    pub empty_lines_skipped: usize,
    pub words_counted: usize,
    pub flushes: usize,
    pub distinct_words: usize,
    pub runs_created: usize,
    pub records_written: usize,
    pub count_time_ms: u64,
    pub sort_time_ms: u64,
    pub merge_time_ms: u64,
    pub processing_time_ms: u64,
    pub peak_memory_mb: f64,
}

pub fn count_words(config: WordFreqConfig) -> error::Result<WordFreqStats> {
    let processor = WordFreqProcessor::new(config)?;
    processor.process()
}
