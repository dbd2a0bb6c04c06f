// Word counting engine: disk-backed counter, chunk sorter and run merger
pub mod word_count;

// Crate-wide constants
pub mod constants;

// Logging setup and formatting helpers
pub mod utils;

// Random input for manual runs and tests
pub mod generator;

// Re-export main types for convenience
pub use word_count::{
    count_words, MergeStrategy, Phase, WordCount, WordFreqConfig, WordFreqError, WordFreqProcessor,
    WordFreqStats,
};
