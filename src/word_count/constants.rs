pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_IO_BUFFER_SIZE_KB: usize = 64;
pub const DEFAULT_SCRATCH_DIR: &str = "./temp_data";

pub const MIN_CHUNK_SIZE: usize = 1;
pub const MIN_IO_BUFFER_SIZE_KB: usize = 4;
pub const MAX_IO_BUFFER_SIZE_KB: usize = 65536;

pub const CELLS_DIR_NAME: &str = "cells";
pub const RUNS_DIR_NAME: &str = "runs";
pub const RUN_FILE_PREFIX: &str = "run_";
pub const RUN_FILE_EXTENSION: &str = ".txt";

pub const RECORD_FIELD_SEPARATOR: char = ' ';
pub const CELL_WORD_SEPARATOR: char = '\n';

pub const MERGE_HEAP_INITIAL_CAPACITY: usize = 64;
pub const PROGRESS_CHECK_INTERVAL_RECORDS: usize = 10_000;
