use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::info;

use crate::word_count::constants::{MERGE_HEAP_INITIAL_CAPACITY, PROGRESS_CHECK_INTERVAL_RECORDS};
use crate::word_count::error::{IoResultExt, Phase, Result, WordFreqError};
use crate::word_count::record::WordCount;

/// How the merger handles a word that shows up in more than one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Emit heads as they are selected. Requires word-disjoint runs, which
    /// is what the chunk sorter produces.
    #[default]
    Stream,
    /// Sum counts per word while merging, then sort and write the totals
    /// once. Holds the whole vocabulary in memory.
    Aggregate,
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stream" => Ok(MergeStrategy::Stream),
            "aggregate" => Ok(MergeStrategy::Aggregate),
            other => Err(format!("unknown merge strategy {:?} (expected stream or aggregate)", other)),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Stream => f.write_str("stream"),
            MergeStrategy::Aggregate => f.write_str("aggregate"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub records_read: usize,
    pub records_written: usize,
}

pub struct RunMerger {
    io_buffer_size: usize,
    strategy: MergeStrategy,
    progress_interval: Duration,
}

#[derive(Debug, PartialEq, Eq)]
struct MergeEntry {
    record: WordCount,
    run_id: usize,
}

impl PartialOrd for MergeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap pops the greatest entry: highest count, then smallest word.
impl Ord for MergeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        WordCount::frequency_order(&other.record, &self.record)
            .then_with(|| other.run_id.cmp(&self.run_id))
    }
}

/// Sequential reader over one run file that checks the run is well formed
/// as it goes.
struct RunReader {
    path: PathBuf,
    reader: BufReader<File>,
    line_number: usize,
    previous_count: Option<u64>,
    line: String,
}

impl RunReader {
    fn open(path: &Path, io_buffer_size: usize) -> Result<Self> {
        let file = File::open(path).in_phase(Phase::Merging, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::with_capacity(io_buffer_size, file),
            line_number: 0,
            previous_count: None,
            line: String::new(),
        })
    }

    fn next_record(&mut self) -> Result<Option<WordCount>> {
        self.line.clear();
        let read = self.reader.read_line(&mut self.line).in_phase(Phase::Merging, &self.path)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let line = self.line.strip_suffix('\n').unwrap_or(&self.line);
        let record = WordCount::from_line(line)
            .map_err(|reason| WordFreqError::corrupt(Phase::Merging, &self.path, self.line_number, reason))?;

        if let Some(previous) = self.previous_count {
            if record.count > previous {
                return Err(WordFreqError::corrupt(
                    Phase::Merging,
                    &self.path,
                    self.line_number,
                    format!("count {} follows smaller count {}", record.count, previous),
                ));
            }
        }
        self.previous_count = Some(record.count);

        Ok(Some(record))
    }
}

impl RunMerger {
    pub fn new(io_buffer_size: usize, strategy: MergeStrategy, progress_interval_seconds: u64) -> Self {
        Self {
            io_buffer_size,
            strategy,
            progress_interval: Duration::from_secs(progress_interval_seconds),
        }
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// K-way merge of runs sorted by descending count into `output_file`.
    ///
    /// With [`MergeStrategy::Stream`] the runs must not share any word; a
    /// word present in several runs is written once per run. Use
    /// [`MergeStrategy::Aggregate`] for runs that may overlap.
    ///
    /// Every run is opened before the output is created. A run's handle is
    /// released as soon as it is exhausted; the rest are released when this
    /// returns, on success or error.
    pub fn merge_runs(&self, run_files: &[PathBuf], output_file: &Path) -> Result<MergeStats> {
        let mut readers = Vec::with_capacity(run_files.len());
        for path in run_files {
            readers.push(Some(RunReader::open(path, self.io_buffer_size)?));
        }

        let output = File::create(output_file).in_phase(Phase::Merging, output_file)?;
        let mut writer = BufWriter::with_capacity(self.io_buffer_size, output);

        let mut merge_heap = BinaryHeap::with_capacity(MERGE_HEAP_INITIAL_CAPACITY.max(readers.len()));
        for run_id in 0..readers.len() {
            self.advance(&mut readers, run_id, &mut merge_heap)?;
        }

        let mut stats = MergeStats::default();
        let mut word_totals: HashMap<String, u64> = HashMap::new();
        let mut last_progress_time = Instant::now();

        while let Some(MergeEntry { record, run_id }) = merge_heap.pop() {
            stats.records_read += 1;

            match self.strategy {
                MergeStrategy::Stream => {
                    writeln!(writer, "{}", record).in_phase(Phase::Merging, output_file)?;
                    stats.records_written += 1;
                }
                MergeStrategy::Aggregate => {
                    *word_totals.entry(record.word).or_insert(0) += record.count;
                }
            }

            self.advance(&mut readers, run_id, &mut merge_heap)?;

            if stats.records_read % PROGRESS_CHECK_INTERVAL_RECORDS == 0
                && last_progress_time.elapsed() >= self.progress_interval {
                info!(
                    "Merge progress: {} records read, {} runs still open",
                    stats.records_read,
                    readers.iter().filter(|r| r.is_some()).count()
                );
                last_progress_time = Instant::now();
            }
        }

        if self.strategy == MergeStrategy::Aggregate {
            let mut final_data: Vec<WordCount> = word_totals
                .into_iter()
                .map(|(word, count)| WordCount::new(word, count))
                .collect();
            final_data.sort_unstable_by(WordCount::frequency_order);

            for record in &final_data {
                writeln!(writer, "{}", record).in_phase(Phase::Merging, output_file)?;
            }
            stats.records_written = final_data.len();
        }

        writer.flush().in_phase(Phase::Merging, output_file)?;

        Ok(stats)
    }

    /// Pushes the next record of `run_id` onto the heap, or closes the run
    /// when it has none left.
    fn advance(
        &self,
        readers: &mut [Option<RunReader>],
        run_id: usize,
        merge_heap: &mut BinaryHeap<MergeEntry>,
    ) -> Result<()> {
        let Some(reader) = readers[run_id].as_mut() else {
            return Ok(());
        };
        match reader.next_record()? {
            Some(record) => merge_heap.push(MergeEntry { record, run_id }),
            None => readers[run_id] = None,
        }
        Ok(())
    }
}
