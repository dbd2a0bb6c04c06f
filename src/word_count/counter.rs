use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::word_count::constants::CELL_WORD_SEPARATOR;
use crate::word_count::error::{IoResultExt, Phase, Result, WordFreqError};
use crate::word_count::record::WordCount;

/// Disk-resident word -> count map, one small file ("cell") per word.
///
/// Cell files are named by the hex SHA-256 of the word so that arbitrary
/// input, including path separators or overlong lines, never escapes the
/// cell directory. The word itself is stored inside the cell after the
/// count: `<count>\n<word>`.
#[derive(Debug, Clone)]
pub struct CellStore {
    dir: PathBuf,
}

impl CellStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cell_path(&self, word: &str) -> PathBuf {
        self.dir.join(cell_name(word))
    }

    /// Adds one occurrence of `word` and returns its new count.
    pub fn increment(&self, word: &str) -> Result<u64> {
        let path = self.cell_path(word);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .in_phase(Phase::Counting, &path)?;

        let mut content = Vec::new();
        file.read_to_end(&mut content).in_phase(Phase::Counting, &path)?;

        let count = if content.is_empty() {
            1
        } else {
            let cell = parse_cell(&content, &path, Phase::Counting)?;
            if cell.word != word {
                return Err(WordFreqError::corrupt(
                    Phase::Counting,
                    &path,
                    1,
                    format!("cell holds {:?}, expected {:?}", cell.word, word),
                ));
            }
            cell.count + 1
        };

        file.seek(SeekFrom::Start(0)).in_phase(Phase::Counting, &path)?;
        file.set_len(0).in_phase(Phase::Counting, &path)?;
        file.write_all(format_cell(word, count).as_bytes())
            .in_phase(Phase::Counting, &path)?;

        Ok(count)
    }

    /// Current count for `word`; a missing cell counts as zero.
    pub fn get(&self, word: &str) -> Result<u64> {
        let path = self.cell_path(word);
        match fs::read(&path) {
            Ok(content) if content.is_empty() => Ok(0),
            Ok(content) => Ok(parse_cell(&content, &path, Phase::Counting)?.count),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e).in_phase(Phase::Counting, &path),
        }
    }

    pub fn read_cell(&self, path: &Path) -> Result<WordCount> {
        let content = fs::read(path).in_phase(Phase::Sorting, path)?;
        parse_cell(&content, path, Phase::Sorting)
    }

    /// Streams every cell in directory order.
    pub fn cells(&self) -> Result<Cells<'_>> {
        let entries = fs::read_dir(&self.dir).in_phase(Phase::Sorting, &self.dir)?;
        Ok(Cells { store: self, entries })
    }
}

pub struct Cells<'a> {
    store: &'a CellStore,
    entries: fs::ReadDir,
}

impl Iterator for Cells<'_> {
    type Item = Result<WordCount>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e).in_phase(Phase::Sorting, &self.store.dir)),
            };
            let path = entry.path();
            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => return Some(self.store.read_cell(&path)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e).in_phase(Phase::Sorting, &path)),
            }
        }
    }
}

fn cell_name(word: &str) -> String {
    format!("{:x}", Sha256::digest(word.as_bytes()))
}

fn format_cell(word: &str, count: u64) -> String {
    format!("{}{}{}", count, CELL_WORD_SEPARATOR, word)
}

fn parse_cell(content: &[u8], path: &Path, phase: Phase) -> Result<WordCount> {
    let text = std::str::from_utf8(content)
        .map_err(|e| WordFreqError::corrupt(phase, path, 1, format!("cell is not UTF-8: {}", e)))?;
    let (count, word) = text
        .split_once(CELL_WORD_SEPARATOR)
        .ok_or_else(|| WordFreqError::corrupt(phase, path, 1, "cell has no word"))?;
    let count: u64 = count
        .parse()
        .map_err(|e| WordFreqError::corrupt(phase, path, 1, format!("invalid count {:?}: {}", count, e)))?;
    if count == 0 || word.is_empty() {
        return Err(WordFreqError::corrupt(phase, path, 1, "cell holds an empty word or zero count"));
    }
    Ok(WordCount::new(word, count))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountStats {
    pub lines_read: usize,
    pub empty_lines_skipped: usize,
    pub words_counted: usize,
    pub flushes: usize,
    pub distinct_words: usize,
}

/// Reads the input in batches of at most `chunk_size` lines and folds each
/// batch into the cell store before reading the next one.
pub struct DiskCounter {
    store: CellStore,
    chunk_size: usize,
    io_buffer_size: usize,
    progress_interval: Duration,
}

impl DiskCounter {
    pub fn new(store: CellStore, chunk_size: usize, io_buffer_size: usize, progress_interval_seconds: u64) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
            io_buffer_size,
            progress_interval: Duration::from_secs(progress_interval_seconds),
        }
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn count_file(&self, input: &Path) -> Result<CountStats> {
        let file = File::open(input).in_phase(Phase::Counting, input)?;
        let reader = BufReader::with_capacity(self.io_buffer_size, file);
        self.count_reader(reader, input)
    }

    /// `source` is only used to label errors.
    pub fn count_reader<R: BufRead>(&self, mut reader: R, source: &Path) -> Result<CountStats> {
        let mut stats = CountStats::default();
        let mut batch: Vec<String> = Vec::with_capacity(self.chunk_size);
        let mut buf = Vec::new();
        let mut last_progress_time = Instant::now();

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).in_phase(Phase::Counting, source)?;
            if read == 0 {
                break;
            }
            stats.lines_read += 1;

            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }

            let line = String::from_utf8(std::mem::take(&mut buf)).map_err(|e| {
                WordFreqError::corrupt(Phase::Counting, source, stats.lines_read, format!("line is not UTF-8: {}", e))
            })?;
            batch.push(line);

            if batch.len() >= self.chunk_size {
                self.flush(&mut batch, &mut stats)?;

                if last_progress_time.elapsed() >= self.progress_interval {
                    info!(
                        "Counting progress: {} lines read, {} distinct words",
                        stats.lines_read, stats.distinct_words
                    );
                    last_progress_time = Instant::now();
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut stats)?;
        }

        Ok(stats)
    }

    fn flush(&self, batch: &mut Vec<String>, stats: &mut CountStats) -> Result<()> {
        let batch_len = batch.len();
        for word in batch.drain(..) {
            if word.is_empty() {
                stats.empty_lines_skipped += 1;
                continue;
            }
            if self.store.increment(&word)? == 1 {
                stats.distinct_words += 1;
            }
            stats.words_counted += 1;
        }
        stats.flushes += 1;
        debug!("Flushed batch {} ({} lines)", stats.flushes, batch_len);
        Ok(())
    }
}
