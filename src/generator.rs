//! Random input generator for trying the counter on large files.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::constants::BYTES_PER_KB;

pub const VOCABULARY: [&str; 20] = [
    "this", "test", "asd", "the", "end",
    "sad", "is", "my", "only", "go", "language",
    "programming", "search", "query", "analysis",
    "utility", "developer", "random", "data", "generator",
];

/// Writes `num_lines` words drawn uniformly from [`VOCABULARY`], one per line.
pub fn generate_words<W: Write, R: Rng>(writer: &mut W, num_lines: usize, rng: &mut R) -> std::io::Result<()> {
    for _ in 0..num_lines {
        let word = VOCABULARY[rng.gen_range(0..VOCABULARY.len())];
        writer.write_all(word.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

pub fn generate_file(path: &Path, num_lines: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(64 * BYTES_PER_KB, file);
    generate_words(&mut writer, num_lines, &mut rng)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_lines_from_vocabulary() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut buffer = Vec::new();
        generate_words(&mut buffer, 250, &mut rng).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 250);
        assert!(lines.iter().all(|line| VOCABULARY.contains(line)));
    }

    #[test]
    fn test_seed_makes_output_reproducible() {
        let temp = tempfile::tempdir().unwrap();
        let first = temp.path().join("first.txt");
        let second = temp.path().join("second.txt");

        generate_file(&first, 100, Some(42)).unwrap();
        generate_file(&second, 100, Some(42)).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }
}
