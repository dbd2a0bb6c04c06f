use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use word_freq::generator::generate_file;
use word_freq::{count_words, MergeStrategy, Phase, WordCount, WordFreqConfig, WordFreqError};

/// Writes `lines` as the input file and returns a config pointing at fresh
/// output and scratch paths inside `temp_dir`.
fn create_test_config(temp_dir: &TempDir, lines: &[&str], chunk_size: usize) -> Result<WordFreqConfig> {
    let input = temp_dir.path().join("input.txt");
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    fs::write(&input, content)?;

    Ok(WordFreqConfig::new(&input, temp_dir.path().join("output.txt"))
        .with_chunk_size(chunk_size)
        .with_scratch_dir(temp_dir.path().join("scratch")))
}

fn read_output(path: &Path) -> Result<Vec<WordCount>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .map(|line| WordCount::from_line(line).map_err(anyhow::Error::msg))
        .collect()
}

fn expected_counts(input: &Path) -> Result<HashMap<String, u64>> {
    let mut counts = HashMap::new();
    for line in fs::read_to_string(input)?.lines() {
        if !line.is_empty() {
            *counts.entry(line.to_string()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

fn assert_descending_and_unique(records: &[WordCount]) {
    for pair in records.windows(2) {
        assert!(pair[0].count >= pair[1].count, "{} before {}", pair[0], pair[1]);
    }
    let mut words: Vec<&str> = records.iter().map(|r| r.word.as_str()).collect();
    words.sort_unstable();
    words.dedup();
    assert_eq!(words.len(), records.len(), "a word appears twice in the output");
}

#[test]
fn test_small_example() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = create_test_config(&temp_dir, &["a", "b", "a", "c", "b", "a"], 2)?;
    let output = config.output_path.clone();

    count_words(config)?;

    assert_eq!(fs::read_to_string(&output)?, "a 3\nb 2\nc 1\n");
    Ok(())
}

#[test]
fn test_single_repeated_word() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let lines = vec!["word"; 10_000];
    let config = create_test_config(&temp_dir, &lines, 100)?;
    let output = config.output_path.clone();

    let stats = count_words(config)?;

    assert_eq!(fs::read_to_string(&output)?, "word 10000\n");
    assert_eq!(stats.flushes, 100);
    assert_eq!(stats.runs_created, 1);
    Ok(())
}

#[test]
fn test_empty_input_gives_empty_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = create_test_config(&temp_dir, &[], 10)?;
    let output = config.output_path.clone();
    let scratch = config.scratch_dir.clone();

    let stats = count_words(config)?;

    assert!(output.exists());
    assert_eq!(fs::read_to_string(&output)?, "");
    assert_eq!(stats.runs_created, 0);
    assert!(!scratch.exists());
    Ok(())
}

#[test]
fn test_blank_lines_only() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = create_test_config(&temp_dir, &["", "", ""], 2)?;
    let output = config.output_path.clone();

    let stats = count_words(config)?;

    assert_eq!(fs::read_to_string(&output)?, "");
    assert_eq!(stats.empty_lines_skipped, 3);
    assert_eq!(stats.words_counted, 0);
    Ok(())
}

#[test]
fn test_unusual_words_are_counted_verbatim() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let lines = [
        "../../etc/passwd", "a/b", "new york", "new york", " ", "ünïcödé", "a/b", "new york",
    ];
    let config = create_test_config(&temp_dir, &lines, 3)?;
    let output = config.output_path.clone();

    count_words(config)?;

    assert_eq!(
        read_output(&output)?,
        vec![
            WordCount::new("new york", 3),
            WordCount::new("a/b", 2),
            WordCount::new(" ", 1),
            WordCount::new("../../etc/passwd", 1),
            WordCount::new("ünïcödé", 1),
        ]
    );

    // Nothing was written next to the scratch directory.
    let mut entries: Vec<String> = fs::read_dir(temp_dir.path())?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    assert_eq!(entries, vec!["input.txt", "output.txt"]);
    Ok(())
}

#[test]
fn test_chunk_size_does_not_change_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("input.txt");
    generate_file(&input, 2_000, Some(1234))?;
    let expected = expected_counts(&input)?;

    let mut outputs: Vec<String> = Vec::new();
    for (index, chunk_size) in [1usize, 7, 10_000].into_iter().enumerate() {
        for strategy in [MergeStrategy::Stream, MergeStrategy::Aggregate] {
            let output: PathBuf = temp_dir.path().join(format!("out_{}_{}.txt", index, strategy));
            let config = WordFreqConfig::new(&input, &output)
                .with_chunk_size(chunk_size)
                .with_scratch_dir(temp_dir.path().join("scratch"))
                .with_merge_strategy(strategy);

            let stats = count_words(config)?;
            assert_eq!(stats.words_counted, 2_000);

            let records = read_output(&output)?;
            assert_descending_and_unique(&records);
            let actual: HashMap<String, u64> = records.into_iter().map(|r| (r.word, r.count)).collect();
            assert_eq!(actual, expected);

            outputs.push(fs::read_to_string(&output)?);
        }
    }

    assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
    Ok(())
}

#[test]
fn test_corrupt_input_cleans_up_scratch() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("input.txt");
    fs::write(&input, b"fine\nalso fine\n\xc3\x28\n")?;
    let output = temp_dir.path().join("output.txt");
    let scratch = temp_dir.path().join("scratch");

    let config = WordFreqConfig::new(&input, &output).with_scratch_dir(&scratch);
    let err = count_words(config).unwrap_err();

    match &err {
        WordFreqError::Corrupt { phase, path, line, .. } => {
            assert_eq!(*phase, Phase::Counting);
            assert_eq!(path, &input);
            assert_eq!(*line, 3);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!scratch.exists());
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_missing_input_is_a_config_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let scratch = temp_dir.path().join("scratch");
    let config = WordFreqConfig::new(temp_dir.path().join("nope.txt"), temp_dir.path().join("out.txt"))
        .with_scratch_dir(&scratch);

    let err = count_words(config).unwrap_err();

    assert!(matches!(err, WordFreqError::Config(_)));
    assert_eq!(err.phase(), Phase::Setup);
    assert!(!scratch.exists());
    Ok(())
}
