use proptest::prelude::*;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;
use word_freq::{count_words, WordCount, WordFreqConfig};

fn run(lines: &[String], chunk_size: usize) -> (String, HashMap<String, u64>) {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("input.txt");
    let output = temp_dir.path().join("output.txt");
    let scratch = temp_dir.path().join("scratch");
    fs::write(&input, lines.join("\n")).unwrap();

    let config = WordFreqConfig::new(&input, &output)
        .with_chunk_size(chunk_size)
        .with_scratch_dir(&scratch);
    count_words(config).unwrap();
    assert!(!scratch.exists());

    let content = fs::read_to_string(&output).unwrap();
    let mut counts = HashMap::new();
    let mut previous: Option<u64> = None;
    for line in content.lines() {
        let record = WordCount::from_line(line).unwrap();
        if let Some(previous) = previous {
            assert!(record.count <= previous);
        }
        previous = Some(record.count);
        assert!(counts.insert(record.word, record.count).is_none());
    }
    (content, counts)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn output_matches_occurrences_for_any_chunk_size(
        lines in prop::collection::vec("[a-d]{0,2}", 0..40),
        chunk_size in 1usize..8,
    ) {
        let mut expected: HashMap<String, u64> = HashMap::new();
        for line in &lines {
            if !line.is_empty() {
                *expected.entry(line.clone()).or_insert(0) += 1;
            }
        }

        let (content, counts) = run(&lines, chunk_size);
        prop_assert_eq!(counts, expected);

        let (reference, _) = run(&lines, 1000);
        prop_assert_eq!(content, reference);
    }
}
