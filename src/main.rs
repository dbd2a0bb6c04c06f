use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use word_freq::constants::VERBOSE_PROGRESS_INTERVAL_SECONDS;
use word_freq::utils::{self, format_bytes, format_duration};
use word_freq::{MergeStrategy, WordFreqConfig, WordFreqProcessor};

#[derive(Parser)]
#[command(name = "word-freq")]
#[command(about = "Count word frequencies in a line-oriented file with bounded memory")]
#[command(version)]
struct Args {
    #[arg(help = "Input file, one word per line")]
    input: PathBuf,

    #[arg(help = "Output file for `<word> <count>` lines, most frequent first")]
    output: PathBuf,

    #[arg(short = 'n', long, help = "Max lines per batch and records per sorted run [default: 1000]")]
    chunk_size: Option<usize>,

    #[arg(long = "temp", help = "Scratch directory, created and removed by the run [default: ./temp_data]")]
    temp: Option<PathBuf>,

    #[arg(short, long, help = "JSON configuration file; command line arguments take precedence")]
    config: Option<PathBuf>,

    #[arg(long, help = "Merge strategy: stream or aggregate")]
    merge_strategy: Option<MergeStrategy>,

    #[arg(short, long, help = "Verbose output")]
    verbose: bool,

    #[arg(long, help = "Print run statistics as JSON")]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let verbosity = if args.verbose { "verbose" } else { "normal" };
    utils::setup_logging(verbosity)?;

    let mut config = match &args.config {
        Some(path) => WordFreqConfig::from_file(path)?,
        None => WordFreqConfig::default(),
    };
    config.input_path = args.input;
    config.output_path = args.output;
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(temp) = args.temp {
        config.scratch_dir = temp;
    }
    if let Some(strategy) = args.merge_strategy {
        config.merge_strategy = strategy;
    }
    if args.verbose {
        config.verbose = true;
        config.progress_interval_seconds = VERBOSE_PROGRESS_INTERVAL_SECONDS;
    }

    if config.chunk_size == 0 {
        anyhow::bail!("-n must be > 0");
    }
    if !config.input_path.exists() {
        anyhow::bail!("input file {} does not exist", config.input_path.display());
    }

    if let Some(parent) = config.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let input_size = std::fs::metadata(&config.input_path)?.len();
    info!("Input: {} ({})", config.input_path.display(), format_bytes(input_size));

    if !args.json {
        println!("Processing started...");
    }
    let start_time = Instant::now();

    let processor = WordFreqProcessor::new(config)?;
    let stats = processor.process()?;
    let total_time = start_time.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        info!("Lines read: {}", stats.lines_read);
        info!("Empty lines skipped: {}", stats.empty_lines_skipped);
        info!("Distinct words: {}", stats.distinct_words);
        info!("Sorted runs: {}", stats.runs_created);
        info!("Peak memory: {:.1} MB", stats.peak_memory_mb);
        info!("Total time: {}", format_duration(total_time.as_secs_f64()));
    }

    if !args.json {
        println!("Done!");
    }
    Ok(())
}
