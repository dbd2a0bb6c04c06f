use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use word_freq::generator::generate_file;
use word_freq::utils;

#[derive(Parser)]
#[command(name = "word-gen")]
#[command(about = "Write random words, one per line, as input for word-freq")]
#[command(version)]
struct Args {
    #[arg(help = "Number of lines to generate")]
    lines: usize,

    #[arg(help = "Output file")]
    output: PathBuf,

    #[arg(long, help = "Seed for reproducible output")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging("normal")?;

    info!("Start generate");
    generate_file(&args.output, args.lines, args.seed)?;
    info!("Done generate: {} lines written to {}", args.lines, args.output.display());

    Ok(())
}
