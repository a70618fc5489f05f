//! Polarity command line.
//!
//! ```bash
//! # Fit and save the vectorizer and classifier
//! polarity train --csv Reviews.csv --out models --limit 50000
//!
//! # Score one text
//! polarity predict "Great taste, arrived quickly"
//!
//! # Score a file, one text per line
//! polarity batch reviews.txt
//!
//! # Show which artifacts are present
//! polarity info
//! ```
//!
//! Logging goes to stderr. Set `RUST_LOG=debug` for stage detail.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use polarity_core::artifact::ArtifactPaths;
use polarity_core::evaluate::BatchSummary;
use polarity_core::fetch::CsvFetcher;
use polarity_core::inference::SentimentService;
use polarity_core::model::LogisticModel;
use polarity_core::train::{default_model_dir, train};
use polarity_types::{PipelineConfig, Result, SentimentResult, SplitConfig};

#[derive(Parser)]
#[command(name = "polarity")]
#[command(about = "Review sentiment training and inference")]
#[command(version)]
struct Cli {
    /// Directory holding vectorizer.bin and model.bin
    #[arg(long, global = true, default_value_os_t = default_model_dir())]
    models: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train from a review CSV and save both artifacts
    Train {
        /// Review CSV with Score, Summary and Text columns
        #[arg(long)]
        csv: PathBuf,

        /// Output directory (defaults to --models)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Read at most this many rows
        #[arg(long)]
        limit: Option<usize>,

        /// Maximum vocabulary size
        #[arg(long, default_value_t = 10_000)]
        max_features: usize,

        /// Seed for balancing and the train/test split
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Score a single text
    Predict { text: String },

    /// Score every non-empty line of a file
    Batch { file: PathBuf },

    /// Show artifact availability
    Info,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Train {
            csv,
            out,
            limit,
            max_features,
            seed,
        } => {
            let mut config = PipelineConfig::default();
            config.vectorizer.max_features = max_features;
            config.balance.seed = seed;
            config.split = SplitConfig {
                seed,
                ..SplitConfig::default()
            };

            let paths = ArtifactPaths::in_dir(out.unwrap_or(cli.models));
            let fetcher = CsvFetcher::new(csv).with_limit(limit);

            let start = Instant::now();
            let report = train(&fetcher, &config, &paths)?;
            println!("{report}");
            println!("\nElapsed           : {}", fmt_duration(start.elapsed()));
            Ok(ExitCode::SUCCESS)
        }

        Command::Predict { text } => {
            let service = load(&cli.models)?;
            let result = service.predict_single(&text)?;
            print_result(&result);
            Ok(ExitCode::SUCCESS)
        }

        Command::Batch { file } => {
            let service = load(&cli.models)?;
            let contents = fs::read_to_string(&file)?;
            let texts: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();

            let start = Instant::now();
            let results = service.predict_batch(&texts);
            let elapsed = start.elapsed();

            for result in &results {
                print_result(result);
            }
            println!("--------------------------------");
            println!("{}", BatchSummary::from_results(&results));
            println!(
                "Scored {} texts in {}",
                fmt_count(results.len() as u64),
                fmt_duration(elapsed)
            );
            Ok(ExitCode::SUCCESS)
        }

        Command::Info => {
            let status = ArtifactPaths::in_dir(&cli.models).status();
            println!("Vectorizer : {}", status.vectorizer);
            println!("Classifier : {}", status.classifier);
            if status.is_ready() {
                println!("Ready");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Not ready; run `polarity train` first");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn load(dir: &Path) -> Result<SentimentService<LogisticModel>> {
    SentimentService::load(&ArtifactPaths::in_dir(dir))
}

fn print_result(result: &SentimentResult) {
    println!("{:<8} {:>6}  {}", result.label.as_str(), result.confidence_percent(), result.text);
}

fn fmt_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.3} s")
    } else {
        format!("{:.3} ms", secs * 1000.0)
    }
}

fn fmt_count(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);

    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}
