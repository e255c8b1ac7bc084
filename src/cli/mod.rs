// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with clap and hands off to the
// application layer. Two commands are supported:
//   1. `inspect` — build the loaders and report batch statistics
//   2. `vocab`   — describe a dictionary, encode or decode
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, VocabArgs};

use crate::application::config::DatasetConfig;
use crate::application::inspect_use_case::{InspectUseCase, SplitSummary};
use crate::application::vocab_use_case::VocabUseCase;
use crate::infra::config_store::ConfigStore;

#[derive(Parser, Debug)]
#[command(
    name = "formula-loader",
    version,
    about = "Load, encode and batch handwritten math-expression samples."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routing only.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Inspect(args) => run_inspect(args),
            Commands::Vocab(args)   => run_vocab(args),
        }
    }
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("Reading dataset config from '{}'", path);
            ConfigStore::new(path).load()?
        }
        None => DatasetConfig::from(&args),
    };

    if let Some(path) = &args.save_config {
        ConfigStore::new(path).save(&config)?;
    }

    let report = InspectUseCase::new(config, args.epochs, args.metrics_dir).execute()?;

    print_summary("train", &report.train);
    print_summary("eval", &report.eval);
    Ok(())
}

fn print_summary(split: &str, s: &SplitSummary) {
    println!(
        "{:<5} | batches={:>5} | items={:>7} | dropped={:>5} | max HxW={}x{} | max len={}",
        split, s.batches, s.accepted, s.dropped(), s.max_height, s.max_width, s.max_length,
    );
}

fn run_vocab(args: VocabArgs) -> Result<()> {
    let use_case = VocabUseCase::load(&args.vocab_path)?;

    match (&args.encode, &args.decode) {
        (Some(text), _) => {
            let ids: Vec<String> = use_case.encode(text)?.iter().map(u32::to_string).collect();
            println!("{}", ids.join(" "));
        }
        (None, Some(text)) => println!("{}", use_case.decode(text)?),
        (None, None)       => println!("{}", use_case.summary()),
    }
    Ok(())
}
