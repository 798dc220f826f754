// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI tool to run the benchmarks and write reports.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lakebench_benchmark::metrics::{format_secs, BenchmarkReport};
use lakebench_benchmark::reporter::print_trials;
use lakebench_benchmark::{
    run_delta_encrypt, run_parquet_encrypt, run_sweep, CsvReporter, JsonReporter,
};
use lakebench_core::{BenchConfig, ConfigLoader, DataGenerator, Workspace};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "run_benchmarks")]
#[command(about = "Benchmark Delta table reads against direct Parquet reads")]
struct Args {
    /// YAML configuration file (built-in defaults if omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root, replaces `workspace.root`
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// CSV report path, replaces `report.csv_path`
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Seed for the data generator
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Run in quick mode (small grid and datasets)
    #[arg(long, global = true)]
    quick: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Native vs direct read over the column/append grid
    Sweep,
    /// Write an encrypted table and read it back
    DeltaEncrypt,
    /// Encrypted vs plain Parquet read time
    ParquetEncrypt,
    /// Every scenario in turn
    All,
    /// Validate the configuration and exit
    Validate,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_file(path)?,
            None => ConfigLoader::defaults()?,
        };
        if self.quick {
            config = config.into_quick();
        }
        if let Some(root) = &self.workspace {
            config.workspace.root = root.clone();
        }
        if let Some(output) = &self.output {
            config.report.csv_path = Some(output.clone());
        }
        if self.seed.is_some() {
            config.sweep.seed = self.seed;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let command = args.command.unwrap_or(Command::Sweep);
    let config = args.load_config()?;

    if command == Command::Validate {
        let trials = config.sweep.trials()?;
        println!("✓ Configuration valid");
        println!("  Workspace: {}", config.workspace.root.display());
        println!("  Trials: {} x {} rows", trials.len(), config.sweep.nrows);
        println!("  CSV report: {}", config.csv_path().display());
        return Ok(());
    }

    println!("Lakebench");
    println!("=========");
    println!("Workspace: {}", config.workspace.root.display());
    match config.sweep.seed {
        Some(seed) => println!("Seed: {}", seed),
        None => println!("Seed: random"),
    }
    println!();

    let workspace = Workspace::new(&config.workspace);
    let mut generator = DataGenerator::new(config.sweep.seed);
    let mut report = BenchmarkReport::new();
    report.seed = config.sweep.seed;

    if matches!(command, Command::Sweep | Command::All) {
        println!("Running read sweep...");
        report.trials = run_sweep(&workspace, &config.sweep, &mut generator).await?;
        println!();
        print_trials(&report.trials);

        let csv = CsvReporter::new(config.csv_path());
        println!();
        println!("Sweep results saved to: {}", csv.save(&report.trials)?.display());
        println!();
    }

    if matches!(command, Command::DeltaEncrypt | Command::All) {
        println!("Running encrypted table scenario...");
        let outcome = run_delta_encrypt(&workspace, &config.encryption, &mut generator).await?;
        println!(
            "  rows={} files={} encrypted_files={} read={}",
            outcome.rows_read,
            outcome.nfiles,
            outcome.encrypted_files,
            format_secs(outcome.time_read)
        );
        if !outcome.encrypted_at_rest() {
            println!("  ⚠ data files are not all encrypted at rest");
        }
        report.delta_encryption = Some(outcome);
        println!();
    }

    if matches!(command, Command::ParquetEncrypt | Command::All) {
        println!("Running Parquet encryption overhead scenario...");
        let overhead = run_parquet_encrypt(&workspace, &config.encryption, &mut generator)?;
        println!("  Unencrypted read time: {}", format_secs(overhead.time_plain));
        println!("  Encrypted read time: {}", format_secs(overhead.time_encrypted));
        println!("  Encrypted/Unencrypted %: {:.1}", overhead.pct);
        report.parquet_encryption = Some(overhead);
        println!();
    }

    if let Some(dir) = &config.report.json_dir {
        let path = JsonReporter::new(dir)?.save(&report)?;
        println!("Benchmark report saved to: {}", path.display());
    }

    Ok(())
}
