//! qobf Command-Line Interface
//!
//! ```text
//! qobf -f bell.qasm -q -a cloaked -a inverse:density=0.5
//! qobf -f payload.py -c -a deterministic:checksum=0110
//! qobf list
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{list, obfuscate};
use config::Config;
use qobf_engine::Mode;

/// qobf - quantum circuit obfuscation and quantum-guarded Python scripts
#[derive(Parser)]
#[command(name = "qobf")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(group(ArgGroup::new("mode").required(true).args(["quantum", "classical"])))]
struct Cli {
    /// Input file: a circuit (.qasm, .py, .json) or a Python script
    #[arg(short, long, required = true)]
    file: Option<PathBuf>,

    /// Obfuscate a quantum circuit
    #[arg(short, long)]
    quantum: bool,

    /// Wrap a classical Python script in a quantum guard
    #[arg(short, long)]
    classical: bool,

    /// Algorithm spec `name[:key=value,...]`; repeat to layer
    #[arg(short, long = "algorithm", value_name = "SPEC", required = true)]
    algorithms: Vec<String>,

    /// Output file (default: next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (default: ~/.config/qobf/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List algorithms and their parameters
    List,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Setup logging
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Some(Commands::List) => {
            list::execute();
            Ok(())
        }
        None => {
            let input = cli.file.context("No input file given")?;
            let mode = if cli.classical {
                Mode::Classical
            } else {
                Mode::Quantum
            };
            obfuscate::execute(&input, mode, cli.algorithms, cli.output, &config.engine)
        }
    }
}
