use std::error::Error;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    bound::{self, BoundArgs},
    domain::{self, DomainArgs},
    run::{self, RunArgs},
};
use tracing::Level;

mod commands;
mod render;
mod scenarios;

#[derive(Parser, Debug)]
#[command(name = "opver", about = "Differential-equivalence verification CLI")]
struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a built-in reference/candidate pair.
    Run(RunArgs),
    /// Print coincidence bounds for given complexity estimates.
    Bound(BoundArgs),
    /// Print a probe domain as canonical JSON.
    Domain(DomainArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Bound(args) => bound::run(&args),
        Command::Domain(args) => domain::run(&args),
    }
}
