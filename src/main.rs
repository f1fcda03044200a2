//! ratescout - supplier rating extraction CLI

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ratescout::cli::{Cli, Commands};
use ratescout::error::Result;

mod commands;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red(), e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

/// Log to stderr; RUST_LOG wins over -v
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "ratescout=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            company,
            pages,
            output,
        } => commands::cmd_extract(company, pages, &output),
        Commands::Batch { list, output } => commands::cmd_batch(&list, &output),
        Commands::Match {
            input,
            candidate,
            json,
        } => commands::cmd_match(&input, &candidate, json),
        Commands::Doctor => commands::cmd_doctor(),
        Commands::Config { init } => commands::cmd_config(init),
    }
}
