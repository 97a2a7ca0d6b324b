//! tagchunk-inspect binary entry point
//!
//! Parses arguments, initializes logging on stderr and prints the report of
//! the chosen subcommand on stdout.

use anyhow::Result;
use clap::Parser;
use tagchunk_inspect::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so JSON reports on stdout stay parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.parser_config();
    tracing::debug!("Parser limits: {config:?}");

    let report = tagchunk_inspect::run(&cli.command, &config, cli.format)?;
    println!("{report}");

    Ok(())
}
