//! workloads CLI - inspect .NET SDK workload manifests, sets, and installs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("workloads=debug")
    } else {
        EnvFilter::new("workloads=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Summary(args) => commands::summary::execute(args),
        Commands::Manifest(args) => commands::manifest::execute(&cli.feed, args),
        Commands::Sets(args) => commands::sets::execute(&cli.feed, args),
        Commands::Deps(args) => commands::deps::execute(&cli.feed, args),
        Commands::Pin(args) => commands::pin::execute(args),
    }
}
