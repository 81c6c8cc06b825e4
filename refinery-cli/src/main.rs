use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;

use crate::cli::{Cli, Commands};
use refinery_core::RefineryError;

fn main() {
    let cli = Cli::parse();

    // -v and -vv win over REFINERY_LOG, which wins over RUST_LOG
    let filter = match cli.verbose {
        0 => match std::env::var("REFINERY_LOG") {
            Ok(level) => EnvFilter::new(level),
            Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        },
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    if let Some(err) = e.downcast_ref::<RefineryError>() {
        return err.exit_code();
    }
    if e.downcast_ref::<std::io::Error>().is_some() {
        return 3;
    }
    1
}

fn run(cli: Cli) -> anyhow::Result<()> {
    refinery_utils::configure_thread_pool(cli.threads)?;
    if cli.verbose > 0 {
        eprintln!(
            "Using {} threads",
            refinery_utils::resolve_workers(cli.threads)
        );
    }

    let global = cli.global_options();
    match cli.command {
        Commands::Refine(args) => crate::cli::commands::refine::run(args, &global),
        Commands::Classify(args) => crate::cli::commands::classify::run(args, &global),
        Commands::Cluster(args) => crate::cli::commands::cluster::run(args, &global),
    }
}
