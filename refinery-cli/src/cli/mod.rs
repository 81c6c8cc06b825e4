pub mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use refinery_core::{load_config, Config};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "refinery",
    version,
    about = "Refine gene cluster catalogues from pairwise alignment evidence",
    long_about = "Refinery groups coding sequences into clusters, aligns the cluster \
                  representatives with BLAST+, classifies every alignment into one of eleven \
                  relationship classes and recommends which clusters to join, choose between, \
                  keep or drop."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,

    /// TOML configuration file; command-line flags override its values
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline from coding sequences and a genome presence table
    Refine(commands::refine::RefineArgs),

    /// Classify precomputed alignments and write recommendations
    Classify(commands::classify::ClassifyArgs),

    /// Cluster sequences by shared minimizers
    Cluster(commands::cluster::ClusterArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub threads: usize,
}

impl Cli {
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            threads: self.threads,
        }
    }
}

impl GlobalOptions {
    /// Configuration file values (or defaults) with `--threads` applied
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                load_config(path)
                    .with_context(|| format!("Failed to load configuration {}", path.display()))?
            }
            None => Config::default(),
        };
        if self.threads > 0 {
            config.aligner.workers = self.threads;
        }
        Ok(config)
    }
}
