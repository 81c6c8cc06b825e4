//! Test utilities for the refinery workspace
//!
//! Shared fixtures (deterministic proteins, coding sequences, FASTA and
//! presence tables on disk) and a `MockAligner` that answers searches from
//! canned alignment records instead of running BLAST+.

pub mod fixtures;
pub mod mock;

// Re-export commonly used items
pub use fixtures::{
    coding_sequence, random_protein, write_fasta_fixture, write_presence_table, TestCds,
};
pub use mock::MockAligner;

pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (safe to call from every test)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .try_init();
}
