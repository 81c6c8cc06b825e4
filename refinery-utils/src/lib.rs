//! Shared utilities for refinery
//!
//! Thread pool and progress helpers, console output formatting and the
//! tab-separated report writers.

pub mod output;
pub mod parallel;
pub mod progress;
pub mod report;

// Re-export commonly used types
pub use output::{create_standard_table, format_number, header_cell, info, success, warning};
pub use parallel::{configure_thread_pool, get_available_cores, resolve_workers};
pub use progress::{create_progress_bar, create_spinner};
pub use report::{ReportWriter, RunSummary};
