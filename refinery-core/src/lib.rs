//! Core utilities and types shared across all refinery crates

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{RefineryError, RefineryResult};

// Re-export core types
pub use types::{ChoiceId, Class, ClusterId, DropReason, MemberId, SequenceType};

/// Version information for the refinery project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
