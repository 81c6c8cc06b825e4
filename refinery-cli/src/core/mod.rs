//! Pipeline stages behind the subcommands

pub mod engine;
pub mod pipeline;
pub mod tables;
