//! Mock implementations of workspace traits

pub mod aligner;

pub use aligner::MockAligner;
