//! Aligner implementations

pub mod blast;
