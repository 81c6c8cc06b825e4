pub mod aligner;

pub use aligner::{Aligner, SearchJob, SearchTarget};
