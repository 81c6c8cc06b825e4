//! External aligner integration for refinery
//!
//! The `Aligner` trait hides the aligner binaries behind database building,
//! search and self-score calls. `BlastAligner` drives BLAST+ as subprocesses
//! and `WorkerPool` fans independent searches out over a fixed number of
//! workers, aborting the whole batch on the first failure.

pub mod aligners;
pub mod pool;
pub mod scores;
pub mod traits;
pub mod types;

pub use aligners::blast::{parse_tabular, parse_tabular_file, BlastAligner, OUTFMT};
pub use pool::{build_worker_pool, WorkerPool};
pub use scores::{best_self_scores, pair_scores};
pub use traits::aligner::{Aligner, SearchJob, SearchTarget};
pub use types::BlastProgram;
