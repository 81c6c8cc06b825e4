//! Bioinformatics engine for refinery
//!
//! Everything between raw sequences and recommendation structures lives here:
//! the sequence registry, FASTA I/O, minimizer clustering, alignment enrichment,
//! the classifier and the relationship resolver. All of it is single-threaded
//! and deterministic for a given input order.

pub mod alignment;
pub mod classification;
pub mod clustering;
pub mod formats;
pub mod relationship;
pub mod sequence;

// Re-export commonly used types
pub use alignment::{AlignmentRecord, EnrichedAlignment, EnrichmentContext};
pub use classification::{classify, classify_all, ClassifiedAlignment, Thresholds};
pub use clustering::{ClusterMembership, DisjointSet, KmerSimilarityTable, MinimizerClusterer};
pub use formats::{parse_fasta, write_fasta};
pub use relationship::{resolve, ClassProcessing, KeepResult, Resolution};
pub use sequence::{Sequence, SequenceRegistry};
