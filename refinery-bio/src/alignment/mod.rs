//! Alignment records and the metrics derived from them

pub mod enrichment;
pub mod palign;
pub mod record;

pub use enrichment::{
    enrich, EnrichedAlignment, EnrichmentContext, EnrichmentOutcome, KmerMetric, PairScores,
    SelfScores,
};
pub use palign::{aligned_length, global_palign, local_palign_min, merge_intervals, round4, PalignRange};
pub use record::AlignmentRecord;
