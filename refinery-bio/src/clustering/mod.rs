//! Signature clustering and the shared disjoint-set utility

pub mod membership;
pub mod minimizer;
pub mod union_find;

pub use membership::{ClusterFrequencies, ClusterMembership, IdChange};
pub use minimizer::{
    minimizers, shared_count, ClusterMember, Clustering, KmerScore, KmerSimilarityTable,
    MinimizerClusterer, MAX_KMER_SIZE,
};
pub use union_find::DisjointSet;
