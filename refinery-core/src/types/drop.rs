/// Reasons a sequence is removed from the catalogue
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// Shorter than the minimum nucleotide length
    CdsSize,
    /// Cluster frequency below the genome presence threshold
    ClusterFrequency,
    /// Matched a cluster present in more genomes
    SmallerGenomePresence,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CdsSize => "Dropped_due_to_cds_size",
            Self::ClusterFrequency => "Dropped_due_to_cluster_frequency_filtering",
            Self::SmallerGenomePresence => {
                "Dropped_due_to_smaller_genome_presence_than_matched_cluster"
            }
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
