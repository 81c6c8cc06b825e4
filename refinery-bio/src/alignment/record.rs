use serde::{Deserialize, Serialize};

/// One local alignment reported by the aligner.
///
/// Coordinates are 1-based and inclusive as the aligner writes them; a subject
/// end smaller than its start marks an alignment on the opposite strand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub query_id: String,
    pub subject_id: String,
    pub query_length: u64,
    pub subject_length: u64,
    pub query_start: i64,
    pub query_end: i64,
    pub subject_start: i64,
    pub subject_end: i64,
    pub alignment_length: u64,
    pub score: f64,
    pub gaps: u64,
    /// Percent identity (0-100)
    pub pident: f64,
}

impl AlignmentRecord {
    pub fn is_self_hit(&self) -> bool {
        self.query_id == self.subject_id
    }

    /// Query interval as (low, high)
    pub fn query_interval(&self) -> (i64, i64) {
        ordered(self.query_start, self.query_end)
    }

    /// Subject interval as (low, high)
    pub fn subject_interval(&self) -> (i64, i64) {
        ordered(self.subject_start, self.subject_end)
    }
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
