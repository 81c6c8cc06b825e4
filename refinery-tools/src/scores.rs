//! Score tables derived from raw aligner records

use refinery_bio::alignment::{AlignmentRecord, PairScores, SelfScores};

/// Highest self-hit score per sequence; other hits are ignored
pub fn best_self_scores(records: &[AlignmentRecord]) -> SelfScores {
    let mut scores = SelfScores::new();
    for record in records.iter().filter(|r| r.is_self_hit()) {
        scores
            .entry(record.query_id.clone())
            .and_modify(|best| {
                if record.score > *best {
                    *best = record.score;
                }
            })
            .or_insert(record.score);
    }
    scores
}

/// Best score per (query, subject) pair, self-hits excluded
pub fn pair_scores(records: &[AlignmentRecord]) -> PairScores {
    let mut scores = PairScores::new();
    for record in records.iter().filter(|r| !r.is_self_hit()) {
        scores.insert(&record.query_id, &record.subject_id, record.score);
    }
    scores
}
