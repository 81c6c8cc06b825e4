//! Derived metrics for raw aligner output
//!
//! Records are grouped per (query, subject) pair in first-seen order. Each pair
//! keeps its highest-scoring record and gains the score ratio, k-mer scores,
//! cluster frequencies and the global/local alignment percentages.

use super::palign::{global_palign, local_palign_min, round4, PalignRange};
use super::record::AlignmentRecord;
use crate::clustering::{ClusterFrequencies, ClusterMembership, KmerScore, KmerSimilarityTable};
use indexmap::IndexMap;
use refinery_core::{ClusterId, RefineryError, RefineryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Self-alignment score per sequence
pub type SelfScores = HashMap<String, f64>;

/// Best protein alignment score per (query, subject)
#[derive(Debug, Clone, Default)]
pub struct PairScores {
    scores: HashMap<(String, String), f64>,
}

impl PairScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score, keeping the highest one seen for the pair
    pub fn insert(&mut self, query: &str, subject: &str, score: f64) {
        let entry = self
            .scores
            .entry((query.to_string(), subject.to_string()))
            .or_insert(score);
        if score > *entry {
            *entry = score;
        }
    }

    pub fn get(&self, query: &str, subject: &str) -> Option<f64> {
        self.scores
            .get(&(query.to_string(), subject.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Fold another table in, keeping the higher score on overlap
    pub fn merge(&mut self, other: PairScores) {
        for ((query, subject), score) in other.scores {
            self.insert(&query, &subject, score);
        }
    }
}

/// k-mer metrics of a pair; `Unavailable` when no similarity table was built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KmerMetric {
    Unavailable,
    Score(KmerScore),
}

impl KmerMetric {
    pub fn similarity(&self) -> Option<f64> {
        match self {
            Self::Unavailable => None,
            Self::Score(s) => Some(s.similarity),
        }
    }

    pub fn coverage(&self) -> Option<f64> {
        match self {
            Self::Unavailable => None,
            Self::Score(s) => Some(s.coverage),
        }
    }

    /// Render one value, '-' when unavailable
    pub fn display_value(value: Option<f64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }
}

impl fmt::Display for KmerMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "-\t-"),
            Self::Score(s) => write!(f, "{}\t{}", s.similarity, s.coverage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAlignment {
    /// Highest-scoring record of the pair
    pub record: AlignmentRecord,
    pub query_cluster: ClusterId,
    pub subject_cluster: ClusterId,
    pub score_ratio: f64,
    pub kmer: KmerMetric,
    pub query_frequency: u32,
    pub subject_frequency: u32,
    pub global_palign_all: PalignRange,
    pub global_palign_pident: PalignRange,
    pub local_palign_min: f64,
    /// Local alignments reported for the pair
    pub hit_count: usize,
}

impl EnrichedAlignment {
    pub fn query_id(&self) -> &str {
        &self.record.query_id
    }

    pub fn subject_id(&self) -> &str {
        &self.record.subject_id
    }

    pub fn pident(&self) -> f64 {
        self.record.pident
    }
}

/// Read-only inputs for enrichment
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentContext<'a> {
    pub membership: &'a ClusterMembership,
    pub frequencies: &'a ClusterFrequencies,
    pub self_scores: &'a SelfScores,
    pub pair_scores: Option<&'a PairScores>,
    pub kmer_table: Option<&'a KmerSimilarityTable>,
    /// Identity cut for the filtered global palign variant
    pub pident_threshold: f64,
}

impl<'a> EnrichmentContext<'a> {
    pub fn new(
        membership: &'a ClusterMembership,
        frequencies: &'a ClusterFrequencies,
        self_scores: &'a SelfScores,
        pident_threshold: f64,
    ) -> Self {
        Self {
            membership,
            frequencies,
            self_scores,
            pair_scores: None,
            kmer_table: None,
            pident_threshold,
        }
    }

    pub fn with_pair_scores(mut self, pair_scores: &'a PairScores) -> Self {
        self.pair_scores = Some(pair_scores);
        self
    }

    pub fn with_kmer_table(mut self, kmer_table: &'a KmerSimilarityTable) -> Self {
        self.kmer_table = Some(kmer_table);
        self
    }

    fn frequency(&self, cluster: &ClusterId) -> u32 {
        self.frequencies.get(cluster).copied().unwrap_or(0)
    }

    /// Best score over self-score, collapsed to an integer above 1, rounded
    fn score_ratio(&self, best: &AlignmentRecord) -> RefineryResult<f64> {
        let self_score = self
            .self_scores
            .get(&best.query_id)
            .copied()
            .ok_or_else(|| RefineryError::MissingSelfScore(best.query_id.clone()))?;

        let score = match self.pair_scores {
            Some(pairs) => pairs.get(&best.query_id, &best.subject_id).unwrap_or(0.0),
            None => best.score,
        };
        if self_score <= 0.0 {
            return Ok(0.0);
        }

        let mut ratio = score / self_score;
        if ratio > 1.0 {
            ratio = ratio.round();
        }
        Ok(round4(ratio))
    }

    fn kmer_metric(&self, query: &ClusterId, subject: &ClusterId) -> KmerMetric {
        match self.kmer_table {
            None => KmerMetric::Unavailable,
            Some(table) => KmerMetric::Score(table.get(query, subject).unwrap_or(KmerScore {
                similarity: 0.0,
                coverage: 0.0,
            })),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    /// One entry per surviving pair, first-seen order
    pub alignments: Vec<EnrichedAlignment>,
    /// Pairs removed because every alignment was inverted
    pub inverted: Vec<(String, String)>,
    pub self_hits: usize,
}

/// Enrich raw records.
///
/// Fails with `MissingSelfScore` when a query has alignments but no
/// self-alignment score.
pub fn enrich(
    records: &[AlignmentRecord],
    ctx: &EnrichmentContext<'_>,
) -> RefineryResult<EnrichmentOutcome> {
    let mut outcome = EnrichmentOutcome::default();
    let mut pairs: IndexMap<(&str, &str), Vec<&AlignmentRecord>> = IndexMap::new();

    for record in records {
        if record.is_self_hit() {
            outcome.self_hits += 1;
            continue;
        }
        pairs
            .entry((record.query_id.as_str(), record.subject_id.as_str()))
            .or_default()
            .push(record);
    }

    for ((query, subject), hits) in pairs {
        let forward: Vec<&AlignmentRecord> = hits
            .iter()
            .copied()
            .filter(|r| local_palign_min(r) >= 0.0)
            .collect();
        if forward.len() < hits.len() {
            debug!(
                "Discarding {} inverted alignment(s) {} vs {}",
                hits.len() - forward.len(),
                query,
                subject
            );
        }

        // First record wins score ties
        let Some(best) = forward
            .iter()
            .copied()
            .reduce(|best, r| if r.score > best.score { r } else { best })
        else {
            outcome.inverted.push((query.to_string(), subject.to_string()));
            continue;
        };

        let score_ratio = ctx.score_ratio(best)?;
        let local = local_palign_min(best);

        let global_all = global_palign(hits.iter().copied(), best.query_length, best.subject_length);
        let global_pident = global_palign(
            hits.iter().copied().filter(|r| r.pident >= ctx.pident_threshold),
            best.query_length,
            best.subject_length,
        );

        let query_cluster = ctx.membership.cluster_of(query);
        let subject_cluster = ctx.membership.cluster_of(subject);

        outcome.alignments.push(EnrichedAlignment {
            record: best.clone(),
            kmer: ctx.kmer_metric(&query_cluster, &subject_cluster),
            query_frequency: ctx.frequency(&query_cluster),
            subject_frequency: ctx.frequency(&subject_cluster),
            query_cluster,
            subject_cluster,
            score_ratio,
            global_palign_all: global_all,
            global_palign_pident: global_pident,
            local_palign_min: local,
            hit_count: hits.len(),
        });
    }

    info!(
        "Enriched {} alignment pairs ({} inverted, {} self-hits ignored)",
        outcome.alignments.len(),
        outcome.inverted.len(),
        outcome.self_hits
    );
    Ok(outcome)
}
