//! Greedy minimizer clustering of protein sequences

use super::membership::ClusterMembership;
use indexmap::IndexMap;
use refinery_core::config::ClusteringConfig;
use refinery_core::ClusterId;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Largest k-mer that still packs into a u64
pub const MAX_KMER_SIZE: usize = 8;

/// Pack a k-mer into a u64, most significant byte first.
///
/// Byte-wise lexicographic order of equal-length k-mers equals numeric order of
/// the packed values.
fn pack_kmer(kmer: &[u8]) -> u64 {
    kmer.iter()
        .fold(0u64, |acc, &b| (acc << 8) | b.to_ascii_uppercase() as u64)
}

/// Sorted, de-duplicated minimizers of `sequence`.
///
/// Each window of `window` consecutive k-mers (step 1) contributes its
/// lexicographically smallest k-mer. A sequence with fewer than `window`
/// k-mers forms a single window; one shorter than `k` has no minimizers.
pub fn minimizers(sequence: &[u8], k: usize, window: usize) -> Vec<u64> {
    if k == 0 || window == 0 || sequence.len() < k {
        return Vec::new();
    }
    let kmers: Vec<u64> = sequence.windows(k).map(pack_kmer).collect();
    let span = window.min(kmers.len());

    let mut result: Vec<u64> = kmers
        .windows(span)
        .filter_map(|w| w.iter().min().copied())
        .collect();
    result.sort_unstable();
    result.dedup();
    result
}

/// Number of minimizers shared by two sorted minimizer sets
pub fn shared_count(a: &[u64], b: &[u64]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

/// k-mer similarity and coverage between two sequences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KmerScore {
    /// Shared minimizers over the query's minimizer count
    pub similarity: f64,
    /// Shared minimizers times k over the target's length, capped at 1
    pub coverage: f64,
}

impl KmerScore {
    pub fn compute(shared: usize, query_size: usize, k: usize, target_length: usize) -> Self {
        let similarity = if query_size == 0 {
            0.0
        } else {
            shared as f64 / query_size as f64
        };
        let coverage = if target_length == 0 {
            0.0
        } else {
            ((shared * k) as f64 / target_length as f64).min(1.0)
        };
        Self {
            similarity,
            coverage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub id: String,
    pub similarity: f64,
    pub coverage: f64,
}

/// Result of a clustering run
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    clusters: IndexMap<ClusterId, Vec<ClusterMember>>,
    signatures: IndexMap<ClusterId, Vec<u64>>,
    lengths: HashMap<String, usize>,
    /// Minimizer to representative positions
    index: HashMap<u64, Vec<usize>>,
}

impl Clustering {
    pub fn clusters(&self) -> &IndexMap<ClusterId, Vec<ClusterMember>> {
        &self.clusters
    }

    pub fn members(&self, cluster: &ClusterId) -> &[ClusterMember] {
        self.clusters.get(cluster).map(|m| m.as_slice()).unwrap_or(&[])
    }

    /// Representative to minimizer set
    pub fn signatures(&self) -> &IndexMap<ClusterId, Vec<u64>> {
        &self.signatures
    }

    /// Protein length of every clustered sequence
    pub fn lengths(&self) -> &HashMap<String, usize> {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn singleton_count(&self) -> usize {
        self.clusters.values().filter(|m| m.len() == 1).count()
    }

    /// Shared minimizer counts per representative position, ascending by position
    fn shared_with_representatives(&self, signature: &[u64]) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for minimizer in signature {
            if let Some(reps) = self.index.get(minimizer) {
                for &rep in reps {
                    *counts.entry(rep).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    fn add_representative(&mut self, id: &str, signature: Vec<u64>) {
        let position = self.clusters.len();
        for &minimizer in &signature {
            self.index.entry(minimizer).or_default().push(position);
        }
        let cluster = ClusterId::new(id);
        self.clusters.insert(
            cluster.clone(),
            vec![ClusterMember {
                id: id.to_string(),
                similarity: 1.0,
                coverage: 1.0,
            }],
        );
        self.signatures.insert(cluster, signature);
    }

    /// Re-attach sequences removed by protein deduplication.
    ///
    /// `duplicates_of` returns the identifiers sharing a member's protein; they
    /// are appended to the member's cluster with the member's scores.
    pub fn attach_duplicates<F>(&mut self, duplicates_of: F)
    where
        F: Fn(&str) -> Vec<String>,
    {
        for members in self.clusters.values_mut() {
            let originals = members.clone();
            for member in originals {
                for duplicate in duplicates_of(&member.id) {
                    if let Some(&length) = self.lengths.get(&member.id) {
                        self.lengths.insert(duplicate.clone(), length);
                    }
                    members.push(ClusterMember {
                        id: duplicate,
                        similarity: member.similarity,
                        coverage: member.coverage,
                    });
                }
            }
        }
    }

    /// Cluster to member-id mapping, representative first
    pub fn membership(&self) -> ClusterMembership {
        ClusterMembership::from_clusters(
            self.clusters
                .iter()
                .map(|(id, members)| (id.clone(), members.iter().map(|m| m.id.clone()).collect()))
                .collect(),
        )
    }
}

/// Representative-vs-representative k-mer scores, keyed by (query, subject) cluster
#[derive(Debug, Clone, Default)]
pub struct KmerSimilarityTable {
    entries: HashMap<(ClusterId, ClusterId), KmerScore>,
}

impl KmerSimilarityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: ClusterId, subject: ClusterId, score: KmerScore) {
        self.entries.insert((query, subject), score);
    }

    pub fn get(&self, query: &ClusterId, subject: &ClusterId) -> Option<KmerScore> {
        self.entries.get(&(query.clone(), subject.clone())).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Greedy clusterer: longest sequences first, each joins the best matching
/// representative or founds a new cluster
#[derive(Debug, Clone)]
pub struct MinimizerClusterer {
    pub kmer_size: usize,
    pub window_size: usize,
    pub similarity_threshold: f64,
    pub coverage_threshold: f64,
}

impl Default for MinimizerClusterer {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

impl MinimizerClusterer {
    pub fn new(kmer_size: usize, window_size: usize) -> Self {
        Self {
            kmer_size: kmer_size.clamp(1, MAX_KMER_SIZE),
            window_size: window_size.max(1),
            similarity_threshold: 0.9,
            coverage_threshold: 0.9,
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(config.kmer_size, config.window_size)
            .with_thresholds(config.similarity_threshold, config.coverage_threshold)
    }

    pub fn with_thresholds(mut self, similarity: f64, coverage: f64) -> Self {
        self.similarity_threshold = similarity;
        self.coverage_threshold = coverage;
        self
    }

    pub fn signature(&self, protein: &str) -> Vec<u64> {
        minimizers(protein.as_bytes(), self.kmer_size, self.window_size)
    }

    /// Cluster `(id, protein)` pairs.
    ///
    /// Input is re-sorted by protein length, longest first, ties by id, so the
    /// result does not depend on the caller's order.
    pub fn cluster(&self, proteins: &[(String, String)]) -> Clustering {
        let mut ordered: Vec<&(String, String)> = proteins.iter().collect();
        ordered.sort_by(|a, b| (Reverse(a.1.len()), &a.0).cmp(&(Reverse(b.1.len()), &b.0)));

        let mut clustering = Clustering::default();
        let mut rep_lengths: Vec<usize> = Vec::new();

        for (id, protein) in ordered {
            clustering.lengths.insert(id.clone(), protein.len());
            let signature = self.signature(protein);

            let mut best: Option<(usize, KmerScore)> = None;
            if !signature.is_empty() {
                for (rep, shared) in clustering.shared_with_representatives(&signature) {
                    let score =
                        KmerScore::compute(shared, signature.len(), self.kmer_size, rep_lengths[rep]);
                    if score.similarity < self.similarity_threshold
                        || score.coverage < self.coverage_threshold
                    {
                        continue;
                    }
                    let better = match &best {
                        None => true,
                        Some((_, current)) => {
                            (score.similarity, score.coverage) > (current.similarity, current.coverage)
                        }
                    };
                    if better {
                        best = Some((rep, score));
                    }
                }
            }

            match best {
                Some((rep, score)) => {
                    if let Some((_, members)) = clustering.clusters.get_index_mut(rep) {
                        members.push(ClusterMember {
                            id: id.clone(),
                            similarity: score.similarity,
                            coverage: score.coverage,
                        });
                    }
                }
                None => {
                    clustering.add_representative(id, signature);
                    rep_lengths.push(protein.len());
                }
            }
        }

        info!(
            "Clustered {} proteins into {} clusters ({} singletons)",
            proteins.len(),
            clustering.len(),
            clustering.singleton_count()
        );
        clustering
    }

    /// Scores between every pair of representatives sharing a minimizer,
    /// with both thresholds at 0
    pub fn representative_similarity(&self, clustering: &Clustering) -> KmerSimilarityTable {
        let mut table = KmerSimilarityTable::new();
        let reps: Vec<(&ClusterId, &Vec<u64>)> = clustering.signatures.iter().collect();

        for (position, (query, signature)) in reps.iter().enumerate() {
            for (other, shared) in clustering.shared_with_representatives(signature) {
                if other == position {
                    continue;
                }
                let subject = reps[other].0;
                let target_length = clustering
                    .lengths
                    .get(subject.as_str())
                    .copied()
                    .unwrap_or(0);
                table.insert(
                    (*query).clone(),
                    subject.clone(),
                    KmerScore::compute(shared, signature.len(), self.kmer_size, target_length),
                );
            }
        }
        debug!("Computed {} representative k-mer scores", table.len());
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(id, p)| (id.to_string(), p.to_string()))
            .collect()
    }

    const PROTEIN: &str = "MKVLAAGIVGLLLAQSSWATEKPLDNRYHHCFGQ";

    #[test]
    fn test_pack_preserves_lexicographic_order() {
        assert!(pack_kmer(b"AAAAA") < pack_kmer(b"AAAAC"));
        assert!(pack_kmer(b"MKVLA") < pack_kmer(b"MKVLY"));
        assert_eq!(pack_kmer(b"mkvla"), pack_kmer(b"MKVLA"));
    }

    #[test]
    fn test_minimizers_windows() {
        // 3 k-mers of size 2 with window 2: min(AB, BC) = AB, min(BC, CA) = BC
        let mins = minimizers(b"ABCA", 2, 2);
        assert_eq!(mins, vec![pack_kmer(b"AB"), pack_kmer(b"BC")]);

        // Fewer k-mers than the window still yields one minimizer
        assert_eq!(minimizers(b"ZYX", 2, 5), vec![pack_kmer(b"YX")]);
        assert!(minimizers(b"AB", 5, 5).is_empty());
    }

    #[test]
    fn test_shared_count() {
        assert_eq!(shared_count(&[1, 3, 5, 7], &[2, 3, 7, 9]), 2);
        assert_eq!(shared_count(&[], &[1]), 0);
    }

    #[test]
    fn test_identical_proteins_cluster_together() {
        let clusterer = MinimizerClusterer::default();
        let clustering = clusterer.cluster(&pairs(&[("b", PROTEIN), ("a", PROTEIN)]));

        assert_eq!(clustering.len(), 1);
        let (rep, members) = clustering.clusters().get_index(0).unwrap();
        // Equal lengths: ties broken by id
        assert_eq!(rep.as_str(), "a");
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].id, "b");
        assert_eq!(members[1].similarity, 1.0);
    }

    #[test]
    fn test_longest_sequence_is_representative() {
        let clusterer = MinimizerClusterer::default().with_thresholds(0.5, 0.5);
        let longer = format!("{}W", PROTEIN);
        let clustering = clusterer.cluster(&pairs(&[("short", PROTEIN), ("long", &longer)]));

        assert_eq!(clustering.len(), 1);
        assert_eq!(clustering.clusters().keys().next().unwrap().as_str(), "long");
    }

    #[test]
    fn test_unrelated_proteins_are_singletons() {
        let clusterer = MinimizerClusterer::default();
        let clustering = clusterer.cluster(&pairs(&[
            ("x", PROTEIN),
            ("y", "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW"),
            ("tiny", "MK"),
        ]));
        assert_eq!(clustering.len(), 3);
        assert_eq!(clustering.singleton_count(), 3);
    }

    #[test]
    fn test_members_meet_thresholds() {
        let clusterer = MinimizerClusterer::default();
        let variant = PROTEIN.replacen("GQ", "GA", 1);
        let clustering = clusterer.cluster(&pairs(&[("a", PROTEIN), ("b", &variant), ("c", PROTEIN)]));
        for members in clustering.clusters().values() {
            for member in &members[1..] {
                assert!(member.similarity >= 0.9);
                assert!(member.coverage >= 0.9);
            }
        }
    }

    #[test]
    fn test_attach_duplicates() {
        let clusterer = MinimizerClusterer::default();
        let mut clustering = clusterer.cluster(&pairs(&[("a", PROTEIN)]));
        clustering.attach_duplicates(|id| {
            if id == "a" {
                vec!["a_dup".to_string()]
            } else {
                Vec::new()
            }
        });

        let membership = clustering.membership();
        assert_eq!(
            membership.members(&ClusterId::new("a")),
            &["a".to_string(), "a_dup".to_string()]
        );
        assert_eq!(clustering.lengths()["a_dup"], PROTEIN.len());
    }

    #[test]
    fn test_representative_similarity_includes_weak_pairs() {
        let clusterer = MinimizerClusterer::default();
        let half = &PROTEIN[..PROTEIN.len() / 2];
        let clustering = clusterer.cluster(&pairs(&[("full", PROTEIN), ("half", half)]));
        assert_eq!(clustering.len(), 2);

        let table = clusterer.representative_similarity(&clustering);
        let full = ClusterId::new("full");
        let half_id = ClusterId::new("half");

        let forward = table.get(&half_id, &full).unwrap();
        assert_eq!(forward.similarity, 1.0);
        assert!(forward.coverage < 0.9);
        assert!(table.get(&full, &half_id).is_some());
        assert!(table.get(&full, &full).is_none());
    }
}
