//! Per cluster-pair bookkeeping over classified alignments

use crate::classification::ClassifiedAlignment;
use indexmap::{IndexMap, IndexSet};
use refinery_core::{Class, ClusterId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ordered (query, subject) cluster pair
pub type ClusterPair = (ClusterId, ClusterId);

/// Whether one side of a pair was marked for dropping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SideStatus {
    #[default]
    Retained,
    Dropped,
}

impl SideStatus {
    pub fn is_dropped(&self) -> bool {
        matches!(self, SideStatus::Dropped)
    }

    /// Suffix used when rendering report rows
    pub fn marker(&self) -> &'static str {
        match self {
            SideStatus::Retained => "",
            SideStatus::Dropped => "*",
        }
    }
}

/// Class counts of a pair in its first-seen orientation and in reverse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrientationCounts {
    pub forward: Option<u32>,
    pub inverse: Option<u32>,
}

impl OrientationCounts {
    fn bump_forward(&mut self) {
        self.forward = Some(self.forward.unwrap_or(0) + 1);
    }

    fn bump_inverse(&mut self) {
        self.inverse = Some(self.inverse.unwrap_or(0) + 1);
    }
}

/// Renders an optional count, '-' when absent
pub struct CountDisplay(pub Option<u32>);

impl fmt::Display for CountDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{}", n),
            None => f.write_str("-"),
        }
    }
}

/// First (highest-priority) classification of a cluster pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedPair {
    pub class: Class,
    pub query: ClusterId,
    pub subject: ClusterId,
    /// Sequence ids of the alignment that decided the class
    pub query_member: String,
    pub subject_member: String,
    pub query_status: SideStatus,
    pub subject_status: SideStatus,
    pub query_frequency: u32,
    pub subject_frequency: u32,
}

impl ProcessedPair {
    pub fn key(&self) -> ClusterPair {
        (self.query.clone(), self.subject.clone())
    }

    /// Cluster marked for dropping, if any
    pub fn dropped(&self) -> Option<&ClusterId> {
        if self.query_status.is_dropped() {
            Some(&self.query)
        } else if self.subject_status.is_dropped() {
            Some(&self.subject)
        } else {
            None
        }
    }

    pub fn status_of(&self, cluster: &ClusterId) -> SideStatus {
        if cluster == &self.query {
            self.query_status
        } else if cluster == &self.subject {
            self.subject_status
        } else {
            SideStatus::Retained
        }
    }
}

/// Distinct sequence ids that contributed to a pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairMembers {
    pub query: IndexSet<String>,
    pub subject: IndexSet<String>,
}

/// Aggregated view of every classified alignment, keyed by cluster pair
#[derive(Debug, Clone, Default)]
pub struct ClassProcessing {
    /// Best classification per pair, in visiting order
    pub pairs: IndexMap<ClusterPair, ProcessedPair>,
    /// Alignments per class per pair, best class first
    pub class_counts: IndexMap<ClusterPair, IndexMap<Class, u32>>,
    /// Counts keyed by the orientation in which the unordered pair first appeared
    pub orientation_counts: IndexMap<ClusterPair, IndexMap<Class, OrientationCounts>>,
    pub members: IndexMap<ClusterPair, PairMembers>,
    /// Clusters drop-marked by at least one pair
    pub drop_mark: IndexSet<ClusterId>,
    pub frequencies: HashMap<ClusterId, u32>,
}

impl ClassProcessing {
    /// Fold classified alignments into per-pair records.
    ///
    /// Input is expected in `classify_all` order so the first alignment seen
    /// for a pair carries its best class.
    pub fn from_classified(classified: &[ClassifiedAlignment]) -> Self {
        let mut processing = Self::default();
        for item in classified {
            processing.add(item);
        }
        processing
    }

    fn add(&mut self, item: &ClassifiedAlignment) {
        let alignment = &item.alignment;
        let class = item.class;
        let key: ClusterPair = (alignment.query_cluster.clone(), alignment.subject_cluster.clone());

        self.frequencies
            .entry(alignment.query_cluster.clone())
            .or_insert(alignment.query_frequency);
        self.frequencies
            .entry(alignment.subject_cluster.clone())
            .or_insert(alignment.subject_frequency);

        *self
            .class_counts
            .entry(key.clone())
            .or_default()
            .entry(class)
            .or_insert(0) += 1;

        let reverse: ClusterPair = (key.1.clone(), key.0.clone());
        if key.0 != key.1 && self.orientation_counts.contains_key(&reverse) {
            self.orientation_counts
                .entry(reverse)
                .or_default()
                .entry(class)
                .or_default()
                .bump_inverse();
        } else {
            self.orientation_counts
                .entry(key.clone())
                .or_default()
                .entry(class)
                .or_default()
                .bump_forward();
        }

        let members = self.members.entry(key.clone()).or_default();
        members.query.insert(alignment.query_id().to_string());
        members.subject.insert(alignment.subject_id().to_string());

        if self.pairs.contains_key(&key) {
            return;
        }

        let (mut query_status, mut subject_status) = (SideStatus::Retained, SideStatus::Retained);
        if class.is_drop_candidate() {
            // The rarer side goes; ties keep the query
            if alignment.query_frequency >= alignment.subject_frequency {
                subject_status = SideStatus::Dropped;
                self.drop_mark.insert(key.1.clone());
            } else {
                query_status = SideStatus::Dropped;
                self.drop_mark.insert(key.0.clone());
            }
        }

        self.pairs.insert(
            key,
            ProcessedPair {
                class,
                query: alignment.query_cluster.clone(),
                subject: alignment.subject_cluster.clone(),
                query_member: alignment.query_id().to_string(),
                subject_member: alignment.subject_id().to_string(),
                query_status,
                subject_status,
                query_frequency: alignment.query_frequency,
                subject_frequency: alignment.subject_frequency,
            },
        );
    }

    pub fn pair(&self, query: &ClusterId, subject: &ClusterId) -> Option<&ProcessedPair> {
        self.pairs.get(&(query.clone(), subject.clone()))
    }

    /// Count of `class` for a pair together with the pair's total
    pub fn class_fraction(&self, key: &ClusterPair, class: Class) -> (u32, u32) {
        self.class_counts
            .get(key)
            .map(|counts| {
                (
                    counts.get(&class).copied().unwrap_or(0),
                    counts.values().sum::<u32>(),
                )
            })
            .unwrap_or((0, 0))
    }

    pub fn is_drop_marked(&self, cluster: &ClusterId) -> bool {
        self.drop_mark.contains(cluster)
    }

    pub fn frequency(&self, cluster: &ClusterId) -> u32 {
        self.frequencies.get(cluster).copied().unwrap_or(0)
    }

    /// Every cluster that appears on either side of a pair
    pub fn matched_clusters(&self) -> IndexSet<ClusterId> {
        self.pairs
            .keys()
            .flat_map(|(q, s)| [q.clone(), s.clone()])
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::alignment::{AlignmentRecord, EnrichedAlignment, KmerMetric, PalignRange};
    use pretty_assertions::assert_eq;

    /// Classified alignment between two sequences of the named clusters
    pub(crate) fn classified(
        query: (&str, &str),
        subject: (&str, &str),
        class: Class,
        frequencies: (u32, u32),
    ) -> ClassifiedAlignment {
        ClassifiedAlignment {
            alignment: EnrichedAlignment {
                record: AlignmentRecord {
                    query_id: query.1.to_string(),
                    subject_id: subject.1.to_string(),
                    query_length: 300,
                    subject_length: 300,
                    query_start: 1,
                    query_end: 300,
                    subject_start: 1,
                    subject_end: 300,
                    alignment_length: 300,
                    score: 500.0,
                    gaps: 0,
                    pident: 100.0,
                },
                query_cluster: ClusterId::new(query.0),
                subject_cluster: ClusterId::new(subject.0),
                score_ratio: 1.0,
                kmer: KmerMetric::Unavailable,
                query_frequency: frequencies.0,
                subject_frequency: frequencies.1,
                global_palign_all: PalignRange { min: 1.0, max: 1.0 },
                global_palign_pident: PalignRange { min: 1.0, max: 1.0 },
                local_palign_min: 1.0,
                hit_count: 1,
            },
            class,
        }
    }

    fn pair(q: &str, s: &str) -> ClusterPair {
        (ClusterId::new(q), ClusterId::new(s))
    }

    #[test]
    fn test_first_class_wins_and_counts_accumulate() {
        let items = vec![
            classified(("A", "A"), ("B", "B"), Class::C1b, (100, 1)),
            classified(("A", "A_1"), ("B", "B"), Class::C2b, (100, 1)),
            classified(("A", "A_2"), ("B", "B"), Class::C2b, (100, 1)),
        ];
        let processing = ClassProcessing::from_classified(&items);

        let p = processing.pair(&ClusterId::new("A"), &ClusterId::new("B")).unwrap();
        assert_eq!(p.class, Class::C1b);
        assert_eq!(p.subject_status, SideStatus::Dropped);
        assert_eq!(p.dropped(), Some(&ClusterId::new("B")));
        assert!(processing.is_drop_marked(&ClusterId::new("B")));

        assert_eq!(processing.class_fraction(&pair("A", "B"), Class::C2b), (2, 3));
        let members = &processing.members[&pair("A", "B")];
        assert_eq!(members.query.len(), 3);
        assert_eq!(members.subject.len(), 1);
    }

    #[test]
    fn test_drop_mark_follows_lower_frequency() {
        let items = vec![classified(("A", "A"), ("B", "B"), Class::C2a, (1, 100))];
        let processing = ClassProcessing::from_classified(&items);
        let p = &processing.pairs[&pair("A", "B")];
        assert_eq!(p.query_status, SideStatus::Dropped);
        assert_eq!(p.subject_status, SideStatus::Retained);
        assert_eq!(p.status_of(&ClusterId::new("A")).marker(), "*");
    }

    #[test]
    fn test_ambiguous_classes_mark_nothing() {
        let items = vec![classified(("A", "A"), ("B", "B"), Class::C1c, (100, 1))];
        let processing = ClassProcessing::from_classified(&items);
        assert!(processing.drop_mark.is_empty());
        assert_eq!(processing.pairs[&pair("A", "B")].dropped(), None);
    }

    #[test]
    fn test_inverse_counts_use_first_orientation() {
        let items = vec![
            classified(("A", "A"), ("B", "B"), Class::C1a, (5, 5)),
            classified(("B", "B"), ("A", "A"), Class::C1a, (5, 5)),
            classified(("B", "B"), ("A", "A_1"), Class::C2b, (5, 5)),
        ];
        let processing = ClassProcessing::from_classified(&items);

        assert_eq!(processing.orientation_counts.len(), 1);
        let counts = &processing.orientation_counts[&pair("A", "B")];
        assert_eq!(
            counts[&Class::C1a],
            OrientationCounts { forward: Some(1), inverse: Some(1) }
        );
        assert_eq!(
            counts[&Class::C2b],
            OrientationCounts { forward: None, inverse: Some(1) }
        );
        assert_eq!(CountDisplay(counts[&Class::C2b].forward).to_string(), "-");
        assert_eq!(processing.matched_clusters().len(), 2);
    }
}
