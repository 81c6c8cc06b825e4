//! Recommendation building per relationship group
//!
//! Groups are the connected components of related cluster pairs (every class
//! except `4c` and `5`). Inside a group each unordered pair is visited once,
//! in class priority order, and its verdict files the sides under `Joined`,
//! `Choice`, `Keep` or `Drop`. A final normalisation keeps every identifier in
//! exactly one category.

use super::keep::KeepResult;
use super::process::{ClassProcessing, ClusterPair, ProcessedPair, SideStatus};
use crate::clustering::DisjointSet;
use indexmap::{IndexMap, IndexSet};
use refinery_core::{ChoiceId, Class, ClusterId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info};

/// Identifier as written in a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendedId {
    Cluster(ClusterId),
    /// A whole `1a` join, named after its join id
    Joined(ClusterId),
}

impl RecommendedId {
    /// A cluster as it must be referenced: through its join when it has one
    pub fn for_cluster(cluster: &ClusterId, keep: &KeepResult) -> Self {
        match keep.join_of(cluster) {
            Some(join) => RecommendedId::Joined(join.clone()),
            None => RecommendedId::Cluster(cluster.clone()),
        }
    }
}

impl fmt::Display for RecommendedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendedId::Cluster(id) => write!(f, "{}", id),
            RecommendedId::Joined(id) => write!(f, "Joined_{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Joined(ClusterId),
    Choice { class: Class, id: ChoiceId },
    Keep,
    Drop,
}

impl Category {
    /// Precedence when an identifier lands in more than one category
    pub fn kind_rank(&self) -> u8 {
        match self {
            Category::Joined(_) => 0,
            Category::Choice { .. } => 1,
            Category::Keep => 2,
            Category::Drop => 3,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, Category::Joined(_))
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Category::Choice { .. })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Joined(id) => write!(f, "Joined_{}", id),
            Category::Choice { class, id } => write!(f, "Choice_{}_{}", class, id),
            Category::Keep => f.write_str("Keep"),
            Category::Drop => f.write_str("Drop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: Category,
    pub ids: Vec<RecommendedId>,
}

/// `count/total` alignments of one class for a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFraction {
    pub count: u32,
    pub total: u32,
}

impl fmt::Display for ClassFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.total)
    }
}

/// One line of the related-matches report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedRow {
    pub query: ClusterId,
    pub query_status: SideStatus,
    pub subject: ClusterId,
    pub subject_status: SideStatus,
    pub class: Class,
    pub class_count: ClassFraction,
    /// Class of the reverse orientation, merged into this row
    pub inverse: Option<(Class, ClassFraction)>,
    pub query_frequency: u32,
    pub subject_frequency: u32,
    /// Distinct query sequences aligned
    pub query_members: usize,
    /// Distinct subject sequences aligned against
    pub subject_members: usize,
}

/// A cluster recommended for dropping and the match responsible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedMatch {
    pub dropped: ClusterId,
    pub cause: RecommendedId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipGroup {
    /// 1-based, in order of the group's first related pair
    pub index: usize,
    pub clusters: Vec<ClusterId>,
    pub recommendations: Vec<Recommendation>,
    pub related: Vec<RelatedRow>,
    /// Drops that survived normalisation
    pub dropped: Vec<DroppedMatch>,
}

impl RelationshipGroup {
    pub fn category_of(&self, id: &RecommendedId) -> Option<&Category> {
        self.recommendations
            .iter()
            .find(|r| r.ids.contains(id))
            .map(|r| &r.category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub groups: Vec<RelationshipGroup>,
}

impl Resolution {
    pub fn dropped(&self) -> impl Iterator<Item = &DroppedMatch> {
        self.groups.iter().flat_map(|g| g.dropped.iter())
    }

    pub fn is_dropped(&self, cluster: &ClusterId) -> bool {
        self.dropped().any(|d| &d.dropped == cluster)
    }

    /// Count of recommendations per category kind (Joined, Choice, Keep, Drop)
    pub fn category_totals(&self) -> [usize; 4] {
        let mut totals = [0usize; 4];
        for rec in self.groups.iter().flat_map(|g| g.recommendations.iter()) {
            totals[rec.category.kind_rank() as usize] += 1;
        }
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Default)]
struct GroupBuilder {
    categories: IndexMap<Category, IndexSet<RecommendedId>>,
    related: Vec<RelatedRow>,
    row_index: HashMap<ClusterPair, usize>,
    dropped: Vec<DroppedMatch>,
    /// Dropped cluster and the choice its undropped partner went to
    matched_with_dropped: Vec<(ClusterId, Category)>,
}

impl GroupBuilder {
    fn add(&mut self, category: Category, id: RecommendedId) {
        self.categories.entry(category).or_default().insert(id);
    }

    fn is_joined_or_choice(&self, id: &RecommendedId) -> bool {
        self.categories
            .iter()
            .any(|(category, ids)| (category.is_joined() || category.is_choice()) && ids.contains(id))
    }

    fn push_row(&mut self, pair: &ProcessedPair, processing: &ClassProcessing, keep: &KeepResult, merge_reverse: bool) {
        let key = pair.key();
        let (count, total) = processing.class_fraction(&key, pair.class);
        let fraction = ClassFraction { count, total };

        if merge_reverse {
            let reverse = (pair.subject.clone(), pair.query.clone());
            if let Some(&row) = self.row_index.get(&reverse) {
                self.related[row].inverse = Some((pair.class, fraction));
                return;
            }
        }

        let (query_members, subject_members) = processing
            .members
            .get(&key)
            .map(|m| (m.query.len(), m.subject.len()))
            .unwrap_or((0, 0));
        self.row_index.insert(key, self.related.len());
        self.related.push(RelatedRow {
            query: pair.query.clone(),
            query_status: pair.query_status,
            subject: pair.subject.clone(),
            subject_status: pair.subject_status,
            class: pair.class,
            class_count: fraction,
            inverse: None,
            query_frequency: keep.frequency(&pair.query),
            subject_frequency: keep.frequency(&pair.subject),
            query_members,
            subject_members,
        });
    }

    fn apply(&mut self, pair: &ProcessedPair, keep: &KeepResult, choice_of: &IndexMap<ClusterId, usize>) {
        let (query, subject) = (&pair.query, &pair.subject);
        let query_id = RecommendedId::for_cluster(query, keep);
        let subject_id = RecommendedId::for_cluster(subject, keep);
        let choice = |class: Class| {
            choice_of
                .get(query)
                .or_else(|| choice_of.get(subject))
                .map(|&i| Category::Choice {
                    class,
                    id: ChoiceId(i as u32 + 1),
                })
        };

        match pair.class {
            Class::C1a => {
                for side in [query, subject] {
                    if let Some(join) = keep.join_of(side) {
                        self.add(Category::Joined(join.clone()), RecommendedId::Cluster(side.clone()));
                    }
                }
            }
            class if class.is_ambiguous() => {
                let Some(category) = choice(class) else {
                    return;
                };
                let same_join = keep.join_of(query).is_some() && keep.join_of(query) == keep.join_of(subject);
                let (query_dropped, subject_dropped) = (keep.is_dropped(query), keep.is_dropped(subject));

                if !query_dropped && !subject_dropped && !same_join {
                    self.add(category.clone(), query_id);
                    self.add(category, subject_id);
                } else if query_dropped {
                    self.add(category.clone(), subject_id);
                    self.matched_with_dropped.push((query.clone(), category));
                } else if subject_dropped {
                    self.add(category.clone(), query_id);
                    self.matched_with_dropped.push((subject.clone(), category));
                }
            }
            class if class.is_drop_candidate() => {
                let query_listed = self.is_joined_or_choice(&query_id);
                let subject_listed = self.is_joined_or_choice(&subject_id);

                let joined_side_marked = (keep.is_joined(query) && pair.query_status.is_dropped())
                    || (keep.is_joined(subject) && pair.subject_status.is_dropped());
                if joined_side_marked {
                    if let Some(category) = choice(class) {
                        self.add(category.clone(), query_id.clone());
                        self.add(category, subject_id.clone());
                    }
                }

                // Only the side this pair marked can be dropped by it
                let marked = if pair.query_status.is_dropped() && keep.is_dropped(query) {
                    Some((query, query_id, query_listed, subject_id))
                } else if pair.subject_status.is_dropped() && keep.is_dropped(subject) {
                    Some((subject, subject_id, subject_listed, query_id))
                } else {
                    None
                };
                if let Some((dropped, dropped_id, listed, cause)) = marked {
                    if !listed {
                        self.add(Category::Drop, dropped_id);
                        self.dropped.push(DroppedMatch {
                            dropped: dropped.clone(),
                            cause,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    /// X dropped because of Y while also matching an undropped Z: Y joins Z's
    /// choice and X moves there from Drop
    fn cascade_dropped_choices(&mut self) {
        let mut moves: Vec<(Category, RecommendedId, RecommendedId)> = Vec::new();
        for dropped in &self.dropped {
            for (matched, category) in &self.matched_with_dropped {
                if matched == &dropped.dropped {
                    moves.push((
                        category.clone(),
                        dropped.cause.clone(),
                        RecommendedId::Cluster(dropped.dropped.clone()),
                    ));
                }
            }
        }
        for (category, cause, dropped) in moves {
            self.add(category.clone(), cause);
            self.add(category, dropped);
        }
    }

    fn finish(mut self, index: usize, clusters: Vec<ClusterId>, keep: &KeepResult) -> RelationshipGroup {
        self.cascade_dropped_choices();

        let mut ordered: Vec<(Category, IndexSet<RecommendedId>)> = self.categories.into_iter().collect();
        ordered.sort_by_key(|(category, _)| category.kind_rank());

        let mut seen: HashSet<RecommendedId> = HashSet::new();
        let mut recommendations: Vec<Recommendation> = Vec::new();
        for (category, ids) in ordered {
            let ids: Vec<RecommendedId> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
            if !ids.is_empty() {
                recommendations.push(Recommendation { category, ids });
            }
        }

        let mut uncategorised: Vec<RecommendedId> = Vec::new();
        for cluster in &clusters {
            let raw = RecommendedId::Cluster(cluster.clone());
            let rendered = RecommendedId::for_cluster(cluster, keep);
            if seen.contains(&raw) || seen.contains(&rendered) {
                continue;
            }
            seen.insert(rendered.clone());
            uncategorised.push(rendered);
        }
        if !uncategorised.is_empty() {
            let position = recommendations
                .iter()
                .position(|r| r.category == Category::Drop)
                .unwrap_or(recommendations.len());
            recommendations.insert(
                position,
                Recommendation {
                    category: Category::Keep,
                    ids: uncategorised,
                },
            );
        }

        let still_dropped: HashSet<&RecommendedId> = recommendations
            .iter()
            .filter(|r| r.category == Category::Drop)
            .flat_map(|r| r.ids.iter())
            .collect();
        let dropped = self
            .dropped
            .into_iter()
            .filter(|d| still_dropped.contains(&RecommendedId::Cluster(d.dropped.clone())))
            .collect();

        RelationshipGroup {
            index,
            clusters,
            recommendations,
            related: self.related,
            dropped,
        }
    }
}

/// Build recommendations, merging reverse-orientation rows of the
/// related-matches report into their first orientation
pub fn resolve(processing: &ClassProcessing, keep: &KeepResult) -> Resolution {
    resolve_with(processing, keep, true)
}

pub fn resolve_with(processing: &ClassProcessing, keep: &KeepResult, merge_reverse: bool) -> Resolution {
    let related: Vec<&ProcessedPair> = processing
        .pairs
        .values()
        .filter(|p| p.class.is_related())
        .collect();

    let mut groups = DisjointSet::from_pairs(related.iter().map(|p| (p.query.clone(), p.subject.clone())));
    let group_members = groups.groups();
    let group_of = groups.group_index();

    let mut choices = DisjointSet::from_pairs(
        related
            .iter()
            .filter(|p| p.class != Class::C1a)
            .map(|p| (p.query.clone(), p.subject.clone())),
    );
    let choice_of = choices.group_index();

    let mut builders: Vec<GroupBuilder> = group_members.iter().map(|_| GroupBuilder::default()).collect();
    let mut processed: HashSet<ClusterPair> = HashSet::new();

    for pair in &related {
        let Some(&group) = group_of.get(&pair.query) else {
            continue;
        };
        let builder = &mut builders[group];
        builder.push_row(pair, processing, keep, merge_reverse);

        if processed.contains(&pair.key()) {
            continue;
        }
        processed.insert((pair.subject.clone(), pair.query.clone()));

        let verdict = match processing.pair(&pair.subject, &pair.query) {
            Some(reverse) if reverse.class < pair.class => {
                debug!(
                    "Using {} from {} vs {} over {} from the reverse orientation",
                    reverse.class, reverse.query, reverse.subject, pair.class
                );
                reverse
            }
            _ => *pair,
        };
        builder.apply(verdict, keep, &choice_of);
    }

    let groups: Vec<RelationshipGroup> = builders
        .into_iter()
        .zip(group_members)
        .enumerate()
        .map(|(i, (builder, clusters))| builder.finish(i + 1, clusters, keep))
        .collect();

    info!("Resolved {} relationship groups", groups.len());
    Resolution { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::keep::clusters_to_keep;
    use crate::relationship::process::tests::classified;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn cluster(id: &str) -> RecommendedId {
        RecommendedId::Cluster(ClusterId::new(id))
    }

    fn run(items: Vec<crate::classification::ClassifiedAlignment>, all: &[&str]) -> (KeepResult, Resolution) {
        let processing = ClassProcessing::from_classified(&items);
        let all: Vec<ClusterId> = all.iter().map(|c| ClusterId::new(*c)).collect();
        let keep = clusters_to_keep(&processing, &all, &processing.frequencies.clone());
        let resolution = resolve(&processing, &keep);
        (keep, resolution)
    }

    fn rendered(group: &RelationshipGroup) -> Vec<(String, Vec<String>)> {
        group
            .recommendations
            .iter()
            .map(|r| (r.category.to_string(), r.ids.iter().map(|i| i.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_join_recommendation() {
        let (_, resolution) = run(
            vec![
                classified(("A", "A"), ("B", "B"), Class::C1a, (50, 1)),
                classified(("B", "B"), ("A", "A"), Class::C1a, (1, 50)),
            ],
            &["A", "B"],
        );

        assert_eq!(resolution.groups.len(), 1);
        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![("Joined_A".to_string(), vec!["A".to_string(), "B".to_string()])]
        );
        assert_eq!(group.related.len(), 1);
        let row = &group.related[0];
        assert_eq!(row.class_count.to_string(), "1/1");
        assert_eq!(row.inverse, Some((Class::C1a, ClassFraction { count: 1, total: 1 })));
        assert_eq!(row.query_frequency, 51);
    }

    #[test]
    fn test_drop_without_alternative() {
        let (_, resolution) = run(
            vec![classified(("A", "A"), ("B", "B"), Class::C2a, (100, 1))],
            &["A", "B"],
        );
        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![
                ("Keep".to_string(), vec!["A".to_string()]),
                ("Drop".to_string(), vec!["B".to_string()]),
            ]
        );
        assert_eq!(
            group.dropped,
            vec![DroppedMatch {
                dropped: ClusterId::new("B"),
                cause: cluster("A"),
            }]
        );
        assert_eq!(group.related[0].subject_status.marker(), "*");
        assert!(resolution.is_dropped(&ClusterId::new("B")));
    }

    #[test]
    fn test_dropped_side_with_undropped_match_becomes_choice() {
        let (_, resolution) = run(
            vec![
                classified(("A", "A"), ("B", "B"), Class::C2a, (100, 1)),
                classified(("B", "B"), ("C", "C"), Class::C2b, (1, 1)),
            ],
            &["A", "B", "C"],
        );
        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![("Choice_2b_1".to_string(), vec!["C".to_string(), "A".to_string(), "B".to_string()])]
        );
        assert!(group.dropped.is_empty());
        assert!(!resolution.is_dropped(&ClusterId::new("B")));
    }

    #[test]
    fn test_ambiguous_pair_is_choice() {
        let (_, resolution) = run(
            vec![classified(("A", "A"), ("B", "B"), Class::C1c, (5, 6))],
            &["A", "B"],
        );
        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![("Choice_1c_1".to_string(), vec!["A".to_string(), "B".to_string()])]
        );
        assert_eq!(
            group.category_of(&cluster("B")),
            Some(&Category::Choice { class: Class::C1c, id: ChoiceId(1) })
        );
    }

    #[test]
    fn test_joined_cluster_referenced_through_join() {
        let (_, resolution) = run(
            vec![
                classified(("A", "A"), ("B", "B"), Class::C1a, (50, 1)),
                classified(("B", "B"), ("C", "C"), Class::C2b, (1, 1)),
            ],
            &["A", "B", "C"],
        );
        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![
                ("Joined_A".to_string(), vec!["A".to_string(), "B".to_string()]),
                ("Choice_2b_1".to_string(), vec!["Joined_A".to_string(), "C".to_string()]),
            ]
        );
    }

    #[test]
    fn test_unrelated_pairs_form_no_group() {
        let (keep, resolution) = run(
            vec![classified(("A", "A"), ("B", "B"), Class::C5, (50, 1))],
            &["A", "B"],
        );
        assert!(resolution.is_empty());
        assert_eq!(keep.by_class[&Class::C5].len(), 2);
    }

    #[test]
    fn test_every_id_in_one_category() {
        let (_, resolution) = run(
            vec![
                classified(("A", "A"), ("B", "B"), Class::C1a, (10, 10)),
                classified(("A", "A"), ("C", "C"), Class::C1b, (10, 0)),
                classified(("C", "C"), ("D", "D"), Class::C3b, (0, 5)),
                classified(("D", "D"), ("E", "E"), Class::C4a, (5, 100)),
                classified(("E", "E"), ("F", "F"), Class::C4b, (100, 90)),
            ],
            &["A", "B", "C", "D", "E", "F", "G"],
        );
        assert_eq!(resolution.groups.len(), 1);
        let group = &resolution.groups[0];
        let mut seen = HashSet::new();
        for rec in &group.recommendations {
            for id in &rec.ids {
                assert!(seen.insert(id.clone()), "{} listed twice", id);
            }
        }
        let kinds: Vec<u8> = group.recommendations.iter().map(|r| r.category.kind_rank()).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
    }

    #[test]
    fn test_related_rows_without_merging() {
        let items = vec![
            classified(("A", "A"), ("B", "B"), Class::C1c, (5, 6)),
            classified(("B", "B"), ("A", "A"), Class::C1c, (6, 5)),
        ];
        let processing = ClassProcessing::from_classified(&items);
        let all = [ClusterId::new("A"), ClusterId::new("B")];
        let keep = clusters_to_keep(&processing, &all, &processing.frequencies.clone());

        let merged = resolve(&processing, &keep);
        assert_eq!(merged.groups[0].related.len(), 1);
        let split = resolve_with(&processing, &keep, false);
        assert_eq!(split.groups[0].related.len(), 2);
        assert_eq!(split.groups[0].recommendations, merged.groups[0].recommendations);
    }

    #[test]
    fn test_drop_follows_side_marked_by_pair() {
        // X is already in the drop set through Y when the X vs W pair is
        // resolved, but that pair marks W
        let (keep, resolution) = run(
            vec![
                classified(("X", "X"), ("W", "W"), Class::C2a, (10, 1)),
                classified(("Y", "Y"), ("X", "X"), Class::C2a, (100, 10)),
            ],
            &["W", "X", "Y"],
        );
        assert!(keep.is_dropped(&ClusterId::new("X")));
        assert!(keep.is_dropped(&ClusterId::new("W")));

        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![
                ("Keep".to_string(), vec!["Y".to_string()]),
                ("Drop".to_string(), vec!["W".to_string(), "X".to_string()]),
            ]
        );
        assert_eq!(
            group.dropped,
            vec![
                DroppedMatch {
                    dropped: ClusterId::new("W"),
                    cause: cluster("X"),
                },
                DroppedMatch {
                    dropped: ClusterId::new("X"),
                    cause: cluster("Y"),
                },
            ]
        );
    }

    #[test]
    fn test_higher_priority_reverse_orientation_wins() {
        // Unsorted input: the 2b orientation is seen before the 2a one
        let (_, resolution) = run(
            vec![
                classified(("A", "A"), ("B", "B"), Class::C2b, (100, 1)),
                classified(("B", "B"), ("A", "A"), Class::C2a, (1, 100)),
            ],
            &["A", "B"],
        );
        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![
                ("Keep".to_string(), vec!["A".to_string()]),
                ("Drop".to_string(), vec!["B".to_string()]),
            ]
        );
        assert_eq!(
            group.dropped,
            vec![DroppedMatch {
                dropped: ClusterId::new("B"),
                cause: cluster("A"),
            }]
        );
    }

    #[test]
    fn test_cascade_into_choice_with_joined_match() {
        let (_, resolution) = run(
            vec![
                classified(("C", "C"), ("D", "D"), Class::C1a, (5, 5)),
                classified(("A", "A"), ("B", "B"), Class::C2a, (100, 1)),
                classified(("B", "B"), ("C", "C"), Class::C2b, (1, 5)),
            ],
            &["A", "B", "C", "D"],
        );
        let group = &resolution.groups[0];
        assert_eq!(
            rendered(group),
            vec![
                ("Joined_C".to_string(), vec!["C".to_string(), "D".to_string()]),
                (
                    "Choice_2b_1".to_string(),
                    vec!["Joined_C".to_string(), "A".to_string(), "B".to_string()]
                ),
            ]
        );
        assert!(group.dropped.is_empty());
        assert!(!resolution.is_dropped(&ClusterId::new("B")));
    }

    fn arbitrary_pairs() -> impl Strategy<Value = Vec<(usize, usize, usize)>> {
        prop::collection::vec((0usize..6, 0usize..6, 0usize..Class::ALL.len()), 1..12)
    }

    proptest! {
        #[test]
        fn prop_each_id_in_one_category(
            pairs in arbitrary_pairs(),
            frequencies in prop::collection::vec(0u32..40, 6),
        ) {
            let names = ["A", "B", "C", "D", "E", "F"];
            let items: Vec<_> = pairs
                .iter()
                .filter(|(q, s, _)| q != s)
                .map(|&(q, s, c)| {
                    classified(
                        (names[q], names[q]),
                        (names[s], names[s]),
                        Class::ALL[c],
                        (frequencies[q], frequencies[s]),
                    )
                })
                .collect();
            let (keep, resolution) = run(items, &names);

            for group in &resolution.groups {
                let mut seen = HashSet::new();
                for rec in &group.recommendations {
                    for id in &rec.ids {
                        prop_assert!(seen.insert(id.clone()), "{} listed twice", id);
                    }
                }
                let kinds: Vec<u8> = group.recommendations.iter().map(|r| r.category.kind_rank()).collect();
                let mut sorted = kinds.clone();
                sorted.sort();
                prop_assert_eq!(kinds, sorted);

                for cluster in &group.clusters {
                    let raw = RecommendedId::Cluster(cluster.clone());
                    let rendered = RecommendedId::for_cluster(cluster, &keep);
                    prop_assert!(seen.contains(&raw) || seen.contains(&rendered), "{} uncategorised", cluster);
                }
            }
        }
    }
}
