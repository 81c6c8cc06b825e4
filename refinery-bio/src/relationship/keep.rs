//! Which clusters survive: joins, drops and retained-by-class lists

use super::process::ClassProcessing;
use crate::clustering::{ClusterFrequencies, DisjointSet};
use indexmap::{IndexMap, IndexSet};
use refinery_core::{Class, ClusterId};
use std::collections::HashMap;
use std::fmt;
use tracing::info;

/// Label recorded for a cluster that no alignment touched
pub const NOT_MATCHED: &str = "Retained_not_matched_by_blastn";

/// Standing of a group in the final catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Joined,
    Class(Class),
    NotMatched,
    Dropped,
}

impl GroupStatus {
    pub fn is_dropped(&self) -> bool {
        matches!(self, GroupStatus::Dropped)
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupStatus::Joined => f.write_str(Class::C1a.as_str()),
            GroupStatus::Class(class) => write!(f, "{}", class),
            GroupStatus::NotMatched => f.write_str(NOT_MATCHED),
            GroupStatus::Dropped => f.write_str("Dropped"),
        }
    }
}

/// One entry of the final catalogue: a join or a single cluster
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueGroup {
    pub id: ClusterId,
    pub clusters: Vec<ClusterId>,
    pub status: GroupStatus,
}

/// Clusters to keep after class processing
#[derive(Debug, Clone, Default)]
pub struct KeepResult {
    /// `1a` joins keyed by their first member
    pub joins: IndexMap<ClusterId, Vec<ClusterId>>,
    join_of: HashMap<ClusterId, ClusterId>,
    /// Best class per matched cluster
    pub best_class: IndexMap<ClusterId, Class>,
    pub drop_set: IndexSet<ClusterId>,
    /// Retained clusters that are not joined, listed under their best class
    pub by_class: IndexMap<Class, Vec<ClusterId>>,
    /// Retained clusters that no alignment touched
    pub unmatched: Vec<ClusterId>,
    /// Cluster frequencies with joined clusters reporting the join total
    pub frequencies: ClusterFrequencies,
}

impl KeepResult {
    pub fn join_of(&self, cluster: &ClusterId) -> Option<&ClusterId> {
        self.join_of.get(cluster)
    }

    pub fn is_joined(&self, cluster: &ClusterId) -> bool {
        self.join_of.contains_key(cluster)
    }

    pub fn is_dropped(&self, cluster: &ClusterId) -> bool {
        self.drop_set.contains(cluster)
    }

    pub fn frequency(&self, cluster: &ClusterId) -> u32 {
        self.frequencies.get(cluster).copied().unwrap_or(0)
    }

    /// Retained cluster groups: every join, then every other surviving cluster.
    ///
    /// Each group is reported as (main id, member clusters); the main id of a
    /// join is the join id.
    pub fn keep_groups(&self) -> Vec<(ClusterId, Vec<ClusterId>)> {
        let mut groups: Vec<(ClusterId, Vec<ClusterId>)> = self
            .joins
            .iter()
            .map(|(id, members)| (id.clone(), members.clone()))
            .collect();
        for cluster in self.by_class.values().flatten().chain(self.unmatched.iter()) {
            groups.push((cluster.clone(), vec![cluster.clone()]));
        }
        groups
    }

    /// Every cluster grouped by its final standing.
    ///
    /// `final_drops` holds the clusters the resolver actually dropped; drop-set
    /// clusters the resolver moved into a Choice are kept under their best class.
    pub fn catalogue(&self, final_drops: &IndexSet<ClusterId>) -> Vec<CatalogueGroup> {
        let mut groups: Vec<CatalogueGroup> = self
            .joins
            .iter()
            .map(|(id, members)| CatalogueGroup {
                id: id.clone(),
                clusters: members.clone(),
                status: GroupStatus::Joined,
            })
            .collect();

        let single = |cluster: &ClusterId, status: GroupStatus| CatalogueGroup {
            id: cluster.clone(),
            clusters: vec![cluster.clone()],
            status,
        };

        for (class, clusters) in &self.by_class {
            for cluster in clusters.iter().filter(|c| !final_drops.contains(*c)) {
                groups.push(single(cluster, GroupStatus::Class(*class)));
            }
        }
        for cluster in self.drop_set.iter().filter(|c| !final_drops.contains(*c)) {
            let class = self.best_class.get(cluster).copied().unwrap_or(Class::C5);
            groups.push(single(cluster, GroupStatus::Class(class)));
        }
        for cluster in self.unmatched.iter().filter(|c| !final_drops.contains(*c)) {
            groups.push(single(cluster, GroupStatus::NotMatched));
        }
        for cluster in final_drops {
            groups.push(single(cluster, GroupStatus::Dropped));
        }
        groups
    }
}

/// Decide which clusters stay.
///
/// `all_clusters` lists every cluster that entered alignment, so clusters
/// without any match can be reported as retained.
pub fn clusters_to_keep<'a, I>(
    processing: &ClassProcessing,
    all_clusters: I,
    frequencies: &ClusterFrequencies,
) -> KeepResult
where
    I: IntoIterator<Item = &'a ClusterId>,
{
    let mut result = KeepResult::default();
    let mut joins: DisjointSet<ClusterId> = DisjointSet::new();

    for ((query, subject), pair) in &processing.pairs {
        let class = pair.class;
        if class == Class::C1a {
            joins.union(query.clone(), subject.clone());
        }
        for side in [query, subject] {
            result
                .best_class
                .entry(side.clone())
                .and_modify(|best| {
                    if class < *best {
                        *best = class;
                    }
                })
                .or_insert(class);
        }
    }

    for group in joins.groups() {
        let Some(id) = group.first().cloned() else {
            continue;
        };
        for member in &group {
            result.join_of.insert(member.clone(), id.clone());
        }
        result.joins.insert(id, group);
    }

    for (cluster, class) in &result.best_class {
        if *class == Class::C1a {
            continue;
        }
        if class.is_drop_candidate() && processing.is_drop_marked(cluster) {
            result.drop_set.insert(cluster.clone());
        } else {
            result.by_class.entry(*class).or_default().push(cluster.clone());
        }
    }
    result.by_class.sort_keys();

    result.unmatched = all_clusters
        .into_iter()
        .filter(|c| !result.best_class.contains_key(*c))
        .cloned()
        .collect();

    result.frequencies = processing.frequencies.clone();
    result
        .frequencies
        .extend(frequencies.iter().map(|(k, v)| (k.clone(), *v)));
    for members in result.joins.values() {
        let total: u32 = members
            .iter()
            .map(|m| result.frequencies.get(m).copied().unwrap_or(0))
            .sum();
        for member in members {
            result.frequencies.insert(member.clone(), total);
        }
    }

    info!(
        "Clusters to keep: {} joins, {} dropped, {} retained by class, {} without matches",
        result.joins.len(),
        result.drop_set.len(),
        result.by_class.values().map(Vec::len).sum::<usize>(),
        result.unmatched.len()
    );
    result
}
