//! Cluster to member mapping shared by enrichment and resolution

use crate::sequence::SequenceRegistry;
use indexmap::IndexMap;
use refinery_core::{ClusterId, RefineryResult};
use std::collections::HashMap;

/// Genome frequency per cluster
pub type ClusterFrequencies = HashMap<ClusterId, u32>;

/// Identifier before and after re-indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdChange {
    pub original: String,
    pub clustered: String,
}

/// Clusters with ordered members, representative first.
///
/// An identifier that belongs to no cluster is treated as the representative
/// of its own singleton cluster, which lets precomputed alignment tables run
/// without a clustering step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterMembership {
    clusters: IndexMap<ClusterId, Vec<String>>,
    member_to_cluster: HashMap<String, ClusterId>,
}

impl ClusterMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clusters(clusters: IndexMap<ClusterId, Vec<String>>) -> Self {
        let mut membership = Self::new();
        for (cluster, members) in clusters {
            membership.insert_cluster(cluster, members);
        }
        membership
    }

    pub fn insert_cluster(&mut self, cluster: ClusterId, members: Vec<String>) {
        for member in &members {
            self.member_to_cluster.insert(member.clone(), cluster.clone());
        }
        self.clusters.insert(cluster, members);
    }

    pub fn cluster_of(&self, member: &str) -> ClusterId {
        self.member_to_cluster
            .get(member)
            .cloned()
            .unwrap_or_else(|| ClusterId::new(member))
    }

    pub fn contains_member(&self, member: &str) -> bool {
        self.member_to_cluster.contains_key(member)
    }

    pub fn contains_cluster(&self, cluster: &ClusterId) -> bool {
        self.clusters.contains_key(cluster)
    }

    pub fn members(&self, cluster: &ClusterId) -> &[String] {
        self.clusters.get(cluster).map(|m| m.as_slice()).unwrap_or(&[])
    }

    pub fn clusters(&self) -> impl Iterator<Item = (&ClusterId, &[String])> {
        self.clusters.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn cluster_ids(&self) -> impl Iterator<Item = &ClusterId> {
        self.clusters.keys()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.clusters.values().map(|m| m.len()).sum()
    }

    /// Sum of member frequencies per cluster
    pub fn frequencies<F>(&self, member_frequency: F) -> ClusterFrequencies
    where
        F: Fn(&str) -> u32,
    {
        self.clusters
            .iter()
            .map(|(cluster, members)| {
                (
                    cluster.clone(),
                    members.iter().map(|m| member_frequency(m)).sum::<u32>(),
                )
            })
            .collect()
    }

    /// Remove clusters rejected by `keep`, returning them in order
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<(ClusterId, Vec<String>)>
    where
        F: FnMut(&ClusterId, &[String]) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = IndexMap::new();
        for (cluster, members) in std::mem::take(&mut self.clusters) {
            if keep(&cluster, &members) {
                kept.insert(cluster, members);
            } else {
                for member in &members {
                    self.member_to_cluster.remove(member);
                }
                removed.push((cluster, members));
            }
        }
        self.clusters = kept;
        removed
    }

    /// Rename every non-representative member to `<cluster>_<position>`.
    ///
    /// Renames go through the registry so sequence facts follow the new ids.
    /// Returns one change per member, representatives included.
    pub fn reindex(&mut self, registry: &mut SequenceRegistry) -> RefineryResult<Vec<IdChange>> {
        let mut changes = Vec::with_capacity(self.member_count());
        let mut renamed = IndexMap::new();

        for (cluster, members) in std::mem::take(&mut self.clusters) {
            let mut new_members = Vec::with_capacity(members.len());
            for (position, member) in members.into_iter().enumerate() {
                let new_id = if position == 0 {
                    member.clone()
                } else {
                    cluster.member(position).to_string()
                };
                if registry.contains(&member) {
                    registry.rename(&member, &new_id)?;
                }
                changes.push(IdChange {
                    original: member,
                    clustered: new_id.clone(),
                });
                new_members.push(new_id);
            }
            renamed.insert(cluster, new_members);
        }

        self.member_to_cluster.clear();
        for (cluster, members) in renamed {
            self.insert_cluster(cluster, members);
        }
        Ok(changes)
    }
}
