//! Structured identifiers for clusters, their members and choice groups

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a cluster: the identifier of its representative sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(String);

impl ClusterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of the `index`-th member of this cluster (1-based)
    pub fn member(&self, index: usize) -> MemberId {
        MemberId::new(self.clone(), index)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClusterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ClusterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Re-indexed identifier of a cluster member, rendered `<cluster>_<index>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId {
    pub cluster: ClusterId,
    /// 1-based position within the cluster
    pub index: usize,
}

impl MemberId {
    pub fn new(cluster: ClusterId, index: usize) -> Self {
        Self { cluster, index }
    }

    pub fn cluster(&self) -> &ClusterId {
        &self.cluster
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.cluster, self.index)
    }
}

/// Sequential identifier of a choice group, unique across a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChoiceId(pub u32);

impl ChoiceId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_rendering() {
        let cluster = ClusterId::new("locus_12");
        assert_eq!(cluster.member(1).to_string(), "locus_12_1");
        assert_eq!(cluster.member(3).cluster(), &cluster);
    }

    #[test]
    fn test_cluster_id_serde_is_transparent() {
        let json = serde_json::to_string(&ClusterId::from("x1")).unwrap();
        assert_eq!(json, "\"x1\"");
    }

    #[test]
    fn test_choice_id_display() {
        assert_eq!(ChoiceId(7).to_string(), "7");
        assert_eq!(ChoiceId(7).value(), 7);
    }
}
