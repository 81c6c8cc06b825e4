//! Final catalogue tables: cluster members, dropped sequences and id changes

use super::{csv_error, tsv_writer};
use refinery_bio::clustering::{ClusterMembership, Clustering};
use refinery_bio::relationship::{CatalogueGroup, KeepResult};
use refinery_core::{DropReason, RefineryResult};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// A sequence id through the clustering and joining steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdChangeRow {
    pub original: String,
    pub clustered: String,
    /// Absent for sequences that did not survive
    pub joined: Option<String>,
}

/// Every member of every catalogue group, with the group's standing
pub fn write_cluster_members<W: Write>(
    writer: W,
    catalogue: &[CatalogueGroup],
    membership: &ClusterMembership,
    keep: &KeepResult,
) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record([
        "Cluster_ID",
        "Representative_ID",
        "Member_ID",
        "Frequency",
        "Classification",
    ])
    .map_err(csv_error)?;

    for group in catalogue {
        let status = group.status.to_string();
        for cluster in &group.clusters {
            let frequency = keep.frequency(cluster).to_string();
            let members = membership.members(cluster);
            // Precomputed tables may name clusters the membership never saw
            let fallback = [cluster.to_string()];
            let members: &[String] = if members.is_empty() { &fallback } else { members };
            for member in members {
                out.write_record([
                    group.id.as_str(),
                    cluster.as_str(),
                    member.as_str(),
                    frequency.as_str(),
                    status.as_str(),
                ])
                .map_err(csv_error)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Minimizer clusters with each member's scores against its representative
pub fn write_clusters<W: Write>(writer: W, clustering: &Clustering) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record(["Cluster_ID", "Member_ID", "Similarity", "Coverage"])
        .map_err(csv_error)?;
    for (cluster, members) in clustering.clusters() {
        for member in members {
            out.write_record([
                cluster.to_string(),
                member.id.clone(),
                format!("{:.4}", member.similarity),
                format!("{:.4}", member.coverage),
            ])
            .map_err(csv_error)?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn write_dropped<W: Write>(writer: W, dropped: &[(String, DropReason)]) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record(["CDS_ID", "Reason_for_dropping"]).map_err(csv_error)?;
    for (id, reason) in dropped {
        out.write_record([id.as_str(), reason.as_str()]).map_err(csv_error)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_id_changes<W: Write>(writer: W, changes: &[IdChangeRow]) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record(["Original_ID", "ID_after_clustering", "ID_after_joining"])
        .map_err(csv_error)?;
    for change in changes {
        out.write_record([
            change.original.as_str(),
            change.clustered.as_str(),
            change.joined.as_deref().unwrap_or("-"),
        ])
        .map_err(csv_error)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::{IndexMap, IndexSet};
    use pretty_assertions::assert_eq;
    use refinery_core::ClusterId;

    #[test]
    fn test_cluster_members_lists_every_member() {
        let mut clusters = IndexMap::new();
        clusters.insert(ClusterId::new("A"), vec!["A".to_string(), "A_1".to_string()]);
        let membership = ClusterMembership::from_clusters(clusters);
        let mut keep = KeepResult::default();
        keep.unmatched = vec![ClusterId::new("A"), ClusterId::new("Z")];
        keep.frequencies.insert(ClusterId::new("A"), 7);

        let catalogue = keep.catalogue(&IndexSet::new());
        let mut buffer = Vec::new();
        write_cluster_members(&mut buffer, &catalogue, &membership, &keep).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "A\tA\tA\t7\tRetained_not_matched_by_blastn",
                "A\tA\tA_1\t7\tRetained_not_matched_by_blastn",
                "Z\tZ\tZ\t0\tRetained_not_matched_by_blastn",
            ]
        );
    }

    #[test]
    fn test_clusters_table() {
        let proteins = vec![
            ("p1".to_string(), "MKVLAAGIVGLLLAQSSWATEKPLDNRYHHCFGQ".to_string()),
            ("p2".to_string(), "MWYTRNDPFEGHKISQMCVLAWYPGTRNEDQKHFS".to_string()),
        ];
        let clustering = refinery_bio::clustering::MinimizerClusterer::default().cluster(&proteins);
        let mut buffer = Vec::new();
        write_clusters(&mut buffer, &clustering).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("p1\tp1\t1.0000\t1.0000\n"));
    }

    #[test]
    fn test_dropped_and_id_changes() {
        let mut buffer = Vec::new();
        write_dropped(&mut buffer, &[("cds9".to_string(), DropReason::CdsSize)]).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "CDS_ID\tReason_for_dropping\ncds9\tDropped_due_to_cds_size\n"
        );

        let changes = vec![
            IdChangeRow {
                original: "x".to_string(),
                clustered: "A_1".to_string(),
                joined: Some("A_2".to_string()),
            },
            IdChangeRow { original: "y".to_string(), clustered: "B".to_string(), joined: None },
        ];
        let mut buffer = Vec::new();
        write_id_changes(&mut buffer, &changes).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("x\tA_1\tA_2\n"));
        assert!(text.ends_with("y\tB\t-\n"));
    }
}
