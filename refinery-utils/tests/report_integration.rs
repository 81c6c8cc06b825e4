use indexmap::{IndexMap, IndexSet};
use pretty_assertions::assert_eq;
use refinery_bio::alignment::{enrich, AlignmentRecord, EnrichmentContext, SelfScores};
use refinery_bio::classification::{classify_all, Thresholds};
use refinery_bio::clustering::{ClusterFrequencies, ClusterMembership};
use refinery_bio::relationship::{clusters_to_keep, resolve, ClassProcessing};
use refinery_core::{ClusterId, DropReason};
use refinery_utils::report::{self, IdChangeRow};
use refinery_utils::{ReportWriter, RunSummary};
use std::fs;
use tempfile::TempDir;

fn record(query: (&str, u64), subject: (&str, u64), aligned: i64, pident: f64) -> AlignmentRecord {
    AlignmentRecord {
        query_id: query.0.to_string(),
        subject_id: subject.0.to_string(),
        query_length: query.1,
        subject_length: subject.1,
        query_start: 1,
        query_end: aligned,
        subject_start: 1,
        subject_end: aligned,
        alignment_length: aligned as u64,
        score: 200.0,
        gaps: 0,
        pident,
    }
}

#[test]
fn test_full_report_set() {
    let mut clusters = IndexMap::new();
    let mut frequencies = ClusterFrequencies::new();
    let mut self_scores = SelfScores::new();
    for (id, freq) in [("A", 100), ("B", 1), ("Z", 4)] {
        clusters.insert(ClusterId::new(id), vec![id.to_string()]);
        frequencies.insert(ClusterId::new(id), freq);
        self_scores.insert(id.to_string(), 400.0);
    }
    let membership = ClusterMembership::from_clusters(clusters);
    let records = vec![record(("A", 300), ("B", 180), 180, 95.0)];

    let ctx = EnrichmentContext::new(&membership, &frequencies, &self_scores, 90.0);
    let outcome = enrich(&records, &ctx).unwrap();
    let classified = classify_all(outcome.alignments, &Thresholds::default());
    let processing = ClassProcessing::from_classified(&classified);
    let keep = clusters_to_keep(&processing, membership.cluster_ids(), &frequencies);
    let resolution = resolve(&processing, &keep);
    let final_drops: IndexSet<ClusterId> = resolution.dropped().map(|d| d.dropped.clone()).collect();
    let catalogue = keep.catalogue(&final_drops);

    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(dir.path().join("results")).unwrap();
    writer.recommendations(&resolution).unwrap();
    writer.related_matches(&resolution).unwrap();
    writer.count_results(&processing, &keep).unwrap();
    writer.cluster_members(&catalogue, &membership, &keep).unwrap();
    writer.all_matches(&classified).unwrap();
    writer
        .dropped(&[("B".to_string(), DropReason::SmallerGenomePresence)])
        .unwrap();
    writer
        .id_changes(&[IdChangeRow {
            original: "A".to_string(),
            clustered: "A".to_string(),
            joined: Some("A_1".to_string()),
        }])
        .unwrap();

    let mut summary = RunSummary::default();
    summary.record_classes(&classified);
    summary.record_resolution(&resolution);
    writer.summary(&summary).unwrap();

    let recommendations = fs::read_to_string(writer.path(report::RECOMMENDATIONS_FILE)).unwrap();
    assert_eq!(recommendations, "Recommendation\tIDs\nKeep\tA\nDrop\tB\n#\n");

    let related = fs::read_to_string(writer.path(report::RELATED_MATCHES_FILE)).unwrap();
    assert!(related.lines().nth(1).unwrap().starts_with("A\tB*\t2a\t1/1\t"));

    let counts = fs::read_to_string(writer.path(report::COUNT_RESULTS_FILE)).unwrap();
    assert_eq!(
        counts.lines().skip(1).collect::<Vec<_>>(),
        vec!["A\tB\t2a\t1/1\t-/0\t100\t1", ""]
    );

    let members = fs::read_to_string(writer.path(report::CLUSTER_MEMBERS_FILE)).unwrap();
    assert!(members.contains("A\tA\tA\t100\t2a\n"));
    assert!(members.contains("Z\tZ\tZ\t4\tRetained_not_matched_by_blastn\n"));
    assert!(members.ends_with("B\tB\tB\t1\tDropped\n"));

    let all = fs::read_to_string(writer.path(report::ALL_MATCHES_FILE)).unwrap();
    assert_eq!(all.lines().count(), 2);
    assert!(all.lines().nth(1).unwrap().ends_with("\t2a"));

    let json = fs::read_to_string(writer.path(report::SUMMARY_FILE)).unwrap();
    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
    assert_eq!(back.drop, 1);
}
