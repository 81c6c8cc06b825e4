mod common;

use anyhow::Result;
use pretty_assertions::assert_eq;
use predicates::prelude::*;
use refinery_test::{coding_sequence, random_protein};
use std::fs;

use common::*;

#[test]
fn test_cli_help_command() {
    refinery_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("refine"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("cluster"));
}

#[test]
fn test_cli_version_command() {
    refinery_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("refinery"));
}

#[test]
fn test_classify_contained_pair() -> Result<()> {
    let env = TestEnvironment::new()?;
    let inputs = env.contained_pair()?;
    let output = env.output_path("results");

    inputs
        .command(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommendations:"));

    let recommendations = fs::read_to_string(output.join("recommendations.tsv"))?;
    assert_eq!(recommendations, "Recommendation\tIDs\nKeep\tA\nDrop\tB\n#\n");

    let members = fs::read_to_string(output.join("cluster_members.tsv"))?;
    assert!(members.contains("Z\tZ\tZ\t4\tRetained_not_matched_by_blastn\n"));
    assert!(members.ends_with("B\tB\tB\t1\tDropped\n"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("summary.json"))?)?;
    assert_eq!(summary["clusters"], 3);
    assert_eq!(summary["drop"], 1);
    Ok(())
}

#[test]
fn test_classify_with_cluster_table() -> Result<()> {
    let env = TestEnvironment::new()?;
    let inputs = env.contained_pair()?;
    // B2 is a member of B's cluster with 2 genomes of its own
    let clusters = env.create_input_file("clusters.tsv", "A\tA\nB\tB\nB\tB2\nZ\tZ\n")?;
    fs::write(&inputs.frequencies, "A\t100\nB\t1\nB2\t2\nZ\t4\n")?;
    let output = env.output_path("results");

    inputs
        .command(&output)
        .arg("--clusters")
        .arg(&clusters)
        .assert()
        .success();

    let members = fs::read_to_string(output.join("cluster_members.tsv"))?;
    assert!(members.contains("B\tB\tB2\t3\tDropped\n"));
    Ok(())
}

#[test]
fn test_cluster_subcommand() -> Result<()> {
    let env = TestEnvironment::new()?;
    let first = coding_sequence(&random_protein(7, 90));
    let second = coding_sequence(&random_protein(8, 70));
    let fasta = env.create_input_file(
        "cds.fasta",
        &format!(">c1\n{}\n>c2\n{}\n>c3\n{}\n", first, second, first),
    )?;
    let output = env.output_path("clusters");

    refinery_cmd()
        .arg("cluster")
        .arg("-i")
        .arg(&fasta)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let table = fs::read_to_string(output.join("clusters.tsv"))?;
    let rows: Vec<&str> = table.lines().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.contains(&"c1\tc3\t1.0000\t1.0000"));
    Ok(())
}
