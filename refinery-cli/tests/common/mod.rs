#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn refinery_cmd() -> Command {
    let mut cmd = Command::cargo_bin("refinery").expect("refinery binary");
    cmd.env_remove("REFINERY_LOG").env_remove("RUST_LOG");
    cmd
}

/// One alignment row in the 12-column tabular format
pub fn alignment_row(query: (&str, u64), subject: (&str, u64), aligned: u64, score: f64, pident: f64) -> String {
    format!(
        "{}\t{}\t{}\t{}\t1\t{}\t1\t{}\t{}\t{}\t0\t{}\n",
        query.0, subject.0, query.1, subject.1, aligned, aligned, aligned, score, pident
    )
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// A contains 60% of itself in B; Z matches nothing
    pub fn contained_pair(&self) -> Result<ClassifyInputs> {
        Ok(ClassifyInputs {
            alignments: self.create_input_file(
                "alignments.tsv",
                &alignment_row(("A", 300), ("B", 180), 180, 200.0, 95.0),
            )?,
            self_scores: self.create_input_file("self_scores.tsv", "# id\tscore\nA\t400\nB\t360\n")?,
            frequencies: self.create_input_file("frequencies.tsv", "A\t100\nB\t1\nZ\t4\n")?,
        })
    }
}

pub struct ClassifyInputs {
    pub alignments: PathBuf,
    pub self_scores: PathBuf,
    pub frequencies: PathBuf,
}

impl ClassifyInputs {
    pub fn command(&self, output: &Path) -> Command {
        let mut cmd = refinery_cmd();
        cmd.arg("classify")
            .arg("--alignments")
            .arg(&self.alignments)
            .arg("--self-scores")
            .arg(&self.self_scores)
            .arg("--frequencies")
            .arg(&self.frequencies)
            .arg("-o")
            .arg(output);
        cmd
    }
}
