//! BLAST+ driven as external processes
//!
//! Every search asks for the same tabular layout (`OUTFMT`) and runs single
//! threaded; parallelism comes from the worker pool running many searches.

pub mod parser;

pub use parser::{parse_tabular, parse_tabular_file, OUTFMT};

use crate::traits::aligner::{Aligner, SearchJob, SearchTarget};
use crate::types::BlastProgram;
use anyhow::{Context, Result};
use refinery_bio::alignment::AlignmentRecord;
use refinery_core::config::AlignerConfig;
use refinery_core::{RefineryError, SequenceType};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BlastAligner {
    blastn: PathBuf,
    blastp: PathBuf,
    makeblastdb: PathBuf,
}

impl BlastAligner {
    pub fn new(config: &AlignerConfig) -> Self {
        Self {
            blastn: PathBuf::from(&config.blastn_path),
            blastp: PathBuf::from(&config.blastp_path),
            makeblastdb: PathBuf::from(&config.makeblastdb_path),
        }
    }

    pub fn binary(&self, program: BlastProgram) -> &Path {
        match program {
            BlastProgram::Blastn => &self.blastn,
            BlastProgram::Blastp => &self.blastp,
            BlastProgram::Makeblastdb => &self.makeblastdb,
        }
    }

    /// Run a prepared command; a spawn failure or non-zero exit is an aligner error
    fn run(&self, program: BlastProgram, command: &mut Command) -> Result<Output> {
        debug!("Running {:?}", command);
        let output = command.output().map_err(|e| {
            RefineryError::Aligner(format!(
                "failed to start {} ({}): {}",
                program.name(),
                self.binary(program).display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RefineryError::Aligner(format!(
                "{} failed with exit code {}: {}",
                program.name(),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ))
            .into());
        }
        Ok(output)
    }
}

impl Default for BlastAligner {
    fn default() -> Self {
        Self::new(&AlignerConfig::default())
    }
}

impl Aligner for BlastAligner {
    fn name(&self) -> &str {
        "BLAST+"
    }

    fn make_database(&self, fasta: &Path, sequence_type: SequenceType, output: &Path) -> Result<PathBuf> {
        let program = BlastProgram::Makeblastdb;
        let mut command = Command::new(self.binary(program));
        command
            .arg("-in")
            .arg(fasta)
            .arg("-dbtype")
            .arg(sequence_type.dbtype())
            .arg("-out")
            .arg(output);
        self.run(program, &mut command)
            .with_context(|| format!("Failed to build database from {}", fasta.display()))?;
        Ok(output.to_path_buf())
    }

    fn search(&self, job: &SearchJob) -> Result<Vec<AlignmentRecord>> {
        let program = BlastProgram::for_search(job.sequence_type);
        let mut command = Command::new(self.binary(program));
        command.arg("-query").arg(&job.query);
        match &job.target {
            SearchTarget::Database(db) => command.arg("-db").arg(db),
            SearchTarget::Subject(subject) => command.arg("-subject").arg(subject),
        };
        command
            .arg("-outfmt")
            .arg(OUTFMT)
            .arg("-out")
            .arg(&job.output)
            .arg("-num_threads")
            .arg("1");

        self.run(program, &mut command)
            .with_context(|| format!("Search of {} failed", job.query.display()))?;

        if !job.output.exists() {
            return Err(RefineryError::Aligner(format!(
                "{} produced no output at {}",
                program.name(),
                job.output.display()
            ))
            .into());
        }
        Ok(parse_tabular_file(&job.output)?)
    }

    fn version(&self) -> Result<String> {
        let program = BlastProgram::Blastn;
        let mut command = Command::new(self.binary(program));
        command.arg("-version");
        let output = self.run(program, &mut command)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.lines().next().unwrap_or_default();
        Ok(first
            .split(':')
            .nth(1)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| first.trim().to_string()))
    }

    fn is_available(&self) -> bool {
        [BlastProgram::Blastn, BlastProgram::Blastp, BlastProgram::Makeblastdb]
            .iter()
            .all(|program| {
                Command::new(self.binary(*program))
                    .arg("-version")
                    .output()
                    .map(|o| o.status.success())
                    .unwrap_or(false)
            })
    }
}
