/// Traits for alignment tools
use crate::scores::best_self_scores;
use anyhow::Result;
use refinery_bio::alignment::{AlignmentRecord, SelfScores};
use refinery_core::SequenceType;
use std::path::{Path, PathBuf};

/// What a search runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// A database built by `make_database`
    Database(PathBuf),
    /// A plain FASTA file, searched without a database
    Subject(PathBuf),
}

/// One independent aligner invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchJob {
    pub query: PathBuf,
    pub target: SearchTarget,
    pub sequence_type: SequenceType,
    /// Tabular output file
    pub output: PathBuf,
}

impl SearchJob {
    pub fn against_database(
        query: impl Into<PathBuf>,
        database: impl Into<PathBuf>,
        sequence_type: SequenceType,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            query: query.into(),
            target: SearchTarget::Database(database.into()),
            sequence_type,
            output: output.into(),
        }
    }

    pub fn against_subject(
        query: impl Into<PathBuf>,
        subject: impl Into<PathBuf>,
        sequence_type: SequenceType,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            query: query.into(),
            target: SearchTarget::Subject(subject.into()),
            sequence_type,
            output: output.into(),
        }
    }
}

/// Trait for alignment tools.
///
/// Implementations are shared by every worker of the pool, so all calls take
/// `&self` and must not rely on per-call mutable state.
pub trait Aligner: Send + Sync {
    /// Short tool name used in logs
    fn name(&self) -> &str;

    /// Build a search database from `fasta`, returning the database prefix
    fn make_database(&self, fasta: &Path, sequence_type: SequenceType, output: &Path) -> Result<PathBuf>;

    /// Run one search and parse every reported alignment
    fn search(&self, job: &SearchJob) -> Result<Vec<AlignmentRecord>>;

    /// Get tool version
    fn version(&self) -> Result<String>;

    /// Check if tool is available
    fn is_available(&self) -> bool;

    /// Self-alignment score of every sequence in `fasta`.
    ///
    /// The file is searched against itself; each id keeps its highest self-hit.
    fn self_scores(&self, fasta: &Path, sequence_type: SequenceType, output: &Path) -> Result<SelfScores> {
        let job = SearchJob::against_subject(fasta, fasta, sequence_type, output);
        Ok(best_self_scores(&self.search(&job)?))
    }
}
