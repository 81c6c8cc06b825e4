//! Mock aligner for testing
//!
//! Searches are answered from canned records: a record is reported when its
//! query id is in the query FASTA and its subject id is in the target (the
//! subject FASTA, or the FASTA a mock database was built from).

use anyhow::{Context, Result};
use refinery_bio::alignment::AlignmentRecord;
use refinery_bio::formats::parse_fasta;
use refinery_core::{RefineryError, SequenceType};
use refinery_tools::{Aligner, SearchJob, SearchTarget};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockAligner {
    records: Vec<AlignmentRecord>,
    /// Query ids whose search fails
    failing: HashSet<String>,
    databases: Mutex<HashMap<PathBuf, PathBuf>>,
    call_count: AtomicUsize,
}

impl MockAligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add canned alignments
    pub fn with_alignments(mut self, records: Vec<AlignmentRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Add a full-length self-hit for `id`
    pub fn with_self_score(mut self, id: &str, length: u64, score: f64) -> Self {
        self.records.push(AlignmentRecord {
            query_id: id.to_string(),
            subject_id: id.to_string(),
            query_length: length,
            subject_length: length,
            query_start: 1,
            query_end: length as i64,
            subject_start: 1,
            subject_end: length as i64,
            alignment_length: length,
            score,
            gaps: 0,
            pident: 100.0,
        });
        self
    }

    /// Fail every search whose query file contains `query_id`
    pub fn with_failure(mut self, query_id: &str) -> Self {
        self.failing.insert(query_id.to_string());
        self
    }

    /// Number of searches run so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn ids_in(path: &Path) -> Result<HashSet<String>> {
        Ok(parse_fasta(path)
            .with_context(|| format!("Mock aligner could not read {}", path.display()))?
            .into_iter()
            .map(|s| s.id)
            .collect())
    }
}

impl Aligner for MockAligner {
    fn name(&self) -> &str {
        "mock"
    }

    fn make_database(&self, fasta: &Path, _sequence_type: SequenceType, output: &Path) -> Result<PathBuf> {
        let mut databases = self.databases.lock().unwrap_or_else(|p| p.into_inner());
        databases.insert(output.to_path_buf(), fasta.to_path_buf());
        Ok(output.to_path_buf())
    }

    fn search(&self, job: &SearchJob) -> Result<Vec<AlignmentRecord>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let queries = Self::ids_in(&job.query)?;

        if let Some(id) = queries.iter().find(|id| self.failing.contains(*id)) {
            return Err(RefineryError::Aligner(format!("mock search failed for {}", id)).into());
        }

        let subject_file = match &job.target {
            SearchTarget::Subject(path) => path.clone(),
            SearchTarget::Database(db) => {
                let databases = self.databases.lock().unwrap_or_else(|p| p.into_inner());
                databases
                    .get(db)
                    .cloned()
                    .ok_or_else(|| RefineryError::Aligner(format!("no mock database at {}", db.display())))?
            }
        };
        let subjects = Self::ids_in(&subject_file)?;

        Ok(self
            .records
            .iter()
            .filter(|r| queries.contains(&r.query_id) && subjects.contains(&r.subject_id))
            .cloned()
            .collect())
    }

    fn version(&self) -> Result<String> {
        Ok("mock-1.0".to_string())
    }

    fn is_available(&self) -> bool {
        true
    }
}
