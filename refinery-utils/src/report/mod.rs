//! Tab-separated report tables and the JSON run summary
//!
//! Every table is written through a `csv` writer with a tab delimiter. Group
//! separators (`#`) and blank lines bypass the csv layer so they stay bare.

pub mod catalogue;
pub mod matches;
pub mod recommendations;
pub mod summary;

pub use catalogue::{
    write_cluster_members, write_clusters, write_dropped, write_id_changes, IdChangeRow,
};
pub use matches::{write_all_matches, write_count_results};
pub use recommendations::{write_recommendations, write_related_matches};
pub use summary::RunSummary;

use refinery_bio::classification::ClassifiedAlignment;
use refinery_bio::clustering::{ClusterMembership, Clustering};
use refinery_bio::relationship::{CatalogueGroup, ClassProcessing, KeepResult, Resolution};
use refinery_core::{DropReason, RefineryError, RefineryResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RECOMMENDATIONS_FILE: &str = "recommendations.tsv";
pub const RELATED_MATCHES_FILE: &str = "related_matches.tsv";
pub const CLUSTERS_FILE: &str = "clusters.tsv";
pub const CLUSTER_MEMBERS_FILE: &str = "cluster_members.tsv";
pub const COUNT_RESULTS_FILE: &str = "count_results_by_cluster.tsv";
pub const DROPPED_FILE: &str = "dropped_cds.tsv";
pub const ID_CHANGES_FILE: &str = "cds_id_changes.tsv";
pub const ALL_MATCHES_FILE: &str = "blast_all_matches.tsv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Tab-delimited csv writer that tolerates rows of different widths
pub(crate) fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(writer)
}

/// Write a line verbatim, outside csv quoting rules
pub(crate) fn write_raw_line<W: Write>(writer: &mut csv::Writer<W>, line: &str) -> RefineryResult<()> {
    writer.flush()?;
    writeln!(writer.get_mut(), "{}", line)?;
    Ok(())
}

pub(crate) fn csv_error(err: csv::Error) -> RefineryError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => RefineryError::Io(e),
        other => RefineryError::Serialization(format!("{:?}", other)),
    }
}

/// Writes every report of a run into one output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> RefineryResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn create(&self, name: &str) -> RefineryResult<BufWriter<File>> {
        let path = self.path(name);
        debug!("Writing {}", path.display());
        Ok(BufWriter::new(File::create(path)?))
    }

    pub fn recommendations(&self, resolution: &Resolution) -> RefineryResult<PathBuf> {
        write_recommendations(self.create(RECOMMENDATIONS_FILE)?, resolution)?;
        Ok(self.path(RECOMMENDATIONS_FILE))
    }

    pub fn related_matches(&self, resolution: &Resolution) -> RefineryResult<PathBuf> {
        write_related_matches(self.create(RELATED_MATCHES_FILE)?, resolution)?;
        Ok(self.path(RELATED_MATCHES_FILE))
    }

    pub fn count_results(&self, processing: &ClassProcessing, keep: &KeepResult) -> RefineryResult<PathBuf> {
        write_count_results(self.create(COUNT_RESULTS_FILE)?, processing, keep)?;
        Ok(self.path(COUNT_RESULTS_FILE))
    }

    pub fn cluster_members(
        &self,
        catalogue: &[CatalogueGroup],
        membership: &ClusterMembership,
        keep: &KeepResult,
    ) -> RefineryResult<PathBuf> {
        write_cluster_members(self.create(CLUSTER_MEMBERS_FILE)?, catalogue, membership, keep)?;
        Ok(self.path(CLUSTER_MEMBERS_FILE))
    }

    pub fn clusters(&self, clustering: &Clustering) -> RefineryResult<PathBuf> {
        write_clusters(self.create(CLUSTERS_FILE)?, clustering)?;
        Ok(self.path(CLUSTERS_FILE))
    }

    pub fn all_matches(&self, classified: &[ClassifiedAlignment]) -> RefineryResult<PathBuf> {
        write_all_matches(self.create(ALL_MATCHES_FILE)?, classified)?;
        Ok(self.path(ALL_MATCHES_FILE))
    }

    pub fn dropped(&self, dropped: &[(String, DropReason)]) -> RefineryResult<PathBuf> {
        write_dropped(self.create(DROPPED_FILE)?, dropped)?;
        Ok(self.path(DROPPED_FILE))
    }

    pub fn id_changes(&self, changes: &[IdChangeRow]) -> RefineryResult<PathBuf> {
        write_id_changes(self.create(ID_CHANGES_FILE)?, changes)?;
        Ok(self.path(ID_CHANGES_FILE))
    }

    pub fn summary(&self, summary: &RunSummary) -> RefineryResult<PathBuf> {
        let mut out = self.create(SUMMARY_FILE)?;
        serde_json::to_writer_pretty(&mut out, summary)?;
        out.flush()?;
        Ok(self.path(SUMMARY_FILE))
    }
}
