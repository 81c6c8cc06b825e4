use super::ThresholdArgs;
use crate::cli::GlobalOptions;
use crate::core::engine::{run_engine, EngineInput};
use crate::core::tables::{read_clusters, read_frequencies, read_pair_scores, read_self_scores};
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use refinery_bio::clustering::ClusterMembership;
use refinery_core::ClusterId;
use refinery_tools::parse_tabular_file;
use refinery_utils::{success, ReportWriter, RunSummary};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Alignments in the 12-column tabular aligner format
    #[arg(short, long, value_name = "TSV")]
    pub alignments: PathBuf,

    /// Self-alignment scores: `id<TAB>score`
    #[arg(short, long, value_name = "TSV")]
    pub self_scores: PathBuf,

    /// Genome frequencies: `id<TAB>frequency`
    #[arg(short, long, value_name = "TSV")]
    pub frequencies: PathBuf,

    /// Protein pair scores used for the score ratio: `query<TAB>subject<TAB>score`
    #[arg(long, value_name = "TSV")]
    pub pair_scores: Option<PathBuf>,

    /// Cluster membership: `cluster<TAB>member`; without it every id is its own cluster
    #[arg(long, value_name = "TSV")]
    pub clusters: Option<PathBuf>,

    /// Output directory for every report
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

pub fn run(args: ClassifyArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = global.load_config()?;
    args.thresholds.apply(&mut config);
    config.validate()?;

    let records = parse_tabular_file(&args.alignments)
        .with_context(|| format!("Failed to read alignments {}", args.alignments.display()))?;
    let self_scores = read_self_scores(&args.self_scores)?;
    let sequence_frequencies = read_frequencies(&args.frequencies)?;
    let pair_scores = args.pair_scores.as_deref().map(read_pair_scores).transpose()?;

    let membership = match &args.clusters {
        Some(path) => ClusterMembership::from_clusters(read_clusters(path)?),
        None => {
            // Every id seen in either table is a singleton cluster
            let mut clusters: IndexMap<ClusterId, Vec<String>> = IndexMap::new();
            let ids = sequence_frequencies.keys().map(String::as_str).chain(
                records
                    .iter()
                    .flat_map(|r| [r.query_id.as_str(), r.subject_id.as_str()]),
            );
            for id in ids {
                clusters
                    .entry(ClusterId::new(id))
                    .or_insert_with(|| vec![id.to_string()]);
            }
            ClusterMembership::from_clusters(clusters)
        }
    };
    let frequencies =
        membership.frequencies(|id| sequence_frequencies.get(id).copied().unwrap_or(0));
    info!(
        "{} alignment records over {} clusters",
        records.len(),
        membership.len()
    );

    let input = EngineInput {
        membership: &membership,
        frequencies: &frequencies,
        self_scores: &self_scores,
        records: &records,
        pair_scores: pair_scores.as_ref(),
        kmer_table: None,
    };
    let output = run_engine(&input, &config)?;

    let writer = ReportWriter::new(&args.output)?;
    output.write_reports(&writer, &membership)?;

    let mut summary = RunSummary {
        clusters: membership.len(),
        ..RunSummary::default()
    };
    output.record_into(&mut summary);
    if config.output.write_summary {
        writer.summary(&summary)?;
    }
    summary.print();
    success(&format!("Reports written to {}", writer.dir().display()));
    Ok(())
}
