//! Enrichment, classification and resolution over one set of alignments
//!
//! Both `refine` and `classify` end here: the former feeds alignments it ran
//! itself, the latter alignments read from disk.

use anyhow::{Context, Result};
use indexmap::IndexSet;
use refinery_bio::alignment::{enrich, AlignmentRecord, EnrichmentContext, PairScores, SelfScores};
use refinery_bio::classification::{classify_all, ClassifiedAlignment, Thresholds};
use refinery_bio::clustering::{ClusterFrequencies, ClusterMembership, KmerSimilarityTable};
use refinery_bio::relationship::{
    clusters_to_keep, resolve_with, CatalogueGroup, ClassProcessing, KeepResult, Resolution,
};
use refinery_core::{ClusterId, Config};
use refinery_utils::{ReportWriter, RunSummary};
use tracing::{info, info_span};

/// Everything the engine reads
pub struct EngineInput<'a> {
    pub membership: &'a ClusterMembership,
    pub frequencies: &'a ClusterFrequencies,
    pub self_scores: &'a SelfScores,
    pub records: &'a [AlignmentRecord],
    pub pair_scores: Option<&'a PairScores>,
    pub kmer_table: Option<&'a KmerSimilarityTable>,
}

pub struct EngineOutput {
    pub classified: Vec<ClassifiedAlignment>,
    pub processing: ClassProcessing,
    pub keep: KeepResult,
    pub resolution: Resolution,
    /// Clusters the resolution finally dropped
    pub final_drops: IndexSet<ClusterId>,
    pub catalogue: Vec<CatalogueGroup>,
    pub inverted_pairs: usize,
}

pub fn run_engine(input: &EngineInput<'_>, config: &Config) -> Result<EngineOutput> {
    let classification = &config.classification;

    let outcome = {
        let _span = info_span!("enrich").entered();
        let mut ctx = EnrichmentContext::new(
            input.membership,
            input.frequencies,
            input.self_scores,
            classification.pident_threshold,
        );
        if let Some(pair_scores) = input.pair_scores {
            ctx = ctx.with_pair_scores(pair_scores);
        }
        if let Some(kmer_table) = input.kmer_table {
            ctx = ctx.with_kmer_table(kmer_table);
        }
        enrich(input.records, &ctx).context("Alignment enrichment failed")?
    };
    info!(
        "{} alignment pairs enriched, {} inverted, {} self-hits",
        outcome.alignments.len(),
        outcome.inverted.len(),
        outcome.self_hits
    );

    let classified = {
        let _span = info_span!("classify").entered();
        classify_all(outcome.alignments, &Thresholds::from_config(classification))
    };

    let _span = info_span!("resolve").entered();
    let processing = ClassProcessing::from_classified(&classified);
    let keep = clusters_to_keep(&processing, input.membership.cluster_ids(), input.frequencies);
    let resolution = resolve_with(&processing, &keep, config.output.reverse_matches);
    let final_drops: IndexSet<ClusterId> =
        resolution.dropped().map(|d| d.dropped.clone()).collect();
    let catalogue = keep.catalogue(&final_drops);
    info!(
        "{} relationship groups, {} clusters dropped",
        resolution.groups.len(),
        final_drops.len()
    );

    Ok(EngineOutput {
        classified,
        processing,
        keep,
        resolution,
        final_drops,
        catalogue,
        inverted_pairs: outcome.inverted.len(),
    })
}

impl EngineOutput {
    /// Write the tables every run produces
    pub fn write_reports(&self, writer: &ReportWriter, membership: &ClusterMembership) -> Result<()> {
        let _span = info_span!("reports").entered();
        writer.recommendations(&self.resolution)?;
        writer.related_matches(&self.resolution)?;
        writer.count_results(&self.processing, &self.keep)?;
        writer.cluster_members(&self.catalogue, membership, &self.keep)?;
        writer.all_matches(&self.classified)?;
        Ok(())
    }

    pub fn record_into(&self, summary: &mut RunSummary) {
        summary.record_classes(&self.classified);
        summary.record_resolution(&self.resolution);
        summary.inverted_pairs = self.inverted_pairs;
    }
}
