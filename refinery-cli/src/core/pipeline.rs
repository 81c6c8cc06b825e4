//! The `refine` pipeline: coding sequences in, recommendations out
//!
//! Stages run in order: id sanitising, size filtering, translation, signature
//! clustering, cluster frequency filtering, re-indexing, the aligner stages
//! and finally the shared engine. Only the aligner stages are parallel.

use super::engine::{run_engine, EngineInput};
use super::tables::{read_presence, sanitize_ids};
use anyhow::{Context, Result};
use indexmap::IndexSet;
use refinery_bio::alignment::{AlignmentRecord, PairScores, SelfScores};
use refinery_bio::clustering::{
    ClusterFrequencies, ClusterMembership, Clustering, IdChange, KmerSimilarityTable,
    MinimizerClusterer,
};
use refinery_bio::formats::{parse_fasta, write_fasta};
use refinery_bio::relationship::CatalogueGroup;
use refinery_bio::sequence::{GeneticCode, Sequence, SequenceRegistry};
use refinery_core::{ClusterId, Config, DropReason, RefineryError, SequenceType};
use refinery_tools::{pair_scores, Aligner, SearchJob, WorkerPool};
use refinery_utils::report::IdChangeRow;
use refinery_utils::{ReportWriter, RunSummary};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

pub const REPRESENTATIVES_FILE: &str = "representatives.fasta";
const WORK_DIR: &str = "alignments";

#[derive(Debug, Clone)]
pub struct RefineInputs {
    pub fasta: PathBuf,
    pub presence: PathBuf,
    pub output: PathBuf,
    /// Keep aligner inputs and outputs under `<output>/alignments`
    pub keep_work_dir: bool,
}

/// Sequences and clusters ready for alignment
pub struct Prepared {
    pub registry: SequenceRegistry,
    pub clustering: Clustering,
    pub membership: ClusterMembership,
    pub frequencies: ClusterFrequencies,
    pub kmer_table: Option<KmerSimilarityTable>,
    pub dropped: Vec<(String, DropReason)>,
    /// Sanitized or re-indexed id to the id found in the input
    pub original_ids: HashMap<String, String>,
    pub changes: Vec<IdChange>,
    pub summary: RunSummary,
}

/// Raw evidence from the aligner stages
#[derive(Debug, Default)]
pub struct AlignmentEvidence {
    pub records: Vec<AlignmentRecord>,
    pub self_scores: SelfScores,
    pub pair_scores: PairScores,
}

/// Load, filter, translate and cluster the input sequences
pub fn prepare(inputs: &RefineInputs, config: &Config) -> Result<Prepared> {
    let mut summary = RunSummary::default();
    let mut dropped = Vec::new();

    let (mut registry, mut original_ids) = {
        let _span = info_span!("load").entered();
        let mut sequences = parse_fasta(&inputs.fasta)
            .with_context(|| format!("Failed to read {}", inputs.fasta.display()))?;
        let mapping = sanitize_ids(sequences.iter().map(|s| s.id.as_str()))?;
        for sequence in &mut sequences {
            if let Some(clean) = mapping.get(&sequence.id) {
                sequence.id = clean.clone();
            }
        }
        summary.input_sequences = sequences.len();
        let mut registry = SequenceRegistry::from_sequences(sequences)?;

        let mut unknown = 0usize;
        for (id, genome) in read_presence(&inputs.presence)? {
            let clean = mapping.get(&id).cloned().unwrap_or_else(|| id.replace('_', "-"));
            if registry.contains(&clean) {
                registry.add_presence(&clean, &genome)?;
            } else {
                unknown += 1;
            }
        }
        if unknown > 0 {
            warn!("{} presence rows name sequences missing from the FASTA input", unknown);
        }
        let original_ids: HashMap<String, String> =
            mapping.into_iter().map(|(raw, clean)| (clean, raw)).collect();
        (registry, original_ids)
    };
    info!(
        "Loaded {} sequences from {} genomes",
        registry.len(),
        registry.genome_count()
    );

    if let Some(min_length) = config.filtering.min_sequence_length {
        let short = registry.filter_by_length(min_length);
        summary.dropped_by_size = short.len();
        dropped.extend(short.into_iter().map(|id| (id, DropReason::CdsSize)));
    }

    {
        let _span = info_span!("translate").entered();
        let table = config.filtering.translation_table;
        let code = GeneticCode::from_table(table).ok_or_else(|| {
            RefineryError::Configuration(format!("Unsupported translation table: {}", table))
        })?;
        summary.untranslatable = registry.translate_all(code).len();
    }

    let clusterer = MinimizerClusterer::from_config(&config.clustering);
    let (clustering, mut membership, mut frequencies) = {
        let _span = info_span!("cluster").entered();
        let mut clustering = clusterer.cluster(&registry.distinct_proteins());
        clustering.attach_duplicates(|id| registry.protein_duplicates(id));
        let membership = clustering.membership();
        let frequencies = membership.frequencies(|id| registry.frequency(id));
        (clustering, membership, frequencies)
    };
    summary.clusters = clustering.len();

    let threshold = config
        .filtering
        .genome_presence_for(registry.genome_count());
    let removed = membership.retain(|cluster, _| {
        frequencies.get(cluster).copied().unwrap_or(0) >= threshold
    });
    for (cluster, members) in removed {
        debug!("Cluster {} below genome presence {}", cluster, threshold);
        frequencies.remove(&cluster);
        for member in members {
            registry.remove(&member);
            summary.dropped_by_frequency += 1;
            dropped.push((member, DropReason::ClusterFrequency));
        }
    }
    info!(
        "{} clusters kept at genome presence >= {}, {} sequences removed",
        membership.len(),
        threshold,
        summary.dropped_by_frequency
    );

    let kmer_table = config
        .clustering
        .representative_similarity
        .then(|| clusterer.representative_similarity(&clustering));

    let changes = membership.reindex(&mut registry)?;
    for change in changes.iter().filter(|c| c.clustered != c.original) {
        if let Some(raw) = original_ids.get(&change.original).cloned() {
            original_ids.insert(change.clustered.clone(), raw);
        }
    }

    Ok(Prepared {
        registry,
        clustering,
        membership,
        frequencies,
        kmer_table,
        dropped,
        original_ids,
        changes,
        summary,
    })
}

fn nucleotide_record(registry: &SequenceRegistry, id: &str) -> Result<Sequence> {
    let entry = registry
        .get(id)
        .ok_or_else(|| RefineryError::NotFound(format!("Sequence not found: {}", id)))?;
    Ok(Sequence::new(id.to_string(), entry.nucleotide.clone()))
}

fn protein_record(registry: &SequenceRegistry, id: &str) -> Result<Sequence> {
    let protein = registry
        .protein(id)
        .ok_or_else(|| RefineryError::NotFound(format!("No translation for {}", id)))?;
    Ok(Sequence::new(id.to_string(), protein.as_bytes().to_vec()))
}

/// Run the nucleotide search, self-score and protein pair-score stages.
///
/// Every representative is searched against a database of all cluster
/// members; its protein is then aligned against the proteins of the members
/// it matched.
pub fn run_alignments(
    prepared: &Prepared,
    aligner: &dyn Aligner,
    pool: &WorkerPool,
    work_dir: &Path,
) -> Result<AlignmentEvidence> {
    let registry = &prepared.registry;
    let membership = &prepared.membership;
    let mut evidence = AlignmentEvidence::default();
    if membership.is_empty() {
        return Ok(evidence);
    }

    let queries_dir = work_dir.join("queries");
    let results_dir = work_dir.join("results");
    fs::create_dir_all(&queries_dir)?;
    fs::create_dir_all(&results_dir)?;

    let database = {
        let _span = info_span!("database").entered();
        let mut members = Vec::with_capacity(membership.member_count());
        for (_, ids) in membership.clusters() {
            for id in ids {
                members.push(nucleotide_record(registry, id)?);
            }
        }
        let all_members = work_dir.join("all_members.fasta");
        write_fasta(&all_members, &members)?;
        aligner.make_database(&all_members, SequenceType::Nucleotide, &work_dir.join("all_members"))?
    };

    let representatives: Vec<&ClusterId> = membership.cluster_ids().collect();
    let mut nucleotide_jobs = Vec::with_capacity(representatives.len());
    let mut self_score_jobs = Vec::with_capacity(representatives.len());
    for (i, rep) in representatives.iter().enumerate() {
        let query = queries_dir.join(format!("rep_{}.fasta", i + 1));
        write_fasta(&query, &[nucleotide_record(registry, rep.as_str())?])?;
        nucleotide_jobs.push(SearchJob::against_database(
            query,
            &database,
            SequenceType::Nucleotide,
            results_dir.join(format!("blastn_{}.tsv", i + 1)),
        ));

        let protein = queries_dir.join(format!("rep_{}_protein.fasta", i + 1));
        write_fasta(&protein, &[protein_record(registry, rep.as_str())?])?;
        self_score_jobs.push((protein, results_dir.join(format!("self_score_{}.tsv", i + 1))));
    }

    let nucleotide_hits = {
        let _span = info_span!("blastn").entered();
        pool.run("BLASTn", &nucleotide_jobs, |job| aligner.search(job))?
    };

    {
        let _span = info_span!("self_scores").entered();
        let scores = pool.run("Self-score", &self_score_jobs, |(fasta, output)| {
            aligner.self_scores(fasta, SequenceType::Protein, output)
        })?;
        for batch in scores {
            evidence.self_scores.extend(batch);
        }
    }

    let mut protein_jobs = Vec::new();
    for (i, (rep, hits)) in representatives.iter().zip(&nucleotide_hits).enumerate() {
        let mut subjects: IndexSet<&str> = IndexSet::new();
        for hit in hits.iter().filter(|h| !h.is_self_hit()) {
            subjects.insert(hit.subject_id.as_str());
        }
        if subjects.is_empty() {
            continue;
        }
        let matches = queries_dir.join(format!("rep_{}_matches_protein.fasta", i + 1));
        let proteins = subjects
            .iter()
            .map(|id| protein_record(registry, id))
            .collect::<Result<Vec<_>>>()?;
        write_fasta(&matches, &proteins)?;
        debug!("{} protein matches for {}", proteins.len(), rep);
        protein_jobs.push(SearchJob::against_subject(
            queries_dir.join(format!("rep_{}_protein.fasta", i + 1)),
            matches,
            SequenceType::Protein,
            results_dir.join(format!("blastp_{}.tsv", i + 1)),
        ));
    }

    {
        let _span = info_span!("blastp").entered();
        for hits in pool.run("BLASTp", &protein_jobs, |job| aligner.search(job))? {
            evidence.pair_scores.merge(pair_scores(&hits));
        }
    }

    evidence.records = nucleotide_hits.into_iter().flatten().collect();
    info!(
        "{} alignments, {} self-scores, {} protein pair scores",
        evidence.records.len(),
        evidence.self_scores.len(),
        evidence.pair_scores.len()
    );
    Ok(evidence)
}

/// Member id to `<group>_<index>` for every member of a surviving group
fn joined_ids(catalogue: &[CatalogueGroup], membership: &ClusterMembership) -> HashMap<String, String> {
    let mut joined = HashMap::new();
    for group in catalogue.iter().filter(|g| !g.status.is_dropped()) {
        let members = group
            .clusters
            .iter()
            .flat_map(|cluster| membership.members(cluster).iter());
        for (index, member) in members.enumerate() {
            joined.insert(member.clone(), group.id.member(index + 1).to_string());
        }
    }
    joined
}

/// Run the whole pipeline and write every report into `inputs.output`
pub fn refine(
    inputs: &RefineInputs,
    config: &Config,
    aligner: &dyn Aligner,
    pool: &WorkerPool,
) -> Result<RunSummary> {
    let writer = ReportWriter::new(&inputs.output)?;
    let mut prepared = prepare(inputs, config)?;

    // Dropping the guard removes the scratch directory
    let (_scratch, work_dir) = if inputs.keep_work_dir {
        let dir = writer.path(WORK_DIR);
        fs::create_dir_all(&dir)?;
        (None, dir)
    } else {
        let scratch = tempfile::Builder::new()
            .prefix("refinery-")
            .tempdir_in(writer.dir())
            .context("Failed to create aligner work directory")?;
        let dir = scratch.path().to_path_buf();
        (Some(scratch), dir)
    };

    let evidence = run_alignments(&prepared, aligner, pool, &work_dir)?;
    let input = EngineInput {
        membership: &prepared.membership,
        frequencies: &prepared.frequencies,
        self_scores: &evidence.self_scores,
        records: &evidence.records,
        pair_scores: Some(&evidence.pair_scores),
        kmer_table: prepared.kmer_table.as_ref(),
    };
    let output = run_engine(&input, config)?;

    for cluster in &output.final_drops {
        for member in prepared.membership.members(cluster) {
            prepared
                .dropped
                .push((member.clone(), DropReason::SmallerGenomePresence));
        }
    }

    let _span = info_span!("write").entered();
    output.write_reports(&writer, &prepared.membership)?;
    writer.clusters(&prepared.clustering)?;
    writer.dropped(&original_drop_ids(&prepared))?;

    if config.output.write_id_changes {
        let joined = joined_ids(&output.catalogue, &prepared.membership);
        let rows: Vec<IdChangeRow> = prepared
            .changes
            .iter()
            .map(|change| IdChangeRow {
                original: original_id(&prepared.original_ids, &change.original),
                clustered: change.clustered.clone(),
                joined: joined.get(&change.clustered).cloned(),
            })
            .collect();
        writer.id_changes(&rows)?;
    }

    let final_drops: HashSet<&ClusterId> = output.final_drops.iter().collect();
    let representatives = output
        .catalogue
        .iter()
        .filter(|g| !final_drops.contains(&g.id))
        .map(|g| nucleotide_record(&prepared.registry, g.id.as_str()))
        .collect::<Result<Vec<_>>>()?;
    write_fasta(writer.path(REPRESENTATIVES_FILE), &representatives)?;

    let mut summary = prepared.summary;
    output.record_into(&mut summary);
    if config.output.write_summary {
        writer.summary(&summary)?;
    }
    info!("Reports written to {}", writer.dir().display());
    Ok(summary)
}

fn original_id(original_ids: &HashMap<String, String>, id: &str) -> String {
    original_ids.get(id).cloned().unwrap_or_else(|| id.to_string())
}

/// Dropped sequences under the ids found in the input
fn original_drop_ids(prepared: &Prepared) -> Vec<(String, DropReason)> {
    prepared
        .dropped
        .iter()
        .map(|(id, reason)| (original_id(&prepared.original_ids, id), *reason))
        .collect()
}
