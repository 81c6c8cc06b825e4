use crate::cli::GlobalOptions;
use anyhow::{Context, Result};
use clap::Args;
use refinery_bio::clustering::MinimizerClusterer;
use refinery_bio::formats::parse_fasta;
use refinery_bio::sequence::{GeneticCode, SequenceRegistry};
use refinery_core::{RefineryError, SequenceType};
use refinery_utils::{create_spinner, format_number, success, warning, ReportWriter};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Sequences to cluster; coding sequences are translated first
    #[arg(short, long, value_name = "FASTA")]
    pub input: PathBuf,

    /// Output directory for clusters.tsv
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Minimizer k-mer size (at most 8)
    #[arg(short, long, value_name = "K")]
    pub kmer_size: Option<usize>,

    /// Minimizer window size
    #[arg(short, long, value_name = "W")]
    pub window_size: Option<usize>,

    /// Minimum shared-minimizer similarity to join a cluster
    #[arg(long, value_name = "RATIO")]
    pub similarity: Option<f64>,

    /// Minimum representative coverage to join a cluster
    #[arg(long, value_name = "RATIO")]
    pub coverage: Option<f64>,

    /// Genetic code table used for translation (1 or 11)
    #[arg(long, value_name = "TABLE")]
    pub translation_table: Option<u8>,
}

pub fn run(args: ClusterArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = global.load_config()?;
    let clustering_config = &mut config.clustering;
    if let Some(k) = args.kmer_size {
        clustering_config.kmer_size = k;
    }
    if let Some(w) = args.window_size {
        clustering_config.window_size = w;
    }
    if let Some(similarity) = args.similarity {
        clustering_config.similarity_threshold = similarity;
    }
    if let Some(coverage) = args.coverage {
        clustering_config.coverage_threshold = coverage;
    }
    if let Some(table) = args.translation_table {
        config.filtering.translation_table = table;
    }
    config.validate()?;

    let sequences = parse_fasta(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let is_nucleotide = sequences
        .first()
        .map(|s| s.detect_type() == SequenceType::Nucleotide)
        .unwrap_or(false);

    let mut registry = SequenceRegistry::from_sequences(sequences)?;
    let proteins = if is_nucleotide {
        let table = config.filtering.translation_table;
        let code = GeneticCode::from_table(table).ok_or_else(|| {
            RefineryError::Configuration(format!("Unsupported translation table: {}", table))
        })?;
        let failed = registry.translate_all(code);
        if !failed.is_empty() {
            warning(&format!("{} sequences could not be translated", failed.len()));
        }
        registry.distinct_proteins()
    } else {
        registry
            .iter()
            .map(|(id, entry)| {
                (
                    id.to_string(),
                    String::from_utf8_lossy(&entry.nucleotide).to_uppercase(),
                )
            })
            .collect()
    };

    let spinner = create_spinner(&format!("Clustering {} sequences", format_number(proteins.len())));
    let clusterer = MinimizerClusterer::from_config(&config.clustering);
    let mut clustering = clusterer.cluster(&proteins);
    if is_nucleotide {
        clustering.attach_duplicates(|id| registry.protein_duplicates(id));
    }
    spinner.finish_and_clear();

    let writer = ReportWriter::new(&args.output)?;
    let path = writer.clusters(&clustering)?;
    success(&format!(
        "{} clusters ({} singletons) written to {}",
        format_number(clustering.len()),
        format_number(clustering.singleton_count()),
        path.display()
    ));
    Ok(())
}
