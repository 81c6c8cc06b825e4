use super::ThresholdArgs;
use crate::cli::GlobalOptions;
use crate::core::pipeline::{refine, RefineInputs};
use anyhow::Result;
use clap::Args;
use refinery_core::RefineryError;
use refinery_tools::{build_worker_pool, Aligner, BlastAligner};
use refinery_utils::{info, success, warning};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct RefineArgs {
    /// Coding sequences (FASTA, optionally gzipped)
    #[arg(short, long, value_name = "FASTA")]
    pub input: PathBuf,

    /// Genome presence table: one `id<TAB>genome` row per occurrence
    #[arg(short, long, value_name = "TSV")]
    pub presence: PathBuf,

    /// Output directory for every report
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Drop sequences shorter than this many nucleotides
    #[arg(long, value_name = "BP")]
    pub min_length: Option<usize>,

    /// Minimum genome presence of a cluster (default: automatic)
    #[arg(long, value_name = "GENOMES")]
    pub genome_presence: Option<u32>,

    /// Genetic code table used for translation (1 or 11)
    #[arg(long, value_name = "TABLE")]
    pub translation_table: Option<u8>,

    /// Skip the k-mer similarity table between representatives
    #[arg(long)]
    pub no_kmer_similarity: bool,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Path to the blastn executable
    #[arg(long, value_name = "PATH")]
    pub blastn: Option<String>,

    /// Path to the blastp executable
    #[arg(long, value_name = "PATH")]
    pub blastp: Option<String>,

    /// Path to the makeblastdb executable
    #[arg(long, value_name = "PATH")]
    pub makeblastdb: Option<String>,

    /// Keep aligner inputs and raw results under <OUTPUT>/alignments
    #[arg(long)]
    pub keep_alignments: bool,
}

pub fn run(args: RefineArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = global.load_config()?;
    if let Some(min_length) = args.min_length {
        config.filtering.min_sequence_length = Some(min_length);
    }
    if let Some(genome_presence) = args.genome_presence {
        config.filtering.genome_presence = Some(genome_presence);
    }
    if let Some(table) = args.translation_table {
        config.filtering.translation_table = table;
    }
    if args.no_kmer_similarity {
        config.clustering.representative_similarity = false;
    }
    if let Some(path) = args.blastn {
        config.aligner.blastn_path = path;
    }
    if let Some(path) = args.blastp {
        config.aligner.blastp_path = path;
    }
    if let Some(path) = args.makeblastdb {
        config.aligner.makeblastdb_path = path;
    }
    args.thresholds.apply(&mut config);
    config.validate()?;

    let aligner = BlastAligner::new(&config.aligner);
    if !aligner.is_available() {
        return Err(RefineryError::Aligner(format!(
            "BLAST+ not found (blastn: {}, blastp: {}, makeblastdb: {})",
            config.aligner.blastn_path, config.aligner.blastp_path, config.aligner.makeblastdb_path
        ))
        .into());
    }
    match aligner.version() {
        Ok(version) => debug!("Using {} {}", aligner.name(), version),
        Err(e) => warning(&format!("Could not read the BLAST+ version: {}", e)),
    }

    let pool = build_worker_pool(config.aligner.workers)?.with_progress(true);
    info(&format!(
        "Refining {} with {} aligner workers",
        args.input.display(),
        pool.workers()
    ));

    let inputs = RefineInputs {
        fasta: args.input,
        presence: args.presence,
        output: args.output,
        keep_work_dir: args.keep_alignments,
    };
    let summary = refine(&inputs, &config, &aligner, &pool)?;

    if summary.untranslatable > 0 {
        warning(&format!(
            "{} sequences could not be translated and were skipped",
            summary.untranslatable
        ));
    }
    summary.print();
    success(&format!("Reports written to {}", inputs.output.display()));
    Ok(())
}
