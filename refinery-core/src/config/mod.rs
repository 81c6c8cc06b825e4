//! Configuration types for refinery

use crate::RefineryError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub filtering: FilteringConfig,
    #[serde(default)]
    pub aligner: AlignerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Minimizer clustering parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusteringConfig {
    #[serde(default = "default_kmer_size")]
    pub kmer_size: usize,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Fraction of the candidate's minimizers shared with a representative
    #[serde(default = "default_clustering_similarity")]
    pub similarity_threshold: f64,
    /// Fraction of the representative covered by shared minimizers
    #[serde(default = "default_clustering_coverage")]
    pub coverage_threshold: f64,
    /// Compute the representative-vs-representative k-mer table used by enrichment
    #[serde(default = "default_representative_similarity")]
    pub representative_similarity: bool,
}

/// Thresholds of the classification decision tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationConfig {
    #[serde(default = "default_bsr_threshold")]
    pub bsr_threshold: f64,
    /// Percent identity (0-100)
    #[serde(default = "default_pident_threshold")]
    pub pident_threshold: f64,
    #[serde(default = "default_size_ratio_threshold")]
    pub size_ratio_threshold: f64,
    #[serde(default = "default_min_global_palign")]
    pub min_global_palign: f64,
    #[serde(default = "default_frequency_ratio_cutoff")]
    pub frequency_ratio_cutoff: f64,
    /// Frequency above which a zero-frequency partner counts as negligibly rare
    #[serde(default = "default_rare_frequency_limit")]
    pub rare_frequency_limit: u32,
}

/// Input filtering applied before clustering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilteringConfig {
    /// Minimum nucleotide length; shorter sequences are dropped
    #[serde(default)]
    pub min_sequence_length: Option<usize>,
    /// Minimum cluster frequency; derived from the genome count when unset
    #[serde(default)]
    pub genome_presence: Option<u32>,
    #[serde(default = "default_translation_table")]
    pub translation_table: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignerConfig {
    #[serde(default = "default_blastn")]
    pub blastn_path: String,
    #[serde(default = "default_blastp")]
    pub blastp_path: String,
    #[serde(default = "default_makeblastdb")]
    pub makeblastdb_path: String,
    /// Concurrent aligner processes (0 = all available cores)
    #[serde(default)]
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Merge reverse-orientation rows into inverse columns of related_matches.tsv
    #[serde(default = "default_reverse_matches")]
    pub reverse_matches: bool,
    #[serde(default = "default_write_id_changes")]
    pub write_id_changes: bool,
    #[serde(default = "default_write_summary")]
    pub write_summary: bool,
}

// Default value functions
fn default_kmer_size() -> usize { 5 }
fn default_window_size() -> usize { 5 }
fn default_clustering_similarity() -> f64 { 0.9 }
fn default_clustering_coverage() -> f64 { 0.9 }
fn default_representative_similarity() -> bool { true }
fn default_bsr_threshold() -> f64 { 0.6 }
fn default_pident_threshold() -> f64 { 90.0 }
fn default_size_ratio_threshold() -> f64 { 0.8 }
fn default_min_global_palign() -> f64 { 0.4 }
fn default_frequency_ratio_cutoff() -> f64 { 0.1 }
fn default_rare_frequency_limit() -> u32 { 10 }
fn default_translation_table() -> u8 { 11 }
fn default_blastn() -> String { "blastn".to_string() }
fn default_blastp() -> String { "blastp".to_string() }
fn default_makeblastdb() -> String { "makeblastdb".to_string() }
fn default_reverse_matches() -> bool { true }
fn default_write_id_changes() -> bool { true }
fn default_write_summary() -> bool { true }

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            kmer_size: default_kmer_size(),
            window_size: default_window_size(),
            similarity_threshold: default_clustering_similarity(),
            coverage_threshold: default_clustering_coverage(),
            representative_similarity: default_representative_similarity(),
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            bsr_threshold: default_bsr_threshold(),
            pident_threshold: default_pident_threshold(),
            size_ratio_threshold: default_size_ratio_threshold(),
            min_global_palign: default_min_global_palign(),
            frequency_ratio_cutoff: default_frequency_ratio_cutoff(),
            rare_frequency_limit: default_rare_frequency_limit(),
        }
    }
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            min_sequence_length: None,
            genome_presence: None,
            translation_table: default_translation_table(),
        }
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            blastn_path: default_blastn(),
            blastp_path: default_blastp(),
            makeblastdb_path: default_makeblastdb(),
            workers: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reverse_matches: default_reverse_matches(),
            write_id_changes: default_write_id_changes(),
            write_summary: default_write_summary(),
        }
    }
}

impl FilteringConfig {
    /// Minimum cluster frequency for a dataset of `genome_count` genomes.
    ///
    /// An explicit `genome_presence` wins; otherwise small datasets (<= 20 genomes)
    /// use 5 and larger ones use 1% of the genome count.
    pub fn genome_presence_for(&self, genome_count: usize) -> u32 {
        if let Some(value) = self.genome_presence {
            return value;
        }
        if genome_count <= 20 {
            5
        } else {
            (genome_count as f64 * 0.01).round() as u32
        }
    }
}

impl Config {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), RefineryError> {
        let c = &self.clustering;
        if c.kmer_size == 0 || c.kmer_size > 8 {
            return Err(RefineryError::Configuration(format!(
                "clustering.kmer_size must be between 1 and 8, got {}",
                c.kmer_size
            )));
        }
        if c.window_size == 0 {
            return Err(RefineryError::Configuration(
                "clustering.window_size must be at least 1".to_string(),
            ));
        }
        check_fraction("clustering.similarity_threshold", c.similarity_threshold)?;
        check_fraction("clustering.coverage_threshold", c.coverage_threshold)?;

        let t = &self.classification;
        check_fraction("classification.size_ratio_threshold", t.size_ratio_threshold)?;
        check_fraction("classification.min_global_palign", t.min_global_palign)?;
        check_fraction("classification.frequency_ratio_cutoff", t.frequency_ratio_cutoff)?;
        if t.bsr_threshold < 0.0 {
            return Err(RefineryError::Configuration(format!(
                "classification.bsr_threshold must be non-negative, got {}",
                t.bsr_threshold
            )));
        }
        if !(0.0..=100.0).contains(&t.pident_threshold) {
            return Err(RefineryError::Configuration(format!(
                "classification.pident_threshold must be within 0-100, got {}",
                t.pident_threshold
            )));
        }
        if t.min_global_palign > t.size_ratio_threshold {
            return Err(RefineryError::Configuration(format!(
                "classification.min_global_palign ({}) exceeds size_ratio_threshold ({})",
                t.min_global_palign, t.size_ratio_threshold
            )));
        }
        if !matches!(self.filtering.translation_table, 1 | 11) {
            return Err(RefineryError::Configuration(format!(
                "filtering.translation_table {} is not supported (use 1 or 11)",
                self.filtering.translation_table
            )));
        }
        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), RefineryError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RefineryError::Configuration(format!(
            "{} must be within 0-1, got {}",
            name, value
        )))
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, RefineryError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| RefineryError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), RefineryError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| RefineryError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.clustering.kmer_size, 5);
        assert_eq!(config.clustering.window_size, 5);
        assert_eq!(config.clustering.similarity_threshold, 0.9);
        assert_eq!(config.clustering.coverage_threshold, 0.9);
        assert!(config.clustering.representative_similarity);

        assert_eq!(config.classification.bsr_threshold, 0.6);
        assert_eq!(config.classification.pident_threshold, 90.0);
        assert_eq!(config.classification.size_ratio_threshold, 0.8);
        assert_eq!(config.classification.min_global_palign, 0.4);
        assert_eq!(config.classification.frequency_ratio_cutoff, 0.1);
        assert_eq!(config.classification.rare_frequency_limit, 10);

        assert_eq!(config.filtering.min_sequence_length, None);
        assert_eq!(config.filtering.genome_presence, None);
        assert_eq!(config.filtering.translation_table, 11);

        assert_eq!(config.aligner.blastn_path, "blastn");
        assert_eq!(config.aligner.workers, 0);
        assert!(config.output.reverse_matches);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
[classification]
bsr_threshold = 0.7

[aligner]
workers = 4
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.classification.bsr_threshold, 0.7);
        assert_eq!(config.aligner.workers, 4);

        // Unspecified values fall back to defaults
        assert_eq!(config.classification.pident_threshold, 90.0);
        assert_eq!(config.clustering.kmer_size, 5);
        assert_eq!(config.aligner.blastp_path, "blastp");
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "this is not valid TOML {{").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            RefineryError::Configuration(msg) => assert!(msg.contains("Failed to parse config")),
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        match load_config("/nonexistent/path/to/refinery.toml").unwrap_err() {
            RefineryError::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.classification.bsr_threshold = 0.42;
        config.filtering.min_sequence_length = Some(201);
        config.filtering.genome_presence = Some(3);
        config.aligner.blastn_path = "/opt/blast/bin/blastn".to_string();

        let temp_file = NamedTempFile::new().unwrap();
        save_config(temp_file.path(), &config).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.clustering.kmer_size = 9;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classification.pident_threshold = 101.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classification.min_global_palign = 0.9;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filtering.translation_table = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_genome_presence_threshold() {
        let filtering = FilteringConfig::default();
        assert_eq!(filtering.genome_presence_for(0), 5);
        assert_eq!(filtering.genome_presence_for(20), 5);
        assert_eq!(filtering.genome_presence_for(450), 5);
        assert_eq!(filtering.genome_presence_for(1000), 10);

        let explicit = FilteringConfig {
            genome_presence: Some(2),
            ..FilteringConfig::default()
        };
        assert_eq!(explicit.genome_presence_for(1000), 2);
    }
}
