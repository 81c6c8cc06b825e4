pub mod classify;
pub mod cluster;
pub mod refine;

use refinery_core::Config;

/// Classification thresholds shared by `refine` and `classify`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ThresholdArgs {
    /// Minimum score ratio for a full-length match
    #[arg(long, value_name = "RATIO")]
    pub bsr: Option<f64>,

    /// Minimum percent identity
    #[arg(long, value_name = "PERCENT")]
    pub pident: Option<f64>,

    /// Minimum alignment coverage for a full-length match
    #[arg(long, value_name = "RATIO")]
    pub size_ratio: Option<f64>,

    /// Frequency ratio below which the rarer side may be dropped
    #[arg(long, value_name = "RATIO")]
    pub frequency_ratio: Option<f64>,

    /// Keep reverse orientations as separate related-match rows
    #[arg(long)]
    pub no_reverse_matches: bool,
}

impl ThresholdArgs {
    pub fn apply(&self, config: &mut Config) {
        let classification = &mut config.classification;
        if let Some(bsr) = self.bsr {
            classification.bsr_threshold = bsr;
        }
        if let Some(pident) = self.pident {
            classification.pident_threshold = pident;
        }
        if let Some(size_ratio) = self.size_ratio {
            classification.size_ratio_threshold = size_ratio;
        }
        if let Some(ratio) = self.frequency_ratio {
            classification.frequency_ratio_cutoff = ratio;
        }
        if self.no_reverse_matches {
            config.output.reverse_matches = false;
        }
    }
}
