use crate::alignment::EnrichedAlignment;
use refinery_core::config::ClassificationConfig;
use refinery_core::Class;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Cut-offs of the classification decision tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub bsr: f64,
    /// Percent identity (0-100)
    pub pident: f64,
    pub size_ratio: f64,
    pub min_global_palign: f64,
    pub frequency_ratio_cutoff: f64,
    pub rare_frequency_limit: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&ClassificationConfig::default())
    }
}

impl Thresholds {
    pub fn from_config(config: &ClassificationConfig) -> Self {
        Self {
            bsr: config.bsr_threshold,
            pident: config.pident_threshold,
            size_ratio: config.size_ratio_threshold,
            min_global_palign: config.min_global_palign,
            frequency_ratio_cutoff: config.frequency_ratio_cutoff,
            rare_frequency_limit: config.rare_frequency_limit,
        }
    }

    fn is_frequency_skewed(&self, query_frequency: u32, subject_frequency: u32) -> bool {
        frequency_ratio(query_frequency, subject_frequency, self) <= self.frequency_ratio_cutoff
    }
}

/// Ratio of the smaller genome frequency to the larger one.
///
/// A zero on either side yields the cutoff when the other side is above the
/// rare limit, otherwise 1.
pub fn frequency_ratio(query_frequency: u32, subject_frequency: u32, thresholds: &Thresholds) -> f64 {
    if query_frequency == 0 || subject_frequency == 0 {
        if query_frequency.max(subject_frequency) > thresholds.rare_frequency_limit {
            thresholds.frequency_ratio_cutoff
        } else {
            1.0
        }
    } else {
        let q = query_frequency as f64;
        let s = subject_frequency as f64;
        (q / s).min(s / q)
    }
}

/// Assign a class to one alignment; the first matching rule wins
pub fn classify(alignment: &EnrichedAlignment, thresholds: &Thresholds) -> Class {
    let coverage = alignment.global_palign_all.min;
    let pident_coverage = alignment.global_palign_pident.max;
    let skewed = thresholds.is_frequency_skewed(alignment.query_frequency, alignment.subject_frequency);

    if coverage >= thresholds.size_ratio {
        if alignment.score_ratio >= thresholds.bsr {
            Class::C1a
        } else if skewed {
            Class::C1b
        } else {
            Class::C1c
        }
    } else if coverage >= thresholds.min_global_palign {
        let full_length_identity = pident_coverage >= thresholds.size_ratio;
        match (alignment.pident() >= thresholds.pident, full_length_identity) {
            (true, true) if skewed => Class::C2a,
            (true, true) => Class::C2b,
            (true, false) if skewed => Class::C3a,
            (true, false) => Class::C3b,
            (false, true) if skewed => Class::C4a,
            (false, true) => Class::C4b,
            (false, false) => Class::C4c,
        }
    } else {
        Class::C5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedAlignment {
    pub alignment: EnrichedAlignment,
    pub class: Class,
}

impl ClassifiedAlignment {
    pub fn query_id(&self) -> &str {
        self.alignment.query_id()
    }

    pub fn subject_id(&self) -> &str {
        self.alignment.subject_id()
    }
}

/// Classify a batch and order it by class priority, then by the position at
/// which each query first appeared in the input.
pub fn classify_all(alignments: Vec<EnrichedAlignment>, thresholds: &Thresholds) -> Vec<ClassifiedAlignment> {
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for alignment in &alignments {
        let next = first_seen.len();
        first_seen.entry(alignment.query_id().to_string()).or_insert(next);
    }

    let mut classified: Vec<ClassifiedAlignment> = alignments
        .into_iter()
        .map(|alignment| {
            let class = classify(&alignment, thresholds);
            ClassifiedAlignment { alignment, class }
        })
        .collect();

    classified.sort_by_key(|c| (c.class, first_seen.get(c.query_id()).copied().unwrap_or(usize::MAX)));

    debug!(
        "Classified {} alignments: {}",
        classified.len(),
        class_counts(&classified)
            .iter()
            .map(|(class, n)| format!("{}={}", class, n))
            .collect::<Vec<_>>()
            .join(" ")
    );
    classified
}

/// Number of alignments per class, in priority order, absent classes omitted
pub fn class_counts(classified: &[ClassifiedAlignment]) -> Vec<(Class, usize)> {
    Class::ALL
        .iter()
        .map(|&class| (class, classified.iter().filter(|c| c.class == class).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}
