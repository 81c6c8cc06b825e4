//! Sequence-related types shared across refinery

use serde::{Deserialize, Serialize};

/// Alphabet of a sequence set, as the aligner tools understand it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceType {
    /// DNA coding sequences
    Nucleotide,
    /// Translated amino acid sequences
    Protein,
}

impl SequenceType {
    pub fn is_nucleotide(&self) -> bool {
        matches!(self, Self::Nucleotide)
    }

    pub fn is_protein(&self) -> bool {
        matches!(self, Self::Protein)
    }

    /// Database type argument understood by `makeblastdb -dbtype`
    pub fn dbtype(&self) -> &'static str {
        match self {
            Self::Nucleotide => "nucl",
            Self::Protein => "prot",
        }
    }

    /// Guess the alphabet from sequence content
    pub fn detect(sequence: &str) -> Self {
        let total = sequence.len();
        if total == 0 {
            return Self::Nucleotide;
        }
        let nucleotide_count = sequence
            .bytes()
            .filter(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
            .count();

        // More than 90% ACGTN reads as DNA
        if nucleotide_count as f32 / total as f32 > 0.9 {
            Self::Nucleotide
        } else {
            Self::Protein
        }
    }
}

impl std::fmt::Display for SequenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nucleotide => write!(f, "Nucleotide"),
            Self::Protein => write!(f, "Protein"),
        }
    }
}
