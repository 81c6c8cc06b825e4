//! Coding-sequence translation
//!
//! A coding sequence is valid when its length is a multiple of three, it opens
//! with a start codon of the chosen genetic code, ends with a stop codon and has
//! no internal stop. Sequences that fail on the forward strand are retried on the
//! reverse complement.

use thiserror::Error;

/// Amino acids for codons ordered TCAG x TCAG x TCAG
const AMINO_ACIDS: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("length {0} is not a multiple of 3")]
    NotMultipleOfThree(usize),

    #[error("invalid codon '{codon}' at position {position}")]
    InvalidCodon { position: usize, codon: String },

    #[error("sequence does not begin with a start codon")]
    MissingStart,

    #[error("sequence does not end with a stop codon")]
    MissingStop,

    #[error("internal stop codon at position {0}")]
    InternalStop(usize),
}

/// NCBI genetic code tables supported for CDS translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneticCode {
    /// Table 1
    Standard,
    /// Table 11
    Bacterial,
}

impl GeneticCode {
    pub fn from_table(table: u8) -> Option<Self> {
        match table {
            1 => Some(Self::Standard),
            11 => Some(Self::Bacterial),
            _ => None,
        }
    }

    pub fn table(&self) -> u8 {
        match self {
            Self::Standard => 1,
            Self::Bacterial => 11,
        }
    }

    pub fn is_start(&self, codon: &[u8]) -> bool {
        match self {
            Self::Standard => matches!(codon, b"ATG" | b"TTG" | b"CTG"),
            Self::Bacterial => matches!(
                codon,
                b"ATG" | b"TTG" | b"CTG" | b"GTG" | b"ATT" | b"ATC" | b"ATA"
            ),
        }
    }
}

fn base_index(base: u8) -> Option<usize> {
    match base {
        b'T' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

fn translate_codon(codon: &[u8]) -> Option<u8> {
    let index = base_index(codon[0])? * 16 + base_index(codon[1])? * 4 + base_index(codon[2])?;
    Some(AMINO_ACIDS[index])
}

pub fn reverse_complement(dna: &[u8]) -> Vec<u8> {
    dna.iter()
        .rev()
        .map(|base| match base.to_ascii_uppercase() {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            other => other,
        })
        .collect()
}

/// Translate a single strand; the terminal stop is not included in the protein
pub fn translate(dna: &[u8], code: GeneticCode) -> Result<String, TranslationError> {
    let dna: Vec<u8> = dna.iter().map(|b| b.to_ascii_uppercase()).collect();
    if dna.len() % 3 != 0 || dna.is_empty() {
        return Err(TranslationError::NotMultipleOfThree(dna.len()));
    }

    let codons: Vec<&[u8]> = dna.chunks_exact(3).collect();
    if !code.is_start(codons[0]) {
        return Err(TranslationError::MissingStart);
    }

    let mut protein = String::with_capacity(codons.len());
    let last = codons.len() - 1;
    for (i, codon) in codons.iter().enumerate() {
        let amino = translate_codon(codon).ok_or_else(|| TranslationError::InvalidCodon {
            position: i * 3,
            codon: String::from_utf8_lossy(codon).into_owned(),
        })?;

        if i == last {
            if amino != b'*' {
                return Err(TranslationError::MissingStop);
            }
        } else if amino == b'*' {
            return Err(TranslationError::InternalStop(i * 3));
        } else if i == 0 {
            // Alternative starts still encode methionine
            protein.push('M');
        } else {
            protein.push(amino as char);
        }
    }

    Ok(protein)
}

/// Translate a CDS, falling back to the reverse complement
pub fn translate_cds(dna: &[u8], code: GeneticCode) -> Result<String, TranslationError> {
    match translate(dna, code) {
        Ok(protein) => Ok(protein),
        Err(forward) => translate(&reverse_complement(dna), code).map_err(|_| forward),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_forward() {
        let protein = translate(b"ATGAAAGGGTTTTAA", GeneticCode::Bacterial).unwrap();
        assert_eq!(protein, "MKGF");
    }

    #[test]
    fn test_alternative_start_is_methionine() {
        assert_eq!(translate(b"GTGAAATAG", GeneticCode::Bacterial).unwrap(), "MK");
        assert_eq!(
            translate(b"GTGAAATAG", GeneticCode::Standard).unwrap_err(),
            TranslationError::MissingStart
        );
    }

    #[test]
    fn test_translate_errors() {
        assert_eq!(
            translate(b"ATGAA", GeneticCode::Standard).unwrap_err(),
            TranslationError::NotMultipleOfThree(5)
        );
        assert_eq!(
            translate(b"ATGTAAAAATAA", GeneticCode::Standard).unwrap_err(),
            TranslationError::InternalStop(3)
        );
        assert_eq!(
            translate(b"ATGAAAAAA", GeneticCode::Standard).unwrap_err(),
            TranslationError::MissingStop
        );
        assert!(matches!(
            translate(b"ATGNAATAA", GeneticCode::Standard).unwrap_err(),
            TranslationError::InvalidCodon { position: 3, .. }
        ));
    }

    #[test]
    fn test_reverse_strand_fallback() {
        let forward = b"ATGAAAGGGTTTTAA";
        let reverse = reverse_complement(forward);
        assert_eq!(translate_cds(&reverse, GeneticCode::Bacterial).unwrap(), "MKGF");
    }

    #[test]
    fn test_lowercase_input() {
        assert_eq!(translate(b"atgtggtga", GeneticCode::Standard).unwrap(), "MW");
    }

    #[test]
    fn test_table_lookup() {
        assert_eq!(GeneticCode::from_table(11), Some(GeneticCode::Bacterial));
        assert_eq!(GeneticCode::from_table(4), None);
        assert_eq!(GeneticCode::Standard.table(), 1);
    }
}
