use serde::{Deserialize, Serialize};
use std::fmt;

pub use refinery_core::SequenceType;

/// A raw FASTA record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

impl Sequence {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn detect_type(&self) -> SequenceType {
        SequenceType::detect(&String::from_utf8_lossy(&self.sequence))
    }

    pub fn header(&self) -> String {
        match &self.description {
            Some(desc) if !desc.is_empty() => format!(">{} {}", self.id, desc),
            _ => format!(">{}", self.id),
        }
    }

    pub fn sequence_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.sequence)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.header(), self.sequence_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_with_and_without_description() {
        let seq = Sequence::new("cds_1".to_string(), b"ATGAAATAA".to_vec());
        assert_eq!(seq.header(), ">cds_1");

        let seq = seq.with_description("genome_A contig_3".to_string());
        assert_eq!(seq.header(), ">cds_1 genome_A contig_3");
        assert_eq!(seq.to_string(), ">cds_1 genome_A contig_3\nATGAAATAA");
    }

    #[test]
    fn test_detect_type() {
        let dna = Sequence::new("a".to_string(), b"ATGGCGTAA".to_vec());
        let protein = Sequence::new("b".to_string(), b"MKLVQEW".to_vec());
        assert_eq!(dna.detect_type(), SequenceType::Nucleotide);
        assert_eq!(protein.detect_type(), SequenceType::Protein);
    }
}
