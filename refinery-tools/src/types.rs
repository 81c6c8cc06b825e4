//! BLAST+ programs driven by refinery

use anyhow::Result;
use refinery_core::SequenceType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlastProgram {
    Blastn,
    Blastp,
    Makeblastdb,
}

impl BlastProgram {
    /// Default binary name
    pub fn name(&self) -> &'static str {
        match self {
            BlastProgram::Blastn => "blastn",
            BlastProgram::Blastp => "blastp",
            BlastProgram::Makeblastdb => "makeblastdb",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BlastProgram::Blastn => "BLASTn",
            BlastProgram::Blastp => "BLASTp",
            BlastProgram::Makeblastdb => "makeblastdb",
        }
    }

    /// Search program for an alphabet
    pub fn for_search(sequence_type: SequenceType) -> Self {
        match sequence_type {
            SequenceType::Nucleotide => BlastProgram::Blastn,
            SequenceType::Protein => BlastProgram::Blastp,
        }
    }
}

impl std::fmt::Display for BlastProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for BlastProgram {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "blastn" => Ok(BlastProgram::Blastn),
            "blastp" => Ok(BlastProgram::Blastp),
            "makeblastdb" => Ok(BlastProgram::Makeblastdb),
            _ => anyhow::bail!("Unknown BLAST+ program: {}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_for_alphabet() {
        assert_eq!(BlastProgram::for_search(SequenceType::Nucleotide), BlastProgram::Blastn);
        assert_eq!(BlastProgram::for_search(SequenceType::Protein), BlastProgram::Blastp);
    }

    #[test]
    fn test_parse_program_names() {
        assert_eq!("BLASTN".parse::<BlastProgram>().unwrap(), BlastProgram::Blastn);
        assert_eq!("makeblastdb".parse::<BlastProgram>().unwrap(), BlastProgram::Makeblastdb);
        assert!("tblastx".parse::<BlastProgram>().is_err());
    }
}
