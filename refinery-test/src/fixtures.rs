//! Test fixtures and data generators

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Residues without `M` so a generated body never repeats the start codon
const RESIDUES: &[u8] = b"ACDEFGHIKLNPQRSTVWY";

/// Deterministic random protein body (no leading `M`)
pub fn random_protein(seed: u64, length: usize) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..length)
        .map(|_| RESIDUES[rng.gen_range(0..RESIDUES.len())] as char)
        .collect()
}

fn codon(residue: char) -> &'static str {
    match residue {
        'A' => "GCT",
        'C' => "TGT",
        'D' => "GAT",
        'E' => "GAA",
        'F' => "TTT",
        'G' => "GGT",
        'H' => "CAT",
        'I' => "ATT",
        'K' => "AAA",
        'L' => "CTG",
        'M' => "ATG",
        'N' => "AAT",
        'P' => "CCT",
        'Q' => "CAG",
        'R' => "CGT",
        'S' => "TCT",
        'T' => "ACT",
        'V' => "GTT",
        'W' => "TGG",
        'Y' => "TAT",
        other => panic!("no codon for residue {}", other),
    }
}

/// `ATG` + one codon per residue + `TAA`; translates back to `M` + `protein`
pub fn coding_sequence(protein: &str) -> String {
    let mut dna = String::with_capacity(protein.len() * 3 + 6);
    dna.push_str("ATG");
    for residue in protein.chars() {
        dna.push_str(codon(residue));
    }
    dna.push_str("TAA");
    dna
}

/// A coding sequence fixture and the genomes it occurs in
#[derive(Debug, Clone)]
pub struct TestCds {
    pub id: String,
    pub dna: String,
    pub genomes: Vec<String>,
}

impl TestCds {
    pub fn new(id: impl Into<String>, protein: &str) -> Self {
        Self {
            id: id.into(),
            dna: coding_sequence(protein),
            genomes: Vec::new(),
        }
    }

    /// Present in genomes `g1..=gN`
    pub fn in_genomes(mut self, count: usize) -> Self {
        self.genomes = (1..=count).map(|i| format!("g{}", i)).collect();
        self
    }

    pub fn to_fasta(&self) -> String {
        format!(">{}\n{}\n", self.id, self.dna)
    }
}

/// Write `(id, sequence)` records as FASTA under `dir`
pub fn write_fasta_fixture(dir: &Path, name: &str, records: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).expect("create fixture");
    for (id, sequence) in records {
        writeln!(file, ">{}\n{}", id, sequence).expect("write fixture");
    }
    path
}

/// Write the nucleotide FASTA and the `id<TAB>genome` presence table of `cds`
pub fn write_presence_table(dir: &Path, cds: &[TestCds]) -> (PathBuf, PathBuf) {
    let fasta = dir.join("cds.fasta");
    let presence = dir.join("presence.tsv");
    let mut fasta_file = fs::File::create(&fasta).expect("create fasta");
    let mut presence_file = fs::File::create(&presence).expect("create presence table");
    for entry in cds {
        write!(fasta_file, "{}", entry.to_fasta()).expect("write fasta");
        for genome in &entry.genomes {
            writeln!(presence_file, "{}\t{}", entry.id, genome).expect("write presence");
        }
    }
    (fasta, presence)
}
