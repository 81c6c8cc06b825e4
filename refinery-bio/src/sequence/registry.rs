//! Owner of every per-sequence fact
//!
//! The registry is the single place where sequences are added, renamed or
//! removed. Nucleotide data, translations, genome presence and protein-hash
//! groups are all keyed by identifier here, so a rename moves every fact at once.

use super::translate::{translate_cds, GeneticCode, TranslationError};
use super::types::Sequence;
use indexmap::{IndexMap, IndexSet};
use refinery_core::{RefineryError, RefineryResult};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// SHA-256 of a protein sequence, hex encoded
pub fn protein_hash(protein: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(protein.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEntry {
    pub nucleotide: Vec<u8>,
    pub protein: Option<String>,
    /// Genomes containing an identical copy, one element per occurrence
    pub genomes: Vec<String>,
}

impl SequenceEntry {
    /// Number of distinct genomes containing the sequence
    pub fn frequency(&self) -> u32 {
        self.genomes.iter().collect::<IndexSet<_>>().len() as u32
    }

    pub fn length(&self) -> usize {
        self.nucleotide.len()
    }

    pub fn protein_length(&self) -> usize {
        self.protein.as_ref().map(|p| p.len()).unwrap_or(0)
    }
}

/// Sequences in insertion order plus their protein-hash groups
#[derive(Debug, Default, Clone)]
pub struct SequenceRegistry {
    entries: IndexMap<String, SequenceEntry>,
    protein_groups: IndexMap<String, Vec<String>>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sequences(sequences: Vec<Sequence>) -> RefineryResult<Self> {
        let mut registry = Self::new();
        for sequence in sequences {
            registry.insert(sequence)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, sequence: Sequence) -> RefineryResult<()> {
        if self.entries.contains_key(&sequence.id) {
            return Err(RefineryError::InvalidInput(format!(
                "Duplicate sequence identifier: {}",
                sequence.id
            )));
        }
        self.entries.insert(
            sequence.id,
            SequenceEntry {
                nucleotide: sequence.sequence,
                protein: None,
                genomes: Vec::new(),
            },
        );
        Ok(())
    }

    /// Record that `genome` contains a copy of sequence `id`
    pub fn add_presence(&mut self, id: &str, genome: &str) -> RefineryResult<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RefineryError::NotFound(format!("Sequence not found: {}", id)))?;
        entry.genomes.push(genome.to_string());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&SequenceEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SequenceEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Distinct genome count for `id`, 0 when unknown
    pub fn frequency(&self, id: &str) -> u32 {
        self.entries.get(id).map(|e| e.frequency()).unwrap_or(0)
    }

    /// Number of distinct genomes across the whole registry
    pub fn genome_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|e| e.genomes.iter())
            .collect::<IndexSet<_>>()
            .len()
    }

    pub fn protein(&self, id: &str) -> Option<&str> {
        self.entries.get(id).and_then(|e| e.protein.as_deref())
    }

    /// Remove a sequence and every fact attached to it
    pub fn remove(&mut self, id: &str) -> Option<SequenceEntry> {
        let entry = self.entries.shift_remove(id)?;
        if let Some(protein) = &entry.protein {
            let hash = protein_hash(protein);
            if let Some(group) = self.protein_groups.get_mut(&hash) {
                group.retain(|member| member != id);
                if group.is_empty() {
                    self.protein_groups.shift_remove(&hash);
                }
            }
        }
        Some(entry)
    }

    /// Rename a sequence, keeping its position and protein-hash group slot.
    ///
    /// Fails without touching anything if `old` is unknown or `new` is taken.
    pub fn rename(&mut self, old: &str, new: &str) -> RefineryResult<()> {
        if old == new {
            return Ok(());
        }
        if self.entries.contains_key(new) {
            return Err(RefineryError::InvalidInput(format!(
                "Cannot rename {} to {}: identifier already in use",
                old, new
            )));
        }
        let (index, _, entry) = self
            .entries
            .shift_remove_full(old)
            .ok_or_else(|| RefineryError::NotFound(format!("Sequence not found: {}", old)))?;

        if let Some(protein) = &entry.protein {
            if let Some(group) = self.protein_groups.get_mut(&protein_hash(protein)) {
                for member in group.iter_mut().filter(|m| m.as_str() == old) {
                    *member = new.to_string();
                }
            }
        }
        self.entries.shift_insert(index, new.to_string(), entry);
        Ok(())
    }

    /// Drop sequences shorter than `min_length` nucleotides, returning their ids
    pub fn filter_by_length(&mut self, min_length: usize) -> Vec<String> {
        let short: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.length() < min_length)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &short {
            self.remove(id);
        }
        debug!("Removed {} sequences shorter than {} bp", short.len(), min_length);
        short
    }

    /// Translate every sequence and group identical proteins.
    ///
    /// Sequences that are not valid coding sequences are removed and returned
    /// together with the reason.
    pub fn translate_all(&mut self, code: GeneticCode) -> Vec<(String, TranslationError)> {
        let mut failed = Vec::new();
        self.protein_groups.clear();

        for (id, entry) in self.entries.iter_mut() {
            match translate_cds(&entry.nucleotide, code) {
                Ok(protein) => {
                    self.protein_groups
                        .entry(protein_hash(&protein))
                        .or_default()
                        .push(id.clone());
                    entry.protein = Some(protein);
                }
                Err(e) => failed.push((id.clone(), e)),
            }
        }

        for (id, reason) in &failed {
            warn!("Skipping {}: {}", id, reason);
            self.entries.shift_remove(id);
        }
        failed
    }

    /// One `(id, protein)` per distinct protein, the first id of each hash group
    pub fn distinct_proteins(&self) -> Vec<(String, String)> {
        self.protein_groups
            .values()
            .filter_map(|group| {
                let first = group.first()?;
                let protein = self.protein(first)?;
                Some((first.clone(), protein.to_string()))
            })
            .collect()
    }

    /// Identifiers sharing `id`'s protein, excluding `id` itself
    pub fn protein_duplicates(&self, id: &str) -> Vec<String> {
        self.protein(id)
            .and_then(|protein| self.protein_groups.get(&protein_hash(protein)))
            .map(|group| group.iter().filter(|m| m.as_str() != id).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of distinct protein hashes
    pub fn distinct_protein_count(&self) -> usize {
        self.protein_groups.len()
    }
}
