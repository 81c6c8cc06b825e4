//! Run totals, printed to the console and saved as `summary.json`

use crate::output::{create_standard_table, format_number, header_cell};
use colored::*;
use comfy_table::Table;
use indexmap::IndexMap;
use refinery_bio::classification::ClassifiedAlignment;
use refinery_bio::relationship::Resolution;
use refinery_core::Class;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_sequences: usize,
    pub dropped_by_size: usize,
    pub untranslatable: usize,
    pub clusters: usize,
    pub dropped_by_frequency: usize,
    pub alignments: usize,
    /// Pairs discarded because the best alignment ran on the opposite strand
    pub inverted_pairs: usize,
    pub class_counts: IndexMap<String, usize>,
    pub groups: usize,
    pub joined: usize,
    pub choice: usize,
    pub keep: usize,
    pub drop: usize,
}

impl RunSummary {
    /// Count classes in priority order, listing every class
    pub fn record_classes(&mut self, classified: &[ClassifiedAlignment]) {
        self.alignments = classified.len();
        self.class_counts = Class::ALL.iter().map(|c| (c.to_string(), 0)).collect();
        for item in classified {
            if let Some(count) = self.class_counts.get_mut(item.class.as_str()) {
                *count += 1;
            }
        }
    }

    pub fn record_resolution(&mut self, resolution: &Resolution) {
        let [joined, choice, keep, drop] = resolution.category_totals();
        self.groups = resolution.groups.len();
        self.joined = joined;
        self.choice = choice;
        self.keep = keep;
        self.drop = drop;
    }

    pub fn table(&self) -> Table {
        let mut table = create_standard_table();
        table.set_header(vec![header_cell("Step"), header_cell("Count")]);
        let rows = [
            ("Input sequences", self.input_sequences),
            ("Dropped by size", self.dropped_by_size),
            ("Not translatable", self.untranslatable),
            ("Clusters", self.clusters),
            ("Dropped by frequency", self.dropped_by_frequency),
            ("Alignments", self.alignments),
            ("Inverted pairs", self.inverted_pairs),
            ("Relationship groups", self.groups),
        ];
        for (label, value) in rows {
            table.add_row(vec![label.to_string(), format_number(value)]);
        }
        for (class, count) in self.class_counts.iter().filter(|(_, n)| **n > 0) {
            table.add_row(vec![format!("Class {}", class), format_number(count)]);
        }
        table
    }

    /// Print the totals table and a one-line verdict
    pub fn print(&self) {
        println!("{}", self.table());
        println!(
            "{} {} joined, {} choice, {} keep, {} drop",
            "Recommendations:".bold(),
            self.joined.to_string().green(),
            self.choice.to_string().yellow(),
            self.keep.to_string().cyan(),
            self.drop.to_string().red()
        );
    }
}
