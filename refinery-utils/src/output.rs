//! Console notes and table styling

use colored::*;
use comfy_table::{modifiers, presets, Attribute, Cell, CellAlignment, Table};
use std::fmt::Display;

/// Group the digits of a count in threes: `1234567` becomes `1,234,567`
pub fn format_number<T: Display>(n: T) -> String {
    let text = n.to_string();
    let (sign, digits) = text.split_at(usize::from(text.starts_with('-')));
    let head = digits.len() % 3;

    let mut grouped = String::with_capacity(text.len() + digits.len() / 3);
    grouped.push_str(sign);
    grouped.push_str(&digits[..head]);
    for (i, chunk) in digits.as_bytes()[head..].chunks(3).enumerate() {
        if head > 0 || i > 0 {
            grouped.push(',');
        }
        grouped.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }
    grouped
}

/// Console notes go to stderr so stdout carries only the summary table
pub fn warning(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn info(msg: &str) {
    eprintln!("{} {}", "note:".cyan().bold(), msg);
}

pub fn success(msg: &str) {
    eprintln!("{} {}", "done:".green().bold(), msg);
}

/// Rounded UTF-8 table used by every console report
pub fn create_standard_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .set_alignment(CellAlignment::Center)
        .add_attribute(Attribute::Bold)
}
