//! Reader for BLAST+ tabular output in the fixed 12-column layout

use refinery_bio::alignment::AlignmentRecord;
use refinery_core::{RefineryError, RefineryResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Columns requested from the aligner, in order
pub const OUTFMT: &str =
    "6 qseqid sseqid qlen slen qstart qend sstart send length score gaps pident";

const COLUMNS: [&str; 12] = [
    "qseqid", "sseqid", "qlen", "slen", "qstart", "qend", "sstart", "send", "length", "score",
    "gaps", "pident",
];

fn field<T: FromStr>(fields: &[&str], index: usize, source: &str, line: usize) -> RefineryResult<T> {
    fields[index].trim().parse().map_err(|_| {
        RefineryError::Parse(format!(
            "{}:{}: invalid {} value '{}'",
            source, line, COLUMNS[index], fields[index]
        ))
    })
}

/// Parse tabular alignments; `#` comment lines and blank lines are skipped.
///
/// `source` names the input in error messages, which also carry the 1-based
/// line number.
pub fn parse_tabular<R: BufRead>(reader: R, source: &str) -> RefineryResult<Vec<AlignmentRecord>> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != COLUMNS.len() {
            return Err(RefineryError::Parse(format!(
                "{}:{}: expected {} columns, found {}",
                source,
                number,
                COLUMNS.len(),
                fields.len()
            )));
        }

        records.push(AlignmentRecord {
            query_id: fields[0].to_string(),
            subject_id: fields[1].to_string(),
            query_length: field(&fields, 2, source, number)?,
            subject_length: field(&fields, 3, source, number)?,
            query_start: field(&fields, 4, source, number)?,
            query_end: field(&fields, 5, source, number)?,
            subject_start: field(&fields, 6, source, number)?,
            subject_end: field(&fields, 7, source, number)?,
            alignment_length: field(&fields, 8, source, number)?,
            score: field(&fields, 9, source, number)?,
            gaps: field(&fields, 10, source, number)?,
            pident: field(&fields, 11, source, number)?,
        });
    }

    Ok(records)
}

pub fn parse_tabular_file<P: AsRef<Path>>(path: P) -> RefineryResult<Vec<AlignmentRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse_tabular(BufReader::new(file), &path.display().to_string())
}
