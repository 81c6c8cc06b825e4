//! Pairwise alignment percentages

use super::record::AlignmentRecord;
use serde::{Deserialize, Serialize};

/// Round to 4 decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Sort by start and union overlapping intervals.
///
/// Intervals are normalised to (low, high) first.
pub fn merge_intervals(intervals: &[(i64, i64)]) -> Vec<(i64, i64)> {
    let mut sorted: Vec<(i64, i64)> = intervals
        .iter()
        .map(|&(a, b)| if a <= b { (a, b) } else { (b, a) })
        .collect();
    sorted.sort_unstable();

    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(sorted.len());
    for (start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Bases covered by the union of `intervals`
pub fn aligned_length(intervals: &[(i64, i64)]) -> u64 {
    merge_intervals(intervals)
        .iter()
        .map(|(start, end)| (end - start + 1) as u64)
        .sum()
}

/// Minimum and maximum of the query and subject alignment fractions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PalignRange {
    pub min: f64,
    pub max: f64,
}

impl PalignRange {
    pub fn from_fractions(query: f64, subject: f64) -> Self {
        Self {
            min: round4(query.min(subject)),
            max: round4(query.max(subject)),
        }
    }
}

fn fraction(aligned: u64, length: u64) -> f64 {
    if length == 0 {
        0.0
    } else {
        aligned as f64 / length as f64
    }
}

/// Global palign over every record of a pair
pub fn global_palign<'a, I>(records: I, query_length: u64, subject_length: u64) -> PalignRange
where
    I: IntoIterator<Item = &'a AlignmentRecord>,
{
    let (query, subject): (Vec<_>, Vec<_>) = records
        .into_iter()
        .map(|r| (r.query_interval(), r.subject_interval()))
        .unzip();
    PalignRange::from_fractions(
        fraction(aligned_length(&query), query_length),
        fraction(aligned_length(&subject), subject_length),
    )
}

/// Local palign of a single record from its raw coordinates.
///
/// Negative when the subject runs backwards (an inverted alignment).
pub fn local_palign_min(record: &AlignmentRecord) -> f64 {
    let span = |start: i64, end: i64, length: u64| {
        if length == 0 {
            0.0
        } else {
            (end - start + 1) as f64 / length as f64
        }
    };
    round4(
        span(record.query_start, record.query_end, record.query_length).min(span(
            record.subject_start,
            record.subject_end,
            record.subject_length,
        )),
    )
}
