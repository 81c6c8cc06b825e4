//! Readers for the tab-separated input tables
//!
//! All tables are headerless; `#` lines and blank lines are skipped. Errors
//! name the file and the 1-based line.

use anyhow::Result;
use indexmap::IndexMap;
use refinery_bio::alignment::{PairScores, SelfScores};
use refinery_core::{ClusterId, RefineryError};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

fn table_error(path: &Path, err: csv::Error) -> RefineryError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => RefineryError::Io(e),
        other => RefineryError::Parse(format!("{}: {:?}", path.display(), other)),
    }
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_path(path)
        .map_err(|e| table_error(path, e))?;
    Ok(reader)
}

/// Visit every row that has at least `columns` fields
fn for_each_row<F>(path: &Path, columns: usize, mut visit: F) -> Result<()>
where
    F: FnMut(&csv::StringRecord, u64) -> Result<()>,
{
    let mut reader = reader(path)?;
    for row in reader.records() {
        let row = row.map_err(|e| table_error(path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if row.len() < columns {
            return Err(RefineryError::Parse(format!(
                "{}:{}: expected {} columns, found {}",
                path.display(),
                line,
                columns,
                row.len()
            ))
            .into());
        }
        visit(&row, line)?;
    }
    Ok(())
}

fn number<T: FromStr>(row: &csv::StringRecord, index: usize, path: &Path, line: u64) -> Result<T> {
    let raw = row.get(index).unwrap_or_default().trim();
    raw.parse().map_err(|_| {
        RefineryError::Parse(format!("{}:{}: invalid number '{}'", path.display(), line, raw)).into()
    })
}

fn text(row: &csv::StringRecord, index: usize) -> String {
    row.get(index).unwrap_or_default().trim().to_string()
}

/// `id<TAB>score`; repeated ids keep the highest score
pub fn read_self_scores(path: &Path) -> Result<SelfScores> {
    let mut scores = SelfScores::new();
    for_each_row(path, 2, |row, line| {
        let score: f64 = number(row, 1, path, line)?;
        let entry = scores.entry(text(row, 0)).or_insert(score);
        if score > *entry {
            *entry = score;
        }
        Ok(())
    })?;
    Ok(scores)
}

/// `id<TAB>frequency`
pub fn read_frequencies(path: &Path) -> Result<IndexMap<String, u32>> {
    let mut frequencies = IndexMap::new();
    for_each_row(path, 2, |row, line| {
        frequencies.insert(text(row, 0), number(row, 1, path, line)?);
        Ok(())
    })?;
    Ok(frequencies)
}

/// `query<TAB>subject<TAB>score`
pub fn read_pair_scores(path: &Path) -> Result<PairScores> {
    let mut scores = PairScores::new();
    for_each_row(path, 3, |row, line| {
        let score: f64 = number(row, 2, path, line)?;
        scores.insert(&text(row, 0), &text(row, 1), score);
        Ok(())
    })?;
    Ok(scores)
}

/// `cluster<TAB>member`, members in file order
pub fn read_clusters(path: &Path) -> Result<IndexMap<ClusterId, Vec<String>>> {
    let mut clusters: IndexMap<ClusterId, Vec<String>> = IndexMap::new();
    for_each_row(path, 2, |row, _| {
        let cluster = ClusterId::new(text(row, 0));
        let member = text(row, 1);
        let members = clusters.entry(cluster.clone()).or_default();
        // The representative always leads its cluster
        if member == cluster.as_str() {
            members.retain(|m| m != &member);
            members.insert(0, member);
        } else if !members.contains(&member) {
            members.push(member);
        }
        Ok(())
    })?;
    Ok(clusters)
}

/// `id<TAB>genome`, one row per occurrence
pub fn read_presence(path: &Path) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();
    for_each_row(path, 2, |row, _| {
        rows.push((text(row, 0), text(row, 1)));
        Ok(())
    })?;
    Ok(rows)
}

/// Identifier with `_` replaced, since `_` separates cluster and member index
pub fn sanitize_id(id: &str) -> String {
    id.replace('_', "-")
}

/// Map every original id to its sanitized form, rejecting collisions
pub fn sanitize_ids<'a, I>(ids: I) -> Result<HashMap<String, String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut mapping = HashMap::new();
    let mut taken: HashMap<String, String> = HashMap::new();
    for id in ids {
        let clean = sanitize_id(id);
        if let Some(previous) = taken.get(&clean) {
            if previous != id {
                return Err(RefineryError::InvalidInput(format!(
                    "identifiers '{}' and '{}' collide after replacing '_' with '-'",
                    previous, id
                ))
                .into());
            }
        }
        taken.insert(clean.clone(), id.to_string());
        mapping.insert(id.to_string(), clean);
    }
    Ok(mapping)
}
