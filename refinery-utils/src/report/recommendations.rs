//! `recommendations.tsv` and `related_matches.tsv`

use super::{csv_error, tsv_writer, write_raw_line};
use refinery_bio::relationship::{RelatedRow, Resolution};
use refinery_core::RefineryResult;
use std::io::Write;

const GROUP_SEPARATOR: &str = "#";

/// One row per category per group, ids comma-joined, `#` after each group
pub fn write_recommendations<W: Write>(writer: W, resolution: &Resolution) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record(["Recommendation", "IDs"]).map_err(csv_error)?;

    for group in &resolution.groups {
        for recommendation in &group.recommendations {
            let ids: Vec<String> = recommendation.ids.iter().map(|id| id.to_string()).collect();
            out.write_record([recommendation.category.to_string(), ids.join(",")])
                .map_err(csv_error)?;
        }
        write_raw_line(&mut out, GROUP_SEPARATOR)?;
    }
    out.flush()?;
    Ok(())
}

fn related_record(row: &RelatedRow) -> [String; 10] {
    let (inverse_class, inverse_count) = match &row.inverse {
        Some((class, fraction)) => (class.to_string(), fraction.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    [
        format!("{}{}", row.query, row.query_status.marker()),
        format!("{}{}", row.subject, row.subject_status.marker()),
        row.class.to_string(),
        row.class_count.to_string(),
        inverse_class,
        inverse_count,
        row.query_frequency.to_string(),
        row.subject_frequency.to_string(),
        row.query_members.to_string(),
        row.subject_members.to_string(),
    ]
}

/// Related pairs of every group; drop-marked sides carry a `*`
pub fn write_related_matches<W: Write>(writer: W, resolution: &Resolution) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record([
        "Query",
        "Subject",
        "Class",
        "Class_count",
        "Inverse_class",
        "Inverse_class_count",
        "Frequency_in_genomes_query",
        "Frequency_in_genomes_subject",
        "Alleles_used_to_blast_count",
        "Alleles_blasted_against_count",
    ])
    .map_err(csv_error)?;

    for group in &resolution.groups {
        for row in &group.related {
            out.write_record(related_record(row)).map_err(csv_error)?;
        }
        write_raw_line(&mut out, GROUP_SEPARATOR)?;
    }
    out.flush()?;
    Ok(())
}
