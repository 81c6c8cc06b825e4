//! Per-alignment and per-pair match tables

use super::{csv_error, tsv_writer, write_raw_line};
use refinery_bio::alignment::KmerMetric;
use refinery_bio::classification::ClassifiedAlignment;
use refinery_bio::relationship::{ClassProcessing, CountDisplay, KeepResult};
use refinery_core::RefineryResult;
use std::io::Write;

const ALL_MATCHES_HEADER: [&str; 26] = [
    "Query",
    "Subject",
    "Query_cluster",
    "Subject_cluster",
    "Query_length",
    "Subject_length",
    "Query_start",
    "Query_end",
    "Subject_start",
    "Subject_end",
    "Length",
    "Score",
    "Gaps",
    "Pident",
    "Hits",
    "Score_ratio",
    "Kmer_similarity",
    "Kmer_coverage",
    "Frequency_in_genomes_query",
    "Frequency_in_genomes_subject",
    "Global_palign_all_min",
    "Global_palign_all_max",
    "Global_palign_pident_min",
    "Global_palign_pident_max",
    "Local_palign_min",
    "Class",
];

/// One row per enriched alignment with every derived metric and its class
pub fn write_all_matches<W: Write>(writer: W, classified: &[ClassifiedAlignment]) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record(ALL_MATCHES_HEADER).map_err(csv_error)?;

    for item in classified {
        let a = &item.alignment;
        let r = &a.record;
        out.write_record([
            r.query_id.clone(),
            r.subject_id.clone(),
            a.query_cluster.to_string(),
            a.subject_cluster.to_string(),
            r.query_length.to_string(),
            r.subject_length.to_string(),
            r.query_start.to_string(),
            r.query_end.to_string(),
            r.subject_start.to_string(),
            r.subject_end.to_string(),
            r.alignment_length.to_string(),
            r.score.to_string(),
            r.gaps.to_string(),
            r.pident.to_string(),
            a.hit_count.to_string(),
            a.score_ratio.to_string(),
            KmerMetric::display_value(a.kmer.similarity()),
            KmerMetric::display_value(a.kmer.coverage()),
            a.query_frequency.to_string(),
            a.subject_frequency.to_string(),
            a.global_palign_all.min.to_string(),
            a.global_palign_all.max.to_string(),
            a.global_palign_pident.min.to_string(),
            a.global_palign_pident.max.to_string(),
            a.local_palign_min.to_string(),
            item.class.to_string(),
        ])
        .map_err(csv_error)?;
    }
    out.flush()?;
    Ok(())
}

/// Class counts per pair in both orientations, best class first.
///
/// The pair and its frequencies appear on the first class line only; a blank
/// line closes each pair.
pub fn write_count_results<W: Write>(
    writer: W,
    processing: &ClassProcessing,
    keep: &KeepResult,
) -> RefineryResult<()> {
    let mut out = tsv_writer(writer);
    out.write_record([
        "Query",
        "Subject",
        "Class",
        "Class_count",
        "Inverse_class_count",
        "Frequency_in_genomes_query",
        "Frequency_in_genomes_subject",
    ])
    .map_err(csv_error)?;

    for ((query, subject), counts) in &processing.orientation_counts {
        let mut classes: Vec<_> = counts.iter().collect();
        classes.sort_by_key(|(class, _)| **class);

        let forward_total: u32 = classes.iter().filter_map(|(_, c)| c.forward).sum();
        let inverse_total: u32 = classes.iter().filter_map(|(_, c)| c.inverse).sum();

        for (position, (class, count)) in classes.iter().enumerate() {
            let forward = format!("{}/{}", CountDisplay(count.forward), forward_total);
            let inverse = format!("{}/{}", CountDisplay(count.inverse), inverse_total);
            if position == 0 {
                out.write_record([
                    query.to_string(),
                    subject.to_string(),
                    class.to_string(),
                    forward,
                    inverse,
                    keep.frequency(query).to_string(),
                    keep.frequency(subject).to_string(),
                ])
                .map_err(csv_error)?;
            } else {
                out.write_record([String::new(), String::new(), class.to_string(), forward, inverse])
                    .map_err(csv_error)?;
            }
        }
        write_raw_line(&mut out, "")?;
    }
    out.flush()?;
    Ok(())
}
