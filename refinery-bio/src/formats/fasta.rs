use crate::sequence::Sequence;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use nom::{
    bytes::complete::{tag, take_till, take_till1},
    character::complete::space1,
    combinator::{map, opt, rest},
    sequence::preceded,
    IResult,
};
use refinery_core::{RefineryError, RefineryResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Residues per line when writing
const LINE_WIDTH: usize = 80;

/// Parse a FASTA header line (without the line ending)
fn parse_header(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, _) = tag(">")(input)?;
    let (input, id) = take_till1(|c: char| c.is_whitespace())(input)?;
    let (input, description) = opt(preceded(space1, map(rest, str::trim_end)))(input)?;
    Ok((input, (id, description.filter(|d| !d.is_empty()))))
}

/// Strip everything after the first whitespace of a sequence line
fn sequence_line(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| c.is_whitespace())(input)
}

/// Read FASTA records from any buffered reader
pub fn read_fasta<R: BufRead>(reader: R) -> RefineryResult<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current: Option<Sequence> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('>') {
            if let Some(seq) = current.take() {
                sequences.push(seq);
            }
            let (_, (id, description)) = parse_header(trimmed).map_err(|_| {
                RefineryError::Parse(format!(
                    "line {}: malformed FASTA header '{}'",
                    line_no + 1,
                    trimmed
                ))
            })?;
            let mut seq = Sequence::new(id.to_string(), Vec::new());
            if let Some(desc) = description {
                seq = seq.with_description(desc.to_string());
            }
            current = Some(seq);
        } else {
            let seq = current.as_mut().ok_or_else(|| {
                RefineryError::Parse(format!(
                    "line {}: sequence data before the first header",
                    line_no + 1
                ))
            })?;
            let (_, residues) = sequence_line(trimmed).map_err(|_| {
                RefineryError::Parse(format!("line {}: malformed sequence line", line_no + 1))
            })?;
            seq.sequence
                .extend(residues.bytes().map(|b| b.to_ascii_uppercase()));
        }
    }

    if let Some(seq) = current {
        sequences.push(seq);
    }
    Ok(sequences)
}

/// Parse a FASTA file into sequences (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> RefineryResult<Vec<Sequence>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut buffer = Vec::new();
        decoder.read_to_end(&mut buffer)?;
        read_fasta(&buffer[..])
    } else {
        read_fasta(BufReader::new(file))
    }
}

/// Write sequences to a FASTA file (supports .gz compression)
pub fn write_fasta<P: AsRef<Path>>(path: P, sequences: &[Sequence]) -> RefineryResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = BufWriter::new(encoder);
        write_fasta_to_writer(&mut writer, sequences)?;
        writer
            .into_inner()
            .map_err(|e| RefineryError::Io(e.into_error()))?
            .finish()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_fasta_to_writer(&mut writer, sequences)?;
        writer.flush()?;
    }

    Ok(())
}

pub fn write_fasta_to_writer<W: Write>(writer: &mut W, sequences: &[Sequence]) -> RefineryResult<()> {
    for seq in sequences {
        writeln!(writer, "{}", seq.header())?;
        for chunk in seq.sequence.chunks(LINE_WIDTH) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
