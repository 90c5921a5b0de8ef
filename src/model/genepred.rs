//! Reading of transcripts from UCSC genePred extended files.
//!
//! The files are headerless TSV files with the following 15 columns
//!
//! 1. Transcript name
//! 2. Chromosome
//! 3. Strand (`+` or `-`)
//! 4. Transcript start (0-based)
//! 5. Transcript end
//! 6. CDS start (0-based, equal to CDS end for non-coding transcripts)
//! 7. CDS end
//! 8. Number of exons
//! 9. Exon starts (comma-separated, trailing comma allowed)
//! 10. Exon ends
//! 11. Score (unused)
//! 12. Gene identifier
//! 13. CDS start status (`none`, `unk`, `incmpl`, `cmpl`)
//! 14. CDS end status
//! 15. Exon frames (comma-separated, `-1` for non-coding exons)

use std::{io::Read, path::Path, str::FromStr};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use super::interval::{Interval, Strand};
use super::transcript::{CdsStat, Transcript, TranscriptBuilder};
use crate::common::io::std::open_read_maybe_gz;

/// One raw line of a genePred extended file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Record {
    name: String,
    chrom: String,
    strand: String,
    tx_start: u64,
    tx_end: u64,
    cds_start: u64,
    cds_end: u64,
    exon_count: usize,
    exon_starts: String,
    exon_ends: String,
    _score: String,
    name2: String,
    cds_start_stat: String,
    cds_end_stat: String,
    exon_frames: String,
}

/// Parse comma-separated list with optional trailing comma.
fn parse_list<T>(value: &str) -> Result<Vec<T>, anyhow::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim()
                .parse::<T>()
                .with_context(|| format!("invalid list entry {:?}", s))
        })
        .collect()
}

impl TryFrom<Record> for Transcript {
    type Error = anyhow::Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let strand = Strand::from_str(&record.strand)
            .map_err(|_| anyhow!("invalid strand {:?}", &record.strand))?;
        let starts = parse_list::<u64>(&record.exon_starts)?;
        let ends = parse_list::<u64>(&record.exon_ends)?;
        let frames = parse_list::<i8>(&record.exon_frames)?;
        if starts.len() != record.exon_count
            || ends.len() != record.exon_count
            || frames.len() != record.exon_count
        {
            anyhow::bail!(
                "exon count {} does not match {} starts, {} ends, and {} frames",
                record.exon_count,
                starts.len(),
                ends.len(),
                frames.len()
            );
        }

        // Keep exons in ascending order together with their frames.
        let mut exons = starts
            .into_iter()
            .zip(ends)
            .zip(frames)
            .map(|((start, stop), frame)| {
                Interval::new(record.chrom.as_str(), start, stop, strand).map(|iv| (iv, frame))
            })
            .collect::<Result<Vec<_>, _>>()?;
        exons.sort_by_key(|(iv, _)| iv.start);
        let (exons, exon_frames): (Vec<_>, Vec<_>) = exons.into_iter().unzip();

        if let (Some(first), Some(last)) = (exons.first(), exons.last()) {
            if first.start != record.tx_start || last.stop != record.tx_end {
                tracing::warn!(
                    "transcript bounds {}-{} of {} differ from exon bounds {}-{}",
                    record.tx_start,
                    record.tx_end,
                    &record.name,
                    first.start,
                    last.stop
                );
            }
        }

        Ok(TranscriptBuilder::default()
            .name(record.name.as_str())
            .gene_id(record.name2.as_str())
            .chrom(record.chrom.as_str())
            .strand(strand)
            .exons(exons)
            .cds(Interval::new(
                record.chrom.as_str(),
                record.cds_start,
                record.cds_end,
                strand,
            )?)
            .exon_frames(exon_frames)
            .cds_start_stat(
                CdsStat::from_str(&record.cds_start_stat)
                    .map_err(|_| anyhow!("invalid cdsStartStat {:?}", &record.cds_start_stat))?,
            )
            .cds_end_stat(
                CdsStat::from_str(&record.cds_end_stat)
                    .map_err(|_| anyhow!("invalid cdsEndStat {:?}", &record.cds_end_stat))?,
            )
            .build()?)
    }
}

/// Read all transcripts from `reader`, in file order.
pub fn read_transcripts<R: Read>(reader: R) -> Result<Vec<Transcript>, anyhow::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(false)
        .from_reader(reader);
    let mut result = Vec::new();
    for (idx, record) in rdr.deserialize::<Record>().enumerate() {
        let record = record.with_context(|| format!("problem parsing genePred line {}", idx + 1))?;
        let name = record.name.clone();
        let tx = Transcript::try_from(record)
            .with_context(|| format!("problem with genePred record {}", name))?;
        result.push(tx);
    }
    Ok(result)
}

/// Load transcripts from the genePred file at `path`, may be gzip-compressed.
pub fn load_transcripts<P: AsRef<Path>>(path: P) -> Result<Vec<Transcript>, anyhow::Error> {
    let reader = open_read_maybe_gz(path.as_ref())
        .with_context(|| format!("could not open {}", path.as_ref().display()))?;
    read_transcripts(reader)
        .with_context(|| format!("could not read transcripts from {}", path.as_ref().display()))
}
