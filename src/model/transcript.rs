//! Transcript structures as produced by the comparative annotation pipeline.

use parse_display::{Display, FromStr};

use super::interval::{Interval, Strand};
use crate::error::Error;

/// CDS completeness status of one genomic end of the coding region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, FromStr)]
#[display(style = "lowercase")]
pub enum CdsStat {
    /// Transcript is non-coding.
    #[default]
    #[display("none")]
    NoCds,
    /// Completeness is unknown.
    Unk,
    /// CDS is incomplete at this end.
    Incmpl,
    /// CDS is complete at this end.
    Cmpl,
}

impl CdsStat {
    /// Everything but `cmpl` is reported as incomplete.
    pub fn is_incomplete(&self) -> bool {
        *self != CdsStat::Cmpl
    }
}

/// Immutable transcript model.
///
/// Exons are kept in ascending genomic order regardless of the strand, `exon_frames[i]`
/// is the reading frame of the first coding base of `exons[i]` in transcription direction
/// or `-1` if the exon is not coding.  The CDS status fields refer to the genomic start
/// (left) and stop (right) of the coding region.
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder)]
#[builder(build_fn(private, name = "build_unchecked"))]
pub struct Transcript {
    #[builder(setter(into))]
    name: String,
    #[builder(setter(into))]
    gene_id: String,
    #[builder(setter(into))]
    chrom: String,
    strand: Strand,
    exons: Vec<Interval>,
    /// Coding region, empty for non-coding transcripts.
    cds: Interval,
    exon_frames: Vec<i8>,
    #[builder(default)]
    cds_start_stat: CdsStat,
    #[builder(default)]
    cds_end_stat: CdsStat,
}

impl TranscriptBuilder {
    /// Build the `Transcript`, checking the structure for consistency.
    pub fn build(&self) -> Result<Transcript, Error> {
        let tx = self.build_unchecked().map_err(|e| Error::InvalidTranscript {
            name: self.name.clone().unwrap_or_default(),
            reason: e.to_string(),
        })?;
        tx.validate()?;
        Ok(tx)
    }
}

impl Transcript {
    fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: String| Error::InvalidTranscript {
            name: self.name.clone(),
            reason,
        };

        if self.exons.is_empty() {
            return Err(invalid("transcript has no exons".into()));
        }
        if self.exons.len() != self.exon_frames.len() {
            return Err(invalid(format!(
                "{} exons but {} exon frames",
                self.exons.len(),
                self.exon_frames.len()
            )));
        }
        if let Some(frame) = self.exon_frames.iter().find(|f| !(-1..=2).contains(*f)) {
            return Err(invalid(format!("exon frame {} not in -1..=2", frame)));
        }
        for exon in self.exons.iter().chain(std::iter::once(&self.cds)) {
            if exon.chrom != self.chrom || exon.strand != self.strand {
                return Err(invalid(format!(
                    "interval {} not on {}({})",
                    exon, self.chrom, self.strand
                )));
            }
        }
        for (lhs, rhs) in self.exons.iter().zip(self.exons.iter().skip(1)) {
            if lhs.stop > rhs.start {
                return Err(invalid(format!(
                    "exons {} and {} are unsorted or overlapping",
                    lhs, rhs
                )));
            }
        }
        if !self.cds.is_empty() && (self.cds.start < self.start() || self.cds.stop > self.stop())
        {
            return Err(invalid(format!(
                "CDS {} outside of transcript bounds",
                self.cds
            )));
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn exons(&self) -> &[Interval] {
        &self.exons
    }

    pub fn cds(&self) -> &Interval {
        &self.cds
    }

    pub fn exon_frames(&self) -> &[i8] {
        &self.exon_frames
    }

    pub fn cds_start_stat(&self) -> CdsStat {
        self.cds_start_stat
    }

    pub fn cds_end_stat(&self) -> CdsStat {
        self.cds_end_stat
    }

    /// Genomic start of the first exon.
    pub fn start(&self) -> u64 {
        self.exons.first().map(|e| e.start).unwrap_or_default()
    }

    /// Genomic stop of the last exon.
    pub fn stop(&self) -> u64 {
        self.exons.last().map(|e| e.stop).unwrap_or_default()
    }

    /// Number of coding bases, i.e., the summed length of exons intersected with the CDS.
    pub fn cds_len(&self) -> u64 {
        if self.cds.is_empty() {
            return 0;
        }
        self.exons
            .iter()
            .map(|exon| {
                let start = std::cmp::max(exon.start, self.cds.start);
                let stop = std::cmp::min(exon.stop, self.cds.stop);
                stop.saturating_sub(start)
            })
            .sum()
    }

    pub fn is_coding(&self) -> bool {
        self.cds_len() > 0
    }
}
