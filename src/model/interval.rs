//! Zero-based, half-open, strand-tagged chromosomal ranges.

use parse_display::{Display, FromStr};

use crate::error::Error;

/// Enumeration for the two strands of the genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr)]
pub enum Strand {
    #[display("+")]
    Plus,
    #[display("-")]
    Minus,
}

/// A range `[start, stop)` on one chromosome strand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{chrom}:{start}-{stop}({strand})")]
pub struct Interval {
    /// Chromosome name.
    pub chrom: String,
    /// 0-based start position.
    pub start: u64,
    /// 0-based, exclusive stop position.
    pub stop: u64,
    /// The strand.
    pub strand: Strand,
}

impl Interval {
    /// Construct interval, failing if `start > stop`.
    pub fn new<S: Into<String>>(
        chrom: S,
        start: u64,
        stop: u64,
        strand: Strand,
    ) -> Result<Self, Error> {
        let chrom = chrom.into();
        if start > stop {
            return Err(Error::MalformedInterval(format!(
                "{}:{}-{} has start after stop",
                chrom, start, stop
            )));
        }
        Ok(Self {
            chrom,
            start,
            stop,
            strand,
        })
    }

    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Intersect with `other`.
    ///
    /// Returns `Ok(None)` if the intervals do not overlap by at least one base and an error
    /// if they are located on different chromosomes.  The strand of `self` is kept.
    pub fn intersection(&self, other: &Interval) -> Result<Option<Interval>, Error> {
        if self.chrom != other.chrom {
            return Err(Error::MalformedInterval(format!(
                "cannot intersect {} with {} on another chromosome",
                self, other
            )));
        }
        let start = std::cmp::max(self.start, other.start);
        let stop = std::cmp::min(self.stop, other.stop);
        if start >= stop {
            Ok(None)
        } else {
            Ok(Some(Interval {
                chrom: self.chrom.clone(),
                start,
                stop,
                strand: self.strand,
            }))
        }
    }
}
