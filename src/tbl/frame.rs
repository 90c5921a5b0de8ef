//! Normalization of exon reading frames into contiguous CDS regions.
//!
//! The comparative annotation pipeline projects transcripts through whole genome alignments.
//! Indels in the target assembly then show up as exons whose annotated frame does not
//! continue the frame of the previous coding exon.  Such breaks are repaired by inserting
//! a filler gap of one or two bases at the start of the affected coding block.

use itertools::Either;

use crate::error::Error;
use crate::model::interval::{Interval, Strand};
use crate::model::transcript::Transcript;

/// Coding blocks and frame-restoring gaps of one transcript.
///
/// Both lists are in transcription order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CdsLayout {
    /// Absolute genomic `(start, stop)` of each coding block, half-open.
    pub regions: Vec<(u64, u64)>,
    /// Inserted gaps, length 1 or 2.
    pub gaps: Vec<Interval>,
}

/// Returns the number of bases that `actual` must be advanced by to reach `expected`.
///
/// Both frames are interpreted modulo 3, so that `-1` behaves like `2`.
pub fn frame_shift(actual: i64, expected: i64) -> u64 {
    (expected - actual).rem_euclid(3) as u64
}

/// Compute CDS regions and gaps from exons, their frames, and the coding interval.
///
/// `exons` and `frames` are given in ascending genomic order and are traversed in
/// transcription order according to `strand`.
pub fn normalize(
    exons: &[Interval],
    frames: &[i8],
    cds: &Interval,
    strand: Strand,
) -> Result<CdsLayout, Error> {
    let pairs = exons.iter().zip(frames.iter());
    let ordered = match strand {
        Strand::Plus => Either::Left(pairs),
        Strand::Minus => Either::Right(pairs.rev()),
    };

    let mut result = CdsLayout::default();
    let mut expected_frame: i64 = 0;
    for (exon, frame) in ordered {
        let sub = match exon.intersection(cds)? {
            Some(sub) => sub,
            None => continue,
        };

        let actual_frame = i64::from(*frame);
        let mut start = sub.start;
        if actual_frame != expected_frame {
            let amt = frame_shift(actual_frame, expected_frame);
            if amt > 0 {
                result.gaps.push(Interval::new(
                    sub.chrom.as_str(),
                    sub.start,
                    sub.start + amt,
                    strand,
                )?);
                start = std::cmp::min(sub.start + amt, sub.stop);
            }
        }
        // From here on, the block starts in the expected frame.
        let len = sub.stop - start;
        if len > 0 {
            result.regions.push((start, sub.stop));
        }
        expected_frame = (expected_frame + len as i64).rem_euclid(3);
    }

    Ok(result)
}

/// Compute CDS regions and gaps of `tx`.
pub fn normalize_transcript(tx: &Transcript) -> Result<CdsLayout, Error> {
    normalize(tx.exons(), tx.exon_frames(), tx.cds(), tx.strand())
}
