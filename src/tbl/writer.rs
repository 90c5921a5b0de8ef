//! Writing of feature tables.
//!
//! Feature tables are tab-separated text files made up of three kinds of rows:
//!
//! - `>Features <sequence>` starts the block of one sequence,
//! - `<start> <stop> <key>` starts a feature, followed by `<start> <stop>` rows for each
//!   further interval of the feature,
//! - `<empty> <empty> <empty> <qualifier> [<value>]` attaches a qualifier to the last feature.
//!
//! Coordinates are 1-based and inclusive; minus strand features are written with start and
//! stop swapped.  A leading `<` or `>` marks an incomplete 5' or 3' end.

use std::cmp::Reverse;
use std::io::Write;

use crate::error::Error;
use crate::model::interval::Strand;

/// Sequential writer of feature table rows.
pub struct FeatureWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> FeatureWriter<W> {
    /// Construct new writer on the given sink.
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(inner);
        Self { writer }
    }

    /// Start the feature block of sequence `name`.
    pub fn start_seq(&mut self, name: &str) -> Result<(), Error> {
        self.writer.write_record([format!(">Features {}", name)])?;
        Ok(())
    }

    /// Write feature with complete ends.
    pub fn write_feature(
        &mut self,
        regions: &[(u64, u64)],
        strand: Strand,
        feature_key: &str,
    ) -> Result<(), Error> {
        self.write_feature_with_ends(regions, strand, feature_key, false, false)
    }

    /// Write feature spanning the half-open, 0-based `regions`.
    ///
    /// The regions may be given in any order, they are written in transcription order.
    /// `start_incomplete` and `end_incomplete` refer to the genomic start and stop of the
    /// feature and are swapped for the minus strand.
    pub fn write_feature_with_ends(
        &mut self,
        regions: &[(u64, u64)],
        strand: Strand,
        feature_key: &str,
        start_incomplete: bool,
        end_incomplete: bool,
    ) -> Result<(), Error> {
        if regions.is_empty() {
            return Err(Error::MalformedInterval(format!(
                "{} feature without any region",
                feature_key
            )));
        }
        if let Some((start, stop)) = regions.iter().find(|(start, stop)| start > stop) {
            return Err(Error::MalformedInterval(format!(
                "{} region {}-{} has start after stop",
                feature_key, start, stop
            )));
        }

        let mut regions = regions.to_vec();
        let (start_incomplete, end_incomplete) = match strand {
            Strand::Plus => {
                regions.sort_by_key(|(start, _)| *start);
                (start_incomplete, end_incomplete)
            }
            Strand::Minus => {
                regions.sort_by_key(|(_, stop)| Reverse(*stop));
                (end_incomplete, start_incomplete)
            }
        };

        let last = regions.len() - 1;
        for (idx, (start, stop)) in regions.into_iter().enumerate() {
            let (mut first_col, mut second_col) = match strand {
                Strand::Plus => ((start + 1).to_string(), stop.to_string()),
                Strand::Minus => (stop.to_string(), (start + 1).to_string()),
            };
            if idx == 0 && start_incomplete {
                first_col.insert(0, '<');
            }
            if idx == last && end_incomplete {
                second_col.insert(0, '>');
            }
            if idx == 0 {
                self.writer
                    .write_record([first_col.as_str(), second_col.as_str(), feature_key])?;
            } else {
                self.writer
                    .write_record([first_col.as_str(), second_col.as_str()])?;
            }
        }

        Ok(())
    }

    /// Write qualifier for the last feature.
    pub fn write_qualifier(&mut self, key: &str, value: Option<&str>) -> Result<(), Error> {
        match value {
            Some(value) => self.writer.write_record(["", "", "", key, value])?,
            None => self.writer.write_record(["", "", "", key])?,
        }
        Ok(())
    }

    /// Flush buffers and return the underlying sink.
    pub fn finish(self) -> Result<W, Error> {
        self.writer
            .into_inner()
            .map_err(|e| Error::OutputWrite(e.into_error()))
    }
}
