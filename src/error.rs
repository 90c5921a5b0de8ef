//! Error type of the conversion core.
//!
//! Loading and command line code uses `anyhow`; the model and feature table code returns
//! this typed error so callers can tell the failure kinds apart.

use thiserror::Error;

/// Errors raised while grouping and converting transcripts.
#[derive(Error, Debug)]
pub enum Error {
    /// A transcript has no record in the attribute table.
    #[error("no attributes found for transcript {transcript_id}")]
    MissingAttribute { transcript_id: String },

    /// A biotype is missing from one of the classification tables.
    #[error("biotype {biotype:?} of transcript {transcript_id} is not in the {table} table")]
    UnknownBiotype {
        table: &'static str,
        biotype: String,
        transcript_id: String,
    },

    /// Interval with `start > stop` or intersection across chromosomes.
    #[error("malformed interval: {0}")]
    MalformedInterval(String),

    /// Transcript record with inconsistent structure.
    #[error("invalid transcript {name}: {reason}")]
    InvalidTranscript { name: String, reason: String },

    /// The same gene identity was encountered on two chromosomes.
    #[error("gene {gene_id} found on {first} and {second}")]
    SplitGene {
        gene_id: String,
        first: String,
        second: String,
    },

    /// The output sink could not be written to.
    #[error("problem writing feature table: {0}")]
    OutputWrite(#[from] std::io::Error),

    /// Wraps an error with the gene or transcript that caused it.
    #[error("{what}")]
    Context {
        what: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap `self` with a description of the record being converted.
    pub fn context<S: Into<String>>(self, what: S) -> Self {
        Error::Context {
            what: what.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping all `Context` layers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::OutputWrite(err.into())
    }
}
