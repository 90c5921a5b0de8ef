//! Conversion of grouped transcripts into NCBI feature tables.

pub mod convert;
pub mod frame;
pub mod tables;
pub mod writer;
