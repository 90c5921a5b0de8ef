//! Data model of transcripts and their attributes.

pub mod attrs;
pub mod genepred;
pub mod index;
pub mod interval;
pub mod transcript;
