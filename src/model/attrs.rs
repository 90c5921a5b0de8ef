//! Biological classification attributes of transcripts.
//!
//! The attribute table is a TSV file with header.  The following columns are used, all
//! others are ignored.
//!
//! - `transcript_id` -- key, matches the genePred transcript name
//! - `gene_biotype`
//! - `transcript_biotype`
//! - `source_gene` -- nullable, identifier of the gene the transcript was projected from
//! - `source_gene_common_name` -- nullable display name of the source gene
//! - `transcript_modes` -- label(s) of the method(s) that predicted the transcript

use std::{io::Read, path::Path};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::io::std::open_read_maybe_gz;
use crate::error::Error;

/// Attributes of one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Transcript identifier.
    pub transcript_id: String,
    /// Biotype of the gene.
    pub gene_biotype: String,
    /// Biotype of the transcript.
    pub transcript_biotype: String,
    /// Identifier of the source gene, if any.
    #[serde(with = "nullable")]
    pub source_gene: Option<String>,
    /// Display name of the source gene, if any.
    #[serde(with = "nullable")]
    pub source_gene_common_name: Option<String>,
    /// Prediction method label(s).
    #[serde(with = "nullable", default)]
    pub transcript_modes: Option<String>,
}

/// Attribute records by transcript identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeTable {
    records: IndexMap<String, AttributeRecord>,
}

impl AttributeTable {
    /// Read attribute table in TSV format from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, anyhow::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .has_headers(true)
            .from_reader(reader);
        let mut records = IndexMap::new();
        for (idx, result) in rdr.deserialize().enumerate() {
            let record: AttributeRecord =
                result.with_context(|| format!("problem parsing attribute row {}", idx + 1))?;
            if let Some(previous) = records.insert(record.transcript_id.clone(), record) {
                tracing::warn!(
                    "duplicate attributes for transcript {}, keeping the last one",
                    previous.transcript_id
                );
            }
        }
        Ok(Self { records })
    }

    /// Load attribute table from `path`, may be gzip-compressed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let reader = open_read_maybe_gz(path.as_ref())
            .with_context(|| format!("could not open {}", path.as_ref().display()))?;
        Self::from_reader(reader)
            .with_context(|| format!("could not read attributes from {}", path.as_ref().display()))
    }

    /// Look up the attributes of transcript `transcript_id`.
    pub fn get(&self, transcript_id: &str) -> Result<&AttributeRecord, Error> {
        self.records
            .get(transcript_id)
            .ok_or_else(|| Error::MissingAttribute {
                transcript_id: transcript_id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<AttributeRecord> for AttributeTable {
    fn from_iter<T: IntoIterator<Item = AttributeRecord>>(iter: T) -> Self {
        Self {
            records: iter
                .into_iter()
                .map(|record| (record.transcript_id.clone(), record))
                .collect(),
        }
    }
}

/// Helper for `Option<String>` columns where empty values and the usual dataframe
/// spellings of missing values encode `None`.
///
/// cf. https://github.com/serde-rs/serde/issues/1316#issue-332908452
mod nullable {
    use serde::{Deserialize, Deserializer, Serializer};

    const NULL_VALUES: &[&str] = &["", "nan", "NaN", "None", "NA"];

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(s) => serializer.collect_str(s),
            None => serializer.collect_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if NULL_VALUES.contains(&s.trim()) {
            Ok(None)
        } else {
            Ok(Some(s))
        }
    }
}
