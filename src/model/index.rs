//! Grouping of transcripts by chromosome and gene.

use indexmap::{map::Entry, IndexMap};

use super::attrs::{AttributeRecord, AttributeTable};
use super::transcript::Transcript;
use crate::error::Error;

/// A transcript together with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptData {
    pub transcript: Transcript,
    pub attrs: AttributeRecord,
}

/// Transcripts of one chromosome, by gene identifier in encounter order.
pub type GeneBuckets = IndexMap<String, Vec<TranscriptData>>;

/// Two-level index chromosome -> gene -> transcripts.
///
/// Chromosomes, genes, and transcripts are kept in the order in which they were first
/// inserted.  A gene identifier may only occur on one chromosome.
#[derive(Debug, Clone, Default)]
pub struct GroupingIndex {
    chroms: IndexMap<String, GeneBuckets>,
    /// Chromosome of each gene seen so far.
    gene_chrom: IndexMap<String, String>,
}

impl GroupingIndex {
    /// Build index from transcripts in file order, looking up their attributes.
    pub fn build<I>(transcripts: I, attrs: &AttributeTable) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Transcript>,
    {
        let mut result = Self::default();
        for transcript in transcripts {
            let attrs = attrs.get(transcript.name())?.clone();
            result.push(TranscriptData { transcript, attrs })?;
        }
        Ok(result)
    }

    /// Return the transcript list for `chrom` and `gene_id`, inserting empty buckets on first
    /// reference.
    pub fn bucket_mut(
        &mut self,
        chrom: &str,
        gene_id: &str,
    ) -> Result<&mut Vec<TranscriptData>, Error> {
        match self.gene_chrom.entry(gene_id.to_string()) {
            Entry::Occupied(entry) => {
                if entry.get() != chrom {
                    return Err(Error::SplitGene {
                        gene_id: gene_id.to_string(),
                        first: entry.get().clone(),
                        second: chrom.to_string(),
                    });
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(chrom.to_string());
            }
        }

        Ok(self
            .chroms
            .entry(chrom.to_string())
            .or_default()
            .entry(gene_id.to_string())
            .or_default())
    }

    /// Append `data` to the bucket of its chromosome and gene.
    pub fn push(&mut self, data: TranscriptData) -> Result<(), Error> {
        let chrom = data.transcript.chrom().to_string();
        let gene_id = data.transcript.gene_id().to_string();
        self.bucket_mut(&chrom, &gene_id)?.push(data);
        Ok(())
    }

    /// Iterate over chromosomes and their genes in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneBuckets)> {
        self.chroms.iter().map(|(chrom, genes)| (chrom.as_str(), genes))
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.chroms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }

    /// Number of genes over all chromosomes.
    pub fn gene_count(&self) -> usize {
        self.gene_chrom.len()
    }
}
