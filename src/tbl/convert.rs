//! Conversion of grouped transcripts into feature table rows.

use std::io::Write;

use nom::{
    bytes::complete::tag,
    character::complete::{alpha1, digit1},
    IResult, Parser,
};
use serde::Serialize;

use super::frame::normalize_transcript;
use super::tables::Classification;
use super::writer::FeatureWriter;
use crate::error::Error;
use crate::model::index::{GroupingIndex, TranscriptData};

/// Transcript biotype of novel predictions without a GENCODE counterpart.
pub const NOVEL_BIOTYPE: &str = "unknown_likely_coding";
/// Suffix appended to the namespaced transcript identifier to form the `protein_id`.
pub const PROTEIN_ID_SUFFIX: &str = "_prot";
/// Note on CDS features with inserted gaps.
pub const CDS_GAP_NOTE: &str = "gaps were added to CDS to maintain frame";
/// Note on each inserted gap.
pub const GAP_NOTE: &str =
    "gap inserted to restore frame; may reflect an indel error in the genome assembly";

/// Returns the part of `id` after its last `_`, or `id` itself.
pub fn local_suffix(id: &str) -> &str {
    id.rsplit_once('_').map(|(_, suffix)| suffix).unwrap_or(id)
}

/// The `locus_tag` of a gene.
pub fn locus_tag(prefix: &str, gene_id: &str) -> String {
    format!("{}_{}", prefix, local_suffix(gene_id))
}

/// The namespaced `transcript_id` of a transcript.
pub fn namespaced_id(prefix: &str, transcript_name: &str) -> String {
    format!("gnl|{}|{}", prefix, local_suffix(transcript_name))
}

fn clone_accession(input: &str) -> IResult<&str, (&str, &str, &str, &str)> {
    (alpha1, digit1, tag("."), digit1).parse(input)
}

/// Whether `name` starts with a clone accession such as `AC012345.3`.
pub fn is_clone_accession(name: &str) -> bool {
    clone_accession(name).is_ok()
}

/// Counters over one conversion run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub chroms: usize,
    pub genes: usize,
    pub transcripts: usize,
    pub coding_transcripts: usize,
    pub gaps: usize,
}

/// Writes genes, transcripts, and CDS features of grouped transcripts.
pub struct TblConverter<'a, W: Write> {
    writer: FeatureWriter<W>,
    tables: &'a Classification,
    prefix: String,
    stats: Stats,
}

impl<'a, W: Write> TblConverter<'a, W> {
    /// Construct converter writing to `writer`, building identifiers with `prefix`.
    pub fn new(writer: FeatureWriter<W>, tables: &'a Classification, prefix: &str) -> Self {
        Self {
            writer,
            tables,
            prefix: prefix.to_string(),
            stats: Stats::default(),
        }
    }

    /// Convert all chromosomes of `index`, in encounter order.
    pub fn convert_index(&mut self, index: &GroupingIndex) -> Result<(), Error> {
        for (chrom, genes) in index.iter() {
            tracing::debug!("writing features of {} ({} genes)", chrom, genes.len());
            self.writer.start_seq(chrom)?;
            self.stats.chroms += 1;
            for (gene_id, txs) in genes {
                self.convert_gene(gene_id, txs)
                    .map_err(|e| e.context(format!("gene {}", gene_id)))?;
            }
        }
        Ok(())
    }

    /// Write gene feature followed by all of its transcripts.
    pub fn convert_gene(&mut self, gene_id: &str, txs: &[TranscriptData]) -> Result<(), Error> {
        let first = match txs.first() {
            Some(first) => first,
            None => {
                tracing::warn!("skipping gene {} without transcripts", gene_id);
                return Ok(());
            }
        };
        let start = txs
            .iter()
            .map(|data| data.transcript.start())
            .min()
            .unwrap_or_default();
        let stop = txs
            .iter()
            .map(|data| data.transcript.stop())
            .max()
            .unwrap_or_default();

        self.writer
            .write_feature(&[(start, stop)], first.transcript.strand(), "gene")?;
        self.writer
            .write_qualifier("locus_tag", Some(&locus_tag(&self.prefix, gene_id)))?;
        if let Some(class) = self.tables.pseudogene_class(&first.attrs.gene_biotype) {
            self.writer.write_qualifier("pseudogene", Some(class))?;
        }
        self.stats.genes += 1;

        for data in txs {
            self.convert_transcript(data)
                .map_err(|e| e.context(format!("transcript {}", data.transcript.name())))?;
        }
        Ok(())
    }

    /// The `product` qualifier value, present only for transcripts with a source gene.
    fn product(&self, data: &TranscriptData) -> Option<String> {
        data.attrs.source_gene.as_ref()?;
        match data.attrs.source_gene_common_name.as_deref() {
            Some(name) if !is_clone_accession(name) => Some(name.to_string()),
            _ => Some(namespaced_id(&self.prefix, data.transcript.name())),
        }
    }

    /// Write transcript feature and, for coding transcripts, its CDS.
    pub fn convert_transcript(&mut self, data: &TranscriptData) -> Result<(), Error> {
        let tx = &data.transcript;
        let biotype = data.attrs.transcript_biotype.as_str();
        let is_coding = tx.is_coding();

        let feature_type = if is_coding {
            "mRNA"
        } else {
            self.tables
                .feature_type(biotype)
                .ok_or_else(|| Error::UnknownBiotype {
                    table: "feature type",
                    biotype: biotype.to_string(),
                    transcript_id: tx.name().to_string(),
                })?
        };

        let exons = tx
            .exons()
            .iter()
            .map(|exon| (exon.start, exon.stop))
            .collect::<Vec<_>>();
        let tx_id = namespaced_id(&self.prefix, tx.name());
        self.writer
            .write_feature(&exons, tx.strand(), feature_type)?;
        self.writer.write_qualifier("transcript_id", Some(&tx_id))?;
        if !is_coding {
            if let Some(class) = self.tables.ncrna_class(biotype) {
                self.writer.write_qualifier("ncRNA_class", Some(class))?;
            }
        }
        let product = self.product(data);
        if let Some(product) = &product {
            self.writer.write_qualifier("product", Some(product))?;
        }
        let note = if biotype != NOVEL_BIOTYPE {
            format!("GENCODE_biotype|{}", biotype)
        } else {
            format!(
                "novel_prediction|{}",
                data.attrs.transcript_modes.as_deref().unwrap_or_default()
            )
        };
        self.writer.write_qualifier("note", Some(&note))?;
        self.stats.transcripts += 1;

        let (cds_regions, gaps) = if is_coding {
            self.convert_cds(data, &tx_id, product.as_deref())?
        } else {
            (0, 0)
        };

        tracing::debug!(
            "{} ({}): {}, {} CDS regions, {} gaps",
            tx.name(),
            biotype,
            feature_type,
            cds_regions,
            gaps
        );
        Ok(())
    }

    /// Write CDS feature and its gaps, returns the number of coding blocks and gaps.
    ///
    /// If the frame gaps consume all coding blocks, no CDS is written.
    fn convert_cds(
        &mut self,
        data: &TranscriptData,
        tx_id: &str,
        product: Option<&str>,
    ) -> Result<(usize, usize), Error> {
        let tx = &data.transcript;
        let layout = normalize_transcript(tx)?;
        if layout.regions.is_empty() {
            tracing::warn!(
                "skipping CDS of {}: no coding bases left after {} frame gaps",
                tx.name(),
                layout.gaps.len()
            );
            return Ok((0, 0));
        }

        self.writer.write_feature_with_ends(
            &layout.regions,
            tx.strand(),
            "CDS",
            tx.cds_start_stat().is_incomplete(),
            tx.cds_end_stat().is_incomplete(),
        )?;
        if let Some(product) = product {
            self.writer.write_qualifier("product", Some(product))?;
        }
        self.writer.write_qualifier(
            "protein_id",
            Some(&format!("{}{}", tx_id, PROTEIN_ID_SUFFIX)),
        )?;
        self.writer.write_qualifier("transcript_id", Some(tx_id))?;

        if !layout.gaps.is_empty() {
            self.writer.write_qualifier("note", Some(CDS_GAP_NOTE))?;
            for gap in &layout.gaps {
                self.writer
                    .write_feature(&[(gap.start, gap.stop)], gap.strand, "misc_feature")?;
                self.writer.write_qualifier("note", Some(GAP_NOTE))?;
            }
        }
        self.stats.coding_transcripts += 1;
        self.stats.gaps += layout.gaps.len();

        Ok((layout.regions.len(), layout.gaps.len()))
    }

    /// Flush output and return sink and statistics.
    pub fn finish(self) -> Result<(W, Stats), Error> {
        Ok((self.writer.finish()?, self.stats))
    }
}

/// Write the feature table of all transcripts in `index` to `sink`.
pub fn write_tbl<W: Write>(
    index: &GroupingIndex,
    tables: &Classification,
    prefix: &str,
    sink: W,
) -> Result<(W, Stats), Error> {
    let mut converter = TblConverter::new(FeatureWriter::new(sink), tables, prefix);
    converter.convert_index(index)?;
    converter.finish()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::attrs::{test::record, AttributeRecord, AttributeTable};
    use crate::model::interval::Strand;
    use crate::model::transcript::{test::transcript, Transcript};

    const PREFIX: &str = "PFX";

    fn data(transcript: Transcript, attrs: AttributeRecord) -> TranscriptData {
        TranscriptData { transcript, attrs }
    }

    /// Convert `txs` with the default tables and return the output lines.
    fn convert(txs: Vec<TranscriptData>) -> Result<(Vec<String>, Stats), Error> {
        let tables = Classification::default();
        let attrs = txs
            .iter()
            .map(|d| d.attrs.clone())
            .collect::<AttributeTable>();
        let index = GroupingIndex::build(txs.into_iter().map(|d| d.transcript), &attrs)?;

        let (buf, stats) = write_tbl(&index, &tables, PREFIX, Vec::new())?;

        Ok((
            String::from_utf8_lossy(&buf)
                .lines()
                .map(String::from)
                .collect(),
            stats,
        ))
    }

    #[rstest::rstest]
    #[case("Mus_caroli_G0001234", "G0001234")]
    #[case("G0001234", "G0001234")]
    #[case("CAT_T0000001.1", "T0000001.1")]
    fn local_suffix_values(#[case] id: &str, #[case] expected: &str) {
        assert_eq!(local_suffix(id), expected);
    }

    #[test]
    fn identifiers() {
        assert_eq!(locus_tag(PREFIX, "Mc_G0001"), "PFX_G0001");
        assert_eq!(namespaced_id(PREFIX, "Mc_T0001"), "gnl|PFX|T0001");
    }

    #[rstest::rstest]
    #[case("AC012345.3", true)]
    #[case("AL627309.1", true)]
    #[case("AC012345.3-AS1", true)]
    #[case("BRCA1", false)]
    #[case("RP11-34P13.3", false)]
    #[case("AC012345", false)]
    #[case("012345.3", false)]
    #[case("", false)]
    fn clone_accession_pattern(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_clone_accession(name), expected);
    }

    #[test]
    fn mirna_end_to_end() -> Result<(), anyhow::Error> {
        let (lines, stats) = convert(vec![data(
            transcript("T1", "G", Strand::Plus, &[(99, 180, -1)], (180, 180)),
            record("T1", "miRNA", None, None),
        )])?;

        assert_eq!(
            lines,
            vec![
                ">Features chr1",
                "100\t180\tgene",
                "\t\t\tlocus_tag\tPFX_G",
                "100\t180\tncRNA",
                "\t\t\ttranscript_id\tgnl|PFX|T1",
                "\t\t\tncRNA_class\tmiRNA",
                "\t\t\tnote\tGENCODE_biotype|miRNA",
            ]
        );
        assert_eq!(
            stats,
            Stats {
                chroms: 1,
                genes: 1,
                transcripts: 1,
                coding_transcripts: 0,
                gaps: 0,
            }
        );

        Ok(())
    }

    #[test]
    fn minus_strand_coding_with_gap() -> Result<(), anyhow::Error> {
        let (lines, stats) = convert(vec![data(
            transcript(
                "Mc_T1",
                "Mc_G1",
                Strand::Minus,
                &[(100, 130, 1), (500, 520, 0)],
                (100, 520),
            ),
            record("Mc_T1", "protein_coding", Some("ENSG01"), Some("BRCA1")),
        )])?;

        assert_eq!(
            lines,
            vec![
                ">Features chr1",
                "520\t101\tgene",
                "\t\t\tlocus_tag\tPFX_G1",
                "520\t501\tmRNA",
                "130\t101",
                "\t\t\ttranscript_id\tgnl|PFX|T1",
                "\t\t\tproduct\tBRCA1",
                "\t\t\tnote\tGENCODE_biotype|protein_coding",
                "520\t501\tCDS",
                "130\t102",
                "\t\t\tproduct\tBRCA1",
                "\t\t\tprotein_id\tgnl|PFX|T1_prot",
                "\t\t\ttranscript_id\tgnl|PFX|T1",
                "\t\t\tnote\tgaps were added to CDS to maintain frame",
                "101\t101\tmisc_feature",
                "\t\t\tnote\tgap inserted to restore frame; may reflect an indel error in the genome assembly",
            ]
        );
        assert_eq!(stats.coding_transcripts, 1);
        assert_eq!(stats.gaps, 1);

        Ok(())
    }

    #[test]
    fn incomplete_cds_plus() -> Result<(), anyhow::Error> {
        let tx = crate::model::transcript::TranscriptBuilder::default()
            .name("T1")
            .gene_id("G1")
            .chrom("chr1")
            .strand(Strand::Plus)
            .exons(vec![
                crate::model::interval::Interval::new("chr1", 0, 30, Strand::Plus)?,
                crate::model::interval::Interval::new("chr1", 60, 90, Strand::Plus)?,
            ])
            .cds(crate::model::interval::Interval::new(
                "chr1",
                0,
                90,
                Strand::Plus,
            )?)
            .exon_frames(vec![0, 0])
            .cds_start_stat(crate::model::transcript::CdsStat::Incmpl)
            .cds_end_stat(crate::model::transcript::CdsStat::Cmpl)
            .build()?;

        let (lines, _) = convert(vec![data(
            tx,
            record("T1", "protein_coding", None, None),
        )])?;

        assert_eq!(
            &lines[7..],
            &[
                "<1\t30\tCDS",
                "61\t90",
                "\t\t\tprotein_id\tgnl|PFX|T1_prot",
                "\t\t\ttranscript_id\tgnl|PFX|T1",
            ]
        );

        Ok(())
    }

    #[test]
    fn gene_span_over_all_transcripts() -> Result<(), anyhow::Error> {
        let (lines, _) = convert(vec![
            data(
                transcript("T1", "G1", Strand::Plus, &[(200, 300, -1)], (300, 300)),
                record("T1", "lncRNA", None, None),
            ),
            data(
                transcript("T2", "G1", Strand::Plus, &[(100, 150, -1)], (150, 150)),
                record("T2", "lncRNA", None, None),
            ),
            data(
                transcript(
                    "T3",
                    "G1",
                    Strand::Plus,
                    &[(120, 140, -1), (250, 400, -1)],
                    (400, 400),
                ),
                record("T3", "lncRNA", None, None),
            ),
        ])?;

        assert_eq!(lines[1], "101\t400\tgene");
        assert_eq!(
            lines
                .iter()
                .filter(|line| line.ends_with("\tncRNA"))
                .cloned()
                .collect::<Vec<_>>(),
            vec!["201\t300\tncRNA", "101\t150\tncRNA", "121\t140\tncRNA"]
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("processed_pseudogene", Some("processed"))]
    #[case("pseudogene", Some("unknown"))]
    #[case("lncRNA", None)]
    fn pseudogene_qualifier(
        #[case] biotype: &str,
        #[case] expected: Option<&str>,
    ) -> Result<(), anyhow::Error> {
        let (lines, _) = convert(vec![data(
            transcript("T1", "G1", Strand::Plus, &[(0, 10, -1)], (10, 10)),
            record("T1", biotype, None, None),
        )])?;

        // Qualifier of the gene feature, right after the locus tag.
        assert_eq!(
            lines[3].strip_prefix("\t\t\tpseudogene\t"),
            expected
        );
        assert_eq!(
            lines
                .iter()
                .filter(|line| line.starts_with("\t\t\tpseudogene"))
                .count(),
            usize::from(expected.is_some())
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case(Some("ENSG01"), Some("BRCA1"), Some("BRCA1"))]
    #[case(Some("ENSG01"), Some("AC012345.3"), Some("gnl|PFX|T1"))]
    #[case(Some("ENSG01"), None, Some("gnl|PFX|T1"))]
    #[case(None, Some("BRCA1"), None)]
    fn product_qualifier(
        #[case] source_gene: Option<&str>,
        #[case] common_name: Option<&str>,
        #[case] expected: Option<&str>,
    ) -> Result<(), anyhow::Error> {
        let (lines, _) = convert(vec![data(
            transcript("T1", "G1", Strand::Plus, &[(0, 30, 0)], (0, 30)),
            record("T1", "protein_coding", source_gene, common_name),
        )])?;

        let products = lines
            .iter()
            .filter_map(|line| line.strip_prefix("\t\t\tproduct\t"))
            .collect::<Vec<_>>();
        match expected {
            // once on the mRNA and once on the CDS
            Some(expected) => assert_eq!(products, vec![expected, expected]),
            None => assert!(products.is_empty()),
        }

        Ok(())
    }

    #[test]
    fn cds_consumed_by_gaps_is_skipped() -> Result<(), anyhow::Error> {
        let (lines, stats) = convert(vec![data(
            transcript("T1", "G1", Strand::Plus, &[(100, 101, 2)], (100, 101)),
            record("T1", "protein_coding", None, None),
        )])?;

        assert_eq!(
            lines,
            vec![
                ">Features chr1",
                "101\t101\tgene",
                "\t\t\tlocus_tag\tPFX_G1",
                "101\t101\tmRNA",
                "\t\t\ttranscript_id\tgnl|PFX|T1",
                "\t\t\tnote\tGENCODE_biotype|protein_coding",
            ]
        );
        assert_eq!(stats.transcripts, 1);
        assert_eq!(stats.coding_transcripts, 0);
        assert_eq!(stats.gaps, 0);

        Ok(())
    }

    #[test]
    fn novel_prediction_note() -> Result<(), anyhow::Error> {
        let mut attrs = record("T1", NOVEL_BIOTYPE, None, None);
        attrs.transcript_modes = Some("augPB".into());
        let (lines, _) = convert(vec![data(
            transcript("T1", "G1", Strand::Plus, &[(0, 30, 0)], (0, 30)),
            attrs,
        )])?;

        assert!(lines.contains(&"\t\t\tnote\tnovel_prediction|augPB".to_string()));
        assert!(!lines.iter().any(|line| line.contains("GENCODE_biotype")));

        Ok(())
    }

    #[test]
    fn unknown_biotype_fails() {
        let err = convert(vec![data(
            transcript("T1", "G1", Strand::Plus, &[(0, 10, -1)], (10, 10)),
            record("T1", "no_such_biotype", None, None),
        )])
        .unwrap_err();

        assert!(matches!(
            err.root(),
            Error::UnknownBiotype { biotype, transcript_id, .. }
                if biotype == "no_such_biotype" && transcript_id == "T1"
        ));
        assert_eq!(format!("{}", err), "gene G1");
    }

    #[test]
    fn genes_and_chromosomes_do_not_interleave() -> Result<(), anyhow::Error> {
        let on = |chrom: &str, name: &str, gene_id: &str, start: u64| {
            crate::model::transcript::TranscriptBuilder::default()
                .name(name)
                .gene_id(gene_id)
                .chrom(chrom)
                .strand(Strand::Plus)
                .exons(vec![crate::model::interval::Interval::new(
                    chrom,
                    start,
                    start + 10,
                    Strand::Plus,
                )
                .expect("invalid exon")])
                .cds(
                    crate::model::interval::Interval::new(chrom, start, start, Strand::Plus)
                        .expect("invalid CDS"),
                )
                .exon_frames(vec![-1])
                .build()
                .expect("invalid transcript")
        };
        let (lines, stats) = convert(vec![
            data(on("chr2", "T1", "G1", 0), record("T1", "lncRNA", None, None)),
            data(on("chr1", "T2", "G2", 0), record("T2", "lncRNA", None, None)),
            data(on("chr2", "T3", "G1", 20), record("T3", "lncRNA", None, None)),
        ])?;

        let skeleton = lines
            .iter()
            .filter(|line| !line.starts_with('\t'))
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(
            skeleton,
            vec![
                ">Features chr2",
                "1\t30\tgene",
                "1\t10\tncRNA",
                "21\t30\tncRNA",
                ">Features chr1",
                "1\t10\tgene",
                "1\t10\tncRNA",
            ]
        );
        assert_eq!(stats.chroms, 2);
        assert_eq!(stats.genes, 2);
        assert_eq!(stats.transcripts, 3);

        Ok(())
    }
}
