//! Static classification tables for biotypes.
//!
//! Three mappings drive the qualifier selection: transcript biotype to the feature key of
//! non-coding transcripts, transcript biotype to the `ncRNA_class` value, and gene biotype
//! to the `pseudogene` qualifier value.  The built-in tables follow the GENCODE biotype
//! vocabulary and can be replaced by a YAML file with the same layout as the output of
//! `cat2tbl dump-tables`.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::io::std::open_read_maybe_gz;

/// Feature keys of non-coding transcripts.
const FEATURE_TYPES: &[(&str, &str)] = &[
    ("protein_coding", "misc_RNA"),
    ("nonsense_mediated_decay", "misc_RNA"),
    ("non_stop_decay", "misc_RNA"),
    ("retained_intron", "misc_RNA"),
    ("processed_transcript", "misc_RNA"),
    ("protein_coding_CDS_not_defined", "misc_RNA"),
    ("unknown_likely_coding", "misc_RNA"),
    ("TEC", "misc_RNA"),
    ("misc_RNA", "misc_RNA"),
    ("lincRNA", "ncRNA"),
    ("lncRNA", "ncRNA"),
    ("antisense", "ncRNA"),
    ("antisense_RNA", "ncRNA"),
    ("sense_intronic", "ncRNA"),
    ("sense_overlapping", "ncRNA"),
    ("3prime_overlapping_ncRNA", "ncRNA"),
    ("bidirectional_promoter_lncRNA", "ncRNA"),
    ("macro_lncRNA", "ncRNA"),
    ("non_coding", "ncRNA"),
    ("miRNA", "ncRNA"),
    ("piRNA", "ncRNA"),
    ("siRNA", "ncRNA"),
    ("snRNA", "ncRNA"),
    ("snoRNA", "ncRNA"),
    ("scaRNA", "ncRNA"),
    ("scRNA", "ncRNA"),
    ("sRNA", "ncRNA"),
    ("ribozyme", "ncRNA"),
    ("vault_RNA", "ncRNA"),
    ("vaultRNA", "ncRNA"),
    ("Y_RNA", "ncRNA"),
    ("rRNA", "rRNA"),
    ("Mt_rRNA", "rRNA"),
    ("Mt_tRNA", "tRNA"),
    ("IG_C_gene", "misc_RNA"),
    ("IG_D_gene", "misc_RNA"),
    ("IG_J_gene", "misc_RNA"),
    ("IG_LV_gene", "misc_RNA"),
    ("IG_V_gene", "misc_RNA"),
    ("TR_C_gene", "misc_RNA"),
    ("TR_D_gene", "misc_RNA"),
    ("TR_J_gene", "misc_RNA"),
    ("TR_V_gene", "misc_RNA"),
    ("pseudogene", "misc_RNA"),
    ("processed_pseudogene", "misc_RNA"),
    ("unprocessed_pseudogene", "misc_RNA"),
    ("transcribed_processed_pseudogene", "misc_RNA"),
    ("transcribed_unprocessed_pseudogene", "misc_RNA"),
    ("transcribed_unitary_pseudogene", "misc_RNA"),
    ("translated_processed_pseudogene", "misc_RNA"),
    ("translated_unprocessed_pseudogene", "misc_RNA"),
    ("unitary_pseudogene", "misc_RNA"),
    ("polymorphic_pseudogene", "misc_RNA"),
    ("rRNA_pseudogene", "misc_RNA"),
    ("IG_C_pseudogene", "misc_RNA"),
    ("IG_J_pseudogene", "misc_RNA"),
    ("IG_V_pseudogene", "misc_RNA"),
    ("IG_pseudogene", "misc_RNA"),
    ("TR_J_pseudogene", "misc_RNA"),
    ("TR_V_pseudogene", "misc_RNA"),
];

/// `ncRNA_class` values, INSDC controlled vocabulary.
const NCRNA_CLASSES: &[(&str, &str)] = &[
    ("lincRNA", "lncRNA"),
    ("lncRNA", "lncRNA"),
    ("antisense", "antisense_RNA"),
    ("antisense_RNA", "antisense_RNA"),
    ("sense_intronic", "lncRNA"),
    ("sense_overlapping", "lncRNA"),
    ("3prime_overlapping_ncRNA", "lncRNA"),
    ("bidirectional_promoter_lncRNA", "lncRNA"),
    ("macro_lncRNA", "lncRNA"),
    ("non_coding", "other"),
    ("miRNA", "miRNA"),
    ("piRNA", "piRNA"),
    ("siRNA", "siRNA"),
    ("snRNA", "snRNA"),
    ("snoRNA", "snoRNA"),
    ("scaRNA", "snoRNA"),
    ("scRNA", "scRNA"),
    ("sRNA", "other"),
    ("ribozyme", "ribozyme"),
    ("vault_RNA", "vault_RNA"),
    ("vaultRNA", "vault_RNA"),
    ("Y_RNA", "Y_RNA"),
];

/// `pseudogene` qualifier values of pseudogene gene biotypes.
const PSEUDOGENE_CLASSES: &[(&str, &str)] = &[
    ("pseudogene", "unknown"),
    ("processed_pseudogene", "processed"),
    ("unprocessed_pseudogene", "unprocessed"),
    ("transcribed_processed_pseudogene", "processed"),
    ("transcribed_unprocessed_pseudogene", "unprocessed"),
    ("transcribed_unitary_pseudogene", "unknown"),
    ("translated_processed_pseudogene", "processed"),
    ("translated_unprocessed_pseudogene", "unprocessed"),
    ("unitary_pseudogene", "unknown"),
    ("polymorphic_pseudogene", "unknown"),
    ("rRNA_pseudogene", "unknown"),
    ("IG_C_pseudogene", "unknown"),
    ("IG_J_pseudogene", "unknown"),
    ("IG_V_pseudogene", "unknown"),
    ("IG_pseudogene", "unknown"),
    ("TR_J_pseudogene", "unknown"),
    ("TR_V_pseudogene", "unknown"),
];

fn to_map(entries: &[(&str, &str)]) -> IndexMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Immutable biotype classification tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Transcript biotype to feature key for non-coding transcripts.
    pub feature_types: IndexMap<String, String>,
    /// Transcript biotype to `ncRNA_class` value.
    #[serde(default)]
    pub ncrna_classes: IndexMap<String, String>,
    /// Gene biotype to `pseudogene` value.
    #[serde(default)]
    pub pseudogene_classes: IndexMap<String, String>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            feature_types: to_map(FEATURE_TYPES),
            ncrna_classes: to_map(NCRNA_CLASSES),
            pseudogene_classes: to_map(PSEUDOGENE_CLASSES),
        }
    }
}

impl Classification {
    /// Load tables from YAML file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let reader = open_read_maybe_gz(path.as_ref())
            .with_context(|| format!("could not open {}", path.as_ref().display()))?;
        serde_yaml::from_reader(reader).with_context(|| {
            format!(
                "could not parse classification tables from {}",
                path.as_ref().display()
            )
        })
    }

    /// Feature key for a non-coding transcript of the given biotype.
    pub fn feature_type(&self, biotype: &str) -> Option<&str> {
        self.feature_types.get(biotype).map(String::as_str)
    }

    /// `ncRNA_class` value for the given transcript biotype.
    pub fn ncrna_class(&self, biotype: &str) -> Option<&str> {
        self.ncrna_classes.get(biotype).map(String::as_str)
    }

    /// `pseudogene` value for the given gene biotype.
    pub fn pseudogene_class(&self, biotype: &str) -> Option<&str> {
        self.pseudogene_classes.get(biotype).map(String::as_str)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[rstest::rstest]
    #[case("miRNA", Some("ncRNA"), Some("miRNA"))]
    #[case("lincRNA", Some("ncRNA"), Some("lncRNA"))]
    #[case("misc_RNA", Some("misc_RNA"), None)]
    #[case("Mt_tRNA", Some("tRNA"), None)]
    #[case("processed_pseudogene", Some("misc_RNA"), None)]
    #[case("no_such_biotype", None, None)]
    fn transcript_tables(
        #[case] biotype: &str,
        #[case] feature_type: Option<&str>,
        #[case] ncrna_class: Option<&str>,
    ) {
        let tables = Classification::default();

        assert_eq!(tables.feature_type(biotype), feature_type);
        assert_eq!(tables.ncrna_class(biotype), ncrna_class);
    }

    #[rstest::rstest]
    #[case("pseudogene", Some("unknown"))]
    #[case("processed_pseudogene", Some("processed"))]
    #[case("unprocessed_pseudogene", Some("unprocessed"))]
    #[case("protein_coding", None)]
    fn pseudogene_table(#[case] biotype: &str, #[case] expected: Option<&str>) {
        assert_eq!(Classification::default().pseudogene_class(biotype), expected);
    }

    #[test]
    fn ncrna_classes_are_ncrna_features() {
        let tables = Classification::default();

        for biotype in tables.ncrna_classes.keys() {
            assert_eq!(tables.feature_type(biotype), Some("ncRNA"), "{}", biotype);
        }
    }

    #[test]
    fn from_path_yaml() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("tables.yaml");
        std::fs::write(
            &path,
            "feature_types:\n  miRNA: ncRNA\n  weird_RNA: misc_RNA\nncrna_classes:\n  miRNA: miRNA\n",
        )?;

        let tables = Classification::from_path(&path)?;

        assert_eq!(tables.feature_type("weird_RNA"), Some("misc_RNA"));
        assert_eq!(tables.feature_type("lncRNA"), None);
        assert_eq!(tables.ncrna_class("miRNA"), Some("miRNA"));
        assert!(tables.pseudogene_classes.is_empty());

        Ok(())
    }

    #[test]
    fn yaml_dump_is_loadable() -> Result<(), anyhow::Error> {
        let tables = Classification::default();

        let yaml = serde_yaml::to_string(&tables)?;
        let loaded: Classification = serde_yaml::from_str(&yaml)?;

        assert_eq!(loaded, tables);

        Ok(())
    }
}
