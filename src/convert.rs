//! Conversion of genePred transcripts and attributes into a feature table.

use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use clap::Parser;
use thousands::Separable;

use crate::common::{io::std::open_write_maybe_gz, trace_rss_now};
use crate::model::{attrs::AttributeTable, genepred::load_transcripts, index::GroupingIndex};
use crate::tbl::{convert::write_tbl, tables::Classification};

/// Command line arguments for `convert` sub command.
#[derive(Parser, Debug)]
#[command(about = "Convert annotation to NCBI feature table", long_about = None)]
pub struct Args {
    /// Path to genePred extended file with the transcripts (may be gzip-ed).
    #[arg(long)]
    pub path_genepred: PathBuf,
    /// Path to TSV file with the transcript attributes (may be gzip-ed).
    #[arg(long)]
    pub path_attrs: PathBuf,
    /// Prefix for locus tags and namespaced identifiers.
    #[arg(long)]
    pub locus_tag_prefix: String,
    /// Path to the output feature table; compressed if ending in `.gz`.
    #[arg(long)]
    pub path_out: PathBuf,
    /// Optional path to YAML file with classification tables to use instead of built-in ones.
    #[arg(long)]
    pub path_tables: Option<PathBuf>,
}

/// Main entry point for `convert` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!(
        "Converting annotation to feature table\ncommon args: {:#?}\nargs: {:#?}",
        common,
        args
    );
    if args.locus_tag_prefix.is_empty() {
        anyhow::bail!("locus tag prefix must not be empty");
    }

    let tables = match &args.path_tables {
        Some(path) => {
            tracing::info!("Loading classification tables from {}", path.display());
            Classification::from_path(path)?
        }
        None => Classification::default(),
    };

    tracing::info!("Loading transcripts ...");
    let start = Instant::now();
    let transcripts = load_transcripts(&args.path_genepred)?;
    tracing::info!(
        "... done loading {} transcripts in {:?}",
        transcripts.len().separate_with_commas(),
        start.elapsed()
    );

    tracing::info!("Loading attributes ...");
    let start = Instant::now();
    let attrs = AttributeTable::from_path(&args.path_attrs)?;
    tracing::info!(
        "... done loading {} attribute records in {:?}",
        attrs.len().separate_with_commas(),
        start.elapsed()
    );
    trace_rss_now();

    tracing::info!("Grouping transcripts by chromosome and gene ...");
    let index = GroupingIndex::build(transcripts, &attrs)?;
    tracing::info!(
        "... done grouping into {} genes on {} chromosomes",
        index.gene_count().separate_with_commas(),
        index.len().separate_with_commas()
    );

    tracing::info!("Writing feature table to {} ...", args.path_out.display());
    let start = Instant::now();
    let sink = open_write_maybe_gz(&args.path_out)
        .with_context(|| format!("could not open {}", args.path_out.display()))?;
    let (sink, stats) = write_tbl(&index, &tables, &args.locus_tag_prefix, sink)?;
    sink.finish()
        .with_context(|| format!("could not finish writing {}", args.path_out.display()))?;
    tracing::info!("... done writing feature table in {:?}", start.elapsed());

    tracing::info!(
        "Statistics: {} chromosomes, {} genes, {} transcripts ({} coding), {} frame gaps",
        stats.chroms.separate_with_commas(),
        stats.genes.separate_with_commas(),
        stats.transcripts.separate_with_commas(),
        stats.coding_transcripts.separate_with_commas(),
        stats.gaps.separate_with_commas()
    );

    Ok(())
}
