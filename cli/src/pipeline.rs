//! Pipelines -- the whole pipeline of the procon.
//!
//! This module defines the pipeline to reconcile the prophage calls of several tools on one assembly,
//! from the tools' tables to the consensus table and the homogenized tables.
use anyhow::{Context, Result};
use definitions::{Reconciliation, Tool};
use log::*;
use reconcile::{Reconcile, ReconcileConfig, ReconcileError};
use serde::{Deserialize, Serialize};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// A table made by a tool.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Source {
    pub tool: Tool,
    /// Candidates of the identifier column, either a name or a list of names.
    /// The first one found in the header is used. If empty, the usual columns of the tool.
    #[serde(default, alias = "column", deserialize_with = "one_or_many")]
    pub columns: Vec<String>,
    pub path: PathBuf,
}

impl Source {
    pub fn columns(&self) -> Vec<&str> {
        match self.columns.is_empty() {
            true => identifier_columns(self.tool).to_vec(),
            false => self.columns.iter().map(|x| x.as_str()).collect(),
        }
    }
}

/// The identifier columns of the summary tables of each tool.
/// geNomad renamed `seqname` to `seq_name`.
pub fn identifier_columns(tool: Tool) -> &'static [&'static str] {
    match tool {
        Tool::GeNomad => &["seq_name", "seqname"],
        Tool::Vibrant => &["scaffold"],
        Tool::VirSorter2 => &["seqname"],
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(column) => Ok(vec![column]),
        OneOrMany::Many(columns) => Ok(columns),
    }
}

/// The configuration of the pipeline.
/// This struct is a comprehensive list of the parameters that can be
/// set by a user.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PipelineConfig {
    /// The path to the output directory.
    out_dir: PathBuf,
    prefix: String,
    #[serde(default)]
    verbose: usize,
    #[serde(default = "default_threads")]
    threads: usize,
    #[serde(default = "default_overlap_threshold")]
    overlap_threshold: f64,
    #[serde(default = "default_max_distance")]
    max_distance: u64,
    #[serde(default = "default_tolerance")]
    tolerance: u64,
    /// Rewrite the identifiers of each source into `{stem}_homogenized.tsv`.
    #[serde(default = "default_homogenize")]
    homogenize: bool,
    sources: Vec<Source>,
}

fn default_threads() -> usize {
    1
}
fn default_overlap_threshold() -> f64 {
    ReconcileConfig::default().overlap_threshold
}
fn default_max_distance() -> u64 {
    ReconcileConfig::default().max_distance
}
fn default_tolerance() -> u64 {
    ReconcileConfig::default().tolerance
}
fn default_homogenize() -> bool {
    true
}

impl PipelineConfig {
    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig::new(self.overlap_threshold, self.max_distance, self.tolerance)
    }
    pub fn verbose(&self) -> usize {
        self.verbose
    }
    pub fn set_verbose(&mut self, verbose: usize) {
        self.verbose = verbose;
    }
    pub fn threads(&self) -> usize {
        self.threads
    }
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
    pub fn file_stem(&self) -> PathBuf {
        self.out_dir.join(&self.prefix)
    }
}

pub fn init_logger(verbose: usize) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    // It fails only if a logger is already set.
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Return `{file_stem}.{extension}`. The prefix may contain dots (e.g., illumina.megahit).
pub fn with_suffix(file_stem: &Path, extension: &str) -> PathBuf {
    let mut path = file_stem.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Write `{file_stem}.consensus.tsv` and `{file_stem}.id_map.tsv`.
pub fn write_reconciliation(result: &Reconciliation, file_stem: &Path) -> Result<()> {
    let consensus = with_suffix(file_stem, "consensus.tsv");
    let wtr = std::fs::File::create(&consensus)
        .map(BufWriter::new)
        .with_context(|| format!("Failed to create {}", consensus.display()))?;
    reconcile::table::write_consensus(wtr, &result.consensus)?;
    info!("OUTPUT\t{}\t{}", consensus.display(), result.consensus.len());
    let id_map = with_suffix(file_stem, "id_map.tsv");
    let wtr = std::fs::File::create(&id_map)
        .map(BufWriter::new)
        .with_context(|| format!("Failed to create {}", id_map.display()))?;
    reconcile::table::write_identifier_map(wtr, &result.identifier_map)?;
    info!("OUTPUT\t{}\t{}", id_map.display(), result.identifier_map.len());
    Ok(())
}

pub fn dump_json(result: &Reconciliation, path: &Path) -> Result<()> {
    let mut wtr = std::fs::File::create(path).map(BufWriter::new)?;
    serde_json::ser::to_writer(&mut wtr, result)?;
    Ok(())
}

pub fn set_threads(threads: usize) {
    debug!("Set Threads\t{}", threads);
    if let Err(why) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("{:?} The global pool is already built. Harmless.", why);
    }
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<()> {
    init_logger(config.verbose);
    set_threads(config.threads);
    let reconcile_config = config.reconcile_config();
    reconcile_config.check()?;
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create {}", config.out_dir.display()))?;
    let mut calls = vec![];
    let mut found = vec![];
    for source in config.sources.iter() {
        if !source.path.exists() {
            warn!("MISSING\t{}\t{}", source.tool, source.path.display());
            continue;
        }
        let columns = source.columns();
        let imported = match reconcile::import::import_file(&source.path, source.tool, &columns) {
            Ok(imported) => imported,
            Err(ReconcileError::MissingColumn { column, path }) => {
                warn!("Column {column} not found in {path}. Skipped.");
                continue;
            }
            Err(why) => {
                let path = source.path.display();
                return Err(why).with_context(|| format!("Failed to import {path}"));
            }
        };
        info!("IMPORT\t{}\t{}", source.tool, imported.len());
        calls.extend(imported);
        found.push(source);
    }
    if calls.is_empty() {
        warn!("No prophage calls were parsed.");
        return Ok(());
    }
    let result = calls.reconcile(&reconcile_config);
    let file_stem = config.file_stem();
    write_reconciliation(&result, &file_stem)?;
    if config.homogenize {
        for source in found {
            homogenize_source(source, &result)?;
        }
    }
    Ok(())
}

/// Return the path of the homogenized table: `{stem}_homogenized.tsv`, beside the source.
pub fn homogenized_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|x| x.to_string_lossy().to_string())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_homogenized.tsv"))
}

fn homogenize_source(source: &Source, result: &Reconciliation) -> Result<()> {
    let output = homogenized_path(&source.path);
    let map = &result.identifier_map;
    let columns = source.columns();
    match reconcile::homogenize::homogenize_file(&source.path, &output, &columns, map) {
        Ok(rewritten) => {
            info!("HOMOGENIZE\t{}\t{}", output.display(), rewritten);
            Ok(())
        }
        Err(ReconcileError::MissingColumn { column, path }) => {
            warn!("Column {column} not found in {path}. Skipped.");
            Ok(())
        }
        Err(why) => {
            let path = source.path.display();
            Err(why).with_context(|| format!("Failed to homogenize {path}"))
        }
    }
}
