use anyhow::{Context, Result};
use definitions::*;
use procon_cli::pipeline::*;
use reconcile::{Reconcile, ReconcileConfig};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
#[macro_use]
extern crate log;

fn main() -> Result<()> {
    let matches = procon_cli::procon_commands::procon_parser().get_matches();
    if let Some(("pipeline", sub_m)) = matches.subcommand() {
        let path: &String = sub_m.get_one("profile").unwrap();
        let file = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
        let mut config: PipelineConfig =
            toml::from_str(&file).with_context(|| format!("Failed to parse {path}"))?;
        let verbose = sub_m.get_count("verbose") as usize;
        if 0 < verbose {
            config.set_verbose(verbose);
        }
        return run_pipeline(&config);
    }
    if let Some((_, sub_m)) = matches.subcommand() {
        init_logger(sub_m.get_count("verbose") as usize);
    }
    match matches.subcommand() {
        Some(("import", sub_m)) => import(sub_m),
        Some(("consensus", sub_m)) => consensus(sub_m),
        Some(("homogenize", sub_m)) => homogenize(sub_m),
        _ => unreachable!(),
    }
}

fn import(matches: &clap::ArgMatches) -> Result<()> {
    debug!("START\tImport");
    let tool: Tool = matches.get_one::<String>("tool").unwrap().parse()?;
    let columns: Vec<&String> = matches.get_many("column").unwrap().collect();
    let input: &String = matches.get_one("input").unwrap();
    let calls = reconcile::import::import_file(Path::new(input), tool, &columns)
        .with_context(|| format!("Failed to import {input}"))?;
    let stdout = std::io::stdout();
    let mut wtr = BufWriter::new(stdout.lock());
    reconcile::table::write_calls(&mut wtr, &calls)?;
    wtr.flush()?;
    Ok(())
}

fn consensus(matches: &clap::ArgMatches) -> Result<()> {
    debug!("START\tConsensus");
    if let Some(threads) = matches
        .get_one("threads")
        .and_then(|num: &String| num.parse().ok())
    {
        set_threads(threads);
    }
    let overlap_threshold: f64 = matches
        .get_one::<String>("overlap_threshold")
        .unwrap()
        .parse()
        .context("overlap_threshold should be a number")?;
    let max_distance: u64 = matches
        .get_one::<String>("max_distance")
        .unwrap()
        .parse()
        .context("max_distance should be a non-negative integer")?;
    let tolerance: u64 = matches
        .get_one::<String>("tolerance")
        .unwrap()
        .parse()
        .context("tolerance should be a non-negative integer")?;
    let config = ReconcileConfig::new(overlap_threshold, max_distance, tolerance);
    config.check()?;
    let mut calls = vec![];
    for path in matches.get_many::<String>("calls").unwrap() {
        let rdr = std::fs::File::open(path)
            .map(BufReader::new)
            .with_context(|| format!("Failed to open {path}"))?;
        let table = reconcile::table::read_calls(rdr)
            .with_context(|| format!("Failed to read {path}"))?;
        debug!("CALLS\t{}\t{}", path, table.len());
        calls.extend(table);
    }
    if calls.is_empty() {
        warn!("No prophage calls were parsed.");
        return Ok(());
    }
    let result = calls.reconcile(&config);
    let prefix: &String = matches.get_one("output").unwrap();
    let file_stem = PathBuf::from(prefix);
    if let Some(dir) = file_stem.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    write_reconciliation(&result, &file_stem)?;
    if let Some(path) = matches.get_one::<String>("json") {
        dump_json(&result, Path::new(path)).with_context(|| format!("Failed to write {path}"))?;
    }
    Ok(())
}

fn homogenize(matches: &clap::ArgMatches) -> Result<()> {
    debug!("START\tHomogenize");
    let map_path: &String = matches.get_one("map").unwrap();
    let rdr = std::fs::File::open(map_path)
        .map(BufReader::new)
        .with_context(|| format!("Failed to open {map_path}"))?;
    let map = reconcile::table::read_identifier_map(rdr)?;
    let input: &String = matches.get_one("input").unwrap();
    let columns: Vec<&String> = matches.get_many("column").unwrap().collect();
    let output: &String = matches.get_one("output").unwrap();
    let (input, output) = (Path::new(input), Path::new(output));
    let rewritten = reconcile::homogenize::homogenize_file(input, output, &columns, &map)?;
    info!("HOMOGENIZE\t{}\t{}", output.display(), rewritten);
    Ok(())
}
