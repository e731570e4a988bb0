//! Build calls from the identifier column of a tool's table.
//!
//! Provirus calls are named `<contig>_prophage_<start>_<end>`. Other identifiers
//! (whole-contig calls) carry no coordinates and are dropped.
use crate::errors::{ReconcileError, Result};
use crate::table::foreign_reader;
use definitions::*;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Return the index of the first of `columns` found in the header of `rdr`.
/// Tools spell the same column differently across versions (e.g., `seq_name` and `seqname`).
pub fn column_index<R: Read, S: AsRef<str>>(
    rdr: &mut csv::Reader<R>,
    columns: &[S],
    source: &str,
) -> Result<usize> {
    let header = rdr.headers()?;
    columns
        .iter()
        .find_map(|column| header.iter().position(|name| name == column.as_ref()))
        .ok_or_else(|| ReconcileError::MissingColumn {
            column: columns
                .iter()
                .map(|c| c.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            path: source.to_string(),
        })
}

/// Read the distinct identifiers of the identifier column in encounter order,
/// and make a call for each prophage identifier.
/// The identifier column is the first of `columns` in the header.
/// `source` is only used in diagnostics.
pub fn import_calls<R: Read, S: AsRef<str>>(
    rdr: R,
    tool: Tool,
    columns: &[S],
    source: &str,
) -> Result<Vec<Call>> {
    let mut rdr = foreign_reader(rdr);
    let idx = column_index(&mut rdr, columns, source)?;
    let mut arrived = HashSet::new();
    let (mut calls, mut dropped) = (vec![], 0);
    for record in rdr.records() {
        let record = record?;
        let raw_id = match record.get(idx) {
            Some(id) if !id.is_empty() => id,
            _ => continue,
        };
        if !arrived.insert(raw_id.to_string()) {
            continue;
        }
        match raw_id.parse::<ProphageId>() {
            Ok(id) => calls.push(Call::from_prophage_id(tool, &id, raw_id)),
            Err(why) => {
                debug!("DROP\t{}\t{}", source, why);
                dropped += 1;
            }
        }
    }
    debug!("IMPORT\t{}\t{}\t{}\t{}", tool, source, calls.len(), dropped);
    Ok(calls)
}

pub fn import_file<S: AsRef<str>>(path: &Path, tool: Tool, columns: &[S]) -> Result<Vec<Call>> {
    let rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
    import_calls(rdr, tool, columns, &path.display().to_string())
}
