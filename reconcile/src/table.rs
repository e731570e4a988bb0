//! Tab-separated tables with a header line: the call table, the consensus table, and the identifier map.
use crate::errors::Result;
use definitions::*;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

pub const CALL_COLUMNS: [&str; 5] = ["tool", "contig", "start", "end", "raw_id"];
pub const CONSENSUS_COLUMNS: [&str; 9] = [
    "consensus_id",
    "contig",
    "n_tools",
    "tools",
    "consensus_start",
    "consensus_end",
    "method",
    "used_tools_start",
    "used_tools_end",
];
pub const ID_MAP_COLUMNS: [&str; 2] = ["raw_id", "consensus_id"];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdPair {
    raw_id: String,
    consensus_id: String,
}

pub fn tsv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(rdr)
}

/// Reader of the tables made by other programs. Quotes are plain characters, and
/// rows may have different numbers of fields.
/// Importing calls and homogenizing a table should see the same cells.
pub fn foreign_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(rdr)
}

pub fn tsv_writer<W: Write>(wtr: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(wtr)
}

fn write_rows<W: Write, T: Serialize>(wtr: W, columns: &[&str], rows: &[T]) -> Result<()> {
    let mut wtr = tsv_writer(wtr);
    if rows.is_empty() {
        // The header is only written along with the first row.
        wtr.write_record(columns)?;
    }
    for row in rows.iter() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a call table. `start` and `end` are swapped if needed.
pub fn read_calls<R: Read>(rdr: R) -> Result<Vec<Call>> {
    let calls = tsv_reader(rdr)
        .deserialize()
        .collect::<std::result::Result<Vec<Call>, _>>()?;
    Ok(calls)
}

pub fn write_calls<W: Write>(wtr: W, calls: &[Call]) -> Result<()> {
    write_rows(wtr, &CALL_COLUMNS, calls)
}

pub fn read_consensus<R: Read>(rdr: R) -> Result<Vec<ConsensusRecord>> {
    let records = tsv_reader(rdr)
        .deserialize()
        .collect::<std::result::Result<Vec<ConsensusRecord>, _>>()?;
    Ok(records)
}

pub fn write_consensus<W: Write>(wtr: W, records: &[ConsensusRecord]) -> Result<()> {
    write_rows(wtr, &CONSENSUS_COLUMNS, records)
}

pub fn read_identifier_map<R: Read>(rdr: R) -> Result<IdentifierMap> {
    let mut map = IdentifierMap::new();
    for pair in tsv_reader(rdr).deserialize() {
        let IdPair {
            raw_id,
            consensus_id,
        } = pair?;
        map.insert(&raw_id, &consensus_id);
    }
    Ok(map)
}

/// The rows are sorted by raw_id.
pub fn write_identifier_map<W: Write>(wtr: W, map: &IdentifierMap) -> Result<()> {
    let pairs: Vec<_> = map
        .sorted_pairs()
        .into_iter()
        .map(|(raw_id, consensus_id)| IdPair {
            raw_id: raw_id.to_string(),
            consensus_id: consensus_id.to_string(),
        })
        .collect();
    write_rows(wtr, &ID_MAP_COLUMNS, &pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{Reconcile, ReconcileConfig};
    const CALLS: &str = "tool\tcontig\tstart\tend\traw_id
VirSorter2\tctg1\t100\t5000\tctg1_prophage_100_5000
GeNomad\tctg1\t4995\t110\tctg1_prophage_110_4995
VIBRANT\tctg1\t8000\t8100\tctg1_prophage_8000_8100
";
    #[test]
    fn read_call_table() {
        let calls = read_calls(CALLS.as_bytes()).unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].tool, Tool::VirSorter2);
        assert_eq!((calls[1].tool, calls[1].start, calls[1].end), (Tool::GeNomad, 110, 4995));
        assert_eq!(calls[2].tool, Tool::Vibrant);
    }
    #[test]
    fn bad_call_table() {
        let table = "tool\tcontig\tstart\tend\traw_id\nCheckV\tctg1\t1\t2\tx\n";
        assert!(read_calls(table.as_bytes()).is_err());
        let table = "tool\tcontig\tstart\tend\traw_id\nVIBRANT\tctg1\tone\t2\tx\n";
        assert!(read_calls(table.as_bytes()).is_err());
    }
    #[test]
    fn write_call_table() {
        let calls = read_calls(CALLS.as_bytes()).unwrap();
        let mut out = vec![];
        write_calls(&mut out, &calls).unwrap();
        let out = String::from_utf8(out).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("tool\tcontig\tstart\tend\traw_id"));
        assert_eq!(
            lines.nth(1),
            Some("geNomad\tctg1\t110\t4995\tctg1_prophage_110_4995")
        );
    }
    #[test]
    fn consensus_table() {
        let calls = read_calls(CALLS.as_bytes()).unwrap();
        let result = calls.reconcile(&ReconcileConfig::default());
        let mut out = vec![];
        write_consensus(&mut out, &result.consensus).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CONSENSUS_COLUMNS.join("\t"));
        assert_eq!(
            lines[1],
            "ctg1_prophage_105_4997\tctg1\t2\tgeNomad,VirSorter2\t105\t4997\tstart_consensus_2+end_consensus_2\tgeNomad,VirSorter2\tgeNomad,VirSorter2"
        );
        assert_eq!(
            lines[2],
            "ctg1_prophage_8000_8100\tctg1\t1\tVIBRANT\t8000\t8100\tsingle_tool\tVIBRANT\tVIBRANT"
        );
        let records = read_consensus(out.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tools, result.consensus[0].tools);
        assert_eq!(records[1].method, Method::SingleTool);
    }
    #[test]
    fn empty_tables_have_header() {
        let mut out = vec![];
        write_consensus(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), CONSENSUS_COLUMNS.join("\t"));
        let mut out = vec![];
        write_identifier_map(&mut out, &IdentifierMap::new()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "raw_id\tconsensus_id\n");
    }
    #[test]
    fn identifier_map_table() {
        let mut map = IdentifierMap::new();
        map.insert("b", "ctg1_prophage_1_2");
        map.insert("a", "ctg1_prophage_1_2");
        let mut out = vec![];
        write_identifier_map(&mut out, &map).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "raw_id\tconsensus_id\na\tctg1_prophage_1_2\nb\tctg1_prophage_1_2\n"
        );
        assert_eq!(read_identifier_map(out.as_bytes()).unwrap(), map);
    }
}
