//! Rewrite an identifier column of an arbitrary table into consensus identifiers.
//! Identifiers without a consensus are kept as they are. Other columns are copied verbatim.
use crate::errors::Result;
use crate::import::column_index;
use crate::table::foreign_reader;
use definitions::IdentifierMap;
use std::io::{Read, Write};
use std::path::Path;

/// Rewrite the first of `columns` found in the header. Return the number of rewritten cells.
pub fn homogenize<R: Read, W: Write, S: AsRef<str>>(
    rdr: R,
    wtr: W,
    columns: &[S],
    map: &IdentifierMap,
    source: &str,
) -> Result<usize> {
    let mut rdr = foreign_reader(rdr);
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(wtr);
    let idx = column_index(&mut rdr, columns, source)?;
    wtr.write_record(rdr.headers()?)?;
    let mut rewritten = 0;
    for record in rdr.records() {
        let record = record?;
        let record: csv::StringRecord = record
            .iter()
            .enumerate()
            .map(|(i, field)| match i == idx {
                true => {
                    let mapped = map.resolve(field);
                    rewritten += (mapped != field) as usize;
                    mapped
                }
                false => field,
            })
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    debug!("HOMOGENIZE\t{}\t{}\t{}", source, idx, rewritten);
    Ok(rewritten)
}

pub fn homogenize_file<S: AsRef<str>>(
    input: &Path,
    output: &Path,
    columns: &[S],
    map: &IdentifierMap,
) -> Result<usize> {
    let rdr = std::fs::File::open(input).map(std::io::BufReader::new)?;
    // Nothing is written when the column is missing.
    let mut buffer = vec![];
    let source = input.display().to_string();
    let rewritten = homogenize(rdr, &mut buffer, columns, map, &source)?;
    std::fs::write(output, buffer)?;
    Ok(rewritten)
}
