// Primitives for reading and writing CSV files.

use log::debug;
use snafu::prelude::*;

use quota_sampling::Dataset;

use crate::sampler::io_common::ParsedTable;
use crate::sampler::{CsvLineParseSnafu, CsvOpenSnafu, CsvWriteSnafu, SamplerResult, WritingOutputSnafu};

/// Reads a CSV file with a header row into a raw table.
pub fn read_csv_table(path: String) -> SamplerResult<ParsedTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    let columns: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu { path: path.clone() })?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();
    debug!("header: {:?}", columns);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, record_r) in rdr.into_records().enumerate() {
        // Header is line 1.
        let lineno = idx + 2;
        let record = record_r.context(CsvLineParseSnafu { lineno })?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(ParsedTable { columns, rows })
}

/// Writes the selected rows of a dataset as a CSV table, header included.
pub fn write_sampled_csv(path: String, dataset: &Dataset, selected: &[usize]) -> SamplerResult<()> {
    let mut wtr = csv::Writer::from_path(&path).context(CsvOpenSnafu { path: path.clone() })?;
    wtr.write_record(dataset.columns())
        .context(CsvWriteSnafu { path: path.clone() })?;
    for &idx in selected.iter() {
        wtr.write_record(dataset.row(idx))
            .context(CsvWriteSnafu { path: path.clone() })?;
    }
    wtr.flush().context(WritingOutputSnafu { path })?;
    Ok(())
}
