// Primitives for reading Excel workbooks.

use log::debug;
use snafu::prelude::*;

use calamine::{open_workbook, Reader, Xlsx};

use crate::sampler::io_common::{cell_to_string, ParsedTable};
use crate::sampler::{EmptyExcelSnafu, MissingWorksheetSnafu, OpeningExcelSnafu, SamplerResult};

/// Reads one worksheet of an Excel workbook into a raw table. The first row
/// is the header. When no worksheet name is given, the first sheet of the
/// workbook is used.
pub fn read_excel_table(path: String, worksheet: Option<&str>) -> SamplerResult<ParsedTable> {
    let mut workbook: Xlsx<_> =
        open_workbook(&path).context(OpeningExcelSnafu { path: path.clone() })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu {
                path: path.clone(),
                name: name.to_string(),
            })?
            .context(OpeningExcelSnafu { path: path.clone() })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path: path.clone() })?
            .context(OpeningExcelSnafu { path: path.clone() })?,
    };

    let mut rows_iter = wrange.rows();
    let header = rows_iter.next().context(EmptyExcelSnafu { path })?;
    let columns: Vec<String> = header.iter().map(cell_to_string).collect();
    debug!("header: {:?}", columns);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in rows_iter {
        rows.push(row.iter().map(cell_to_string).collect());
    }
    Ok(ParsedTable { columns, rows })
}
