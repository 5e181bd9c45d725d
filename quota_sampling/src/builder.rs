pub use crate::config::*;

/// A builder for assembling a dataset row by row.
///
/// This is the entry point for callers that already hold tabular data in
/// memory. File readers should normalize every cell to a string first.
///
/// ```
/// use quota_sampling::builder::Builder;
/// # use quota_sampling::SamplingErrors;
///
/// let mut builder = Builder::new(&["Age".to_string(), "Gender".to_string()]);
/// builder.add_row(&["18 - 24".to_string(), "Female".to_string()])?;
/// let dataset = builder.build()?;
/// assert_eq!(dataset.num_rows(), 1);
///
/// # Ok::<(), SamplingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _columns: Vec<String>,
    pub(crate) _rows: Vec<Vec<String>>,
}

impl Builder {
    pub fn new(columns: &[String]) -> Builder {
        Builder {
            _columns: columns.to_vec(),
            _rows: Vec::new(),
        }
    }

    /// Adds one record. The row must have one cell per column.
    pub fn add_row(&mut self, cells: &[String]) -> Result<(), SamplingErrors> {
        if cells.len() != self._columns.len() {
            return Err(SamplingErrors::MalformedRow(self._rows.len()));
        }
        self._rows.push(cells.to_vec());
        Ok(())
    }

    pub fn build(self) -> Result<Dataset, SamplingErrors> {
        Dataset::new(self._columns, self._rows)
    }
}
