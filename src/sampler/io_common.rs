// Primitives shared by the table readers.

use quota_sampling::builder::Builder;
use quota_sampling::{Dataset, SamplingErrors};

/// A raw table as produced by a reader: a header plus string rows.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn into_dataset(self) -> Result<Dataset, SamplingErrors> {
        let mut builder = Builder::new(&self.columns);
        for row in self.rows.iter() {
            builder.add_row(row)?;
        }
        builder.build()
    }
}

/// Normalizes a spreadsheet cell to the string form used as a group label.
/// Whole floats are printed without the trailing '.0' so that numeric codes
/// match their CSV spelling.
pub fn cell_to_string(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.trim().to_string(),
        calamine::DataType::Int(i) => i.to_string(),
        // Beyond 2^53 the integer cast would lose digits; the plain float
        // rendering is exact there anyway.
        calamine::DataType::Float(f) if f.fract() == 0.0 && f.abs() < 9007199254740992.0 => {
            format!("{}", *f as i64)
        }
        calamine::DataType::Float(f) => f.to_string(),
        calamine::DataType::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        calamine::DataType::DateTime(f) => f.to_string(),
        calamine::DataType::Error(_) | calamine::DataType::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_normalized_to_strings() {
        assert_eq!(
            cell_to_string(&calamine::DataType::String("  Malay ".to_string())),
            "Malay"
        );
        assert_eq!(cell_to_string(&calamine::DataType::Int(42)), "42");
        assert_eq!(cell_to_string(&calamine::DataType::Float(42.0)), "42");
        assert_eq!(cell_to_string(&calamine::DataType::Float(4.5)), "4.5");
        // Whole floats beyond the exact-integer range of f64 keep all their
        // digits through the float rendering.
        assert_eq!(
            cell_to_string(&calamine::DataType::Float(1e18)),
            "1000000000000000000"
        );
        assert_eq!(cell_to_string(&calamine::DataType::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&calamine::DataType::Empty), "");
    }

    #[test]
    fn tables_turn_into_datasets() {
        let table = ParsedTable {
            columns: vec!["Age".to_string(), "Gender".to_string()],
            rows: vec![
                vec!["18 - 24".to_string(), "Female".to_string()],
                vec!["25 - 34".to_string(), "Male".to_string()],
            ],
        };
        let dataset = table.into_dataset().unwrap();
        assert_eq!(dataset.num_rows(), 2);
        assert_eq!(dataset.groups("Gender").unwrap(), vec!["Female", "Male"]);
    }

    #[test]
    fn ragged_tables_are_rejected() {
        let table = ParsedTable {
            columns: vec!["Age".to_string(), "Gender".to_string()],
            rows: vec![vec!["18 - 24".to_string()]],
        };
        assert_eq!(
            table.into_dataset(),
            Err(SamplingErrors::MalformedRow(0))
        );
    }
}
