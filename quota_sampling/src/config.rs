// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// A categorical dataset: ordered rows with named columns.
///
/// Records are identified by their row index, which is stable for the
/// lifetime of the dataset. The sampler never mutates a record, it only
/// selects or deselects row indices. All cell values are kept as strings;
/// the readers in the command line interface are responsible for
/// normalizing numeric cells before the dataset is built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Builds a dataset from a header and rows.
    ///
    /// Every row must have exactly one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Dataset, SamplingErrors> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SamplingErrors::MalformedRow(idx));
            }
        }
        let column_index: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Ok(Dataset {
            columns,
            column_index,
            rows,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row(&self, idx: usize) -> &[String] {
        &self.rows[idx]
    }

    /// The position of a column, or `InvalidAttribute` if it is unknown.
    pub fn column_position(&self, attribute: &str) -> Result<usize, SamplingErrors> {
        self.column_index
            .get(attribute)
            .cloned()
            .ok_or_else(|| SamplingErrors::InvalidAttribute(attribute.to_string()))
    }

    pub fn value(&self, row_idx: usize, col_idx: usize) -> &str {
        &self.rows[row_idx][col_idx]
    }

    /// The distinct values of an attribute, in first-seen row order.
    pub fn groups(&self, attribute: &str) -> Result<Vec<String>, SamplingErrors> {
        let col = self.column_position(attribute)?;
        let mut seen: HashMap<&str, ()> = HashMap::new();
        let mut res: Vec<String> = Vec::new();
        for row in self.rows.iter() {
            let v = row[col].as_str();
            if seen.insert(v, ()).is_none() {
                res.push(v.to_string());
            }
        }
        Ok(res)
    }
}

/// The benchmark distribution for one attribute: ordered (group, percent)
/// pairs. The order is preserved and used for all per-group processing, so
/// two runs over the same target are deterministic.
///
/// Percentages are treated as relative weights: they are normalized to sum
/// to 100 before any quota is computed. Benchmark tables in the wild sum to
/// 99.x or 100.x because of rounding, and some omit categories entirely.
#[derive(PartialEq, Debug, Clone)]
pub struct AttributeTarget {
    pub attribute: String,
    pub shares: Vec<(String, f64)>,
}

impl AttributeTarget {
    pub fn new(attribute: &str, shares: &[(&str, f64)]) -> AttributeTarget {
        AttributeTarget {
            attribute: attribute.to_string(),
            shares: shares
                .iter()
                .map(|(g, p)| (g.to_string(), *p))
                .collect(),
        }
    }

    /// The shares rescaled to sum to 100.
    ///
    /// Fails with `InvalidTarget` if the weights do not add up to a positive
    /// total.
    pub fn normalized_shares(&self) -> Result<Vec<(String, f64)>, SamplingErrors> {
        let total: f64 = self.shares.iter().map(|(_, p)| *p).sum();
        if !(total > 0.0) {
            return Err(SamplingErrors::InvalidTarget(self.attribute.clone()));
        }
        Ok(self
            .shares
            .iter()
            .map(|(g, p)| (g.clone(), p * 100.0 / total))
            .collect())
    }
}

/// Tuning knobs of the iterative adjustment loop.
#[derive(PartialEq, Debug, Clone)]
pub struct SamplerRules {
    /// Upper bound on the number of full passes over the balance attributes.
    pub max_iterations: u32,
    /// The loop stops early once the summed absolute deviation between
    /// sampled and target percentages drops below this value.
    pub tolerance: f64,
    /// Seed for all random draws. Two runs with the same seed and the same
    /// inputs select exactly the same rows.
    pub random_seed: u64,
}

impl SamplerRules {
    pub const DEFAULT_RULES: SamplerRules = SamplerRules {
        max_iterations: 100,
        tolerance: 0.04,
        random_seed: 42,
    };
}

// ******** Output data structures *********

/// One line of a comparison table: how a group fares against its benchmark.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupComparison {
    pub group: String,
    /// Normalized target percentage, 0 if the group is absent from the target.
    pub target_percent: f64,
    /// 100 * count in sample / sample size, 0 if the group was not sampled.
    pub sampled_percent: f64,
}

/// Target-versus-sampled percentages for every group of one attribute.
#[derive(PartialEq, Debug, Clone)]
pub struct AttributeComparison {
    pub attribute: String,
    pub groups: Vec<GroupComparison>,
}

/// A stratum that could not meet its quota because the unselected pool ran
/// out. This is a degraded-but-completable condition: the run substitutes
/// the full remaining pool and continues.
#[derive(PartialEq, Debug, Clone)]
pub struct Shortfall {
    pub attribute: String,
    pub group: String,
    /// The quota the group should have reached.
    pub requested: usize,
    /// How many records of that group existed at all.
    pub available: usize,
}

/// Outcome of the adjustment loop.
///
/// Exhausting the iteration budget is not an error: the sampler still
/// returns the best selection it saw, with `converged` set to false.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSummary {
    pub converged: bool,
    pub iterations_used: u32,
    /// Summed absolute deviation of the final selection.
    pub final_distance: f64,
    /// Same measure on the initial stratified draw, topped up to the
    /// requested size but not yet adjusted. `final_distance` is never
    /// larger than this.
    pub initial_distance: f64,
    pub shortfalls: Vec<Shortfall>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SamplingResult {
    /// Selected row indices, free of duplicates, in selection order.
    pub selected: Vec<usize>,
    pub comparisons: Vec<AttributeComparison>,
    pub summary: RunSummary,
}

/// Errors that prevent the sampler from starting.
///
/// These are all detected before any sampling work happens; no partial
/// output is ever produced for them.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SamplingErrors {
    /// A referenced column is absent from the dataset or the targets.
    InvalidAttribute(String),
    /// Requested sample size is zero or exceeds the dataset population.
    InvalidSampleSize { requested: usize, available: usize },
    /// A target table whose weights do not sum to a positive value.
    InvalidTarget(String),
    /// A row whose width does not match the header.
    MalformedRow(usize),
}

impl Error for SamplingErrors {}

impl Display for SamplingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingErrors::InvalidAttribute(name) => {
                write!(f, "unknown attribute: {}", name)
            }
            SamplingErrors::InvalidSampleSize {
                requested,
                available,
            } => {
                write!(
                    f,
                    "invalid sample size {} for a population of {}",
                    requested, available
                )
            }
            SamplingErrors::InvalidTarget(name) => {
                write!(f, "target weights for {} do not sum to a positive value", name)
            }
            SamplingErrors::MalformedRow(idx) => {
                write!(f, "row {} does not match the header width", idx)
            }
        }
    }
}
