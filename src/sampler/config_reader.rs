use crate::sampler::*;

use serde::{Deserialize, Serialize};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "runName")]
    pub run_name: String,
    /// Where to write the JSON summary. 'stdout' or a missing value prints
    /// it to the standard output.
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    /// If present, the sampled rows are also written as a CSV table to this
    /// path.
    #[serde(rename = "sampledRowsPath")]
    pub sampled_rows_path: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// 'excel' or 'csv'.
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SamplingSettings {
    // Accepts both a number and a string, like the spreadsheet tools that
    // produce these configurations.
    #[serde(rename = "totalSamples")]
    _total_samples: JSValue,
    #[serde(rename = "stratifyColumn")]
    pub stratify_column: String,
    #[serde(rename = "balanceColumns")]
    pub balance_columns: Vec<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<JSValue>,
    #[serde(rename = "maxIterations")]
    pub max_iterations: Option<u32>,
    pub tolerance: Option<f64>,
}

impl SamplingSettings {
    pub fn total_samples(&self) -> SamplerResult<usize> {
        read_js_int(&Some(self._total_samples.clone()))
    }

    pub fn seed(&self) -> SamplerResult<Option<u64>> {
        match &self.random_seed {
            None => Ok(None),
            some => read_js_int(some).map(|x| Some(x as u64)),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TargetGroup {
    pub group: String,
    pub percent: f64,
}

/// One benchmark table, in the order it should be processed and reported.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TargetColumn {
    pub column: String,
    pub groups: Vec<TargetGroup>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSource")]
    pub data_source: DataSource,
    pub sampling: SamplingSettings,
    pub targets: Vec<TargetColumn>,
}

pub fn read_config(path: &str) -> SamplerResult<RunConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let config: RunConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> SamplerResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>) -> SamplerResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}
