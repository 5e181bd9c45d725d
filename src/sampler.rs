use log::{info, warn};

use quota_sampling::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

use config_reader::*;

#[derive(Debug, Snafu)]
pub enum SamplerError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no usable worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(""))]
    OpeningJson { source: std::io::Error },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display(""))]
    ParsingJsonNumber {},
    #[snafu(display("Error writing output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Sampling failed: {source}"))]
    Sampling { source: SamplingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SamplerResult<T> = Result<T, SamplerError>;

fn comparisons_to_json(comparisons: &[AttributeComparison]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for comparison in comparisons.iter() {
        let rows: Vec<JSValue> = comparison
            .groups
            .iter()
            .map(|row| {
                json!({
                    "group": row.group,
                    "targetPercent": format!("{:.4}", row.target_percent),
                    "sampledPercent": format!("{:.4}", row.sampled_percent),
                })
            })
            .collect();
        l.push(json!({"column": comparison.attribute, "rows": rows}));
    }
    l
}

fn build_summary_js(
    config: &RunConfig,
    stratify: &str,
    total_samples: usize,
    result: &SamplingResult,
) -> JSValue {
    let shortfalls: Vec<JSValue> = result
        .summary
        .shortfalls
        .iter()
        .map(|s| {
            json!({
                "column": s.attribute,
                "group": s.group,
                "requested": s.requested,
                "available": s.available,
            })
        })
        .collect();
    json!({
        "config": {
            "runName": config.output_settings.run_name,
            "stratifyColumn": stratify,
            "balanceColumns": config.sampling.balance_columns,
            "totalSamples": total_samples,
        },
        "summary": {
            "converged": result.summary.converged,
            "iterations": result.summary.iterations_used,
            "initialDistance": format!("{:.4}", result.summary.initial_distance),
            "finalDistance": format!("{:.4}", result.summary.final_distance),
            "shortfalls": shortfalls,
        },
        "comparisons": comparisons_to_json(&result.comparisons),
        "selectedRows": result.selected,
    })
}

fn build_counts_js(config: &RunConfig, dataset: &Dataset) -> SamplerResult<JSValue> {
    let total = dataset.num_rows();
    let mut tables: Vec<JSValue> = Vec::new();
    for target in config.targets.iter() {
        let counts = attribute_counts(dataset, &target.column).context(SamplingSnafu {})?;
        let rows: Vec<JSValue> = counts
            .iter()
            .map(|(group, count)| {
                let percent = if total == 0 {
                    0.0
                } else {
                    100.0 * (*count as f64) / (total as f64)
                };
                json!({
                    "group": group,
                    "count": count,
                    "percent": format!("{:.4}", percent),
                })
            })
            .collect();
        tables.push(json!({"column": target.column, "rows": rows}));
    }
    Ok(json!({
        "config": { "runName": config.output_settings.run_name },
        "counts": tables,
    }))
}

fn write_output(out_path: &Option<String>, pretty_js: &str) -> SamplerResult<()> {
    match out_path.as_deref() {
        Some("stdout") | None => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            fs::write(path, pretty_js).context(WritingOutputSnafu {
                path: path.to_string(),
            })?;
            info!("Summary written to {}", path);
        }
    }
    Ok(())
}

fn load_dataset(config: &RunConfig, args: &Args) -> SamplerResult<Dataset> {
    let input_path = args
        .input
        .clone()
        .unwrap_or_else(|| config.data_source.file_path.clone());
    let worksheet = args
        .worksheet
        .clone()
        .or_else(|| config.data_source.worksheet_name.clone());
    info!("Attempting to read data file {:?}", input_path);
    let table = match config.data_source.provider.as_str() {
        "excel" => io_excel::read_excel_table(input_path, worksheet.as_deref())?,
        "csv" => io_csv::read_csv_table(input_path)?,
        x => whatever!("Provider not implemented {:?}", x),
    };
    info!(
        "Loaded {} rows with {} columns",
        table.rows.len(),
        table.columns.len()
    );
    table.into_dataset().context(SamplingSnafu {})
}

pub fn run_sampling(args: &Args) -> SamplerResult<()> {
    let config = read_config(&args.config)?;
    info!("config: {:?}", config);

    let dataset = load_dataset(&config, args)?;

    if args.count_only {
        let counts_js = build_counts_js(&config, &dataset)?;
        let pretty = serde_json::to_string_pretty(&counts_js).context(ParsingJsonSnafu {})?;
        let out = args.out.clone().or_else(|| config.output_settings.output_path.clone());
        return write_output(&out, &pretty);
    }

    let targets: Vec<AttributeTarget> = config
        .targets
        .iter()
        .map(|t| AttributeTarget {
            attribute: t.column.clone(),
            shares: t
                .groups
                .iter()
                .map(|g| (g.group.clone(), g.percent))
                .collect(),
        })
        .collect();

    let stratify = args
        .stratify
        .clone()
        .unwrap_or_else(|| config.sampling.stratify_column.clone());
    let total_samples = match args.samples {
        Some(n) => n,
        None => config.sampling.total_samples()?,
    };
    let rules = SamplerRules {
        max_iterations: config
            .sampling
            .max_iterations
            .unwrap_or(SamplerRules::DEFAULT_RULES.max_iterations),
        tolerance: config
            .sampling
            .tolerance
            .unwrap_or(SamplerRules::DEFAULT_RULES.tolerance),
        random_seed: match args.seed {
            Some(s) => s,
            None => config
                .sampling
                .seed()?
                .unwrap_or(SamplerRules::DEFAULT_RULES.random_seed),
        },
    };

    let result = run_quota_sampling(
        &dataset,
        &stratify,
        &config.sampling.balance_columns,
        &targets,
        total_samples,
        &rules,
    )
    .context(SamplingSnafu {})?;

    info!(
        "Selected {} records: converged: {}, iterations: {}, distance: {:.4}",
        result.selected.len(),
        result.summary.converged,
        result.summary.iterations_used,
        result.summary.final_distance
    );
    if !result.summary.converged {
        warn!(
            "The target tolerance was not reached, returning the best selection (distance {:.4})",
            result.summary.final_distance
        );
    }
    for shortfall in result.summary.shortfalls.iter() {
        warn!(
            "Quota shortfall for {} = {}: requested {}, available {}",
            shortfall.attribute, shortfall.group, shortfall.requested, shortfall.available
        );
    }

    // Assemble the final json
    let result_js = build_summary_js(&config, &stratify, total_samples, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out = args.out.clone().or_else(|| config.output_settings.output_path.clone());
    write_output(&out, &pretty_js_stats)?;

    if let Some(rows_path) = config.output_settings.sampled_rows_path.clone() {
        io_csv::write_sampled_csv(rows_path, &dataset, &result.selected)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.clone() {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}
