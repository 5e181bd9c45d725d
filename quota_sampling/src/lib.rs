//! Quota-balancing sampler for categorical survey data.
//!
//! Given a dataset of labeled records and a set of benchmark distributions
//! (one per attribute), the sampler draws a fixed-size subset whose
//! per-attribute, per-group proportions approximate the benchmarks. The
//! selection is built in two phases: an initial stratified draw over one
//! attribute, then an iterative adjustment loop that trims over-represented
//! groups and tops up under-represented ones across all configured
//! attributes until the aggregate deviation falls below a tolerance or the
//! iteration budget runs out.
//!
//! The sampler never selects the same record twice and never exceeds the
//! requested sample size. When a stratum is too small to meet its quota,
//! its full population is substituted and the shortfall is reported in the
//! run summary instead of failing the run.

mod config;
pub mod builder;

use log::{debug, info, warn};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

pub use crate::config::*;

// **** Private structures ****

/// The working selection: row indices in selection order plus a membership
/// set.
///
/// Invariant: `selected` contains no duplicates and mirrors `members`
/// exactly.
#[derive(Debug, Clone)]
struct SampleState {
    selected: Vec<usize>,
    members: HashSet<usize>,
}

impl SampleState {
    fn new() -> SampleState {
        SampleState {
            selected: Vec::new(),
            members: HashSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.selected.len()
    }

    fn contains(&self, idx: usize) -> bool {
        self.members.contains(&idx)
    }

    fn insert(&mut self, idx: usize) {
        let fresh = self.members.insert(idx);
        // Selecting the same record twice is a programming defect, not a
        // user-facing error: the candidate pools always exclude members.
        debug_assert!(fresh, "record {} selected twice", idx);
        if fresh {
            self.selected.push(idx);
        }
    }

    fn remove_many(&mut self, to_remove: &HashSet<usize>) {
        for idx in to_remove.iter() {
            self.members.remove(idx);
        }
        self.selected.retain(|idx| !to_remove.contains(idx));
    }

    /// Per-group tally of the selected records for one column.
    fn counts(&self, dataset: &Dataset, col: usize) -> HashMap<String, usize> {
        let mut tally: HashMap<String, usize> = HashMap::new();
        for &idx in self.selected.iter() {
            let e = tally.entry(dataset.value(idx, col).to_string()).or_insert(0);
            *e += 1;
        }
        tally
    }
}

/// Integer quotas for one attribute: `floor(total * percent / 100)` on the
/// normalized shares. The residual left by flooring is not pre-allocated,
/// the adjustment loop's top-up phase absorbs it.
fn quota_plan(
    target: &AttributeTarget,
    total_samples: usize,
) -> Result<Vec<(String, usize)>, SamplingErrors> {
    let shares = target.normalized_shares()?;
    Ok(shares
        .iter()
        .map(|(group, pct)| {
            let quota = ((total_samples as f64) * pct / 100.0).floor() as usize;
            (group.clone(), quota)
        })
        .collect())
}

/// Row indices of a stratum, in row order, excluding already-selected
/// records when a state is given.
fn stratum_pool(
    dataset: &Dataset,
    col: usize,
    group: &str,
    exclude: Option<&SampleState>,
) -> Vec<usize> {
    (0..dataset.num_rows())
        .filter(|&idx| {
            dataset.value(idx, col) == group && exclude.map_or(true, |s| !s.contains(idx))
        })
        .collect()
}

fn target_for<'a>(
    targets: &'a [AttributeTarget],
    attribute: &str,
) -> Result<&'a AttributeTarget, SamplingErrors> {
    targets
        .iter()
        .find(|t| t.attribute == attribute)
        .ok_or_else(|| SamplingErrors::InvalidAttribute(attribute.to_string()))
}

/// Summed absolute deviation between sampled and target percentages over
/// the balance attributes. Only groups listed in the targets contribute,
/// matching how the benchmark tables are written.
fn total_distance(
    dataset: &Dataset,
    state: &SampleState,
    balance: &[String],
    targets: &[AttributeTarget],
) -> Result<f64, SamplingErrors> {
    let sample_size = state.len();
    let mut distance = 0.0_f64;
    for attribute in balance.iter() {
        let col = dataset.column_position(attribute)?;
        let target = target_for(targets, attribute)?;
        let counts = state.counts(dataset, col);
        for (group, target_pct) in target.normalized_shares()?.iter() {
            let sampled_pct = if sample_size == 0 {
                0.0
            } else {
                100.0 * (*counts.get(group).unwrap_or(&0) as f64) / (sample_size as f64)
            };
            distance += (sampled_pct - target_pct).abs();
        }
    }
    Ok(distance)
}

/// Records a quota shortfall, replacing any earlier entry for the same
/// attribute and group so the summary reflects the last pass.
fn record_shortfall(
    shortfalls: &mut Vec<Shortfall>,
    attribute: &str,
    group: &str,
    requested: usize,
    available: usize,
) {
    warn!(
        "insufficient population for {} = {}: requested {}, available {}",
        attribute, group, requested, available
    );
    let entry = Shortfall {
        attribute: attribute.to_string(),
        group: group.to_string(),
        requested,
        available,
    };
    if let Some(existing) = shortfalls
        .iter_mut()
        .find(|s| s.attribute == attribute && s.group == group)
    {
        *existing = entry;
    } else {
        shortfalls.push(entry);
    }
}

/// Initial stratified draw over a single attribute.
///
/// Each group receives exactly its quota when enough records exist, and its
/// full population otherwise. The result may be smaller than the requested
/// total; the caller makes up the difference with a top-up.
fn initial_stratified_draw(
    dataset: &Dataset,
    stratify: &str,
    targets: &[AttributeTarget],
    total_samples: usize,
    rng: &mut StdRng,
    shortfalls: &mut Vec<Shortfall>,
) -> Result<SampleState, SamplingErrors> {
    let col = dataset.column_position(stratify)?;
    let target = target_for(targets, stratify)?;
    let plan = quota_plan(target, total_samples)?;

    let mut state = SampleState::new();
    for (group, quota) in plan.iter() {
        let pool = stratum_pool(dataset, col, group, None);
        if *quota >= pool.len() {
            if *quota > pool.len() {
                record_shortfall(shortfalls, stratify, group, *quota, pool.len());
            }
            for idx in pool {
                state.insert(idx);
            }
        } else {
            let picked: Vec<usize> = pool.choose_multiple(rng, *quota).cloned().collect();
            for idx in picked {
                state.insert(idx);
            }
        }
    }
    debug!(
        "initial_stratified_draw: {} of {} records selected on {}",
        state.len(),
        total_samples,
        stratify
    );
    Ok(state)
}

/// One adjustment pass over a single attribute.
///
/// Over-quota groups are trimmed by uniform random removal; under-quota
/// groups are topped up from the unselected remainder of their stratum,
/// never by re-selecting a record. A group whose remainder runs out gets
/// everything that is left and a shortfall entry. Groups not listed in the
/// target are left untouched.
fn adjust_attribute(
    dataset: &Dataset,
    state: &mut SampleState,
    attribute: &str,
    targets: &[AttributeTarget],
    total_samples: usize,
    rng: &mut StdRng,
    shortfalls: &mut Vec<Shortfall>,
) -> Result<(), SamplingErrors> {
    let col = dataset.column_position(attribute)?;
    let target = target_for(targets, attribute)?;
    let plan = quota_plan(target, total_samples)?;
    let counts = state.counts(dataset, col);

    // Trim first so the additions below see a freed budget.
    for (group, required) in plan.iter() {
        let current = *counts.get(group).unwrap_or(&0);
        if current > *required {
            let members: Vec<usize> = state
                .selected
                .iter()
                .filter(|&&idx| dataset.value(idx, col) == group)
                .cloned()
                .collect();
            let excess = current - required;
            let dropped: HashSet<usize> =
                members.choose_multiple(rng, excess).cloned().collect();
            state.remove_many(&dropped);
            debug!(
                "adjust_attribute: {} = {}: trimmed {} (now {})",
                attribute, group, excess, required
            );
        }
    }

    for (group, required) in plan.iter() {
        let current = std::cmp::min(*counts.get(group).unwrap_or(&0), *required);
        if current >= *required {
            continue;
        }
        let pool = stratum_pool(dataset, col, group, Some(state));
        let mut needed = required - current;
        if pool.len() < needed {
            record_shortfall(shortfalls, attribute, group, *required, current + pool.len());
            needed = pool.len();
        }
        // The hard cap on the total sample size wins over the quota.
        let budget = total_samples - state.len();
        let added: Vec<usize> = pool
            .choose_multiple(rng, std::cmp::min(needed, budget))
            .cloned()
            .collect();
        for idx in added {
            state.insert(idx);
        }
    }
    Ok(())
}

/// Fills the selection back up to the requested total with uniform draws
/// from the unselected remainder of the whole dataset.
fn top_up(dataset: &Dataset, state: &mut SampleState, total_samples: usize, rng: &mut StdRng) {
    if state.len() >= total_samples {
        return;
    }
    let remainder: Vec<usize> = (0..dataset.num_rows())
        .filter(|&idx| !state.contains(idx))
        .collect();
    let missing = total_samples - state.len();
    let added: Vec<usize> = remainder
        .choose_multiple(rng, missing)
        .cloned()
        .collect();
    debug!("top_up: adding {} of {} missing records", added.len(), missing);
    for idx in added {
        state.insert(idx);
    }
}

/// Runs the full sampling pipeline: validation, initial stratified draw,
/// iterative multi-attribute adjustment, and comparison reporting.
///
/// Arguments:
/// * `dataset` the records to sample from
/// * `stratify` the attribute used for the initial stratified draw
/// * `balance` the attributes to balance, processed in the given order
/// * `targets` the benchmark distributions; must cover `stratify` and every
///   entry of `balance`
/// * `total_samples` the hard cap on the selection size
/// * `rules` iteration budget, tolerance and random seed
pub fn run_quota_sampling(
    dataset: &Dataset,
    stratify: &str,
    balance: &[String],
    targets: &[AttributeTarget],
    total_samples: usize,
    rules: &SamplerRules,
) -> Result<SamplingResult, SamplingErrors> {
    info!(
        "Sampling {} of {} records, stratified on {}, balancing {:?}, rules: {:?}",
        total_samples,
        dataset.num_rows(),
        stratify,
        balance,
        rules
    );

    if total_samples == 0 || total_samples > dataset.num_rows() {
        return Err(SamplingErrors::InvalidSampleSize {
            requested: total_samples,
            available: dataset.num_rows(),
        });
    }
    // Fail fast on any unknown attribute before touching the data.
    dataset.column_position(stratify)?;
    target_for(targets, stratify)?.normalized_shares()?;
    for attribute in balance.iter() {
        dataset.column_position(attribute)?;
        target_for(targets, attribute)?.normalized_shares()?;
    }
    for target in targets.iter() {
        dataset.column_position(&target.attribute)?;
    }

    let mut rng = StdRng::seed_from_u64(rules.random_seed);
    let mut shortfalls: Vec<Shortfall> = Vec::new();

    let mut state = initial_stratified_draw(
        dataset,
        stratify,
        targets,
        total_samples,
        &mut rng,
        &mut shortfalls,
    )?;
    // The floored quotas leave a residual, so the draw can come back short
    // of the requested total. Fill up before measuring the baseline: every
    // candidate state the snapshot below can finalize on is then full-size.
    top_up(dataset, &mut state, total_samples, &mut rng);
    let initial_distance = total_distance(dataset, &state, balance, targets)?;
    info!(
        "initial draw: {} records, distance {:.4}",
        state.len(),
        initial_distance
    );

    // Keep the best selection seen so far. Ties go to the most recent state,
    // which is the fullest one after top-up.
    let mut best_distance = initial_distance;
    let mut best_selection = state.selected.clone();
    let mut converged = initial_distance < rules.tolerance;
    let mut iterations_used: u32 = 0;

    if !converged {
        for iteration in 1..=rules.max_iterations {
            for attribute in balance.iter() {
                adjust_attribute(
                    dataset,
                    &mut state,
                    attribute,
                    targets,
                    total_samples,
                    &mut rng,
                    &mut shortfalls,
                )?;
                top_up(dataset, &mut state, total_samples, &mut rng);
            }
            let distance = total_distance(dataset, &state, balance, targets)?;
            iterations_used = iteration;
            debug!(
                "iteration {}: {} records, distance {:.4}",
                iteration,
                state.len(),
                distance
            );
            if distance <= best_distance {
                best_distance = distance;
                best_selection = state.selected.clone();
            }
            if distance < rules.tolerance {
                converged = true;
                break;
            }
        }
    }

    if !converged {
        info!(
            "iteration budget exhausted after {} passes, best distance {:.4}",
            iterations_used, best_distance
        );
    }

    let comparisons = build_comparison_report(dataset, &best_selection, targets)?;
    Ok(SamplingResult {
        selected: best_selection,
        comparisons,
        summary: RunSummary {
            converged,
            iterations_used,
            final_distance: best_distance,
            initial_distance,
            shortfalls,
        },
    })
}

/// Builds the target-versus-sampled comparison tables for a finalized
/// selection. Pure function of its inputs: calling it twice on the same
/// selection yields identical reports.
///
/// Every group present in either the target or the sample appears, with a
/// zero percentage on the side it is missing from. Target groups come
/// first, in target order, then sample-only groups in row order.
pub fn build_comparison_report(
    dataset: &Dataset,
    selected: &[usize],
    targets: &[AttributeTarget],
) -> Result<Vec<AttributeComparison>, SamplingErrors> {
    let sample_size = selected.len();
    let mut res: Vec<AttributeComparison> = Vec::new();
    for target in targets.iter() {
        let col = dataset.column_position(&target.attribute)?;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for &idx in selected.iter() {
            let e = counts.entry(dataset.value(idx, col).to_string()).or_insert(0);
            *e += 1;
        }
        let sampled_pct = |group: &str| -> f64 {
            if sample_size == 0 {
                0.0
            } else {
                100.0 * (*counts.get(group).unwrap_or(&0) as f64) / (sample_size as f64)
            }
        };

        let shares = target.normalized_shares()?;
        let mut groups: Vec<GroupComparison> = shares
            .iter()
            .map(|(group, pct)| GroupComparison {
                group: group.clone(),
                target_percent: *pct,
                sampled_percent: sampled_pct(group),
            })
            .collect();

        // Sampled groups the benchmark does not mention.
        let known: HashSet<&str> = shares.iter().map(|(g, _)| g.as_str()).collect();
        for group in dataset.groups(&target.attribute)?.iter() {
            if !known.contains(group.as_str()) && counts.contains_key(group) {
                groups.push(GroupComparison {
                    group: group.clone(),
                    target_percent: 0.0,
                    sampled_percent: sampled_pct(group),
                });
            }
        }
        res.push(AttributeComparison {
            attribute: target.attribute.clone(),
            groups,
        });
    }
    Ok(res)
}

/// Per-group occurrence counts for one attribute over the whole dataset, in
/// first-seen row order. This backs the distribution-count mode of the
/// command line interface.
pub fn attribute_counts(
    dataset: &Dataset,
    attribute: &str,
) -> Result<Vec<(String, usize)>, SamplingErrors> {
    let col = dataset.column_position(attribute)?;
    let mut tally: HashMap<String, usize> = HashMap::new();
    for idx in 0..dataset.num_rows() {
        let e = tally.entry(dataset.value(idx, col).to_string()).or_insert(0);
        *e += 1;
    }
    Ok(dataset
        .groups(attribute)?
        .into_iter()
        .map(|group| {
            let count = *tally.get(&group).unwrap_or(&0);
            (group, count)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        let cols: Vec<String> = columns.iter().map(|s| s.to_string()).collect();
        let mut builder = Builder::new(&cols);
        for row in rows.iter() {
            let cells: Vec<String> = row.iter().map(|s| s.to_string()).collect();
            builder.add_row(&cells).unwrap();
        }
        builder.build().unwrap()
    }

    /// A one-column dataset with the given number of records per group.
    fn color_dataset(reds: usize, blues: usize) -> Dataset {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for _ in 0..reds {
            rows.push(vec!["Red".to_string()]);
        }
        for _ in 0..blues {
            rows.push(vec!["Blue".to_string()]);
        }
        let mut builder = Builder::new(&["Color".to_string()]);
        for row in rows.iter() {
            builder.add_row(row).unwrap();
        }
        builder.build().unwrap()
    }

    fn count_group(dataset: &Dataset, selected: &[usize], col: usize, group: &str) -> usize {
        selected
            .iter()
            .filter(|&&idx| dataset.value(idx, col) == group)
            .count()
    }

    #[test]
    fn balanced_color_quota_is_met_exactly() {
        let data = color_dataset(60, 40);
        let targets = vec![AttributeTarget::new(
            "Color",
            &[("Red", 50.0), ("Blue", 50.0)],
        )];
        let res = run_quota_sampling(
            &data,
            "Color",
            &["Color".to_string()],
            &targets,
            10,
            &SamplerRules::DEFAULT_RULES,
        )
        .unwrap();

        assert_eq!(res.selected.len(), 10);
        assert_eq!(count_group(&data, &res.selected, 0, "Red"), 5);
        assert_eq!(count_group(&data, &res.selected, 0, "Blue"), 5);
        assert!(res.summary.converged);
        assert!(res.summary.shortfalls.is_empty());
        assert_eq!(res.summary.final_distance, 0.0);
    }

    #[test]
    fn floor_residual_still_fills_the_sample() {
        // Quotas floor to 5 + 4, leaving one record unassigned. With an
        // ample population the run must still return the full sample.
        let data = color_dataset(50, 50);
        let targets = vec![AttributeTarget::new(
            "Color",
            &[("Red", 55.0), ("Blue", 45.0)],
        )];
        let res = run_quota_sampling(
            &data,
            "Color",
            &["Color".to_string()],
            &targets,
            10,
            &SamplerRules::DEFAULT_RULES,
        )
        .unwrap();

        assert_eq!(res.selected.len(), 10);
        let distinct: HashSet<usize> = res.selected.iter().cloned().collect();
        assert_eq!(distinct.len(), res.selected.len());
        assert!(res.summary.shortfalls.is_empty());
        assert!(res.summary.final_distance <= res.summary.initial_distance);
    }

    #[test]
    fn starved_stratum_is_absorbed_not_fatal() {
        let data = color_dataset(10, 0);
        let targets = vec![AttributeTarget::new(
            "Color",
            &[("Red", 50.0), ("Blue", 50.0)],
        )];
        let res = run_quota_sampling(
            &data,
            "Color",
            &["Color".to_string()],
            &targets,
            10,
            &SamplerRules::DEFAULT_RULES,
        )
        .unwrap();

        // The run completes with everything that exists: 10 red records.
        assert_eq!(res.selected.len(), 10);
        assert_eq!(count_group(&data, &res.selected, 0, "Red"), 10);
        assert!(!res.summary.converged);
        let blue = res
            .summary
            .shortfalls
            .iter()
            .find(|s| s.group == "Blue")
            .expect("expected a shortfall for Blue");
        assert_eq!(blue.attribute, "Color");
        assert_eq!(blue.requested, 5);
        assert_eq!(blue.available, 0);
    }

    #[test]
    fn no_duplicates_and_size_bound() {
        let data = dataset(
            &["Color", "Size"],
            &[
                &["Red", "S"],
                &["Red", "S"],
                &["Red", "M"],
                &["Red", "M"],
                &["Red", "L"],
                &["Blue", "S"],
                &["Blue", "M"],
                &["Blue", "L"],
                &["Blue", "L"],
                &["Green", "M"],
                &["Green", "L"],
                &["Green", "S"],
            ],
        );
        let targets = vec![
            AttributeTarget::new("Color", &[("Red", 40.0), ("Blue", 40.0), ("Green", 20.0)]),
            AttributeTarget::new("Size", &[("S", 30.0), ("M", 40.0), ("L", 30.0)]),
        ];
        let res = run_quota_sampling(
            &data,
            "Color",
            &["Color".to_string(), "Size".to_string()],
            &targets,
            8,
            &SamplerRules::DEFAULT_RULES,
        )
        .unwrap();

        assert!(res.selected.len() <= 8);
        let distinct: HashSet<usize> = res.selected.iter().cloned().collect();
        assert_eq!(distinct.len(), res.selected.len());
    }

    #[test]
    fn same_seed_same_selection() {
        let data = dataset(
            &["Color", "Size"],
            &[
                &["Red", "S"],
                &["Red", "M"],
                &["Red", "L"],
                &["Red", "S"],
                &["Blue", "M"],
                &["Blue", "L"],
                &["Blue", "S"],
                &["Green", "M"],
                &["Green", "L"],
                &["Green", "S"],
            ],
        );
        let targets = vec![
            AttributeTarget::new("Color", &[("Red", 50.0), ("Blue", 30.0), ("Green", 20.0)]),
            AttributeTarget::new("Size", &[("S", 34.0), ("M", 33.0), ("L", 33.0)]),
        ];
        let rules = SamplerRules {
            max_iterations: 10,
            tolerance: 0.05,
            random_seed: 7,
        };
        let balance = ["Color".to_string(), "Size".to_string()];
        let first = run_quota_sampling(&data, "Color", &balance, &targets, 6, &rules).unwrap();
        let second = run_quota_sampling(&data, "Color", &balance, &targets, 6, &rules).unwrap();
        assert_eq!(first.selected, second.selected);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.comparisons, second.comparisons);
    }

    #[test]
    fn adjustment_never_worse_than_initial_draw() {
        // Stratify on Color only, then balance on Size: the initial draw
        // ignores Size entirely, so the loop has real work to do.
        let data = dataset(
            &["Color", "Size"],
            &[
                &["Red", "S"],
                &["Red", "S"],
                &["Red", "S"],
                &["Red", "S"],
                &["Red", "M"],
                &["Red", "L"],
                &["Blue", "M"],
                &["Blue", "M"],
                &["Blue", "L"],
                &["Blue", "L"],
                &["Blue", "S"],
                &["Blue", "S"],
            ],
        );
        let targets = vec![
            AttributeTarget::new("Color", &[("Red", 50.0), ("Blue", 50.0)]),
            AttributeTarget::new("Size", &[("S", 33.0), ("M", 33.0), ("L", 34.0)]),
        ];
        let res = run_quota_sampling(
            &data,
            "Color",
            &["Size".to_string()],
            &targets,
            6,
            &SamplerRules {
                max_iterations: 10,
                tolerance: 0.05,
                random_seed: 3,
            },
        )
        .unwrap();
        assert!(res.summary.final_distance <= res.summary.initial_distance);
    }

    #[test]
    fn comparison_report_is_idempotent() {
        let data = color_dataset(6, 4);
        let targets = vec![AttributeTarget::new(
            "Color",
            &[("Red", 60.0), ("Blue", 40.0)],
        )];
        let selected = vec![0usize, 1, 2, 6, 7];
        let first = build_comparison_report(&data, &selected, &targets).unwrap();
        let second = build_comparison_report(&data, &selected, &targets).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn report_covers_groups_on_either_side() {
        // "Green" is sampled but not in the target; "Blue" is targeted but
        // never sampled.
        let data = dataset(&["Color"], &[&["Red"], &["Red"], &["Green"], &["Blue"]]);
        let targets = vec![AttributeTarget::new(
            "Color",
            &[("Red", 50.0), ("Blue", 50.0)],
        )];
        let report = build_comparison_report(&data, &[0, 1, 2], &targets).unwrap();
        let rows = &report[0].groups;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].group, "Red");
        assert!((rows[0].sampled_percent - 100.0 * 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(rows[1].group, "Blue");
        assert_eq!(rows[1].sampled_percent, 0.0);
        assert_eq!(rows[2].group, "Green");
        assert_eq!(rows[2].target_percent, 0.0);
        assert!(rows[2].sampled_percent > 0.0);
    }

    #[test]
    fn targets_are_normalized_as_relative_weights() {
        let target = AttributeTarget::new("Color", &[("Red", 2.0), ("Blue", 2.0)]);
        let shares = target.normalized_shares().unwrap();
        assert_eq!(shares[0].1, 50.0);
        assert_eq!(shares[1].1, 50.0);

        // A weight table summing to zero cannot be used.
        let broken = AttributeTarget::new("Color", &[("Red", 0.0)]);
        assert_eq!(
            broken.normalized_shares(),
            Err(SamplingErrors::InvalidTarget("Color".to_string()))
        );
    }

    #[test]
    fn unknown_attributes_fail_fast() {
        let data = color_dataset(5, 5);
        let targets = vec![AttributeTarget::new(
            "Color",
            &[("Red", 50.0), ("Blue", 50.0)],
        )];
        let rules = SamplerRules::DEFAULT_RULES;

        let missing_column = run_quota_sampling(
            &data,
            "Shade",
            &["Color".to_string()],
            &targets,
            4,
            &rules,
        );
        assert_eq!(
            missing_column,
            Err(SamplingErrors::InvalidAttribute("Shade".to_string()))
        );

        // Known column, but no benchmark for it.
        let missing_target = run_quota_sampling(
            &data,
            "Color",
            &["Color".to_string()],
            &[AttributeTarget::new("Shade", &[("Dark", 100.0)])],
            4,
            &rules,
        );
        assert_eq!(
            missing_target,
            Err(SamplingErrors::InvalidAttribute("Color".to_string()))
        );
    }

    #[test]
    fn sample_size_bounds_are_checked() {
        let data = color_dataset(5, 5);
        let targets = vec![AttributeTarget::new(
            "Color",
            &[("Red", 50.0), ("Blue", 50.0)],
        )];
        let rules = SamplerRules::DEFAULT_RULES;
        let balance = ["Color".to_string()];

        assert_eq!(
            run_quota_sampling(&data, "Color", &balance, &targets, 0, &rules),
            Err(SamplingErrors::InvalidSampleSize {
                requested: 0,
                available: 10
            })
        );
        assert_eq!(
            run_quota_sampling(&data, "Color", &balance, &targets, 11, &rules),
            Err(SamplingErrors::InvalidSampleSize {
                requested: 11,
                available: 10
            })
        );
    }

    #[test]
    fn conflicting_attributes_are_reproducible() {
        // Color and Size pull against each other: every Red record is S.
        let mut rows: Vec<Vec<String>> = Vec::new();
        for _ in 0..25 {
            rows.push(vec!["Red".to_string(), "S".to_string()]);
        }
        for i in 0..25 {
            let size = if i % 2 == 0 { "M" } else { "L" };
            rows.push(vec!["Blue".to_string(), size.to_string()]);
        }
        let mut builder = Builder::new(&["Color".to_string(), "Size".to_string()]);
        for row in rows.iter() {
            builder.add_row(row).unwrap();
        }
        let data = builder.build().unwrap();

        let targets = vec![
            AttributeTarget::new("Color", &[("Red", 50.0), ("Blue", 50.0)]),
            AttributeTarget::new("Size", &[("S", 20.0), ("M", 40.0), ("L", 40.0)]),
        ];
        let rules = SamplerRules {
            max_iterations: 10,
            tolerance: 0.05,
            random_seed: 11,
        };
        let balance = ["Color".to_string(), "Size".to_string()];
        let first = run_quota_sampling(&data, "Color", &balance, &targets, 20, &rules).unwrap();
        let second = run_quota_sampling(&data, "Color", &balance, &targets, 20, &rules).unwrap();
        assert_eq!(first.summary.converged, second.summary.converged);
        assert_eq!(first.selected, second.selected);
        assert!(first.selected.len() <= 20);
    }

    #[test]
    fn attribute_counts_tally_the_whole_dataset() {
        let data = dataset(
            &["Color"],
            &[&["Red"], &["Blue"], &["Red"], &["Green"], &["Red"]],
        );
        let counts = attribute_counts(&data, "Color").unwrap();
        assert_eq!(
            counts,
            vec![
                ("Red".to_string(), 3),
                ("Blue".to_string(), 1),
                ("Green".to_string(), 1)
            ]
        );
    }
}
