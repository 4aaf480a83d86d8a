//! Data series for the six dashboard chart views.

use crate::data::survey::{NUMERIC_COLUMNS, SATISFACTION_RANGE, SurveyDataset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Count of rows per satisfaction level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBin {
    pub level: i64,
    pub count: usize,
}

/// Grouped average for one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeptAverage {
    pub dept: String,
    pub mean_stress: f64,
}

/// One point of the activity-vs-satisfaction scatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub physical_activity_hours: f64,
    pub job_satisfaction: i64,
    pub dept: String,
    pub stress: f64,
    pub age: f64,
    pub wlb: f64,
    pub work_env: f64,
}

/// Five-number summary of workload for one satisfaction level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxStats {
    pub level: i64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Raw sample series per satisfaction level (violin / strip plots).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolinSeries {
    pub level: i64,
    pub samples: Vec<f64>,
}

/// One entry of the correlation ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub column: String,
    pub r: f64,
}

/// Satisfaction distribution over the 1..=5 scale; empty levels included.
pub fn satisfaction_histogram(dataset: &SurveyDataset) -> Vec<HistogramBin> {
    let mut counts: BTreeMap<i64, usize> = SATISFACTION_RANGE.map(|l| (l, 0)).collect();
    for record in dataset.records() {
        if let Some(count) = counts.get_mut(&record.job_satisfaction) {
            *count += 1;
        }
    }
    counts
        .into_iter()
        .map(|(level, count)| HistogramBin { level, count })
        .collect()
}

/// Mean stress per department, sorted by department name.
pub fn mean_stress_by_dept(dataset: &SurveyDataset) -> Vec<DeptAverage> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in dataset.records() {
        let entry = sums.entry(record.dept.clone()).or_insert((0.0, 0));
        entry.0 += record.stress;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(dept, (sum, n))| DeptAverage {
            dept,
            mean_stress: sum / n as f64,
        })
        .collect()
}

/// Physical activity vs satisfaction scatter with hover context.
pub fn activity_scatter(dataset: &SurveyDataset) -> Vec<ScatterPoint> {
    dataset
        .records()
        .iter()
        .map(|r| ScatterPoint {
            physical_activity_hours: r.physical_activity_hours,
            job_satisfaction: r.job_satisfaction,
            dept: r.dept.clone(),
            stress: r.stress,
            age: r.age,
            wlb: r.wlb,
            work_env: r.work_env,
        })
        .collect()
}

/// Workload quartiles per satisfaction level; levels with no rows omitted.
pub fn workload_box_by_satisfaction(dataset: &SurveyDataset) -> Vec<BoxStats> {
    let mut by_level: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for record in dataset.records() {
        by_level
            .entry(record.job_satisfaction)
            .or_default()
            .push(record.workload);
    }
    by_level
        .into_iter()
        .map(|(level, mut samples)| {
            samples.sort_by(f64::total_cmp);
            BoxStats {
                level,
                min: samples[0],
                q1: quantile(&samples, 0.25),
                median: quantile(&samples, 0.5),
                q3: quantile(&samples, 0.75),
                max: samples[samples.len() - 1],
            }
        })
        .collect()
}

/// Sleep hour samples per satisfaction level.
pub fn sleep_by_satisfaction(dataset: &SurveyDataset) -> Vec<ViolinSeries> {
    let mut by_level: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for record in dataset.records() {
        by_level
            .entry(record.job_satisfaction)
            .or_default()
            .push(record.sleep_hours);
    }
    by_level
        .into_iter()
        .map(|(level, samples)| ViolinSeries { level, samples })
        .collect()
}

/// Pearson correlation of every numeric column against satisfaction,
/// ranked by absolute value. Zero-variance columns are skipped.
pub fn correlation_ranking(dataset: &SurveyDataset, top_n: usize) -> Vec<CorrelationEntry> {
    let targets: Vec<f64> = dataset
        .records()
        .iter()
        .map(|r| r.job_satisfaction as f64)
        .collect();

    let mut entries: Vec<CorrelationEntry> = NUMERIC_COLUMNS
        .iter()
        .filter_map(|column| {
            let values: Vec<f64> = dataset
                .records()
                .iter()
                .filter_map(|r| r.numeric_value(column))
                .collect();
            pearson(&values, &targets).map(|r| CorrelationEntry {
                column: column.to_string(),
                r,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
    entries.truncate(top_n);
    entries
}

/// Linear interpolation quantile over sorted samples.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Pearson r; `None` when either side has zero variance or too few rows.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
