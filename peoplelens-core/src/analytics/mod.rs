//! Aggregate computations behind the dashboard charts. Rendering lives in
//! the UI layer; these produce plain data.

pub mod charts;
pub mod summary;

pub use charts::{
    BoxStats, CorrelationEntry, DeptAverage, HistogramBin, ScatterPoint, ViolinSeries,
    activity_scatter, correlation_ranking, mean_stress_by_dept, satisfaction_histogram,
    sleep_by_satisfaction, workload_box_by_satisfaction,
};
pub use summary::DatasetSummary;
