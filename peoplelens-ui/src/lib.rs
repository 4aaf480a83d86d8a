//! Dashboard HTTP surface: summary metrics, filtered chart data, form
//! options, and the prediction endpoint.
//!
//! Dataset and model artifacts are loaded once at startup into [`AppState`]
//! and shared read-only; nothing here mutates after boot.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use peoplelens_core::analytics::{
    self, BoxStats, CorrelationEntry, DatasetSummary, DeptAverage, HistogramBin, ScatterPoint,
    ViolinSeries,
};
use peoplelens_core::data::{DashboardFilter, SurveyDataset};
use peoplelens_core::error::AnalyticsError;
use peoplelens_core::inference::{PredictionInput, Predictor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared, read-only application state.
pub struct AppState {
    pub dataset: SurveyDataset,
    pub predictor: Predictor,
}

/// Build the dashboard router over loaded state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/summary", get(summary))
        .route("/api/dashboard", get(dashboard))
        .route("/api/form-options", get(form_options))
        .route("/api/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn summary(State(state): State<Arc<AppState>>) -> axum::Json<DatasetSummary> {
    axum::Json(DatasetSummary::compute(&state.dataset))
}

/// Sidebar filter parameters; departments arrive comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub depts: Option<String>,
    pub age_min: Option<f64>,
    pub age_max: Option<f64>,
}

impl DashboardQuery {
    fn into_filter(self) -> DashboardFilter {
        let depts = self.depts.map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<BTreeSet<String>>()
        });
        DashboardFilter {
            depts,
            age_min: self.age_min,
            age_max: self.age_max,
        }
    }
}

/// All six chart payloads computed over the filtered dataset, plus an echo
/// of the filter they were computed under.
#[derive(Debug, Serialize)]
pub struct DashboardPayload {
    pub filter: DashboardFilter,
    pub summary: DatasetSummary,
    pub rows: usize,
    pub satisfaction_histogram: Vec<HistogramBin>,
    pub stress_by_dept: Vec<DeptAverage>,
    pub activity_scatter: Vec<ScatterPoint>,
    pub workload_box: Vec<BoxStats>,
    pub sleep_violin: Vec<ViolinSeries>,
    pub correlation_ranking: Vec<CorrelationEntry>,
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> axum::Json<DashboardPayload> {
    let filter = query.into_filter();
    let filtered = filter.apply(&state.dataset);
    axum::Json(DashboardPayload {
        summary: DatasetSummary::compute(&filtered),
        rows: filtered.len(),
        filter,
        satisfaction_histogram: analytics::satisfaction_histogram(&filtered),
        stress_by_dept: analytics::mean_stress_by_dept(&filtered),
        activity_scatter: analytics::activity_scatter(&filtered),
        workload_box: analytics::workload_box_by_satisfaction(&filtered),
        sleep_violin: analytics::sleep_by_satisfaction(&filtered),
        correlation_ranking: analytics::correlation_ranking(&filtered, 10),
    })
}

/// A numeric form field with its slider bounds and default.
#[derive(Debug, Serialize)]
pub struct SliderSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// Everything the prediction form needs to render itself.
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub sliders: Vec<SliderSpec>,
    pub genders: Vec<String>,
    pub marital_statuses: Vec<String>,
    pub job_levels: Vec<String>,
    pub depts: Vec<String>,
    pub emp_types: Vec<String>,
    pub commute_modes: Vec<String>,
    pub edu_levels: Vec<String>,
    pub age_range: Option<(f64, f64)>,
}

async fn form_options(State(state): State<Arc<AppState>>) -> axum::Json<FormOptions> {
    let ds = &state.dataset;
    axum::Json(FormOptions {
        sliders: slider_specs(),
        genders: vec!["Male".to_string(), "Female".to_string()],
        marital_statuses: vec!["Single".to_string(), "Married".to_string()],
        job_levels: ds.distinct("job_level"),
        depts: ds.distinct("dept"),
        emp_types: ds.distinct("emp_type"),
        commute_modes: ds.distinct("commute_mode"),
        edu_levels: ds.distinct("edu_level"),
        age_range: ds.age_range(),
    })
}

fn slider_specs() -> Vec<SliderSpec> {
    vec![
        SliderSpec { name: "age", min: 18.0, max: 60.0, default: 30.0 },
        SliderSpec { name: "experience", min: 0.0, max: 40.0, default: 5.0 },
        SliderSpec { name: "wlb", min: 1.0, max: 5.0, default: 3.0 },
        SliderSpec { name: "work_env", min: 1.0, max: 5.0, default: 3.0 },
        SliderSpec { name: "physical_activity_hours", min: 0.0, max: 15.0, default: 3.0 },
        SliderSpec { name: "workload", min: 1.0, max: 5.0, default: 3.0 },
        SliderSpec { name: "stress", min: 1.0, max: 5.0, default: 3.0 },
        SliderSpec { name: "sleep_hours", min: 0.0, max: 12.0, default: 7.0 },
        SliderSpec { name: "commute_distance", min: 0.0, max: 100.0, default: 10.0 },
        SliderSpec { name: "num_companies", min: 0.0, max: 10.0, default: 2.0 },
        SliderSpec { name: "team_size", min: 1.0, max: 100.0, default: 10.0 },
        SliderSpec { name: "num_reports", min: 0.0, max: 10.0, default: 0.0 },
        SliderSpec { name: "training_hours_per_year", min: 0.0, max: 100.0, default: 20.0 },
    ]
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: i64,
}

async fn predict(
    State(state): State<Arc<AppState>>,
    axum::Json(input): axum::Json<PredictionInput>,
) -> Result<axum::Json<PredictionResponse>, ApiError> {
    let prediction = state.predictor.predict(&input)?;
    Ok(axum::Json(PredictionResponse { prediction }))
}

/// HTTP mapping for core errors: validation problems are the client's
/// fault, everything else is ours.
pub struct ApiError(AnalyticsError);

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AnalyticsError::UnseenCategory { .. } | AnalyticsError::InvalidInput(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AnalyticsError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = axum::Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use peoplelens_core::config::TrainingConfig;
    use peoplelens_core::data::SurveyRecord;
    use peoplelens_core::encode::UnseenPolicy;
    use peoplelens_core::training::train;
    use tower::util::ServiceExt;

    fn record(i: i64, dept: &str, satisfaction: i64) -> SurveyRecord {
        SurveyRecord {
            emp_id: format!("E{i:03}"),
            gender: if i % 2 == 0 { "Male" } else { "Female" }.to_string(),
            age: 22.0 + i as f64,
            marital_status: "Single".to_string(),
            job_level: "Mid".to_string(),
            experience: (i % 10) as f64,
            dept: dept.to_string(),
            emp_type: "Full-Time".to_string(),
            wlb: satisfaction as f64,
            work_env: 3.0,
            physical_activity_hours: (i % 7) as f64,
            workload: (6 - satisfaction) as f64,
            stress: (6 - satisfaction) as f64,
            sleep_hours: 4.0 + satisfaction as f64,
            commute_mode: "Car".to_string(),
            commute_distance: 10.0,
            num_companies: 2.0,
            team_size: 10.0,
            num_reports: 0.0,
            edu_level: "Bachelor".to_string(),
            have_ot: i % 2 == 0,
            training_hours_per_year: 20.0,
            job_satisfaction: satisfaction,
        }
    }

    fn test_state() -> Arc<AppState> {
        let depts = ["Engineering", "Sales", "HR"];
        let records: Vec<SurveyRecord> = (0..45i64)
            .map(|i| record(i, depts[(i % 3) as usize], (i % 5) + 1))
            .collect();
        let dataset = SurveyDataset::new(records);
        let outcome = train(
            &dataset,
            &TrainingConfig {
                n_estimators: 6,
                max_depth: Some(6),
                test_fraction: 0.2,
                oversample_neighbors: 3,
                seed: 42,
            },
        )
        .unwrap();
        Arc::new(AppState {
            dataset,
            predictor: Predictor::new(outcome.artifacts, UnseenPolicy::Reject),
        })
    }

    async fn call(request: Request<Body>) -> Response {
        router(test_state()).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_summary_ok() {
        let response = call(Request::get("/api/summary").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dashboard_with_filters_ok() {
        let response = call(
            Request::get("/api/dashboard?depts=Engineering,Sales&age_min=25&age_max=50")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dashboard_echoes_applied_filter() {
        let response = call(
            Request::get("/api/dashboard?depts=Engineering&age_min=25&age_max=50")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["filter"]["depts"], serde_json::json!(["Engineering"]));
        assert_eq!(payload["filter"]["age_min"], serde_json::json!(25.0));
        assert_eq!(payload["filter"]["age_max"], serde_json::json!(50.0));
    }

    #[tokio::test]
    async fn test_form_options_ok() {
        let response = call(Request::get("/api/form-options").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_ok() {
        let payload = serde_json::json!({
            "dept": "Engineering",
            "job_level": "Mid",
            "emp_type": "Full-Time",
            "commute_mode": "Car",
            "edu_level": "Bachelor",
            "have_ot": false
        });
        let response = call(
            Request::post("/api/predict")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_unseen_category_is_422() {
        let payload = serde_json::json!({
            "dept": "Cryptozoology",
            "job_level": "Mid",
            "emp_type": "Full-Time",
            "commute_mode": "Car",
            "edu_level": "Bachelor"
        });
        let response = call(
            Request::post("/api/predict")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_dashboard_query_parses_dept_list() {
        let query = DashboardQuery {
            depts: Some("Engineering, Sales,,HR".to_string()),
            age_min: Some(20.0),
            age_max: None,
        };
        let filter = query.into_filter();
        let depts = filter.depts.unwrap();
        assert_eq!(depts.len(), 3);
        assert!(depts.contains("Sales"));
        assert_eq!(filter.age_min, Some(20.0));
    }

    #[test]
    fn test_slider_specs_cover_form() {
        let specs = slider_specs();
        assert_eq!(specs.len(), 13);
        let sleep = specs.iter().find(|s| s.name == "sleep_hours").unwrap();
        assert_eq!(sleep.default, 7.0);
        assert_eq!(sleep.max, 12.0);
    }
}
