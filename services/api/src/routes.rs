use crate::infra::{generate_report, resolve_range, AppState, ReportResponse, TableSource};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use weekly_report::error::AppError;

const INLINE_TABLE_NAME: &str = "inline";

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(default)]
    pub(crate) start_week: Option<i64>,
    #[serde(default)]
    pub(crate) end_week: Option<i64>,
    /// CSV export to report on instead of the configured table.
    #[serde(default)]
    pub(crate) table_csv: Option<String>,
    #[serde(default)]
    pub(crate) table_name: Option<String>,
}

pub(crate) fn report_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/report", post(report_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    let ReportRequest {
        start_week,
        end_week,
        table_csv,
        table_name,
    } = payload;

    let inline = table_csv.map(|csv| {
        let name = table_name.unwrap_or_else(|| INLINE_TABLE_NAME.to_string());
        (name, csv)
    });
    let source = TableSource::select(inline, None, &state.report)?;
    let range = resolve_range(state.report.default_range, start_week, end_week);

    let response = generate_report(&source, &state.report.settings, range).await?;
    info!(
        table = %response.table_name,
        start_week = range.start,
        end_week = range.end,
        groups = response.groups.len(),
        "report served"
    );

    Ok(Json(response))
}
