use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::report::ReportError;
use crate::workflows::table::TableError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Report(ReportError),
    Table(TableError),
    /// No table data was supplied and none is configured.
    MissingTable,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Report(ReportError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Report(ReportError::NotInitialized | ReportError::RangeNotConfigured)
            | AppError::MissingTable => StatusCode::BAD_REQUEST,
            AppError::Report(ReportError::Table(TableError::Csv(_) | TableError::InvalidCell { .. }))
            | AppError::Table(TableError::Csv(_) | TableError::InvalidCell { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Report(ReportError::Table(_)) | AppError::Table(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::Table(err) => write!(f, "table error: {}", err),
            AppError::MissingTable => {
                write!(f, "no task table supplied and REPORT_TABLE_PATH is not set")
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Table(err) => Some(err),
            AppError::MissingTable => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<TableError> for AppError {
    fn from(value: TableError) -> Self {
        Self::Table(value)
    }
}
