//! REST API types.
//!
//! The five tables are returned as row arrays under `tables`, keyed
//! `property`, `location`, `time`, `amenities` and `facts`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{PipelineError, ServerError};
use crate::models::StarSchema;
use crate::transform::pipeline::{format_delimiter, PipelineReport};

/// Response sent after a listings upload has been transformed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready", or "warning" when some dates could not be parsed
    pub status: String,

    pub tables: StarSchema,

    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub csv_info: CsvMetadata,
    pub counts: TableCounts,
    pub unparseable_dates: usize,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Row count per table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableCounts {
    pub property: usize,
    pub location: usize,
    pub time: usize,
    pub amenities: usize,
    pub facts: usize,
}

impl From<&StarSchema> for TableCounts {
    fn from(schema: &StarSchema) -> Self {
        Self {
            property: schema.property.len(),
            location: schema.location.len(),
            time: schema.time.len(),
            amenities: schema.amenities.len(),
            facts: schema.facts.len(),
        }
    }
}

impl From<PipelineReport> for TransformResponse {
    fn from(report: PipelineReport) -> Self {
        let status = if report.unparseable_dates == 0 { "ready" } else { "warning" };

        TransformResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            metadata: ResponseMetadata {
                counts: TableCounts::from(&report.schema),
                unparseable_dates: report.unparseable_dates,
                csv_info: CsvMetadata {
                    encoding: report.csv_info.encoding,
                    delimiter: format_delimiter(report.csv_info.delimiter),
                    row_count: report.csv_info.row_count,
                    columns: report.csv_info.headers,
                },
            },
            tables: report.schema,
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "tables": {
            "property": [],
            "location": [],
            "time": [],
            "amenities": [],
            "facts": []
        }
    })
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Csv(_) | PipelineError::EmptyInput) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), Json(error_response(&self.to_string()))).into_response()
    }
}
