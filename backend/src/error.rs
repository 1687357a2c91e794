//! Error types for the Propstar pipeline.
//!
//! - [`CsvError`] - listing CSV parsing errors
//! - [`ExportError`] - writing star-schema tables
//! - [`CrawlError`] - listing site crawler errors
//! - [`ConfigError`] - environment configuration errors
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP API errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading a listings CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV row.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Delimiter must be a single ASCII character.
    #[error("Delimiter '{0}' is not an ASCII character")]
    InvalidDelimiter(char),

    /// A required column is absent from the header row.
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// A data row is too short to hold a required column.
    #[error("Record {record}: missing field '{field}'")]
    MissingField { record: usize, field: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while persisting tables.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output directory or file.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("Failed to serialize {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
}

// =============================================================================
// Crawl Errors
// =============================================================================

/// Errors from the listing site crawler.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("Unexpected status {status} for {url}")]
    BadStatus { status: u16, url: String },

    /// URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// CSS selector failed to compile.
    #[error("Invalid selector '{0}'")]
    Selector(String),

    /// Writing the scraped listings failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors from environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Crawl error.
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No records to transform.
    #[error("No records to transform")]
    EmptyInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for crawl operations.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
