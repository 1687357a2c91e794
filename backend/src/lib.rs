//! # Propstar - Real-estate listings to a dimensional star schema
//!
//! Propstar scrapes property listings into a flat CSV and turns that CSV
//! into four dimension tables and one fact table with `<prefix>_<n>`
//! surrogate keys.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Crawler   │────▶│  Listings   │────▶│  Transform  │────▶│  Dim_* and  │
//! │ (HTML→rows) │     │ CSV (parse) │     │  (5 passes) │     │ Fact_* CSVs │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use propstar::{run_file, TransformOptions};
//! use std::path::Path;
//!
//! let report = run_file(
//!     Path::new("realestate.csv"),
//!     TransformOptions::default().with_output_dir("warehouse"),
//! )?;
//! println!("{}", report.schema.summary());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment configuration
//! - [`logs`] - Log entries and the SSE broadcaster
//! - [`models`] - Raw listings and star-schema rows
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Surrogate keys, dimension passes, pipeline
//! - [`export`] - Table persistence
//! - [`crawler`] - Listing site scraper
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Persistence
pub mod export;

// Scraping
pub mod crawler;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, CrawlError, CsvError, ExportError, PipelineError, PipelineResult, ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AmenityBridgeRow, FactRow, LocationRow, PropertyRow, RawListing, StarSchema, TimeRow,
    REQUIRED_COLUMNS,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_bytes_auto,
    parse_file_auto, parse_listings, ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::pipeline::{
    format_delimiter, run_bytes, run_file, run_parsed, CsvInfo, PipelineReport, TransformOptions,
};
pub use transform::{transform, KeyGenerator};

// =============================================================================
// Re-exports - Export, crawler, config
// =============================================================================

pub use config::{CrawlConfig, ServerConfig};
pub use crawler::{crawl_to_csv, Crawler};
pub use export::{write_listings, write_star_schema, ExportedTable};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, TransformResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
