//! High-level pipeline API: listings CSV → star schema → table files.
//!
//! # Example
//!
//! ```rust,ignore
//! use propstar::transform::pipeline::{run_file, TransformOptions};
//! use std::path::Path;
//!
//! let report = run_file(
//!     Path::new("realestate.csv"),
//!     TransformOptions::default().with_output_dir("warehouse"),
//! )?;
//! println!("{}", report.schema.summary());
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::passes::{transform, unparseable_dates};
use crate::error::{CsvError, PipelineError, PipelineResult};
use crate::export::{write_star_schema, ExportedTable};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::StarSchema;
use crate::parser::{parse_bytes, parse_file_auto, ParseResult};

/// Options for the transformation pipeline
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Force a delimiter instead of auto-detecting it
    pub delimiter: Option<char>,

    /// Write the five tables here; `None` keeps them in memory only
    pub output_dir: Option<PathBuf>,
}

impl TransformOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub schema: StarSchema,
    pub csv_info: CsvInfo,
    /// Date cells present but not in `DD/MM/YYYY` form
    pub unparseable_dates: usize,
    /// Files written, empty when no output dir was given
    pub exported: Vec<ExportedTable>,
}

/// Transform a listings file.
pub fn run_file(path: &Path, options: TransformOptions) -> PipelineResult<PipelineReport> {
    log_info(format!("📖 Reading {}", path.display()));
    let parse_result = match options.delimiter {
        Some(d) => {
            let bytes = std::fs::read(path).map_err(CsvError::from)?;
            parse_bytes(&bytes, Some(d))?
        }
        None => parse_file_auto(path)?,
    };
    run_parsed(parse_result, options)
}

/// Transform listing bytes (e.g. an upload).
pub fn run_bytes(bytes: &[u8], options: TransformOptions) -> PipelineResult<PipelineReport> {
    let parse_result = parse_bytes(bytes, options.delimiter)?;
    run_parsed(parse_result, options)
}

/// Transform already-parsed listings.
pub fn run_parsed(parse_result: ParseResult, options: TransformOptions) -> PipelineResult<PipelineReport> {
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parse_result.delimiter)));
    log_success(format!("Read {} listings", parse_result.records.len()));

    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.records.len(),
    };

    if parse_result.records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let bad_dates = unparseable_dates(&parse_result.records);
    if !bad_dates.is_empty() {
        log_warning(format!("{} date values could not be parsed (kept as null)", bad_dates.len()));
        for (record, field, value) in bad_dates.iter().take(3) {
            log_info_indent(format!("record {}: {} = '{}'", record, field, value), 1);
        }
    }

    log_info("⚙️  Building dimensions...");
    let schema = transform(&parse_result.records);
    log_success(schema.summary());

    let exported = match options.output_dir {
        Some(ref dir) => {
            log_info(format!("💾 Writing tables to {}", dir.display()));
            let tables = write_star_schema(&schema, dir)?;
            for table in &tables {
                log_info_indent(format!("{} ({} rows)", table.path.display(), table.rows), 1);
            }
            tables
        }
        None => Vec::new(),
    };

    Ok(PipelineReport {
        schema,
        csv_info,
        unparseable_dates: bad_dates.len(),
        exported,
    })
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
