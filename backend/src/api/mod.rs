//! HTTP API module.
//!
//! Upload a listings CSV and get the five tables back as JSON; pipeline
//! logs are streamed over SSE.

pub mod server;
pub mod types;

pub use server::{router, start_server};
pub use types::*;
