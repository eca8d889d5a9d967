//! Error types surfaced across the fuse feed boundary.
//!
//! Everything below the coordinator (fetch, parse, filter failures) is
//! recovered locally per source and never escapes as an `Err` — see
//! `FusedFeed::fetch`. The only errors this crate surfaces are spec
//! parsing failures, which the HTTP boundary maps to 400/404.

use super::*;

#[derive(thiserror::Error, Debug)]
pub enum SpecError {
    #[error("spec document is empty")]
    Empty,

    #[error("spec document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to read spec file: {0}")]
    Io(#[from] std::io::Error),
}
