//! edugain-report: Exporters for learning-gains results.
//!
//! Writes per-pair comparison CSVs and renders gains reports as markdown.

pub mod csv;
pub mod markdown;
