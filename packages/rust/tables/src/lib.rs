//! Markdown table parser for Crossweave.
//!
//! Extracts typed [`Document`](crossweave_shared::Document) records from
//! loosely formatted markdown tables interleaved with arbitrary prose.
//! Malformed tables and rows are skipped, never fatal; skips are recorded
//! as diagnostics on the [`ParseReport`].

mod parser;

pub use parser::{ParseReport, SkipReason, SkippedTable, parse_document_tables};
