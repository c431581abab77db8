//! Crossweave core: timeline normalization, knowledge-schema assembly, and
//! the end-to-end pipeline.

pub mod pipeline;
pub mod schema;
pub mod timeline;
