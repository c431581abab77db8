//! Shared types, error model, and configuration for Crossweave.
//!
//! This crate is the foundation depended on by all other Crossweave crates.
//! It provides:
//! - [`CrossweaveError`], the unified error type
//! - Domain types ([`Goal`], [`Document`], [`TimelinePeriod`], [`KnowledgeFramework`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, PathsConfig, RunPaths, config_dir, config_file_path, default_frameworks,
    init_config, load_config, load_config_from,
};
pub use error::{CrossweaveError, Result};
pub use types::{Document, Goal, KnowledgeFramework, TimelineEntry, TimelineFile, TimelinePeriod};
