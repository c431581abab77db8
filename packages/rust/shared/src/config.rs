//! Application configuration for Crossweave.
//!
//! User config lives at `~/.crossweave/crossweave.toml`.
//! Every field has a default, so a missing file is not an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CrossweaveError, Result};
use crate::types::KnowledgeFramework;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "crossweave.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".crossweave";

// ---------------------------------------------------------------------------
// Config structs (matching crossweave.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output file locations, relative to the run's root directory.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Knowledge-framework metadata. Static per run, never derived from
    /// input data. Defaults to the three built-in frameworks.
    #[serde(default = "default_frameworks")]
    pub frameworks: Vec<KnowledgeFramework>,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Goals JSON file (ordered list of goal records).
    #[serde(default = "default_goals_path")]
    pub goals: String,

    /// Raw markdown document containing the document tables.
    #[serde(default = "default_documents_path")]
    pub documents: String,

    /// Timeline JSON file (`{"goals": [...]}`).
    #[serde(default = "default_timeline_path")]
    pub timeline: String,

    /// Output: document→goal mappings with overlap metadata.
    #[serde(default = "default_mappings_out")]
    pub mappings_out: String,

    /// Output: per-goal coverage statistics.
    #[serde(default = "default_coverage_out")]
    pub coverage_out: String,

    /// Output: the knowledge-integration schema.
    #[serde(default = "default_schema_out")]
    pub schema_out: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            goals: default_goals_path(),
            documents: default_documents_path(),
            timeline: default_timeline_path(),
            mappings_out: default_mappings_out(),
            coverage_out: default_coverage_out(),
            schema_out: default_schema_out(),
        }
    }
}

fn default_goals_path() -> String {
    "data/goals.json".into()
}
fn default_documents_path() -> String {
    "data/documents.md".into()
}
fn default_timeline_path() -> String {
    "data/timeline.json".into()
}
fn default_mappings_out() -> String {
    "data/document_goal_mappings.json".into()
}
fn default_coverage_out() -> String {
    "data/goal_coverage_stats.json".into()
}
fn default_schema_out() -> String {
    "data/knowledge_integration.json".into()
}

/// The three built-in frameworks, used when the config does not override them.
pub fn default_frameworks() -> Vec<KnowledgeFramework> {
    vec![
        KnowledgeFramework {
            id: "decision_frameworks".into(),
            title: "Decision Frameworks".into(),
            description: "Playbooks for selecting goals, sequencing work, and making tradeoffs."
                .into(),
            url: "decision_frameworks.md".into(),
        },
        KnowledgeFramework {
            id: "institutional_memory".into(),
            title: "Institutional Memory".into(),
            description: "Persistent lessons learned, norms, and recurring patterns from past work."
                .into(),
            url: "institutional_memory.md".into(),
        },
        KnowledgeFramework {
            id: "problem_solving_templates".into(),
            title: "Problem-Solving Templates".into(),
            description: "Reusable templates for experiments, incident response, and retrospectives."
                .into(),
            url: "problem_solving_templates.md".into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Resolved run paths
// ---------------------------------------------------------------------------

/// Absolute input/output paths for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub goals: PathBuf,
    pub documents: PathBuf,
    pub timeline: PathBuf,
    pub mappings_out: PathBuf,
    pub coverage_out: PathBuf,
    pub schema_out: PathBuf,
}

impl PathsConfig {
    /// Resolve the configured relative paths against a root directory.
    pub fn resolve(&self, root: &Path) -> RunPaths {
        RunPaths {
            goals: root.join(&self.goals),
            documents: root.join(&self.documents),
            timeline: root.join(&self.timeline),
            mappings_out: root.join(&self.mappings_out),
            coverage_out: root.join(&self.coverage_out),
            schema_out: root.join(&self.schema_out),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.crossweave/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CrossweaveError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.crossweave/crossweave.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig {
            paths: PathsConfig::default(),
            frameworks: default_frameworks(),
        });
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CrossweaveError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CrossweaveError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CrossweaveError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig {
        paths: PathsConfig::default(),
        frameworks: default_frameworks(),
    };
    let content =
        toml::to_string_pretty(&config).map_err(|e| CrossweaveError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CrossweaveError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
