//! End-to-end pipeline: inputs → parse → overlap → normalize → schema → JSON.
//!
//! A run is a pure function of the three input files plus the configured
//! framework metadata: single-threaded, synchronous, no partial output.
//! Missing inputs abort before anything is written; re-running on
//! unchanged inputs is byte-identical except for `generated_at`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crossweave_overlap::{
    DocumentMapping, GoalCoverage, compute_goal_coverage, map_documents_to_goals,
};
use crossweave_shared::{
    CrossweaveError, Goal, KnowledgeFramework, Result, RunPaths, TimelineFile,
};
use crossweave_tables::parse_document_tables;

use crate::schema::{self, SchemaSources};
use crate::timeline::normalize_timeline_periods;

// ---------------------------------------------------------------------------
// Configuration and result
// ---------------------------------------------------------------------------

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Resolved input and output locations.
    pub paths: RunPaths,
    /// Static framework metadata attached to every output entity.
    pub frameworks: Vec<KnowledgeFramework>,
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct RunResult {
    /// Path of the knowledge-integration schema.
    pub schema_path: PathBuf,
    pub goals_loaded: usize,
    pub documents_parsed: usize,
    pub periods: usize,
    /// Table blocks the parser rejected.
    pub tables_skipped: usize,
    /// Data rows dropped during parsing.
    pub rows_dropped: usize,
    /// Human-readable coverage summary for display.
    pub coverage_summary: String,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &RunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &RunResult) {}
}

// ---------------------------------------------------------------------------
// Output file shapes
// ---------------------------------------------------------------------------

/// The document→goal mappings output file.
#[derive(Debug, Serialize, Deserialize)]
pub struct MappingsFile {
    pub generated_at: String,
    pub documents: Vec<DocumentMapping>,
}

/// The per-goal coverage statistics output file.
#[derive(Debug, Serialize, Deserialize)]
pub struct CoverageFile {
    pub generated_at: String,
    pub goals: Vec<GoalCoverage>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full pipeline.
///
/// 1. Check inputs (fail fast on a missing file)
/// 2. Load goals, parse document tables, load the timeline
/// 3. Compute overlaps and coverage
/// 4. Normalize timeline periods
/// 5. Build the knowledge schema
/// 6. Write the three JSON outputs atomically
#[instrument(skip_all)]
pub fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunResult> {
    let start = Instant::now();
    let paths = &config.paths;

    // A missing input is a configuration error, not a recoverable
    // condition. Abort before producing any output.
    progress.phase("Checking inputs");
    for path in [&paths.goals, &paths.documents, &paths.timeline] {
        if !path.exists() {
            return Err(CrossweaveError::missing_input(path));
        }
    }

    progress.phase("Loading goals");
    let goals = load_goals(&paths.goals)?;

    progress.phase("Parsing document tables");
    let text = std::fs::read_to_string(&paths.documents)
        .map_err(|e| CrossweaveError::io(&paths.documents, e))?;
    let report = parse_document_tables(&text);

    progress.phase("Loading timeline");
    let timeline = load_timeline(&paths.timeline)?;

    progress.phase("Computing overlaps");
    let mappings = map_documents_to_goals(&report.documents, &goals);
    let coverage = compute_goal_coverage(&report.documents, &goals);

    progress.phase("Normalizing timeline");
    let periods = normalize_timeline_periods(&timeline.goals, &goals);

    progress.phase("Building knowledge schema");
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let sources = SchemaSources {
        goals: paths.goals.display().to_string(),
        documents: paths.documents.display().to_string(),
        timeline: paths.timeline.display().to_string(),
    };
    let schema = schema::build_schema(
        &goals,
        &mappings,
        periods,
        &config.frameworks,
        sources,
        &generated_at,
    );

    progress.phase("Writing outputs");
    write_json_atomic(
        &paths.mappings_out,
        &MappingsFile {
            generated_at: generated_at.clone(),
            documents: mappings,
        },
    )?;
    write_json_atomic(
        &paths.coverage_out,
        &CoverageFile {
            generated_at: generated_at.clone(),
            goals: coverage.clone(),
        },
    )?;
    write_json_atomic(&paths.schema_out, &schema)?;

    let result = RunResult {
        schema_path: paths.schema_out.clone(),
        goals_loaded: goals.len(),
        documents_parsed: schema.timecapsule_documents.len(),
        periods: schema.timeline_periods.len(),
        tables_skipped: report.skipped.len(),
        rows_dropped: report.rows_dropped,
        coverage_summary: summarize_coverage(&coverage),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        goals = result.goals_loaded,
        documents = result.documents_parsed,
        periods = result.periods,
        tables_skipped = result.tables_skipped,
        rows_dropped = result.rows_dropped,
        elapsed_ms = result.elapsed.as_millis(),
        "pipeline complete"
    );

    Ok(result)
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

/// Load and deserialize the goals file.
fn load_goals(path: &Path) -> Result<Vec<Goal>> {
    let content = std::fs::read_to_string(path).map_err(|e| CrossweaveError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| CrossweaveError::parse(format!("invalid goals file {}: {e}", path.display())))
}

/// Load and deserialize the timeline file.
fn load_timeline(path: &Path) -> Result<TimelineFile> {
    let content = std::fs::read_to_string(path).map_err(|e| CrossweaveError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        CrossweaveError::parse(format!("invalid timeline file {}: {e}", path.display()))
    })
}

// ---------------------------------------------------------------------------
// Output writing
// ---------------------------------------------------------------------------

/// Write a pretty-printed JSON file atomically (temp file, then rename).
fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| CrossweaveError::validation(format!("JSON serialization failed: {e}")))?;

    let parent = path
        .parent()
        .ok_or_else(|| CrossweaveError::validation(format!("no parent dir: {}", path.display())))?;
    std::fs::create_dir_all(parent).map_err(|e| CrossweaveError::io(parent, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| CrossweaveError::validation(format!("no file name: {}", path.display())))?
        .to_string_lossy();
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, json).map_err(|e| CrossweaveError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| CrossweaveError::io(path, e))?;

    tracing::debug!(path = %path.display(), "wrote JSON output");
    Ok(())
}

// ---------------------------------------------------------------------------
// Coverage summary
// ---------------------------------------------------------------------------

/// Render a short best/worst coverage summary for CLI display.
pub fn summarize_coverage(stats: &[GoalCoverage]) -> String {
    if stats.is_empty() {
        return "No goals available.".to_string();
    }

    let mut by_pct: Vec<&GoalCoverage> = stats.iter().collect();
    by_pct.sort_by(|a, b| b.coverage_pct.total_cmp(&a.coverage_pct));

    let fmt = |items: &[&GoalCoverage]| {
        items
            .iter()
            .map(|g| {
                format!(
                    "{} (Days {}-{}, {}% over {} days)",
                    g.goal_title, g.start_day, g.end_day, g.coverage_pct, g.covered_days
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    let best = &by_pct[..by_pct.len().min(3)];
    let worst: Vec<&GoalCoverage> = by_pct.iter().rev().take(3).copied().collect();
    let covered = stats.iter().filter(|g| g.covered_days > 0).count();

    format!(
        "Goals with coverage: {}/{}\nMost covered: {}\nLeast covered: {}",
        covered,
        stats.len(),
        fmt(best),
        fmt(&worst)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
