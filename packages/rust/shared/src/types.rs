//! Core domain types for the Crossweave knowledge-integration pipeline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Goal
// ---------------------------------------------------------------------------

/// A named, time-boxed unit of project work loaded from the goals file.
///
/// Invariant: `start_day <= end_day`. Goals are immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique key referenced by timeline periods and the output schema.
    pub slug: String,
    /// Human-readable title.
    pub title: String,
    /// Optional link to the goal's page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// First day of the goal period (inclusive).
    pub start_day: i64,
    /// Last day of the goal period (inclusive).
    pub end_day: i64,
}

impl Goal {
    /// Number of days spanned by the goal, inclusive of both endpoints.
    pub fn duration(&self) -> i64 {
        self.end_day - self.start_day + 1
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A written artifact parsed from one row of a document table.
///
/// Ranges may duplicate or overlap across documents; `name` is a display
/// key, not guaranteed unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Display name (link text when the cell holds a markdown link).
    pub name: String,
    /// Free-text description cell.
    pub description: String,
    /// Author cell.
    pub author: String,
    /// The raw period cell the day range was extracted from.
    pub period_text: String,
    /// First day covered (inclusive).
    pub start_day: i64,
    /// Last day covered (inclusive).
    pub end_day: i64,
    /// URL when the document cell was a markdown link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Most recent section heading above the table, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Document {
    /// Number of days spanned by the document, inclusive of both endpoints.
    pub fn duration(&self) -> i64 {
        self.end_day - self.start_day + 1
    }
}

// ---------------------------------------------------------------------------
// Timeline input
// ---------------------------------------------------------------------------

/// One raw entry from the externally computed timeline file.
///
/// The `goal` field is a free-text label, not a slug reference; entries are
/// reconciled against [`Goal`]s by exact `(start_day, end_day)` match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Free-text label for the period.
    pub goal: String,
    /// Category label assigned by the timeline source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub start_day: i64,
    pub end_day: i64,
    /// Period length; computed from the range when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
}

/// Root structure of the timeline input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineFile {
    #[serde(default)]
    pub goals: Vec<TimelineEntry>,
}

// ---------------------------------------------------------------------------
// TimelinePeriod
// ---------------------------------------------------------------------------

/// A normalized timeline period with a stable identifier.
///
/// `id` is the matched goal's slug when an exact-range match exists,
/// otherwise `timeline-<position>` (1-based input position).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePeriod {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub start_day: i64,
    pub end_day: i64,
    pub duration_days: i64,
    /// Slug of the goal with an identical range, when one exists.
    pub goal_slug: Option<String>,
    /// Names of overlapping documents; populated by the schema builder.
    pub timecapsule_documents: Vec<String>,
    /// Framework ids; populated by the schema builder.
    pub knowledge_frameworks: Vec<String>,
}

// ---------------------------------------------------------------------------
// KnowledgeFramework
// ---------------------------------------------------------------------------

/// A static, universally applicable reference category.
///
/// Frameworks come from configuration, never from input data, and are
/// attached to every entity in the output graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFramework {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
}
