//! Pairwise goal↔document overlap records.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crossweave_shared::{Document, Goal};

use crate::range::{DayRange, overlap, round2};

/// One goal overlapping one document, with bidirectional coverage stats.
///
/// Percentages are informational and unclamped; by construction they lie
/// in `(0, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalOverlap {
    pub goal_slug: String,
    pub goal_title: String,
    pub goal_start_day: i64,
    pub goal_end_day: i64,
    pub overlap_start_day: i64,
    pub overlap_end_day: i64,
    pub overlap_days: i64,
    /// Share of the goal's days covered by this document.
    pub goal_coverage_pct: f64,
    /// Share of the document's days falling inside this goal.
    pub document_coverage_pct: f64,
}

/// Document metadata echoed into the mappings output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedDocument {
    pub name: String,
    pub description: String,
    pub author: String,
    pub period: String,
    pub start_day: i64,
    pub end_day: i64,
    pub duration_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// One document and every goal it overlaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMapping {
    pub document: MappedDocument,
    /// Sorted by overlap size descending, earlier goal start first on ties.
    pub overlapping_goals: Vec<GoalOverlap>,
}

/// Compute the overlap records for every (document, goal) pair whose
/// ranges intersect. Pairs with no intersection produce no record.
///
/// Documents with zero overlapping goals still appear in the output with
/// an empty `overlapping_goals` list.
pub fn map_documents_to_goals(documents: &[Document], goals: &[Goal]) -> Vec<DocumentMapping> {
    let mut mappings = Vec::with_capacity(documents.len());

    for doc in documents {
        let doc_range = DayRange::new(doc.start_day, doc.end_day);
        let mut overlaps: Vec<GoalOverlap> = Vec::new();

        for goal in goals {
            let goal_range = DayRange::new(goal.start_day, goal.end_day);
            let Some(o) = overlap(doc_range, goal_range) else {
                continue;
            };

            let overlap_days = o.duration();
            overlaps.push(GoalOverlap {
                goal_slug: goal.slug.clone(),
                goal_title: goal.title.clone(),
                goal_start_day: goal.start_day,
                goal_end_day: goal.end_day,
                overlap_start_day: o.start,
                overlap_end_day: o.end,
                overlap_days,
                goal_coverage_pct: round2(overlap_days as f64 / goal.duration() as f64 * 100.0),
                document_coverage_pct: round2(overlap_days as f64 / doc.duration() as f64 * 100.0),
            });
        }

        overlaps.sort_by_key(|o| (-o.overlap_days, o.goal_start_day));

        mappings.push(DocumentMapping {
            document: MappedDocument {
                name: doc.name.clone(),
                description: doc.description.clone(),
                author: doc.author.clone(),
                period: doc.period_text.clone(),
                start_day: doc.start_day,
                end_day: doc.end_day,
                duration_days: doc.duration(),
                category: doc.category.clone(),
                link: doc.link.clone(),
            },
            overlapping_goals: overlaps,
        });
    }

    debug!(documents = mappings.len(), "document→goal mappings computed");
    mappings
}
