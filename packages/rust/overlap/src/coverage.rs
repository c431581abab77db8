//! Per-goal coverage statistics.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crossweave_shared::{Document, Goal};

use crate::range::{DayRange, overlap, round2};

/// One document contributing coverage to a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveringDocument {
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub overlap_start_day: i64,
    pub overlap_end_day: i64,
    pub overlap_days: i64,
}

/// Coverage of one goal by the document set.
///
/// `covered_days` is the size of the union of covered days, so documents
/// overlapping each other are not double-counted and
/// `covered_days <= duration_days` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalCoverage {
    pub goal_slug: String,
    pub goal_title: String,
    pub start_day: i64,
    pub end_day: i64,
    pub duration_days: i64,
    pub covered_days: i64,
    pub coverage_pct: f64,
    /// Sorted by overlap size descending, earlier overlap start first on ties.
    pub covering_documents: Vec<CoveringDocument>,
}

/// Compute coverage statistics for every goal.
pub fn compute_goal_coverage(documents: &[Document], goals: &[Goal]) -> Vec<GoalCoverage> {
    let mut stats = Vec::with_capacity(goals.len());

    for goal in goals {
        let goal_range = DayRange::new(goal.start_day, goal.end_day);
        let mut covered: HashSet<i64> = HashSet::new();
        let mut covering: Vec<CoveringDocument> = Vec::new();

        for doc in documents {
            let Some(o) = overlap(goal_range, DayRange::new(doc.start_day, doc.end_day)) else {
                continue;
            };

            covered.extend(o.start..=o.end);
            covering.push(CoveringDocument {
                document: doc.name.clone(),
                link: doc.link.clone(),
                overlap_start_day: o.start,
                overlap_end_day: o.end,
                overlap_days: o.duration(),
            });
        }

        covering.sort_by_key(|d| (-d.overlap_days, d.overlap_start_day));

        let duration = goal.duration();
        // goals come straight from JSON, so an inverted range can reach here
        let coverage_pct = if duration > 0 {
            round2(covered.len() as f64 / duration as f64 * 100.0)
        } else {
            0.0
        };

        stats.push(GoalCoverage {
            goal_slug: goal.slug.clone(),
            goal_title: goal.title.clone(),
            start_day: goal.start_day,
            end_day: goal.end_day,
            duration_days: duration,
            covered_days: covered.len() as i64,
            coverage_pct,
            covering_documents: covering,
        });
    }

    debug!(goals = stats.len(), "goal coverage computed");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(slug: &str, start: i64, end: i64) -> Goal {
        Goal {
            slug: slug.into(),
            title: slug.to_uppercase(),
            href: None,
            start_day: start,
            end_day: end,
        }
    }

    fn doc(name: &str, start: i64, end: i64) -> Document {
        Document {
            name: name.into(),
            description: "d".into(),
            author: "a".into(),
            period_text: format!("Days {start}-{end}"),
            start_day: start,
            end_day: end,
            link: None,
            category: None,
        }
    }

    #[test]
    fn overlapping_documents_not_double_counted() {
        let goals = [goal("g1", 1, 10)];
        // Two documents both covering days 3-6: union is 1-8, not 4+6+4 days.
        let docs = [doc("A", 1, 6), doc("B", 3, 8), doc("C", 3, 6)];

        let stats = compute_goal_coverage(&docs, &goals);
        assert_eq!(stats[0].covered_days, 8);
        assert_eq!(stats[0].coverage_pct, 80.0);

        let sum_overlap: i64 = stats[0]
            .covering_documents
            .iter()
            .map(|d| d.overlap_days)
            .sum();
        assert!(sum_overlap > stats[0].covered_days);
    }

    #[test]
    fn covered_days_bounded_by_duration() {
        let goals = [goal("g1", 5, 8)];
        let docs = [doc("A", 1, 30), doc("B", 1, 30)];

        let stats = compute_goal_coverage(&docs, &goals);
        assert_eq!(stats[0].covered_days, stats[0].duration_days);
        assert_eq!(stats[0].coverage_pct, 100.0);
    }

    #[test]
    fn uncovered_goal_reports_zero() {
        let goals = [goal("g1", 1, 10)];
        let stats = compute_goal_coverage(&[], &goals);
        assert_eq!(stats[0].covered_days, 0);
        assert_eq!(stats[0].coverage_pct, 0.0);
        assert!(stats[0].covering_documents.is_empty());
    }

    #[test]
    fn covering_documents_sorted_by_overlap_then_start() {
        let goals = [goal("g1", 1, 20)];
        let docs = [
            doc("short-late", 15, 17),
            doc("long", 1, 10),
            doc("short-early", 2, 4),
        ];

        let stats = compute_goal_coverage(&docs, &goals);
        let order: Vec<&str> = stats[0]
            .covering_documents
            .iter()
            .map(|d| d.document.as_str())
            .collect();
        assert_eq!(order, ["long", "short-early", "short-late"]);
    }

    #[test]
    fn inverted_goal_range_yields_zero_coverage() {
        // end before start gives a non-positive duration; must not divide by it
        let goals = [goal("backwards", 10, 1)];
        let docs = [doc("A", 1, 10)];

        let stats = compute_goal_coverage(&docs, &goals);
        assert_eq!(stats[0].coverage_pct, 0.0);
        assert_eq!(stats[0].covered_days, 0);
        assert!(stats[0].duration_days <= 0);
    }

    #[test]
    fn stats_emitted_in_goal_input_order() {
        let goals = [goal("b", 11, 20), goal("a", 1, 10)];
        let stats = compute_goal_coverage(&[], &goals);
        assert_eq!(stats[0].goal_slug, "b");
        assert_eq!(stats[1].goal_slug, "a");
    }
}
