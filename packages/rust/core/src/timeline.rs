//! Timeline normalization.
//!
//! Assigns stable identifiers to externally supplied timeline entries by
//! reconciling each against the goal list on an exact `(start_day, end_day)`
//! match.

use tracing::debug;

use crossweave_shared::{Goal, TimelineEntry, TimelinePeriod};

/// Normalize raw timeline entries into stable-identified periods.
///
/// Entries are processed in input order. The first goal with an identical
/// day range wins; unmatched entries get a synthetic `timeline-<position>`
/// id (1-based). A missing or zero `duration_days` is recomputed from the
/// day range. `timecapsule_documents` and `knowledge_frameworks` start
/// empty and are filled in by the schema builder.
pub fn normalize_timeline_periods(entries: &[TimelineEntry], goals: &[Goal]) -> Vec<TimelinePeriod> {
    let periods: Vec<TimelinePeriod> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let matched = goals
                .iter()
                .find(|g| g.start_day == entry.start_day && g.end_day == entry.end_day);

            let id = match matched {
                Some(goal) => goal.slug.clone(),
                None => format!("timeline-{}", idx + 1),
            };

            TimelinePeriod {
                id,
                label: entry.goal.clone(),
                category: entry.category.clone(),
                start_day: entry.start_day,
                end_day: entry.end_day,
                duration_days: entry
                    .duration_days
                    .filter(|d| *d != 0)
                    .unwrap_or(entry.end_day - entry.start_day + 1),
                goal_slug: matched.map(|g| g.slug.clone()),
                timecapsule_documents: Vec::new(),
                knowledge_frameworks: Vec::new(),
            }
        })
        .collect();

    let matched = periods.iter().filter(|p| p.goal_slug.is_some()).count();
    debug!(
        periods = periods.len(),
        matched,
        "timeline periods normalized"
    );

    periods
}
