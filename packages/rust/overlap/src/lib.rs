//! Interval overlap engine for Crossweave.
//!
//! Pure functions over closed integer day ranges: pairwise goal↔document
//! overlaps with bidirectional coverage percentages, and per-goal coverage
//! statistics computed as a union of covered days (robust to documents
//! that overlap each other).

mod coverage;
mod mapping;
mod range;

pub use coverage::{CoveringDocument, GoalCoverage, compute_goal_coverage};
pub use mapping::{DocumentMapping, GoalOverlap, MappedDocument, map_documents_to_goals};
pub use range::{DayRange, overlap, round2};
