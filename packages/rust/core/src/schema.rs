//! Knowledge-schema builder.
//!
//! Composes goals, document→goal mappings, normalized timeline periods, and
//! the static framework metadata into one bidirectional cross-reference
//! graph. Deterministic given its inputs: nested goal-document lists are
//! ordered by overlap size, timeline↔document links alphabetically, and the
//! flat `references` maps serialize with sorted keys.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crossweave_overlap::{DayRange, DocumentMapping, GoalOverlap, overlap};
use crossweave_shared::{Goal, KnowledgeFramework, TimelinePeriod};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Echo of the input file locations, for consumers tracing provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSources {
    pub goals: String,
    pub documents: String,
    pub timeline: String,
}

/// A document reference attached to a goal, with overlap metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDocumentRef {
    pub document: String,
    pub overlap_start_day: i64,
    pub overlap_end_day: i64,
    pub overlap_days: i64,
    pub goal_coverage_pct: f64,
    pub document_coverage_pct: f64,
}

/// One goal with its cross-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaGoal {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub start_day: i64,
    pub end_day: i64,
    pub duration_days: i64,
    /// Sorted by overlap size descending, document name on ties.
    pub timecapsule_documents: Vec<GoalDocumentRef>,
    /// Sorted ids of periods whose `goal_slug` matches.
    pub timeline_periods: Vec<String>,
    pub knowledge_frameworks: Vec<String>,
}

/// One document with its cross-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    pub description: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub start_day: i64,
    pub end_day: i64,
    pub duration_days: i64,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub overlapping_goals: Vec<GoalOverlap>,
    /// Sorted ids of overlapping timeline periods.
    pub timeline_periods: Vec<String>,
    pub knowledge_frameworks: Vec<String>,
}

/// A framework annotated with every entity in the run. Frameworks are
/// cross-cutting: they are never filtered by topical relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFramework {
    #[serde(flatten)]
    pub framework: KnowledgeFramework,
    pub related_goals: Vec<String>,
    pub related_documents: Vec<String>,
    pub related_timeline_periods: Vec<String>,
}

/// Entities related to one framework in the `references` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkEntities {
    pub goals: Vec<String>,
    pub documents: Vec<String>,
    pub timeline_periods: Vec<String>,
}

/// Flat lookup maps for consumers that want direct key access instead of
/// traversing the nested arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct References {
    pub goal_to_documents: BTreeMap<String, Vec<String>>,
    pub document_to_goals: BTreeMap<String, Vec<String>>,
    pub timeline_to_documents: BTreeMap<String, Vec<String>>,
    pub document_to_timeline: BTreeMap<String, Vec<String>>,
    pub knowledge_framework_to_entities: BTreeMap<String, FrameworkEntities>,
}

/// The complete knowledge-integration schema, the run's sole durable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSchema {
    pub generated_at: String,
    pub sources: SchemaSources,
    pub goals: Vec<SchemaGoal>,
    pub timecapsule_documents: Vec<SchemaDocument>,
    pub timeline_periods: Vec<TimelinePeriod>,
    pub knowledge_frameworks: Vec<SchemaFramework>,
    pub references: References,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assemble the full cross-reference graph.
///
/// `periods` must already be normalized; their `timecapsule_documents` and
/// `knowledge_frameworks` fields are populated here.
pub fn build_schema(
    goals: &[Goal],
    mappings: &[DocumentMapping],
    mut periods: Vec<TimelinePeriod>,
    frameworks: &[KnowledgeFramework],
    sources: SchemaSources,
    generated_at: &str,
) -> KnowledgeSchema {
    let framework_ids: Vec<String> = frameworks.iter().map(|fw| fw.id.clone()).collect();

    // goal slug → document refs, in document input order.
    let mut goal_to_docs: HashMap<String, Vec<GoalDocumentRef>> = HashMap::new();
    for mapping in mappings {
        for o in &mapping.overlapping_goals {
            goal_to_docs
                .entry(o.goal_slug.clone())
                .or_default()
                .push(GoalDocumentRef {
                    document: mapping.document.name.clone(),
                    overlap_start_day: o.overlap_start_day,
                    overlap_end_day: o.overlap_end_day,
                    overlap_days: o.overlap_days,
                    goal_coverage_pct: o.goal_coverage_pct,
                    document_coverage_pct: o.document_coverage_pct,
                });
        }
    }

    // Timeline↔document links via the same overlap rule, alphabetical order.
    let (timeline_to_docs, doc_to_timeline) = build_timeline_document_links(&periods, mappings);

    // Documents payload.
    let mut documents: Vec<SchemaDocument> = Vec::with_capacity(mappings.len());
    let mut doc_to_goals: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for mapping in mappings {
        let doc = &mapping.document;
        doc_to_goals.insert(
            doc.name.clone(),
            mapping
                .overlapping_goals
                .iter()
                .map(|o| o.goal_slug.clone())
                .collect(),
        );
        documents.push(SchemaDocument {
            name: doc.name.clone(),
            description: doc.description.clone(),
            author: doc.author.clone(),
            category: doc.category.clone(),
            start_day: doc.start_day,
            end_day: doc.end_day,
            duration_days: doc.duration_days,
            period: doc.period.clone(),
            link: doc.link.clone(),
            overlapping_goals: mapping.overlapping_goals.clone(),
            timeline_periods: doc_to_timeline.get(&doc.name).cloned().unwrap_or_default(),
            knowledge_frameworks: framework_ids.clone(),
        });
    }

    // Periods carry their document names and the universal framework list.
    for period in &mut periods {
        period.timecapsule_documents = timeline_to_docs
            .get(&period.id)
            .cloned()
            .unwrap_or_default();
        period.knowledge_frameworks = framework_ids.clone();
    }

    // goal slug → sorted set of matching timeline ids.
    let mut slug_to_timeline_ids: HashMap<String, BTreeSet<String>> = HashMap::new();
    for period in &periods {
        if let Some(slug) = &period.goal_slug {
            slug_to_timeline_ids
                .entry(slug.clone())
                .or_default()
                .insert(period.id.clone());
        }
    }

    // Goals payload.
    let goals_payload: Vec<SchemaGoal> = goals
        .iter()
        .map(|goal| {
            let mut docs = goal_to_docs.get(&goal.slug).cloned().unwrap_or_default();
            docs.sort_by(|a, b| {
                (-a.overlap_days, &a.document).cmp(&(-b.overlap_days, &b.document))
            });

            SchemaGoal {
                slug: goal.slug.clone(),
                title: goal.title.clone(),
                href: goal.href.clone(),
                start_day: goal.start_day,
                end_day: goal.end_day,
                duration_days: goal.duration(),
                timecapsule_documents: docs,
                timeline_periods: slug_to_timeline_ids
                    .get(&goal.slug)
                    .map(|ids| ids.iter().cloned().collect())
                    .unwrap_or_default(),
                knowledge_frameworks: framework_ids.clone(),
            }
        })
        .collect();

    // Frameworks are annotated with the complete entity sets, sorted.
    let all_goal_slugs: Vec<String> = {
        let mut v: Vec<String> = goals_payload.iter().map(|g| g.slug.clone()).collect();
        v.sort();
        v
    };
    let all_doc_names: Vec<String> = {
        let mut v: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
        v.sort();
        v
    };
    let all_timeline_ids: Vec<String> = {
        let mut v: Vec<String> = periods.iter().map(|p| p.id.clone()).collect();
        v.sort();
        v
    };

    let frameworks_payload: Vec<SchemaFramework> = frameworks
        .iter()
        .map(|fw| SchemaFramework {
            framework: fw.clone(),
            related_goals: all_goal_slugs.clone(),
            related_documents: all_doc_names.clone(),
            related_timeline_periods: all_timeline_ids.clone(),
        })
        .collect();

    let references = References {
        goal_to_documents: goals
            .iter()
            .map(|goal| {
                let names = goal_to_docs
                    .get(&goal.slug)
                    .map(|docs| docs.iter().map(|d| d.document.clone()).collect())
                    .unwrap_or_default();
                (goal.slug.clone(), names)
            })
            .collect(),
        document_to_goals: doc_to_goals,
        timeline_to_documents: timeline_to_docs,
        document_to_timeline: doc_to_timeline,
        knowledge_framework_to_entities: frameworks
            .iter()
            .map(|fw| {
                (
                    fw.id.clone(),
                    FrameworkEntities {
                        goals: all_goal_slugs.clone(),
                        documents: all_doc_names.clone(),
                        timeline_periods: all_timeline_ids.clone(),
                    },
                )
            })
            .collect(),
    };

    debug!(
        goals = goals_payload.len(),
        documents = documents.len(),
        periods = periods.len(),
        frameworks = frameworks_payload.len(),
        "knowledge schema assembled"
    );

    KnowledgeSchema {
        generated_at: generated_at.to_string(),
        sources,
        goals: goals_payload,
        timecapsule_documents: documents,
        timeline_periods: periods,
        knowledge_frameworks: frameworks_payload,
        references,
    }
}

/// Link timeline periods and documents by day-range overlap.
///
/// Both directions are sorted alphabetically: these are stable lookup
/// listings, unlike the overlap-size ordering used for goal references.
/// Every period id appears in the period→documents map, empty or not.
fn build_timeline_document_links(
    periods: &[TimelinePeriod],
    mappings: &[DocumentMapping],
) -> (BTreeMap<String, Vec<String>>, BTreeMap<String, Vec<String>>) {
    let mut timeline_to_docs: BTreeMap<String, Vec<String>> = periods
        .iter()
        .map(|p| (p.id.clone(), Vec::new()))
        .collect();
    let mut doc_to_timeline: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for period in periods {
        let period_range = DayRange::new(period.start_day, period.end_day);
        for mapping in mappings {
            let doc = &mapping.document;
            if overlap(period_range, DayRange::new(doc.start_day, doc.end_day)).is_none() {
                continue;
            }
            if let Some(names) = timeline_to_docs.get_mut(&period.id) {
                names.push(doc.name.clone());
            }
            doc_to_timeline
                .entry(doc.name.clone())
                .or_default()
                .push(period.id.clone());
        }
    }

    for names in timeline_to_docs.values_mut() {
        names.sort();
    }
    for ids in doc_to_timeline.values_mut() {
        ids.sort();
    }

    (timeline_to_docs, doc_to_timeline)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::normalize_timeline_periods;
    use crossweave_overlap::map_documents_to_goals;
    use crossweave_shared::{Document, TimelineEntry};

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

    fn framework(id: &str) -> KnowledgeFramework {
        KnowledgeFramework {
            id: id.into(),
            title: id.to_uppercase(),
            description: "desc".into(),
            url: format!("{id}.md"),
        }
    }

    fn sources() -> SchemaSources {
        SchemaSources {
            goals: "data/goals.json".into(),
            documents: "data/documents.md".into(),
            timeline: "data/timeline.json".into(),
        }
    }

    fn entry(label: &str, start: i64, end: i64) -> TimelineEntry {
        TimelineEntry {
            goal: label.into(),
            category: None,
            start_day: start,
            end_day: end,
            duration_days: None,
        }
    }

    /// Three goals, two documents each fully covering exactly one goal.
    fn small_schema() -> KnowledgeSchema {
        let goals = vec![goal("g1", 1, 10), goal("g2", 11, 20), goal("g3", 21, 30)];
        let docs = vec![doc("doc-one", 1, 10), doc("doc-two", 11, 20)];
        let mappings = map_documents_to_goals(&docs, &goals);
        let periods = normalize_timeline_periods(
            &[entry("First", 1, 10), entry("Gap", 31, 35)],
            &goals,
        );
        let frameworks = vec![framework("alpha"), framework("beta")];

        build_schema(
            &goals,
            &mappings,
            periods,
            &frameworks,
            sources(),
            "2025-01-01T00:00:00Z",
        )
    }

    #[test]
    fn goal_to_documents_has_expected_entries() {
        let schema = small_schema();
        let map = &schema.references.goal_to_documents;

        assert_eq!(map.len(), 3);
        assert_eq!(map["g1"], vec!["doc-one"]);
        assert_eq!(map["g2"], vec!["doc-two"]);
        assert!(map["g3"].is_empty());
    }

    #[test]
    fn frameworks_relate_to_all_entities() {
        let schema = small_schema();

        for fw in &schema.knowledge_frameworks {
            assert_eq!(fw.related_goals, vec!["g1", "g2", "g3"]);
            assert_eq!(fw.related_documents, vec!["doc-one", "doc-two"]);
            assert_eq!(fw.related_timeline_periods, vec!["g1", "timeline-2"]);
        }

        let entities = &schema.references.knowledge_framework_to_entities["beta"];
        assert_eq!(entities.goals, vec!["g1", "g2", "g3"]);
    }

    #[test]
    fn every_entity_lists_all_framework_ids() {
        let schema = small_schema();
        let ids = vec!["alpha".to_string(), "beta".to_string()];

        assert!(schema.goals.iter().all(|g| g.knowledge_frameworks == ids));
        assert!(
            schema
                .timecapsule_documents
                .iter()
                .all(|d| d.knowledge_frameworks == ids)
        );
        assert!(
            schema
                .timeline_periods
                .iter()
                .all(|p| p.knowledge_frameworks == ids)
        );
    }

    #[test]
    fn matched_period_links_back_to_goal() {
        let schema = small_schema();

        let g1 = schema.goals.iter().find(|g| g.slug == "g1").unwrap();
        assert_eq!(g1.timeline_periods, vec!["g1"]);

        let g2 = schema.goals.iter().find(|g| g.slug == "g2").unwrap();
        assert!(g2.timeline_periods.is_empty());
    }

    #[test]
    fn timeline_document_links_are_alphabetical() {
        let goals = vec![goal("g1", 1, 30)];
        let docs = vec![doc("zeta", 1, 5), doc("alpha", 3, 8), doc("mid", 4, 4)];
        let mappings = map_documents_to_goals(&docs, &goals);
        let periods = normalize_timeline_periods(&[entry("All", 1, 30)], &goals);

        let schema = build_schema(
            &goals,
            &mappings,
            periods,
            &[framework("fw")],
            sources(),
            "2025-01-01T00:00:00Z",
        );

        assert_eq!(
            schema.references.timeline_to_documents["g1"],
            vec!["alpha", "mid", "zeta"]
        );
        assert_eq!(schema.timeline_periods[0].timecapsule_documents, vec![
            "alpha", "mid", "zeta"
        ]);
    }

    #[test]
    fn goal_documents_sorted_by_overlap_then_name() {
        let goals = vec![goal("g1", 1, 20)];
        // "b-long" and "a-long" tie on overlap; name breaks the tie.
        let docs = vec![
            doc("short", 1, 2),
            doc("b-long", 1, 10),
            doc("a-long", 11, 20),
        ];
        let mappings = map_documents_to_goals(&docs, &goals);

        let schema = build_schema(
            &goals,
            &mappings,
            Vec::new(),
            &[framework("fw")],
            sources(),
            "2025-01-01T00:00:00Z",
        );

        let order: Vec<&str> = schema.goals[0]
            .timecapsule_documents
            .iter()
            .map(|d| d.document.as_str())
            .collect();
        assert_eq!(order, ["a-long", "b-long", "short"]);
    }

    #[test]
    fn unmatched_period_appears_in_timeline_map_with_empty_list() {
        let schema = small_schema();
        // "Gap" overlaps no documents but still has a map entry.
        assert!(schema.references.timeline_to_documents["timeline-2"].is_empty());
    }

    #[test]
    fn document_to_goals_sorted_by_overlap_size() {
        let goals = vec![goal("minor", 9, 10), goal("major", 1, 8)];
        let docs = vec![doc("D", 1, 10)];
        let mappings = map_documents_to_goals(&docs, &goals);

        let schema = build_schema(
            &goals,
            &mappings,
            Vec::new(),
            &[framework("fw")],
            sources(),
            "2025-01-01T00:00:00Z",
        );

        assert_eq!(schema.references.document_to_goals["D"], vec![
            "major", "minor"
        ]);
    }

    #[test]
    fn schema_serialization_is_deterministic() {
        let a = serde_json::to_string_pretty(&small_schema()).unwrap();
        let b = serde_json::to_string_pretty(&small_schema()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn framework_fields_flatten_into_payload() {
        let schema = small_schema();
        let json = serde_json::to_value(&schema.knowledge_frameworks[0]).unwrap();
        assert_eq!(json["id"], "alpha");
        assert_eq!(json["url"], "alpha.md");
        assert!(json["related_goals"].is_array());
    }
}
