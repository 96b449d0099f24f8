//! End-to-end pipeline tests over synthetic documents
//!
//! Exercises segment → match → diff → aggregate together, without PDFs:
//! fragments are built directly, the way the extractor would emit them.

use code_model::{ChangeKind, Document, Fragment, MatchMethod, SpanKind};
use comparison_engine::{compare_documents, EngineConfig, SectionSegmenter};
use pretty_assertions::assert_eq;

fn document(label: &str, lines: &[&str]) -> Document {
    let fragments: Vec<Fragment> = lines
        .iter()
        .enumerate()
        .map(|(i, text)| Fragment::plain(*text, 1, i + 1))
        .collect();
    SectionSegmenter::segment(&fragments, label, label, "test.pdf")
}

/// Base {101 Scope, 102 Definitions}; supplemental keeps 101 verbatim,
/// rewords 102, and adds 103.
#[test]
fn scenario_unchanged_modified_added() {
    let base = document(
        "State",
        &[
            "101 Scope",
            "these provisions govern plumbing installations",
            "102 Definitions",
            "terms are defined in chapter two",
        ],
    );
    let supplemental = document(
        "City 1",
        &[
            "101 Scope",
            "these provisions govern plumbing installations",
            "102 Definitions",
            "terms are defined in the municipal chapter",
            "103 New Requirement",
            "backflow preventers are required citywide",
        ],
    );

    let config = EngineConfig::default();
    let results = compare_documents(&base, &supplemental, &config);

    assert_eq!(results.len(), 3);

    assert_eq!(results[0].base.as_ref().unwrap().number, "101");
    assert_eq!(results[0].kind, ChangeKind::Unchanged);

    assert_eq!(results[1].base.as_ref().unwrap().number, "102");
    assert_eq!(results[1].kind, ChangeKind::Modified);
    assert!(results[1]
        .delta
        .iter()
        .any(|span| span.kind == SpanKind::Inserted && span.text.contains("municipal")));
    assert!(results[1]
        .delta
        .iter()
        .any(|span| span.kind == SpanKind::Deleted && span.text.contains("two")));

    assert_eq!(results[2].supplemental.as_ref().unwrap().number, "103");
    assert_eq!(results[2].kind, ChangeKind::Added);
    assert_eq!(results[2].method, MatchMethod::UnmatchedSupplemental);
}

/// A supplemental sharing nothing with the base: every base section comes
/// back removed, every supplemental section added.
#[test]
fn scenario_fully_disjoint_documents() {
    let base = document(
        "State",
        &[
            "101 Scope",
            "alpha bravo charlie delta",
            "102 Definitions",
            "echo foxtrot golf hotel",
        ],
    );
    let supplemental = document(
        "City 1",
        &[
            "901 Local Scope",
            "india juliett kilo lima",
            "902 Local Fees",
            "mike november oscar papa",
        ],
    );

    let config = EngineConfig::default();
    let results = compare_documents(&base, &supplemental, &config);

    let removed = results
        .iter()
        .filter(|r| r.kind == ChangeKind::Removed)
        .count();
    let added = results
        .iter()
        .filter(|r| r.kind == ChangeKind::Added)
        .count();
    assert_eq!(removed, base.section_count());
    assert_eq!(added, supplemental.section_count());
}

/// Repeated runs over identical inputs yield identical results.
#[test]
fn pipeline_is_deterministic() {
    let lines_base = &[
        "101 Scope",
        "provisions apply to every building",
        "604 Water Distribution",
        "604.3 Pressure",
        "maximum static pressure eighty psi",
    ];
    let lines_supp = &[
        "101 Scope",
        "provisions apply to every building and structure",
        "604 Water Distribution",
        "604.3 Pressure",
        "maximum static pressure sixty five psi",
        "604.4 Gauges",
        "pressure gauges required at each riser",
    ];
    let config = EngineConfig::default();

    let base1 = document("State", lines_base);
    let supp1 = document("City 1", lines_supp);
    let first = compare_documents(&base1, &supp1, &config);

    let base2 = document("State", lines_base);
    let supp2 = document("City 1", lines_supp);
    let second = compare_documents(&base2, &supp2, &config);

    assert_eq!(first, second);
}

/// Every result group keeps base pre-order, then supplemental additions.
#[test]
fn results_follow_base_preorder_then_additions() {
    let base = document(
        "State",
        &[
            "101 Scope",
            "scope text here",
            "604 Water Distribution",
            "distribution text",
            "604.3 Pressure",
            "pressure text",
        ],
    );
    let supplemental = document(
        "City 1",
        &[
            "604 Water Distribution",
            "distribution text",
            "604.3 Pressure",
            "pressure text",
            "101 Scope",
            "scope text here",
            "950 Permit Fees",
            "local fee schedule applies",
        ],
    );

    let config = EngineConfig::default();
    let results = compare_documents(&base, &supplemental, &config);

    let order: Vec<String> = results
        .iter()
        .map(|r| {
            r.base
                .as_ref()
                .or(r.supplemental.as_ref())
                .unwrap()
                .number
                .clone()
        })
        .collect();
    assert_eq!(order, vec!["101", "604", "604.3", "950"]);
}

/// Reconstruction laws hold across every result the pipeline emits.
#[test]
fn deltas_reconstruct_normalized_bodies() {
    let base = document(
        "State",
        &[
            "101 Scope",
            "these provisions govern all plumbing work",
            "102 Definitions",
            "a definition list follows",
        ],
    );
    let supplemental = document(
        "City 1",
        &[
            "101 Scope",
            "these amended provisions govern plumbing and mechanical work",
            "102 Definitions",
            "a definition list follows",
        ],
    );

    let config = EngineConfig::default();
    let results = compare_documents(&base, &supplemental, &config);

    let base_index = base.index();
    let supp_index = supplemental.index();
    for result in &results {
        let base_text = result
            .base
            .as_ref()
            .and_then(|r| base_index.get(&r.number))
            .map(|s| s.body.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let supp_text = result
            .supplemental
            .as_ref()
            .and_then(|r| supp_index.get(&r.number))
            .map(|s| s.body.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        let from_deleted: Vec<&str> = result
            .delta
            .iter()
            .filter(|s| s.kind != SpanKind::Inserted)
            .map(|s| s.text.as_str())
            .collect();
        let from_inserted: Vec<&str> = result
            .delta
            .iter()
            .filter(|s| s.kind != SpanKind::Deleted)
            .map(|s| s.text.as_str())
            .collect();

        assert_eq!(from_deleted.join(" "), base_text);
        assert_eq!(from_inserted.join(" "), supp_text);
    }
}
