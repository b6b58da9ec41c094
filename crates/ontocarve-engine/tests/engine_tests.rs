//! End-to-end engine tests over hand-built source graphs.

use std::collections::HashSet;

use roaring::RoaringBitmap;

use ontocarve_engine::{extract, ClosureMode, ExtractOptions, SelectionStage, Selector};
use ontocarve_model::{
    AnnotationValue, EntityId, EntityKind, OutputGraph, SourceGraph, Statement,
};

fn declared_chain(graph: &mut SourceGraph, iris: &[&str]) -> Vec<EntityId> {
    let ids: Vec<EntityId> = iris.iter().map(|iri| graph.intern(iri)).collect();
    for &id in &ids {
        graph.insert(Statement::Declaration {
            entity: id,
            kind: EntityKind::Class,
        });
    }
    for pair in ids.windows(2) {
        graph.insert(Statement::SubClassOf {
            sub: pair[0],
            sup: pair[1],
        });
    }
    ids
}

fn seed(ids: &[EntityId]) -> RoaringBitmap {
    ids.iter().map(|id| id.raw()).collect()
}

fn statement_set(output: &OutputGraph) -> HashSet<Statement> {
    output.statements().cloned().collect()
}

// ============================================================================
// Specified scenarios
// ============================================================================

#[test]
fn complete_mode_with_structure_preservation_spans_the_gap() {
    // A subClassOf B, B subClassOf C; seed {A, C}; self; Complete.
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:A", "ex:B", "ex:C"]);
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    let options = ExtractOptions {
        stages: vec![SelectionStage::of([Selector::Itself])],
        mode: ClosureMode::Complete,
        preserve_structure: true,
        ..ExtractOptions::default()
    };
    let output = extract(&graph, &seed(&[a, c]), &options);

    assert!(output.contains(&Statement::Declaration {
        entity: a,
        kind: EntityKind::Class
    }));
    assert!(output.contains(&Statement::Declaration {
        entity: c,
        kind: EntityKind::Class
    }));
    assert!(output.contains(&Statement::SubClassOf { sub: a, sup: c }));
    for statement in output.statements() {
        assert!(
            !statement.entities().contains(&b),
            "no output statement may mention the omitted entity: {statement:?}"
        );
    }
}

#[test]
fn empty_seed_and_empty_pipeline_selects_the_whole_graph() {
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:A", "ex:B", "ex:C"]);
    let label = graph.intern("rdfs:label");
    graph.insert(Statement::AnnotationAssertion {
        subject: ids[0],
        property: label,
        value: AnnotationValue::literal("a"),
    });

    let options = ExtractOptions {
        mode: ClosureMode::Partial,
        trim: false,
        ..ExtractOptions::default()
    };
    let output = extract(&graph, &RoaringBitmap::new(), &options);

    let source: HashSet<Statement> = graph.statements().iter().cloned().collect();
    assert_eq!(statement_set(&output), source);
}

#[test]
fn stages_chain_rather_than_union_against_the_seed() {
    // D -> C -> X -> B, and X also has child E. Children of X then
    // ancestors of those children must differ from the reverse order.
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:D", "ex:C", "ex:X", "ex:B"]);
    let x = ids[2];
    let e = graph.intern("ex:E");
    graph.insert(Statement::SubClassOf { sub: e, sup: x });

    let options = ExtractOptions {
        stages: vec![
            SelectionStage::of([Selector::Children]),
            SelectionStage::of([Selector::Ancestors]),
        ],
        mode: ClosureMode::Complete,
        preserve_structure: false,
        trim: false,
        ..ExtractOptions::default()
    };
    let output = extract(&graph, &seed(&[x]), &options);

    // children(X) = {C, E}; ancestors of those = {X, B}. The declarations
    // present are exactly the ones for the final selection.
    let declared: HashSet<EntityId> = output
        .statements()
        .filter_map(|s| match s {
            Statement::Declaration { entity, .. } => Some(*entity),
            _ => None,
        })
        .collect();
    assert_eq!(declared, [x, ids[3]].into_iter().collect());
}

// ============================================================================
// Policy toggles
// ============================================================================

#[test]
fn metadata_only_invocation_short_circuits() {
    let mut graph = SourceGraph::new();
    declared_chain(&mut graph, &["ex:A", "ex:B"]);
    let creator = graph.intern("dc:creator");
    graph.insert(Statement::OntologyAnnotation {
        property: creator,
        value: AnnotationValue::literal("tester"),
    });
    let upstream = graph.intern("http://example.org/upstream.owl");
    graph.insert(Statement::Import { target: upstream });

    let options = ExtractOptions {
        stages: vec![
            SelectionStage::parse("ontology").unwrap(),
            SelectionStage::parse("imports").unwrap(),
        ],
        trim: false,
        ..ExtractOptions::default()
    };
    let output = extract(&graph, &RoaringBitmap::new(), &options);

    assert_eq!(output.len(), 2);
    assert!(output
        .statements()
        .all(|s| matches!(s, Statement::OntologyAnnotation { .. } | Statement::Import { .. })));
}

#[test]
fn annotations_toggle_pulls_in_labels_of_referenced_entities() {
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:A", "ex:B"]);
    let label = graph.intern("rdfs:label");
    graph.insert(Statement::AnnotationAssertion {
        subject: ids[1],
        property: label,
        value: AnnotationValue::literal("b label"),
    });

    let base = ExtractOptions {
        stages: vec![SelectionStage::of([Selector::Itself])],
        mode: ClosureMode::Complete,
        ..ExtractOptions::default()
    };
    let without = extract(&graph, &seed(&ids), &base);

    let with = extract(
        &graph,
        &seed(&ids),
        &ExtractOptions {
            include_annotations: true,
            ..base.clone()
        },
    );

    assert!(statement_set(&without).is_subset(&statement_set(&with)));
    assert!(with.contains(&Statement::AnnotationAssertion {
        subject: ids[1],
        property: label,
        value: AnnotationValue::literal("b label"),
    }));
}

#[test]
fn stage_annotations_keyword_matches_the_caller_boolean() {
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:A", "ex:B"]);
    let label = graph.intern("rdfs:label");
    graph.insert(Statement::AnnotationAssertion {
        subject: ids[0],
        property: label,
        value: AnnotationValue::literal("a label"),
    });

    let via_keyword = ExtractOptions {
        stages: vec![SelectionStage::parse("self annotations").unwrap()],
        mode: ClosureMode::Complete,
        ..ExtractOptions::default()
    };
    let via_boolean = ExtractOptions {
        stages: vec![SelectionStage::of([Selector::Itself])],
        mode: ClosureMode::Complete,
        include_annotations: true,
        ..ExtractOptions::default()
    };

    assert_eq!(
        statement_set(&extract(&graph, &seed(&[ids[0]]), &via_keyword)),
        statement_set(&extract(&graph, &seed(&[ids[0]]), &via_boolean)),
    );
}

#[test]
fn disabling_trim_retains_dangling_declarations() {
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:A", "ex:B", "ex:C"]);

    // Select only B with no relations surviving Complete mode besides its
    // declaration: A and C edges both reference unselected entities.
    let base = ExtractOptions {
        stages: vec![SelectionStage::of([Selector::Itself])],
        mode: ClosureMode::Complete,
        preserve_structure: false,
        trim: false,
        ..ExtractOptions::default()
    };
    let untrimmed = extract(&graph, &seed(&[ids[1]]), &base);
    assert!(untrimmed.contains(&Statement::Declaration {
        entity: ids[1],
        kind: EntityKind::Class
    }));

    let trimmed = extract(
        &graph,
        &seed(&[ids[1]]),
        &ExtractOptions {
            trim: true,
            ..base
        },
    );
    assert!(trimmed.is_empty());
}

#[test]
fn empty_source_graph_degenerates_to_an_empty_output() {
    let graph = SourceGraph::new();
    let output = extract(&graph, &RoaringBitmap::new(), &ExtractOptions::default());
    assert!(output.is_empty());
}

#[test]
fn structure_preservation_is_monotone() {
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:A", "ex:X", "ex:B"]);

    let base = ExtractOptions {
        stages: vec![SelectionStage::of([Selector::Itself])],
        mode: ClosureMode::Complete,
        preserve_structure: false,
        ..ExtractOptions::default()
    };
    let without = extract(&graph, &seed(&[ids[0], ids[2]]), &base);
    let with = extract(
        &graph,
        &seed(&[ids[0], ids[2]]),
        &ExtractOptions {
            preserve_structure: true,
            ..base
        },
    );
    assert!(statement_set(&without).is_subset(&statement_set(&with)));
}

#[test]
fn kind_filter_limits_transfer_but_not_declarations() {
    let mut graph = SourceGraph::new();
    let ids = declared_chain(&mut graph, &["ex:A", "ex:B"]);
    let label = graph.intern("rdfs:label");
    graph.insert(Statement::AnnotationAssertion {
        subject: ids[0],
        property: label,
        value: AnnotationValue::literal("a"),
    });

    let mut kinds = HashSet::new();
    kinds.insert(ontocarve_model::StatementKind::SubClassOf);

    let output = extract(
        &graph,
        &seed(&ids),
        &ExtractOptions {
            stages: vec![SelectionStage::of([Selector::Itself])],
            kinds,
            mode: ClosureMode::Partial,
            preserve_structure: false,
            trim: false,
            ..ExtractOptions::default()
        },
    );

    assert!(output.contains(&Statement::SubClassOf {
        sub: ids[0],
        sup: ids[1]
    }));
    assert!(output
        .statements()
        .all(|s| !matches!(s, Statement::AnnotationAssertion { .. })));
    // Declarations ride along despite the filter.
    assert!(output.statements().any(Statement::is_declaration));
}
