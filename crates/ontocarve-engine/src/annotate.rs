//! Annotation propagator: descriptive annotations for referenced entities.

use std::collections::HashSet;

use roaring::RoaringBitmap;

use ontocarve_model::{EntityId, SourceGraph, Statement};

/// Descriptive annotations whose subject is any entity referenced by
/// `statements`.
pub fn propagate(graph: &SourceGraph, statements: &HashSet<Statement>) -> HashSet<Statement> {
    let mut referenced = RoaringBitmap::new();
    for statement in statements {
        for entity in statement.entities() {
            referenced.insert(entity.raw());
        }
    }
    annotations_for(graph, &referenced)
}

/// Descriptive annotations whose subject is in `entities`.
pub fn annotations_for(graph: &SourceGraph, entities: &RoaringBitmap) -> HashSet<Statement> {
    let mut out = HashSet::new();
    for raw in entities {
        let entity = EntityId::new(raw);
        for statement in graph.statements_mentioning(entity) {
            if let Statement::AnnotationAssertion { subject, .. } = statement {
                if *subject == entity {
                    out.insert(statement.clone());
                }
            }
        }
    }
    out
}
