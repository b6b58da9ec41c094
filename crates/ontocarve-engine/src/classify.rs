//! Axiom closure classifier: which source statements transfer to the output.
//!
//! Pure filter over the source graph; candidate statements are gathered from
//! the mention index of the selected entities, never by scanning statements
//! that mention nothing selected.

use std::collections::HashSet;

use roaring::RoaringBitmap;

use ontocarve_model::{EntityId, SourceGraph, Statement, StatementKind};

/// Membership policy for statement qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureMode {
    /// A statement qualifies only if *every* entity it references is selected.
    Complete,
    /// A statement qualifies if *any* entity it references is selected.
    Partial,
}

/// Classify the closure of `entities` under `mode`.
///
/// `filter` restricts qualification to the given statement kinds; the empty
/// filter means no restriction. Declarations of selected entities are always
/// included regardless of mode and of the filter: an entity cannot appear in
/// the output undeclared.
pub fn classify(
    graph: &SourceGraph,
    entities: &RoaringBitmap,
    filter: &HashSet<StatementKind>,
    mode: ClosureMode,
) -> HashSet<Statement> {
    let mut candidates = RoaringBitmap::new();
    for raw in entities {
        if let Some(ids) = graph.mention_ids(EntityId::new(raw)) {
            candidates |= ids;
        }
    }

    let mut out = HashSet::new();
    for idx in &candidates {
        let Some(statement) = graph.statement(idx) else {
            continue;
        };
        if !filter.is_empty() && !filter.contains(&statement.kind()) {
            continue;
        }
        let qualifies = match mode {
            ClosureMode::Complete => statement
                .entities()
                .iter()
                .all(|e| entities.contains(e.raw())),
            // Candidacy already implies at least one selected mention.
            ClosureMode::Partial => true,
        };
        if qualifies {
            out.insert(statement.clone());
        }
    }

    for raw in entities {
        if let Some(declaration) = graph.declaration(EntityId::new(raw)) {
            out.insert(declaration.clone());
        }
    }

    tracing::debug!(
        selected = entities.len(),
        qualified = out.len(),
        ?mode,
        "closure classified"
    );
    out
}
