//! Gap-spanning reconstructor.
//!
//! Omitting an intermediate entity severs hierarchy chains: with `X`
//! unselected, `A -> X -> B` leaves `A` and `B` disconnected in the output.
//! This walks parent edges from each selected entity through *unselected*
//! intermediates only and synthesizes a direct edge to each selected
//! ancestor first reached that way. Edges whose endpoints were adjacent in
//! the source are never re-synthesized (they qualify under Complete
//! classification already), and no edge is invented between entities with no
//! connecting path.

use std::collections::HashSet;

use roaring::RoaringBitmap;

use ontocarve_model::{EntityId, SourceGraph, Statement};

/// Synthesized direct hierarchy edges for every selected pair connected
/// through unselected intermediates.
pub fn span_gaps(graph: &SourceGraph, entities: &RoaringBitmap) -> HashSet<Statement> {
    let mut out = HashSet::new();

    for raw in entities {
        let start = EntityId::new(raw);
        let mut seen = RoaringBitmap::new();
        let mut frontier: Vec<EntityId> = Vec::new();

        // Enter the gap only through unselected direct parents.
        for &parent in graph.parents_of(start) {
            if !entities.contains(parent.raw()) && seen.insert(parent.raw()) {
                frontier.push(parent);
            }
        }

        while let Some(current) = frontier.pop() {
            for &parent in graph.parents_of(current) {
                if entities.contains(parent.raw()) {
                    // Hierarchy cycles can lead back to the start; a
                    // self-edge would say nothing.
                    if parent != start {
                        out.insert(Statement::SubClassOf {
                            sub: start,
                            sup: parent,
                        });
                    }
                } else if seen.insert(parent.raw()) {
                    frontier.push(parent);
                }
            }
        }
    }

    if !out.is_empty() {
        tracing::debug!(spanned = out.len(), "hierarchy gaps spanned");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(graph: &mut SourceGraph, iris: &[&str]) -> Vec<EntityId> {
        let ids: Vec<EntityId> = iris.iter().map(|iri| graph.intern(iri)).collect();
        for pair in ids.windows(2) {
            graph.insert(Statement::SubClassOf {
                sub: pair[0],
                sup: pair[1],
            });
        }
        ids
    }

    fn set(ids: &[EntityId]) -> RoaringBitmap {
        ids.iter().map(|id| id.raw()).collect()
    }

    #[test]
    fn spans_a_single_unselected_intermediate() {
        let mut graph = SourceGraph::new();
        let ids = chain(&mut graph, &["ex:A", "ex:X", "ex:B"]);
        let (a, b) = (ids[0], ids[2]);

        let out = span_gaps(&graph, &set(&[a, b]));
        assert_eq!(out.len(), 1);
        assert!(out.contains(&Statement::SubClassOf { sub: a, sup: b }));
    }

    #[test]
    fn spans_chains_of_intermediates() {
        let mut graph = SourceGraph::new();
        let ids = chain(&mut graph, &["ex:A", "ex:X", "ex:Y", "ex:Z", "ex:B"]);
        let (a, b) = (ids[0], ids[4]);

        let out = span_gaps(&graph, &set(&[a, b]));
        assert_eq!(out.len(), 1);
        assert!(out.contains(&Statement::SubClassOf { sub: a, sup: b }));
    }

    #[test]
    fn does_not_resynthesize_direct_edges() {
        let mut graph = SourceGraph::new();
        let ids = chain(&mut graph, &["ex:A", "ex:B"]);

        let out = span_gaps(&graph, &set(&ids));
        assert!(out.is_empty());
    }

    #[test]
    fn stops_at_the_first_selected_ancestor() {
        // A -> X -> B -> Y -> C with A, B, C selected: spanning yields
        // A -> B and B -> C, never the long-range A -> C.
        let mut graph = SourceGraph::new();
        let ids = chain(&mut graph, &["ex:A", "ex:X", "ex:B", "ex:Y", "ex:C"]);
        let (a, b, c) = (ids[0], ids[2], ids[4]);

        let out = span_gaps(&graph, &set(&[a, b, c]));
        assert_eq!(out.len(), 2);
        assert!(out.contains(&Statement::SubClassOf { sub: a, sup: b }));
        assert!(out.contains(&Statement::SubClassOf { sub: b, sup: c }));
        assert!(!out.contains(&Statement::SubClassOf { sub: a, sup: c }));
    }

    #[test]
    fn unconnected_entities_get_no_edge() {
        let mut graph = SourceGraph::new();
        let a = graph.intern("ex:A");
        let b = graph.intern("ex:B");
        let x = graph.intern("ex:X");
        // A -> X and B -> X share an ancestor but have no path between them.
        graph.insert(Statement::SubClassOf { sub: a, sup: x });
        graph.insert(Statement::SubClassOf { sub: b, sup: x });

        let out = span_gaps(&graph, &set(&[a, b]));
        assert!(out.is_empty());
    }

    #[test]
    fn terminates_on_cyclic_gaps_without_self_edges() {
        let mut graph = SourceGraph::new();
        let a = graph.intern("ex:A");
        let x = graph.intern("ex:X");
        let y = graph.intern("ex:Y");
        graph.insert(Statement::SubClassOf { sub: a, sup: x });
        graph.insert(Statement::SubClassOf { sub: x, sup: y });
        graph.insert(Statement::SubClassOf { sub: y, sup: a });

        let out = span_gaps(&graph, &set(&[a]));
        assert!(out.is_empty());
    }

    #[test]
    fn diamond_gap_spans_both_branches() {
        let mut graph = SourceGraph::new();
        let a = graph.intern("ex:A");
        let x = graph.intern("ex:X");
        let y = graph.intern("ex:Y");
        let b = graph.intern("ex:B");
        let c = graph.intern("ex:C");
        graph.insert(Statement::SubClassOf { sub: a, sup: x });
        graph.insert(Statement::SubClassOf { sub: a, sup: y });
        graph.insert(Statement::SubClassOf { sub: x, sup: b });
        graph.insert(Statement::SubClassOf { sub: y, sup: c });

        let out = span_gaps(&graph, &set(&[a, b, c]));
        assert_eq!(out.len(), 2);
        assert!(out.contains(&Statement::SubClassOf { sub: a, sup: b }));
        assert!(out.contains(&Statement::SubClassOf { sub: a, sup: c }));
    }
}
