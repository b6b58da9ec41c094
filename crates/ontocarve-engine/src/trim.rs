//! Dangling-entity trimmer.
//!
//! An entity is *backed* when some non-declaration statement in the output
//! references it. Trimming drops the declarations of unbacked entities;
//! since removing declarations never changes what is backed, trimming is
//! idempotent.

use roaring::RoaringBitmap;

use ontocarve_model::{OutputGraph, Statement};

/// Remove declarations for entities no surviving statement references.
pub fn trim_dangling(mut graph: OutputGraph) -> OutputGraph {
    let mut backed = RoaringBitmap::new();
    for statement in graph.statements() {
        if statement.is_declaration() {
            continue;
        }
        for entity in statement.entities() {
            backed.insert(entity.raw());
        }
    }

    let before = graph.len();
    graph.retain(|statement| match statement {
        Statement::Declaration { entity, .. } => backed.contains(entity.raw()),
        _ => true,
    });
    let dropped = before - graph.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dangling declarations trimmed");
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontocarve_model::{EntityId, EntityKind};

    fn declaration(raw: u32) -> Statement {
        Statement::Declaration {
            entity: EntityId::new(raw),
            kind: EntityKind::Class,
        }
    }

    #[test]
    fn drops_unbacked_declarations_and_keeps_backed_ones() {
        let mut out = OutputGraph::new();
        out.insert(declaration(0));
        out.insert(declaration(1));
        out.insert(declaration(2));
        out.insert(Statement::SubClassOf {
            sub: EntityId::new(0),
            sup: EntityId::new(1),
        });

        let trimmed = trim_dangling(out);
        assert_eq!(trimmed.len(), 3);
        assert!(!trimmed.contains(&declaration(2)));
        assert!(trimmed.contains(&declaration(0)));
    }

    #[test]
    fn trimming_is_idempotent() {
        let mut out = OutputGraph::new();
        out.insert(declaration(0));
        out.insert(declaration(7));
        out.insert(Statement::SubClassOf {
            sub: EntityId::new(0),
            sup: EntityId::new(3),
        });

        let once = trim_dangling(out);
        let twice = trim_dangling(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_graph_stays_empty() {
        let trimmed = trim_dangling(OutputGraph::new());
        assert!(trimmed.is_empty());
    }
}
