//! Ontocarve data model: interned entities, typed statements, indexed graphs.
//!
//! Key representation choices:
//! 1. **IRI Interning**: every IRI stored once, referenced by a `u32` id
//! 2. **Bitmap Indexes**: entity and statement sets are Roaring bitmaps,
//!    so selection pipelines are cheap set algebra
//! 3. **Closed Statement Enum**: the statement vocabulary is a tagged enum,
//!    so every classifier and traversal is exhaustiveness-checked
//!
//! A [`SourceGraph`] is built once at load time and then used strictly
//! read-only; all engine entry points take `&SourceGraph`, so a loaded graph
//! can be shared across threads without synchronization. Each extraction
//! accumulates into its own private [`OutputGraph`].

pub mod graph;
pub mod statement;

use std::collections::HashMap;

pub use graph::{OutputGraph, SourceGraph};
pub use statement::{
    parse_kind_filter, AnnotationValue, EntityKind, KindFilterError, Statement, StatementKind,
};

// ============================================================================
// IRI Interning (Compact Entity Identity)
// ============================================================================

/// Interned entity id (4 bytes instead of a heap-allocated IRI string).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// IRI interner: maps IRIs to compact ids.
///
/// Mutated only while a graph is being loaded; after that the owning
/// [`SourceGraph`] exposes lookups through `&self` only.
#[derive(Debug, Default)]
pub struct IriInterner {
    iri_to_id: HashMap<String, EntityId>,
    id_to_iri: Vec<String>,
}

impl IriInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an IRI, returning its id.
    pub fn intern(&mut self, iri: &str) -> EntityId {
        if let Some(&id) = self.iri_to_id.get(iri) {
            return id;
        }
        let id = EntityId(self.id_to_iri.len() as u32);
        self.iri_to_id.insert(iri.to_string(), id);
        self.id_to_iri.push(iri.to_string());
        id
    }

    /// Look up an existing id for an IRI without inserting.
    pub fn id_of(&self, iri: &str) -> Option<EntityId> {
        self.iri_to_id.get(iri).copied()
    }

    /// Look up the IRI for an id.
    pub fn lookup(&self, id: EntityId) -> Option<&str> {
        self.id_to_iri.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id_to_iri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_iri.is_empty()
    }
}
