//! Indexed source graph (read-only after load) and the private output
//! accumulator each extraction builds into.

use std::collections::{HashMap, HashSet};

use roaring::RoaringBitmap;

use crate::{EntityId, IriInterner, Statement};

// ============================================================================
// Source Graph (statement list + per-entity indexes)
// ============================================================================

/// The complete source statement set plus lookup indexes.
///
/// Built incrementally through [`SourceGraph::intern`] and
/// [`SourceGraph::insert`] while loading, then used strictly read-only. The
/// engine never holds a mutable alias, so one loaded graph can serve
/// concurrent extractions.
#[derive(Debug, Default)]
pub struct SourceGraph {
    interner: IriInterner,
    ontology_iri: Option<String>,
    statements: Vec<Statement>,

    /// entity -> bitmap of statement indexes mentioning it
    mentions: HashMap<EntityId, RoaringBitmap>,
    /// every entity mentioned by at least one statement
    all_entities: RoaringBitmap,
    /// entity -> statement index of its declaration
    declarations: HashMap<EntityId, usize>,

    /// hierarchy adjacency, subclass -> superclasses
    parents: HashMap<EntityId, Vec<EntityId>>,
    /// hierarchy adjacency, superclass -> subclasses
    children: HashMap<EntityId, Vec<EntityId>>,
    /// symmetric equivalence adjacency
    equivalents: HashMap<EntityId, Vec<EntityId>>,
    /// symmetric disjointness adjacency
    disjoints: HashMap<EntityId, Vec<EntityId>>,
    /// individual -> asserted classes
    types_of: HashMap<EntityId, Vec<EntityId>>,
    /// class -> asserted members
    members_of: HashMap<EntityId, Vec<EntityId>>,

    /// statement indexes of import references
    imports: Vec<usize>,
    /// statement indexes of ontology-level metadata
    ontology_annotations: Vec<usize>,
}

impl SourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an IRI. Only valid while the graph is being loaded.
    pub fn intern(&mut self, iri: &str) -> EntityId {
        self.interner.intern(iri)
    }

    pub fn set_ontology_iri(&mut self, iri: impl Into<String>) {
        self.ontology_iri = Some(iri.into());
    }

    pub fn ontology_iri(&self) -> Option<&str> {
        self.ontology_iri.as_deref()
    }

    /// Add a statement, maintaining every index.
    pub fn insert(&mut self, statement: Statement) {
        let idx = self.statements.len();

        for entity in statement.entities() {
            self.mentions.entry(entity).or_default().insert(idx as u32);
            self.all_entities.insert(entity.raw());
        }

        match &statement {
            Statement::SubClassOf { sub, sup } => {
                self.parents.entry(*sub).or_default().push(*sup);
                self.children.entry(*sup).or_default().push(*sub);
            }
            Statement::EquivalentClasses { left, right } => {
                self.equivalents.entry(*left).or_default().push(*right);
                self.equivalents.entry(*right).or_default().push(*left);
            }
            Statement::DisjointClasses { left, right } => {
                self.disjoints.entry(*left).or_default().push(*right);
                self.disjoints.entry(*right).or_default().push(*left);
            }
            Statement::ClassAssertion { individual, class } => {
                self.types_of.entry(*individual).or_default().push(*class);
                self.members_of.entry(*class).or_default().push(*individual);
            }
            Statement::Declaration { entity, .. } => {
                self.declarations.entry(*entity).or_insert(idx);
            }
            Statement::Import { .. } => self.imports.push(idx),
            Statement::OntologyAnnotation { .. } => self.ontology_annotations.push(idx),
            Statement::AnnotationAssertion { .. } => {}
        }

        self.statements.push(statement);
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn statement(&self, idx: u32) -> Option<&Statement> {
        self.statements.get(idx as usize)
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Bitmap of statement indexes mentioning an entity.
    pub fn mention_ids(&self, entity: EntityId) -> Option<&RoaringBitmap> {
        self.mentions.get(&entity)
    }

    /// All statements mentioning an entity.
    pub fn statements_mentioning(
        &self,
        entity: EntityId,
    ) -> impl Iterator<Item = &Statement> + '_ {
        self.mentions
            .get(&entity)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|idx| self.statements.get(idx as usize))
    }

    /// The declaration statement for an entity, if the source carries one.
    pub fn declaration(&self, entity: EntityId) -> Option<&Statement> {
        self.declarations
            .get(&entity)
            .and_then(|&idx| self.statements.get(idx))
    }

    /// Every entity mentioned by at least one statement.
    pub fn entities(&self) -> &RoaringBitmap {
        &self.all_entities
    }

    pub fn entity_count(&self) -> usize {
        self.all_entities.len() as usize
    }

    pub fn parents_of(&self, entity: EntityId) -> &[EntityId] {
        self.parents.get(&entity).map_or(&[], Vec::as_slice)
    }

    pub fn children_of(&self, entity: EntityId) -> &[EntityId] {
        self.children.get(&entity).map_or(&[], Vec::as_slice)
    }

    pub fn equivalents_of(&self, entity: EntityId) -> &[EntityId] {
        self.equivalents.get(&entity).map_or(&[], Vec::as_slice)
    }

    pub fn disjoints_of(&self, entity: EntityId) -> &[EntityId] {
        self.disjoints.get(&entity).map_or(&[], Vec::as_slice)
    }

    pub fn types_of(&self, entity: EntityId) -> &[EntityId] {
        self.types_of.get(&entity).map_or(&[], Vec::as_slice)
    }

    pub fn members_of(&self, entity: EntityId) -> &[EntityId] {
        self.members_of.get(&entity).map_or(&[], Vec::as_slice)
    }

    pub fn imports(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.imports
            .iter()
            .filter_map(|&idx| self.statements.get(idx))
    }

    pub fn ontology_annotations(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.ontology_annotations
            .iter()
            .filter_map(|&idx| self.statements.get(idx))
    }

    /// Resolve a full IRI to an entity mentioned somewhere in the graph.
    pub fn resolve_iri(&self, iri: &str) -> Option<EntityId> {
        self.interner
            .id_of(iri)
            .filter(|id| self.all_entities.contains(id.raw()))
    }

    pub fn iri(&self, entity: EntityId) -> Option<&str> {
        self.interner.lookup(entity)
    }
}

// ============================================================================
// Output Graph (private per-extraction accumulator)
// ============================================================================

/// The accumulated output statement set.
///
/// Never shares storage with the source graph: statements are copied in by
/// value. Set semantics hold by construction, a statement lands at most once
/// no matter how many pipeline steps produce it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputGraph {
    ontology_iri: Option<String>,
    statements: HashSet<Statement>,
}

impl OutputGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ontology_iri(iri: impl Into<String>) -> Self {
        Self {
            ontology_iri: Some(iri.into()),
            statements: HashSet::new(),
        }
    }

    pub fn ontology_iri(&self) -> Option<&str> {
        self.ontology_iri.as_deref()
    }

    /// Insert one statement; returns false if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    pub fn extend<I: IntoIterator<Item = Statement>>(&mut self, statements: I) {
        self.statements.extend(statements);
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every entity referenced by any statement in the output.
    pub fn entity_ids(&self) -> RoaringBitmap {
        let mut out = RoaringBitmap::new();
        for statement in &self.statements {
            for entity in statement.entities() {
                out.insert(entity.raw());
            }
        }
        out
    }

    /// Retain only statements matching the predicate.
    pub fn retain<F: FnMut(&Statement) -> bool>(&mut self, f: F) {
        self.statements.retain(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{AnnotationValue, EntityKind};

    fn edge(graph: &mut SourceGraph, sub: &str, sup: &str) {
        let sub = graph.intern(sub);
        let sup = graph.intern(sup);
        graph.insert(Statement::SubClassOf { sub, sup });
    }

    #[test]
    fn insert_maintains_hierarchy_indexes() {
        let mut graph = SourceGraph::new();
        edge(&mut graph, "ex:A", "ex:B");
        edge(&mut graph, "ex:B", "ex:C");

        let a = graph.resolve_iri("ex:A").unwrap();
        let b = graph.resolve_iri("ex:B").unwrap();
        let c = graph.resolve_iri("ex:C").unwrap();

        assert_eq!(graph.parents_of(a), &[b]);
        assert_eq!(graph.parents_of(b), &[c]);
        assert_eq!(graph.children_of(c), &[b]);
        assert_eq!(graph.entity_count(), 3);
        assert_eq!(graph.statements_mentioning(b).count(), 2);
    }

    #[test]
    fn equivalence_and_disjointness_are_symmetric() {
        let mut graph = SourceGraph::new();
        let a = graph.intern("ex:A");
        let b = graph.intern("ex:B");
        let c = graph.intern("ex:C");
        graph.insert(Statement::EquivalentClasses { left: a, right: b });
        graph.insert(Statement::DisjointClasses { left: a, right: c });

        assert_eq!(graph.equivalents_of(b), &[a]);
        assert_eq!(graph.disjoints_of(c), &[a]);
    }

    #[test]
    fn declaration_lookup_returns_first_declaration() {
        let mut graph = SourceGraph::new();
        let a = graph.intern("ex:A");
        graph.insert(Statement::Declaration {
            entity: a,
            kind: EntityKind::Class,
        });

        assert!(matches!(
            graph.declaration(a),
            Some(Statement::Declaration { .. })
        ));
        assert!(graph.declaration(EntityId::new(99)).is_none());
    }

    #[test]
    fn output_graph_has_set_semantics() {
        let mut out = OutputGraph::new();
        let stmt = Statement::AnnotationAssertion {
            subject: EntityId::new(0),
            property: EntityId::new(1),
            value: AnnotationValue::literal("hello"),
        };
        assert!(out.insert(stmt.clone()));
        assert!(!out.insert(stmt));
        assert_eq!(out.len(), 1);
        assert_eq!(out.entity_ids().len(), 2);
    }
}
