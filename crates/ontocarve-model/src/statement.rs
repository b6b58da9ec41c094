//! Typed statements ("axioms") and their kind vocabulary.
//!
//! Statements are immutable once read from the source graph: the engine only
//! selects and copies them, so they derive `Eq + Hash` and output assembly is
//! plain set insertion.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::EntityId;

/// What a declaration declares an entity to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Class,
    NamedIndividual,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    Datatype,
}

/// Value position of an annotation: another entity or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationValue {
    Entity(EntityId),
    Literal {
        lexical: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl AnnotationValue {
    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal {
            lexical: lexical.into(),
            language: None,
            datatype: None,
        }
    }
}

/// A single statement of the source graph.
///
/// The vocabulary is closed: adding a statement form means extending this
/// enum, and the compiler will point at every classifier, traversal and
/// writer that needs to learn about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    /// Structural hierarchy edge: `sub` is a subclass of `sup`.
    SubClassOf { sub: EntityId, sup: EntityId },
    /// Equivalence between two classes.
    EquivalentClasses { left: EntityId, right: EntityId },
    /// Disjointness between two classes.
    DisjointClasses { left: EntityId, right: EntityId },
    /// Membership: `individual` is asserted to be of type `class`.
    ClassAssertion {
        individual: EntityId,
        class: EntityId,
    },
    /// Declaration of an entity's kind.
    Declaration { entity: EntityId, kind: EntityKind },
    /// Descriptive annotation on an entity.
    AnnotationAssertion {
        subject: EntityId,
        property: EntityId,
        value: AnnotationValue,
    },
    /// Ontology-level metadata annotation.
    OntologyAnnotation {
        property: EntityId,
        value: AnnotationValue,
    },
    /// Import reference to another ontology document.
    Import { target: EntityId },
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::SubClassOf { .. } => StatementKind::SubClassOf,
            Statement::EquivalentClasses { .. } => StatementKind::EquivalentClasses,
            Statement::DisjointClasses { .. } => StatementKind::DisjointClasses,
            Statement::ClassAssertion { .. } => StatementKind::ClassAssertion,
            Statement::Declaration { .. } => StatementKind::Declaration,
            Statement::AnnotationAssertion { .. } => StatementKind::AnnotationAssertion,
            Statement::OntologyAnnotation { .. } => StatementKind::OntologyAnnotation,
            Statement::Import { .. } => StatementKind::Import,
        }
    }

    /// Every entity this statement references, annotation properties and
    /// entity-valued annotation objects included.
    pub fn entities(&self) -> Vec<EntityId> {
        match self {
            Statement::SubClassOf { sub, sup } => vec![*sub, *sup],
            Statement::EquivalentClasses { left, right }
            | Statement::DisjointClasses { left, right } => vec![*left, *right],
            Statement::ClassAssertion { individual, class } => vec![*individual, *class],
            Statement::Declaration { entity, .. } => vec![*entity],
            Statement::AnnotationAssertion {
                subject,
                property,
                value,
            } => {
                let mut out = vec![*subject, *property];
                if let AnnotationValue::Entity(id) = value {
                    out.push(*id);
                }
                out
            }
            Statement::OntologyAnnotation { property, value } => {
                let mut out = vec![*property];
                if let AnnotationValue::Entity(id) = value {
                    out.push(*id);
                }
                out
            }
            Statement::Import { target } => vec![*target],
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, Statement::Declaration { .. })
    }
}

// ============================================================================
// Statement kinds and the `--axioms` filter vocabulary
// ============================================================================

/// The closed set of statement kind tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementKind {
    SubClassOf,
    EquivalentClasses,
    DisjointClasses,
    ClassAssertion,
    Declaration,
    AnnotationAssertion,
    OntologyAnnotation,
    Import,
}

impl StatementKind {
    pub const ALL: [StatementKind; 8] = [
        StatementKind::SubClassOf,
        StatementKind::EquivalentClasses,
        StatementKind::DisjointClasses,
        StatementKind::ClassAssertion,
        StatementKind::Declaration,
        StatementKind::AnnotationAssertion,
        StatementKind::OntologyAnnotation,
        StatementKind::Import,
    ];

    /// Logical (non-annotation) statement kinds.
    pub const LOGICAL: [StatementKind; 4] = [
        StatementKind::SubClassOf,
        StatementKind::EquivalentClasses,
        StatementKind::DisjointClasses,
        StatementKind::ClassAssertion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatementKind::SubClassOf => "subclass",
            StatementKind::EquivalentClasses => "equivalent",
            StatementKind::DisjointClasses => "disjoint",
            StatementKind::ClassAssertion => "type",
            StatementKind::Declaration => "declaration",
            StatementKind::AnnotationAssertion => "annotation",
            StatementKind::OntologyAnnotation => "ontology",
            StatementKind::Import => "import",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KindFilterError {
    #[error("unknown axiom kind: `{token}`")]
    Unknown { token: String },
}

impl FromStr for StatementKind {
    type Err = KindFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subclass" => Ok(StatementKind::SubClassOf),
            "equivalent" => Ok(StatementKind::EquivalentClasses),
            "disjoint" => Ok(StatementKind::DisjointClasses),
            "type" => Ok(StatementKind::ClassAssertion),
            "declaration" => Ok(StatementKind::Declaration),
            "annotation" => Ok(StatementKind::AnnotationAssertion),
            "ontology" => Ok(StatementKind::OntologyAnnotation),
            "import" => Ok(StatementKind::Import),
            _ => Err(KindFilterError::Unknown {
                token: s.to_string(),
            }),
        }
    }
}

/// Parse an `--axioms` style filter: comma/whitespace separated kind names,
/// plus the groups `all`, `logical` and `annotations`.
///
/// Returns the empty set for `all` (empty filter means no restriction).
pub fn parse_kind_filter(input: &str) -> Result<HashSet<StatementKind>, KindFilterError> {
    let mut out = HashSet::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token {
            "all" => return Ok(HashSet::new()),
            "logical" => out.extend(StatementKind::LOGICAL),
            "annotations" => {
                out.insert(StatementKind::AnnotationAssertion);
                out.insert(StatementKind::OntologyAnnotation);
            }
            other => {
                out.insert(other.parse()?);
            }
        }
    }
    Ok(out)
}
