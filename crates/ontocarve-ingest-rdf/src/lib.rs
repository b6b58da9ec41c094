//! RDF loading and serialization for Ontocarve (boundary adapter).
//!
//! This crate sits at the interop boundary:
//!
//! - It parses RDF-shaped ontology documents (untrusted) into a
//!   [`SourceGraph`].
//! - It writes an extracted [`OutputGraph`] back out as N-Triples.
//! - It performs no selection logic of its own; the engine owns that.
//!
//! Supported serializations via **Sophia**:
//! - N-Triples (`.nt`)
//! - Turtle (`.ttl`)
//! - RDF/XML (`.rdf`, `.owl`, `.xml`)
//!
//! The statement vocabulary is direct-assertion only: `rdfs:subClassOf`,
//! `owl:equivalentClass`, `owl:disjointWith`, `rdf:type`, declarations,
//! `owl:imports`, ontology-header annotations and entity annotations.
//! Triples involving blank nodes (anonymous class expressions) are skipped.

use std::io::{BufReader, Cursor, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use sophia::api::prelude::*;

use ontocarve_model::{
    AnnotationValue, EntityKind, OutputGraph, SourceGraph, Statement,
};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_DATATYPE: &str = "http://www.w3.org/2000/01/rdf-schema#Datatype";
pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
pub const OWL_EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
pub const OWL_DISJOINT_WITH: &str = "http://www.w3.org/2002/07/owl#disjointWith";
pub const OWL_IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";
pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
pub const OWL_ANNOTATION_PROPERTY: &str = "http://www.w3.org/2002/07/owl#AnnotationProperty";

// ============================================================================
// RDF term model (sufficient for statement extraction)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum RdfNode {
    Iri(String),
    BlankNode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RdfLiteral {
    lexical: String,
    language: Option<String>,
    datatype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RdfObject {
    Node(RdfNode),
    Literal(RdfLiteral),
}

#[derive(Debug, Clone)]
struct RdfTriple {
    subject: RdfNode,
    predicate_iri: String,
    object: RdfObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Ok(RdfFormat::NTriples),
            "ttl" | "turtle" => Ok(RdfFormat::Turtle),
            "rdf" | "owl" | "xml" => Ok(RdfFormat::RdfXml),
            other => Err(anyhow!("unsupported RDF format: .{other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct RdfSinkError {
    message: String,
}

impl From<anyhow::Error> for RdfSinkError {
    fn from(value: anyhow::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

// ============================================================================
// Term parsing (N-Triples-ish display form)
// ============================================================================

fn unescape_rdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_term_display(term: &str) -> Result<RdfObject> {
    let s = term.trim();

    if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(RdfObject::Node(RdfNode::Iri(rest.to_string())));
    }

    if let Some(rest) = s.strip_prefix("_:") {
        return Ok(RdfObject::Node(RdfNode::BlankNode(rest.to_string())));
    }

    if s.starts_with('"') {
        let mut end_quote = None;
        let mut prev_was_escape = false;
        for (i, ch) in s.char_indices().skip(1) {
            if ch == '"' && !prev_was_escape {
                end_quote = Some(i);
                break;
            }
            prev_was_escape = ch == '\\' && !prev_was_escape;
            if ch != '\\' {
                prev_was_escape = false;
            }
        }
        let Some(end) = end_quote else {
            return Err(anyhow!("invalid literal term (missing closing quote): {s}"));
        };

        let lexical = unescape_rdf_string(&s[1..end]);
        let rest = s[end + 1..].trim();

        let mut language = None;
        let mut datatype = None;
        if let Some(lang) = rest.strip_prefix('@') {
            language = Some(lang.to_string());
        } else if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            if let Some(dt_iri) = dt.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                datatype = Some(dt_iri.to_string());
            } else if !dt.is_empty() {
                datatype = Some(dt.to_string());
            }
        }

        return Ok(RdfObject::Literal(RdfLiteral {
            lexical,
            language,
            datatype,
        }));
    }

    Err(anyhow!("unsupported RDF term form: {s}"))
}

fn parse_node_term_display(term: &str) -> Result<RdfNode> {
    match parse_term_display(term)? {
        RdfObject::Node(node) => Ok(node),
        RdfObject::Literal(_) => Err(anyhow!("expected IRI/blank node, got literal: {term}")),
    }
}

fn push_triple(
    out: &mut Vec<RdfTriple>,
    subject: String,
    predicate: String,
    object: String,
) -> std::result::Result<(), RdfSinkError> {
    let subject = parse_node_term_display(&subject).map_err(RdfSinkError::from)?;
    let predicate = parse_node_term_display(&predicate).map_err(RdfSinkError::from)?;
    let RdfNode::Iri(predicate_iri) = predicate else {
        return Ok(());
    };
    let object = parse_term_display(&object).map_err(RdfSinkError::from)?;
    out.push(RdfTriple {
        subject,
        predicate_iri,
        object,
    });
    Ok(())
}

fn parse_triples(bytes: &[u8], format: RdfFormat) -> Result<Vec<RdfTriple>> {
    let reader = BufReader::new(Cursor::new(bytes));
    let mut out: Vec<RdfTriple> = Vec::new();

    match format {
        RdfFormat::NTriples => {
            sophia::turtle::parser::nt::parse_bufread(reader)
                .try_for_each_triple(|t| {
                    push_triple(
                        &mut out,
                        t.s().to_string(),
                        t.p().to_string(),
                        t.o().to_string(),
                    )
                })
                .map_err(|e| anyhow!("failed to parse N-Triples: {e}"))?;
        }
        RdfFormat::Turtle => {
            sophia::turtle::parser::turtle::parse_bufread(reader)
                .try_for_each_triple(|t| {
                    push_triple(
                        &mut out,
                        t.s().to_string(),
                        t.p().to_string(),
                        t.o().to_string(),
                    )
                })
                .map_err(|e| anyhow!("failed to parse Turtle: {e}"))?;
        }
        RdfFormat::RdfXml => {
            sophia::xml::parser::parse_bufread(reader)
                .try_for_each_triple(|t| {
                    push_triple(
                        &mut out,
                        t.s().to_string(),
                        t.p().to_string(),
                        t.o().to_string(),
                    )
                })
                .map_err(|e| anyhow!("failed to parse RDF/XML: {e}"))?;
        }
    }
    Ok(out)
}

// ============================================================================
// Triple -> statement mapping
// ============================================================================

fn declaration_kind(class_iri: &str) -> Option<EntityKind> {
    match class_iri {
        OWL_CLASS => Some(EntityKind::Class),
        OWL_NAMED_INDIVIDUAL => Some(EntityKind::NamedIndividual),
        OWL_OBJECT_PROPERTY => Some(EntityKind::ObjectProperty),
        OWL_DATATYPE_PROPERTY => Some(EntityKind::DataProperty),
        OWL_ANNOTATION_PROPERTY => Some(EntityKind::AnnotationProperty),
        RDFS_DATATYPE => Some(EntityKind::Datatype),
        _ => None,
    }
}

/// Load a source graph from a file, picking the format from the extension.
pub fn load_path(path: &Path) -> Result<SourceGraph> {
    let format = RdfFormat::from_path(path)?;
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    graph_from_bytes(&bytes, format)
}

/// Parse an RDF document into an indexed [`SourceGraph`].
pub fn graph_from_bytes(bytes: &[u8], format: RdfFormat) -> Result<SourceGraph> {
    let triples = parse_triples(bytes, format)?;
    let mut graph = SourceGraph::new();

    // The ontology header subject scopes imports and metadata annotations.
    let ontology_iri = triples.iter().find_map(|t| match (&t.subject, &t.object) {
        (RdfNode::Iri(subject), RdfObject::Node(RdfNode::Iri(object)))
            if t.predicate_iri == RDF_TYPE && object == OWL_ONTOLOGY =>
        {
            Some(subject.clone())
        }
        _ => None,
    });
    if let Some(iri) = &ontology_iri {
        graph.set_ontology_iri(iri.clone());
    }

    let mut skipped_bnodes = 0usize;
    for triple in &triples {
        let RdfNode::Iri(subject_iri) = &triple.subject else {
            skipped_bnodes += 1;
            continue;
        };
        if let RdfObject::Node(RdfNode::BlankNode(_)) = &triple.object {
            skipped_bnodes += 1;
            continue;
        }

        let is_header = ontology_iri.as_deref() == Some(subject_iri.as_str());
        let predicate = triple.predicate_iri.as_str();

        match (&triple.object, predicate) {
            (RdfObject::Node(RdfNode::Iri(object_iri)), RDF_TYPE) => {
                if object_iri == OWL_ONTOLOGY {
                    continue;
                }
                let subject = graph.intern(subject_iri);
                if let Some(kind) = declaration_kind(object_iri) {
                    graph.insert(Statement::Declaration {
                        entity: subject,
                        kind,
                    });
                } else {
                    let class = graph.intern(object_iri);
                    graph.insert(Statement::ClassAssertion {
                        individual: subject,
                        class,
                    });
                }
            }
            (RdfObject::Node(RdfNode::Iri(object_iri)), RDFS_SUBCLASS_OF) => {
                let sub = graph.intern(subject_iri);
                let sup = graph.intern(object_iri);
                graph.insert(Statement::SubClassOf { sub, sup });
            }
            (RdfObject::Node(RdfNode::Iri(object_iri)), OWL_EQUIVALENT_CLASS) => {
                let left = graph.intern(subject_iri);
                let right = graph.intern(object_iri);
                graph.insert(Statement::EquivalentClasses { left, right });
            }
            (RdfObject::Node(RdfNode::Iri(object_iri)), OWL_DISJOINT_WITH) => {
                let left = graph.intern(subject_iri);
                let right = graph.intern(object_iri);
                graph.insert(Statement::DisjointClasses { left, right });
            }
            (RdfObject::Node(RdfNode::Iri(object_iri)), OWL_IMPORTS) if is_header => {
                let target = graph.intern(object_iri);
                graph.insert(Statement::Import { target });
            }
            (object, _) => {
                let property = graph.intern(predicate);
                let value = match object {
                    RdfObject::Node(RdfNode::Iri(iri)) => AnnotationValue::Entity(graph.intern(iri)),
                    RdfObject::Literal(lit) => AnnotationValue::Literal {
                        lexical: lit.lexical.clone(),
                        language: lit.language.clone(),
                        datatype: lit.datatype.clone(),
                    },
                    RdfObject::Node(RdfNode::BlankNode(_)) => unreachable!("filtered above"),
                };
                if is_header {
                    graph.insert(Statement::OntologyAnnotation { property, value });
                } else {
                    let subject = graph.intern(subject_iri);
                    graph.insert(Statement::AnnotationAssertion {
                        subject,
                        property,
                        value,
                    });
                }
            }
        }
    }

    if skipped_bnodes > 0 {
        tracing::debug!(skipped_bnodes, "blank-node triples skipped");
    }
    tracing::debug!(
        statements = graph.statement_count(),
        entities = graph.entity_count(),
        "source graph loaded"
    );
    Ok(graph)
}

// ============================================================================
// N-Triples writer
// ============================================================================

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn render_value(graph: &SourceGraph, value: &AnnotationValue) -> Result<String> {
    match value {
        AnnotationValue::Entity(id) => {
            let iri = graph
                .iri(*id)
                .ok_or_else(|| anyhow!("unknown entity id in output: {id:?}"))?;
            Ok(format!("<{iri}>"))
        }
        AnnotationValue::Literal {
            lexical,
            language,
            datatype,
        } => {
            let mut out = format!("\"{}\"", escape_literal(lexical));
            if let Some(lang) = language {
                out.push('@');
                out.push_str(lang);
            } else if let Some(dt) = datatype {
                out.push_str(&format!("^^<{dt}>"));
            }
            Ok(out)
        }
    }
}

/// Serialize an output graph as N-Triples, deterministically (sorted lines).
///
/// The source graph supplies the id-to-IRI mapping; every entity in the
/// output came from the source, so lookups cannot miss unless the two are
/// mismatched, which is an error.
pub fn write_ntriples<W: Write>(
    graph: &SourceGraph,
    output: &OutputGraph,
    writer: &mut W,
) -> Result<()> {
    let iri = |id| {
        graph
            .iri(id)
            .ok_or_else(|| anyhow!("unknown entity id in output: {id:?}"))
    };

    let mut lines: Vec<String> = Vec::with_capacity(output.len() + 1);
    if let Some(ontology) = output.ontology_iri() {
        lines.push(format!("<{ontology}> <{RDF_TYPE}> <{OWL_ONTOLOGY}> ."));
    }

    for statement in output.statements() {
        let line = match statement {
            Statement::SubClassOf { sub, sup } => {
                format!("<{}> <{RDFS_SUBCLASS_OF}> <{}> .", iri(*sub)?, iri(*sup)?)
            }
            Statement::EquivalentClasses { left, right } => {
                format!(
                    "<{}> <{OWL_EQUIVALENT_CLASS}> <{}> .",
                    iri(*left)?,
                    iri(*right)?
                )
            }
            Statement::DisjointClasses { left, right } => {
                format!("<{}> <{OWL_DISJOINT_WITH}> <{}> .", iri(*left)?, iri(*right)?)
            }
            Statement::ClassAssertion { individual, class } => {
                format!("<{}> <{RDF_TYPE}> <{}> .", iri(*individual)?, iri(*class)?)
            }
            Statement::Declaration { entity, kind } => {
                let class_iri = match kind {
                    EntityKind::Class => OWL_CLASS,
                    EntityKind::NamedIndividual => OWL_NAMED_INDIVIDUAL,
                    EntityKind::ObjectProperty => OWL_OBJECT_PROPERTY,
                    EntityKind::DataProperty => OWL_DATATYPE_PROPERTY,
                    EntityKind::AnnotationProperty => OWL_ANNOTATION_PROPERTY,
                    EntityKind::Datatype => RDFS_DATATYPE,
                };
                format!("<{}> <{RDF_TYPE}> <{class_iri}> .", iri(*entity)?)
            }
            Statement::AnnotationAssertion {
                subject,
                property,
                value,
            } => {
                format!(
                    "<{}> <{}> {} .",
                    iri(*subject)?,
                    iri(*property)?,
                    render_value(graph, value)?
                )
            }
            Statement::OntologyAnnotation { property, value } => {
                let Some(ontology) = output.ontology_iri() else {
                    tracing::warn!("ontology annotation without an ontology IRI, skipped");
                    continue;
                };
                format!(
                    "<{ontology}> <{}> {} .",
                    iri(*property)?,
                    render_value(graph, value)?
                )
            }
            Statement::Import { target } => {
                let Some(ontology) = output.ontology_iri() else {
                    tracing::warn!("import reference without an ontology IRI, skipped");
                    continue;
                };
                format!("<{ontology}> <{OWL_IMPORTS}> <{}> .", iri(*target)?)
            }
        };
        lines.push(line);
    }

    lines.sort();
    lines.dedup();
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
