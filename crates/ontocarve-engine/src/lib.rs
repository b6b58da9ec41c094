//! Ontocarve engine: carve a structurally consistent subset out of a large
//! statement graph.
//!
//! The pipeline, in order:
//! 1. **Selection** ([`select`]): resolve seed entities through an ordered
//!    list of relation-operator stages.
//! 2. **Closure classification** ([`classify`]): decide which source
//!    statements transfer, under Complete or Partial membership.
//! 3. **Gap spanning** ([`span`], optional): synthesize direct hierarchy
//!    edges across omitted intermediates.
//! 4. **Annotation propagation** ([`annotate`], optional): pull in the
//!    descriptive annotations of every referenced entity.
//! 5. **Trimming** ([`trim`], optional, default on): drop declarations of
//!    entities nothing else references.
//!
//! Every entry point takes `&SourceGraph`; the source is never mutated, so a
//! loaded graph may serve concurrent extractions, each with its own private
//! [`OutputGraph`].

pub mod annotate;
pub mod classify;
pub mod select;
pub mod span;
pub mod trim;

use std::collections::HashSet;

use roaring::RoaringBitmap;

use ontocarve_model::{OutputGraph, SourceGraph, StatementKind};

pub use annotate::{annotations_for, propagate};
pub use classify::{classify, ClosureMode};
pub use select::{resolve, SelectError, SelectionStage, Selector};
pub use span::span_gaps;
pub use trim::trim_dangling;

/// Everything one extraction needs beyond the graph and the seed.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Ordered selection stages; empty means the implicit `self` stage.
    pub stages: Vec<SelectionStage>,
    /// Statement-kind filter; empty means no restriction.
    pub kinds: HashSet<StatementKind>,
    /// Complete or partial closure membership.
    pub mode: ClosureMode,
    /// Synthesize hierarchy edges across omitted intermediates.
    pub preserve_structure: bool,
    /// Pull in descriptive annotations for every referenced entity. ORed
    /// with any stage's `annotations` keyword.
    pub include_annotations: bool,
    /// Drop declarations of entities nothing else references.
    pub trim: bool,
    /// Ontology identifier for the output; defaults to the source's.
    pub ontology_iri: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            stages: Vec::new(),
            kinds: HashSet::new(),
            mode: ClosureMode::Complete,
            preserve_structure: true,
            include_annotations: false,
            trim: true,
            ontology_iri: None,
        }
    }
}

/// Run the full extraction pipeline.
///
/// Two early-exit policies:
/// - toggles-only invocations (`imports`/`ontology` keywords, no operators,
///   no seed) return exactly those metadata statements;
/// - a selection that resolves to nothing falls back to every entity in the
///   source graph ("no constraint means everything").
pub fn extract(graph: &SourceGraph, seed: &RoaringBitmap, options: &ExtractOptions) -> OutputGraph {
    let include_annotations = options.include_annotations
        || options.stages.iter().any(|s| s.include_annotations);
    let include_imports = options.stages.iter().any(|s| s.include_imports);
    let include_ontology = options.stages.iter().any(|s| s.include_ontology);
    let operators_present = options.stages.iter().any(|s| !s.is_empty());

    let mut output = match options
        .ontology_iri
        .as_deref()
        .or_else(|| graph.ontology_iri())
    {
        Some(iri) => OutputGraph::with_ontology_iri(iri),
        None => OutputGraph::new(),
    };

    if include_imports {
        output.extend(graph.imports().cloned());
    }
    if include_ontology {
        output.extend(graph.ontology_annotations().cloned());
    }

    // Toggles-only invocation: the metadata statements are the whole result.
    if (include_imports || include_ontology) && !operators_present && seed.is_empty() {
        tracing::debug!(statements = output.len(), "metadata-only extraction");
        return if options.trim {
            trim_dangling(output)
        } else {
            output
        };
    }

    // Empty seed selects the whole graph.
    let seed = if seed.is_empty() {
        graph.entities().clone()
    } else {
        seed.clone()
    };

    let mut selected = select::resolve(graph, &seed, &options.stages);
    if selected.is_empty() {
        selected = graph.entities().clone();
    }

    let mut statements = classify::classify(graph, &selected, &options.kinds, options.mode);

    if options.preserve_structure {
        statements.extend(span::span_gaps(graph, &selected));
    }

    if include_annotations {
        // Propagation runs against the directly selected entities plus
        // everything the qualified statements reference.
        let mut referenced = selected.clone();
        for statement in &statements {
            for entity in statement.entities() {
                referenced.insert(entity.raw());
            }
        }
        statements.extend(annotate::annotations_for(graph, &referenced));
    }

    output.extend(statements);

    tracing::debug!(
        selected = selected.len(),
        statements = output.len(),
        trim = options.trim,
        "extraction assembled"
    );

    if options.trim {
        trim_dangling(output)
    } else {
        output
    }
}
