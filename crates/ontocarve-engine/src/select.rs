//! Selection pipeline: resolve an ordered list of stages into an entity set.
//!
//! Each stage consumes the output of the previous stage (the first consumes
//! the seed). Operators within one stage are evaluated independently against
//! the source graph and unioned; stages chain strictly left-to-right, so
//! `--select children --select ancestors` selects the ancestors of the
//! children, not the children of the ancestors.

use std::str::FromStr;

use roaring::RoaringBitmap;
use thiserror::Error;

use ontocarve_model::{EntityId, SourceGraph};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    /// An unrecognized operator keyword. Fatal to the invocation: silently
    /// ignoring an operator would silently change semantics.
    #[error("unknown selector keyword: `{token}`")]
    UnknownSelector { token: String },
}

/// A relation operator of one selection stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// The input entity itself.
    Itself,
    /// Entities one hierarchy edge up.
    Parents,
    /// Entities one hierarchy edge down.
    Children,
    /// Transitive closure of `Parents` (cycle-safe).
    Ancestors,
    /// Transitive closure of `Children` (cycle-safe).
    Descendants,
    /// Entities connected via equivalence statements.
    Equivalents,
    /// Entities connected via disjointness statements.
    Disjoints,
    /// For an individual, its asserted classes.
    Types,
    /// For a class, its asserted members.
    Individuals,
    /// Everything in the source graph *not* selected by the rest of the
    /// stage's operators.
    Complement,
}

impl FromStr for Selector {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self" => Ok(Selector::Itself),
            "parents" => Ok(Selector::Parents),
            "children" => Ok(Selector::Children),
            "ancestors" => Ok(Selector::Ancestors),
            "descendants" => Ok(Selector::Descendants),
            "equivalents" => Ok(Selector::Equivalents),
            "disjoints" => Ok(Selector::Disjoints),
            "types" => Ok(Selector::Types),
            "individuals" => Ok(Selector::Individuals),
            "complement" => Ok(Selector::Complement),
            _ => Err(SelectError::UnknownSelector {
                token: s.to_string(),
            }),
        }
    }
}

/// One stage of the selection pipeline: a union of operators plus the toggle
/// keywords (`annotations`, `imports`, `ontology`). The toggles do not affect
/// entity-set membership; they are recorded here and applied once by the
/// orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStage {
    pub selectors: Vec<Selector>,
    pub include_annotations: bool,
    pub include_imports: bool,
    pub include_ontology: bool,
}

impl SelectionStage {
    /// Parse one `--select` value: whitespace-separated keywords.
    pub fn parse(spec: &str) -> Result<Self, SelectError> {
        let mut stage = Self::default();
        for token in spec.split_whitespace() {
            match token {
                "annotations" => stage.include_annotations = true,
                "imports" => stage.include_imports = true,
                "ontology" => stage.include_ontology = true,
                other => stage.selectors.push(other.parse()?),
            }
        }
        Ok(stage)
    }

    pub fn of(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            selectors: selectors.into_iter().collect(),
            ..Self::default()
        }
    }

    /// True when the stage carries only toggles, no relation operators.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Resolve the pipeline: seed through each stage in order.
///
/// An empty stage list (or a pipeline of toggle-only stages) leaves the seed
/// unmodified, the implicit `self` stage.
pub fn resolve(graph: &SourceGraph, seed: &RoaringBitmap, stages: &[SelectionStage]) -> RoaringBitmap {
    let mut current = seed.clone();
    for stage in stages {
        if stage.is_empty() {
            continue;
        }
        current = resolve_stage(graph, &current, stage);
        tracing::debug!(selected = current.len(), ?stage.selectors, "stage resolved");
    }
    current
}

/// Two-pass stage evaluation: union every non-complement operator first, then
/// complement against that union if requested. `complement` therefore never
/// sees a partial result.
fn resolve_stage(graph: &SourceGraph, input: &RoaringBitmap, stage: &SelectionStage) -> RoaringBitmap {
    let mut selected = RoaringBitmap::new();
    let mut complement = false;

    for selector in &stage.selectors {
        match selector {
            Selector::Complement => complement = true,
            other => selected |= resolve_selector(graph, input, *other),
        }
    }

    if complement {
        let mut all = graph.entities().clone();
        all -= &selected;
        selected = all;
    }
    selected
}

fn resolve_selector(graph: &SourceGraph, input: &RoaringBitmap, selector: Selector) -> RoaringBitmap {
    match selector {
        Selector::Itself => input.clone(),
        Selector::Parents => adjacent(graph, input, SourceGraph::parents_of),
        Selector::Children => adjacent(graph, input, SourceGraph::children_of),
        Selector::Ancestors => closure(graph, input, SourceGraph::parents_of),
        Selector::Descendants => closure(graph, input, SourceGraph::children_of),
        Selector::Equivalents => adjacent(graph, input, SourceGraph::equivalents_of),
        Selector::Disjoints => adjacent(graph, input, SourceGraph::disjoints_of),
        Selector::Types => adjacent(graph, input, SourceGraph::types_of),
        Selector::Individuals => adjacent(graph, input, SourceGraph::members_of),
        // Handled by resolve_stage's second pass.
        Selector::Complement => RoaringBitmap::new(),
    }
}

type Step = for<'g> fn(&'g SourceGraph, EntityId) -> &'g [EntityId];

/// Entities one step away from any input entity.
fn adjacent(graph: &SourceGraph, input: &RoaringBitmap, step: Step) -> RoaringBitmap {
    let mut out = RoaringBitmap::new();
    for raw in input {
        for next in step(graph, EntityId::new(raw)) {
            out.insert(next.raw());
        }
    }
    out
}

/// Transitive closure of `step`. The seen-set bounds revisits, so traversal
/// terminates on cyclic hierarchies in time proportional to distinct edges.
fn closure(graph: &SourceGraph, input: &RoaringBitmap, step: Step) -> RoaringBitmap {
    let mut seen = RoaringBitmap::new();
    let mut frontier: Vec<u32> = input.iter().collect();
    while let Some(raw) = frontier.pop() {
        for next in step(graph, EntityId::new(raw)) {
            if seen.insert(next.raw()) {
                frontier.push(next.raw());
            }
        }
    }
    seen
}
