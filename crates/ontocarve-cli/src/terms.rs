//! Term input handling: comment-stripped term lists and CURIE expansion.
//!
//! Caller-supplied terms may be full IRIs, `<wrapped>` IRIs, or CURIEs
//! resolved against a prefix table. Unresolvable terms are reported and
//! skipped; partial selection is a valid outcome.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use roaring::RoaringBitmap;

use ontocarve_model::SourceGraph;

/// Prefix table for CURIE expansion, seeded with the core RDF vocabularies.
#[derive(Debug, Clone)]
pub struct PrefixMap {
    prefixes: HashMap<String, String>,
}

impl Default for PrefixMap {
    fn default() -> Self {
        let mut prefixes = HashMap::new();
        for (prefix, expansion) in [
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("owl", "http://www.w3.org/2002/07/owl#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ] {
            prefixes.insert(prefix.to_string(), expansion.to_string());
        }
        Self { prefixes }
    }
}

impl PrefixMap {
    pub fn add(&mut self, prefix: impl Into<String>, expansion: impl Into<String>) {
        self.prefixes.insert(prefix.into(), expansion.into());
    }

    /// Add a combined `"prefix: expansion"` pair, the `--prefix` format.
    pub fn add_combined(&mut self, combined: &str) -> Result<()> {
        let (prefix, expansion) = combined
            .split_once(':')
            .ok_or_else(|| anyhow!("invalid prefix pair (expected `prefix: expansion`): {combined}"))?;
        let (prefix, expansion) = (prefix.trim(), expansion.trim());
        if prefix.is_empty() || expansion.is_empty() {
            return Err(anyhow!(
                "invalid prefix pair (expected `prefix: expansion`): {combined}"
            ));
        }
        self.add(prefix, expansion);
        Ok(())
    }

    /// Merge prefixes from a JSON object of `prefix -> expansion`.
    pub fn load_json_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read prefix file {}", path.display()))?;
        let map: HashMap<String, String> =
            serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        for (prefix, expansion) in map {
            self.add(prefix, expansion);
        }
        Ok(())
    }

    /// Expand a term to a full IRI: `<wrapped>` and absolute IRIs pass
    /// through, CURIEs go through the table.
    pub fn expand(&self, term: &str) -> Option<String> {
        let term = term.trim();
        if let Some(inner) = term.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            return Some(inner.to_string());
        }
        if term.contains("://") {
            return Some(term.to_string());
        }
        let (prefix, local) = term.split_once(':')?;
        self.prefixes
            .get(prefix)
            .map(|expansion| format!("{expansion}{local}"))
    }
}

/// Extract terms from input text: one term per line, blank lines and `#`
/// comment lines skipped, terms trimmed and deduplicated.
pub fn extract_terms(input: &str) -> BTreeSet<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Resolve terms against the graph, collecting what could not be mapped.
///
/// Unresolvable identifiers are warned about and skipped, never fatal.
pub fn resolve_terms(
    graph: &SourceGraph,
    terms: &BTreeSet<String>,
    prefixes: &PrefixMap,
) -> (RoaringBitmap, Vec<String>) {
    let mut seed = RoaringBitmap::new();
    let mut unresolved = Vec::new();
    for term in terms {
        let resolved = prefixes
            .expand(term)
            .and_then(|iri| graph.resolve_iri(&iri));
        match resolved {
            Some(entity) => {
                seed.insert(entity.raw());
            }
            None => {
                tracing::warn!(term = %term, "term does not resolve to a known entity");
                unresolved.push(term.clone());
            }
        }
    }
    (seed, unresolved)
}
