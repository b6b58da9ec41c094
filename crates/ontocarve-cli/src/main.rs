//! Ontocarve CLI
//!
//! Carves a focused subset out of an ontology document: seed terms go
//! through an ordered pipeline of relation selectors, qualifying statements
//! transfer to a fresh output graph, severed hierarchy chains are repaired,
//! and dangling entities are trimmed.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ontocarve_engine::{extract, ClosureMode, ExtractOptions, SelectionStage};
use ontocarve_model::parse_kind_filter;

mod terms;

use terms::PrefixMap;

#[derive(Parser)]
#[command(name = "ontocarve")]
#[command(author, version, about = "Carve structurally consistent subsets out of ontologies")]
struct Cli {
    /// Load the ontology from a file (.nt, .ttl, .rdf, .owl, .xml)
    #[arg(short, long)]
    input: PathBuf,

    /// Save the subset as N-Triples (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ontology IRI for the output (defaults to the input's)
    #[arg(short = 'O', long)]
    ontology_iri: Option<String>,

    /// Seed term (full IRI, <wrapped> IRI, or CURIE); repeatable
    #[arg(short, long)]
    term: Vec<String>,

    /// Load seed terms from a file (one per line, `#` comments)
    #[arg(short = 'T', long)]
    term_file: Option<PathBuf>,

    /// Selection stage: whitespace-separated keywords (self, parents,
    /// children, ancestors, descendants, equivalents, disjoints, types,
    /// individuals, complement, annotations, imports, ontology); repeatable,
    /// stages chain in order
    #[arg(short, long)]
    select: Vec<String>,

    /// Keep only these statement kinds (names, or `all`/`logical`/`annotations`)
    #[arg(short, long)]
    axioms: Option<String>,

    /// Complete or partial closure membership
    #[arg(short, long, value_enum, default_value_t = Mode::Complete)]
    mode: Mode,

    /// Repair hierarchy chains severed by omitted intermediates
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    preserve_structure: bool,

    /// Pull in descriptive annotations for every referenced entity
    #[arg(long, action = ArgAction::SetTrue)]
    annotations: bool,

    /// Drop declarations of entities nothing else references
    #[arg(short = 'r', long, default_value_t = true, action = ArgAction::Set)]
    trim: bool,

    /// Add a prefix pair, e.g. "ex: http://example.org/"; repeatable
    #[arg(long)]
    prefix: Vec<String>,

    /// Load prefixes from a JSON object of prefix -> expansion
    #[arg(long)]
    prefixes: Option<PathBuf>,

    /// Write a JSON extraction report
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Complete,
    Partial,
}

impl From<Mode> for ClosureMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Complete => ClosureMode::Complete,
            Mode::Partial => ClosureMode::Partial,
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    input_statements: usize,
    input_entities: usize,
    selected_entities: u64,
    output_statements: usize,
    output_entities: u64,
    unresolved_terms: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    // Stage syntax and the kind filter are validated before any graph work:
    // an unknown keyword must never silently change selection semantics.
    let stages = cli
        .select
        .iter()
        .map(|spec| SelectionStage::parse(spec))
        .collect::<Result<Vec<_>, _>>()?;
    let kinds = match &cli.axioms {
        Some(spec) => parse_kind_filter(spec)?,
        None => Default::default(),
    };

    let mut prefixes = PrefixMap::default();
    if let Some(path) = &cli.prefixes {
        prefixes.load_json_file(path)?;
    }
    for pair in &cli.prefix {
        prefixes.add_combined(pair)?;
    }

    let graph = ontocarve_ingest_rdf::load_path(&cli.input)?;

    let mut term_set: BTreeSet<String> = cli.term.iter().map(|t| t.trim().to_string()).collect();
    if let Some(path) = &cli.term_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read term file {}", path.display()))?;
        term_set.extend(terms::extract_terms(&text));
    }
    let (seed, unresolved) = terms::resolve_terms(&graph, &term_set, &prefixes);

    let options = ExtractOptions {
        stages,
        kinds,
        mode: cli.mode.into(),
        preserve_structure: cli.preserve_structure,
        include_annotations: cli.annotations,
        trim: cli.trim,
        ontology_iri: cli.ontology_iri.clone(),
    };
    let output = extract(&graph, &seed, &options);

    match &cli.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            ontocarve_ingest_rdf::write_ntriples(&graph, &output, &mut file)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            ontocarve_ingest_rdf::write_ntriples(&graph, &output, &mut handle)?;
        }
    }

    let summary = Summary {
        input_statements: graph.statement_count(),
        input_entities: graph.entity_count(),
        selected_entities: seed.len(),
        output_statements: output.len(),
        output_entities: output.entity_ids().len(),
        unresolved_terms: unresolved,
    };
    if let Some(path) = &cli.summary {
        let mut file =
            std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
        serde_json::to_writer_pretty(&mut file, &summary)?;
        writeln!(file)?;
    }

    eprintln!(
        "{} {} of {} statements kept, {} of {} entities",
        "carved:".green().bold(),
        summary.output_statements,
        summary.input_statements,
        summary.output_entities,
        summary.input_entities,
    );
    if !summary.unresolved_terms.is_empty() {
        eprintln!(
            "{} {} term(s) did not resolve: {}",
            "warning:".yellow().bold(),
            summary.unresolved_terms.len(),
            summary.unresolved_terms.join(", "),
        );
    }

    Ok(())
}
