use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::adjlist::{read_adjlist_file, write_adjlist_file, ReadOptions, WriteOptions};
use crate::error::Result;
use crate::gml::{read_gml_file, write_gml_file};
use crate::graph::AdjGraph;
use crate::paths::{derive_adjlist_path, derive_output_path, resolve_output_path};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub read: ReadOptions,
    /// Overrides the path derived from the input name.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ReverseOptions {
    pub write: WriteOptions,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub nodes: usize,
    pub edges: usize,
    pub self_loops: usize,
}

impl ConversionSummary {
    fn new(input: &Path, output: PathBuf, graph: &AdjGraph) -> Self {
        Self {
            input: input.to_path_buf(),
            output,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            self_loops: graph.self_loop_count(),
        }
    }
}

/// Reads an adjacency list and writes it as GML.
///
/// The input is parsed completely before the output file is created, so a
/// missing or malformed input never leaves an output file behind.
pub fn convert(input: &Path, options: &ConvertOptions) -> Result<ConversionSummary> {
    let output = resolve_output_path(input, options.output.as_deref(), derive_output_path)?;
    let graph = read_adjlist_file(input, &options.read)?;
    write_gml_file(&graph, &output)?;

    let summary = ConversionSummary::new(input, output, &graph);
    info!(
        input = %summary.input.display(),
        output = %summary.output.display(),
        nodes = summary.nodes,
        edges = summary.edges,
        "converted adjacency list to GML"
    );
    Ok(summary)
}

/// Reads a GML document and writes it as an adjacency list.
pub fn convert_to_adjlist(input: &Path, options: &ReverseOptions) -> Result<ConversionSummary> {
    let output = resolve_output_path(input, options.output.as_deref(), derive_adjlist_path)?;
    let graph = read_gml_file(input)?;
    write_adjlist_file(&graph, &output, &options.write)?;

    let summary = ConversionSummary::new(input, output, &graph);
    info!(
        input = %summary.input.display(),
        output = %summary.output.display(),
        nodes = summary.nodes,
        edges = summary.edges,
        "converted GML to adjacency list"
    );
    Ok(summary)
}
