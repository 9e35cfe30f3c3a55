//! Adjacency-list text format.
//!
//! One line per node: the node label followed by its neighbours. Tokens are
//! separated by runs of whitespace unless an explicit one-byte delimiter is
//! configured, in which case lines are read as delimited records.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::AdjGraph;

/// How tokens on a line are separated.
///
/// `Byte` must hold an ASCII byte; readers and writers reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Whitespace,
    Byte(u8),
}

impl Delimiter {
    fn validate(&self) -> Result<()> {
        match self {
            Delimiter::Byte(b) if !b.is_ascii() => Err(Error::InvalidDelimiter { byte: *b }),
            _ => Ok(()),
        }
    }

    fn separator(&self) -> char {
        match self {
            Delimiter::Whitespace => ' ',
            Delimiter::Byte(b) => *b as char,
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" | "whitespace" => Ok(Delimiter::Whitespace),
            "\\t" | "tab" => Ok(Delimiter::Byte(b'\t')),
            _ if s.len() == 1 && s.is_ascii() => Ok(Delimiter::Byte(s.as_bytes()[0])),
            _ => Err(format!("delimiter must be a single ASCII character, got {s:?}")),
        }
    }
}

/// How node tokens are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeType {
    #[default]
    String,
    /// Tokens must be 64-bit integers; labels are stored in canonical form.
    Int,
}

impl NodeType {
    fn normalize<'a>(&self, token: &'a str) -> std::result::Result<Cow<'a, str>, String> {
        match self {
            NodeType::String => Ok(Cow::Borrowed(token)),
            NodeType::Int => token
                .parse::<i64>()
                .map(|n| Cow::Owned(n.to_string()))
                .map_err(|e| format!("node {token:?} is not an integer: {e}")),
        }
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" | "str" => Ok(NodeType::String),
            "int" | "integer" => Ok(NodeType::Int),
            _ => Err(format!("unknown node type {s:?} (expected string or int)")),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::String => write!(f, "string"),
            NodeType::Int => write!(f, "int"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub delimiter: Delimiter,
    /// Everything from this character to the end of the line is ignored.
    pub comments: Option<char>,
    pub node_type: NodeType,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            comments: Some('#'),
            node_type: NodeType::String,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub delimiter: Delimiter,
    /// Labels containing this character are rejected so the output reads back.
    pub comments: Option<char>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            comments: Some('#'),
        }
    }
}

pub fn read_adjlist_file(path: &Path, options: &ReadOptions) -> Result<AdjGraph> {
    let file = File::open(path).map_err(|e| Error::reading(path, e))?;
    read_adjlist(BufReader::new(file), options).map_err(|e| match e {
        Error::Io(source) => Error::Read {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

pub fn read_adjlist<R: BufRead>(reader: R, options: &ReadOptions) -> Result<AdjGraph> {
    options.delimiter.validate()?;
    let mut graph = AdjGraph::new();
    let lines = match options.delimiter {
        Delimiter::Whitespace => read_whitespace(reader, options, &mut graph)?,
        Delimiter::Byte(b) => read_delimited(reader, b, options, &mut graph)?,
    };

    debug!(
        lines,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "parsed adjacency list"
    );
    Ok(graph)
}

fn read_whitespace<R: BufRead>(
    reader: R,
    options: &ReadOptions,
    graph: &mut AdjGraph,
) -> Result<u64> {
    let mut line_no = 0;
    for line in reader.split(b'\n') {
        let bytes = line?;
        line_no += 1;

        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::parse(line_no, format!("invalid UTF-8: {e}")))?;
        let text = match options.comments.and_then(|c| text.find(c)) {
            Some(p) => &text[..p],
            None => text,
        };
        let tokens: Vec<&str> = text.split_whitespace().collect();
        add_line(graph, line_no, &tokens, options.node_type)?;
    }
    Ok(line_no)
}

fn read_delimited<R: BufRead>(
    reader: R,
    delimiter: u8,
    options: &ReadOptions,
    graph: &mut AdjGraph,
) -> Result<u64> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut record = csv::StringRecord::new();
    let mut line_no = 0;
    while rdr.read_record(&mut record)? {
        line_no = record.position().map(|p| p.line()).unwrap_or(line_no + 1);

        let mut tokens = Vec::with_capacity(record.len());
        for field in record.iter() {
            match options.comments.and_then(|c| field.find(c)) {
                Some(p) => {
                    let head = field[..p].trim();
                    if !head.is_empty() {
                        tokens.push(head);
                    }
                    break;
                }
                None if field.is_empty() => {}
                None => tokens.push(field),
            }
        }
        add_line(graph, line_no, &tokens, options.node_type)?;
    }
    Ok(line_no)
}

fn add_line(graph: &mut AdjGraph, line: u64, tokens: &[&str], node_type: NodeType) -> Result<()> {
    let Some((head, neighbors)) = tokens.split_first() else {
        return Ok(());
    };
    let head = node_type.normalize(head).map_err(|m| Error::parse(line, m))?;
    graph.add_node(&head);

    for token in neighbors {
        let neighbor = node_type.normalize(token).map_err(|m| Error::parse(line, m))?;
        if !graph.add_edge(&head, &neighbor) {
            debug!(line, node = %head, neighbor = %neighbor, "edge already present");
        }
    }
    Ok(())
}

pub fn write_adjlist_file(graph: &AdjGraph, path: &Path, options: &WriteOptions) -> Result<()> {
    let to_write = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_write)?;
    let mut writer = BufWriter::new(file);
    write_adjlist(graph, &mut writer, options).map_err(|e| match e {
        Error::Io(source) => to_write(source),
        other => other,
    })?;
    writer.flush().map_err(to_write)
}

/// Writes each undirected edge once, on the line of whichever endpoint comes first.
pub fn write_adjlist<W: Write>(
    graph: &AdjGraph,
    mut writer: W,
    options: &WriteOptions,
) -> Result<()> {
    options.delimiter.validate()?;
    let separator = options.delimiter.separator();
    let mut seen = HashSet::new();

    for label in graph.labels() {
        check_label(label, options)?;
        let mut line = label.to_string();
        for neighbor in graph.neighbors(label) {
            if !seen.contains(neighbor) {
                line.push(separator);
                line.push_str(neighbor);
            }
        }
        seen.insert(label);
        writeln!(writer, "{line}")?;
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "wrote adjacency list"
    );
    Ok(())
}

fn check_label(label: &str, options: &WriteOptions) -> Result<()> {
    let reject = |message: &str| {
        warn!(label, "label cannot be represented in adjacency list");
        Err(Error::Label {
            label: label.to_string(),
            message: message.to_string(),
        })
    };

    if label.is_empty() {
        return reject("empty label");
    }
    if label.contains(['\n', '\r']) {
        return reject("contains a line break");
    }
    if options.comments.is_some_and(|c| label.contains(c)) {
        return reject("contains the comment character");
    }
    match options.delimiter {
        Delimiter::Whitespace if label.chars().any(char::is_whitespace) => {
            reject("contains whitespace")
        }
        Delimiter::Byte(b) if label.contains(b as char) => reject("contains the delimiter"),
        Delimiter::Byte(_) if label.trim() != label => {
            reject("has leading or trailing whitespace")
        }
        _ => Ok(()),
    }
}
