//! GML (Graph Modeling Language) reading and writing.
//!
//! Written documents look like
//!
//! ```text
//! graph [
//!   node [
//!     id 0
//!     label "A"
//!   ]
//!   edge [
//!     source 0
//!     target 1
//!   ]
//! ]
//! ```
//!
//! Node ids are positions in first-appearance order and labels carry the node
//! names. `&`, `"` and non-ASCII characters in labels are written as decimal
//! character references.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::AdjGraph;

const INDENT: &str = "  ";

/// Deepest `[ ... ]` nesting the reader accepts.
const MAX_DEPTH: usize = 128;

pub fn write_gml_file(graph: &AdjGraph, path: &Path) -> Result<()> {
    let to_write = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_write)?;
    let mut writer = BufWriter::new(file);
    write_gml(graph, &mut writer).map_err(|e| match e {
        Error::Io(source) => to_write(source),
        other => other,
    })?;
    writer.flush().map_err(to_write)
}

pub fn write_gml<W: Write>(graph: &AdjGraph, mut writer: W) -> Result<()> {
    writeln!(writer, "graph [")?;
    for (id, label) in graph.labels().enumerate() {
        writeln!(writer, "{INDENT}node [")?;
        writeln!(writer, "{INDENT}{INDENT}id {id}")?;
        writeln!(writer, "{INDENT}{INDENT}label \"{}\"", escape(label))?;
        writeln!(writer, "{INDENT}]")?;
    }
    for (source, target) in graph.edge_positions() {
        writeln!(writer, "{INDENT}edge [")?;
        writeln!(writer, "{INDENT}{INDENT}source {source}")?;
        writeln!(writer, "{INDENT}{INDENT}target {target}")?;
        writeln!(writer, "{INDENT}]")?;
    }
    writeln!(writer, "]")?;

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "wrote GML"
    );
    Ok(())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '&' || c == '"' || !c.is_ascii() || c.is_ascii_control() {
            out.push_str(&format!("&#{};", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_reference(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match name {
        "amp" => Some('&'),
        "quot" => Some('"'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Real(f64),
    Str(String),
    Open,
    Close,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Key(k) => format!("key {k:?}"),
            Token::Int(n) => format!("integer {n}"),
            Token::Real(r) => format!("real {r}"),
            Token::Str(s) => format!("string {s:?}"),
            Token::Open => "'['".to_string(),
            Token::Close => "']'".to_string(),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<(u64, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            '[' => {
                chars.next();
                tokens.push((line, Token::Open));
            }
            ']' => {
                chars.next();
                tokens.push((line, Token::Close));
            }
            '"' => {
                chars.next();
                let start = line;
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            text.push(c);
                        }
                        None => return Err(Error::gml(start, "unterminated string")),
                    }
                }
                tokens.push((start, Token::Str(unescape(&text))));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut key = String::new();
                while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                    key.push(c);
                }
                tokens.push((line, Token::Key(key)));
            }
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                let mut number = String::new();
                let numeric =
                    |c: &char| c.is_ascii_digit() || matches!(*c, '-' | '+' | '.' | 'e' | 'E');
                while let Some(c) = chars.next_if(numeric) {
                    number.push(c);
                }
                let token = if let Ok(n) = number.parse::<i64>() {
                    Token::Int(n)
                } else if let Ok(r) = number.parse::<f64>() {
                    Token::Real(r)
                } else {
                    return Err(Error::gml(line, format!("invalid number {number:?}")));
                };
                tokens.push((line, token));
            }
            other => {
                return Err(Error::gml(line, format!("unexpected character {other:?}")));
            }
        }
    }
    Ok(tokens)
}

#[derive(Debug)]
enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<Entry>),
}

#[derive(Debug)]
struct Entry {
    key: String,
    line: u64,
    value: Value,
}

/// Parses `key value` pairs until a matching `]` (when `opened_at` is set) or end of input.
///
/// `depth` counts the lists enclosing this one.
fn parse_list<I>(tokens: &mut I, opened_at: Option<u64>, depth: usize) -> Result<Vec<Entry>>
where
    I: Iterator<Item = (u64, Token)>,
{
    let mut entries = Vec::new();
    loop {
        let (line, key) = match tokens.next() {
            None => {
                return match opened_at {
                    Some(line) => Err(Error::gml(line, "unclosed '['")),
                    None => Ok(entries),
                };
            }
            Some((_, Token::Close)) if opened_at.is_some() => return Ok(entries),
            Some((line, Token::Key(key))) => (line, key),
            Some((line, other)) => {
                let found = other.describe();
                return Err(Error::gml(line, format!("expected a key, found {found}")));
            }
        };

        let value = match tokens.next() {
            Some((_, Token::Int(n))) => Value::Int(n),
            Some((_, Token::Real(r))) => Value::Real(r),
            Some((_, Token::Str(s))) => Value::Str(s),
            Some((open, Token::Open)) => {
                if depth >= MAX_DEPTH {
                    return Err(Error::gml(open, "nesting too deep"));
                }
                Value::List(parse_list(tokens, Some(open), depth + 1)?)
            }
            Some((at, other)) => {
                return Err(Error::gml(
                    at,
                    format!("expected a value for {key:?}, found {}", other.describe()),
                ));
            }
            None => return Err(Error::gml(line, format!("missing value for {key:?}"))),
        };
        entries.push(Entry { key, line, value });
    }
}

pub fn read_gml_file(path: &Path) -> Result<AdjGraph> {
    let file = File::open(path).map_err(|e| Error::reading(path, e))?;
    read_gml(BufReader::new(file)).map_err(|e| match e {
        Error::Io(source) => Error::Read {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

pub fn read_gml<R: Read>(mut reader: R) -> Result<AdjGraph> {
    let mut src = String::new();
    reader.read_to_string(&mut src)?;
    parse_gml(&src)
}

/// Builds an undirected graph from a GML document.
pub fn parse_gml(src: &str) -> Result<AdjGraph> {
    let tokens = tokenize(src)?;
    let top = parse_list(&mut tokens.into_iter(), None, 0)?;

    let entry = top
        .iter()
        .find(|e| e.key == "graph")
        .ok_or_else(|| Error::gml(1, "no graph found"))?;
    let Value::List(items) = &entry.value else {
        return Err(Error::gml(entry.line, "graph must be a list"));
    };

    let mut graph = AdjGraph::new();
    let mut ids: HashMap<i64, String> = HashMap::new();
    let mut edges = Vec::new();

    for item in items {
        match (item.key.as_str(), &item.value) {
            ("directed", Value::Int(n)) if *n != 0 => {
                return Err(Error::gml(item.line, "directed graphs are not supported"));
            }
            ("multigraph", Value::Int(n)) if *n != 0 => {
                return Err(Error::gml(item.line, "multigraphs are not supported"));
            }
            ("node", Value::List(attrs)) => {
                let id = int_attr(attrs, "id", item.line)?;
                let label = match attrs.iter().find(|a| a.key == "label") {
                    Some(Entry {
                        value: Value::Str(s), ..
                    }) => s.clone(),
                    Some(other) => {
                        return Err(Error::gml(other.line, "node label must be a string"));
                    }
                    None => id.to_string(),
                };
                if ids.contains_key(&id) {
                    return Err(Error::gml(item.line, format!("duplicate node id {id}")));
                }
                if graph.contains_node(&label) {
                    return Err(Error::gml(item.line, format!("duplicate node label {label:?}")));
                }
                graph.add_node(&label);
                ids.insert(id, label);
            }
            ("edge", Value::List(attrs)) => {
                let source = int_attr(attrs, "source", item.line)?;
                let target = int_attr(attrs, "target", item.line)?;
                edges.push((item.line, source, target));
            }
            ("node" | "edge", _) => {
                return Err(Error::gml(item.line, format!("{} must be a list", item.key)));
            }
            _ => {}
        }
    }

    for (line, source, target) in edges {
        let lookup = |id: i64| {
            ids.get(&id)
                .ok_or_else(|| Error::gml(line, format!("edge refers to unknown node id {id}")))
        };
        let (a, b) = (lookup(source)?, lookup(target)?);
        if !graph.add_edge(a, b) {
            warn!(line, source = %a, target = %b, "duplicate edge ignored");
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "parsed GML"
    );
    Ok(graph)
}

fn int_attr(attrs: &[Entry], key: &str, line: u64) -> Result<i64> {
    match attrs.iter().find(|a| a.key == key) {
        Some(Entry {
            value: Value::Int(n), ..
        }) => Ok(*n),
        Some(Entry {
            value: Value::Real(r),
            line,
            ..
        }) => Err(Error::gml(*line, format!("{key} must be an integer, found {r}"))),
        Some(Entry {
            value: Value::Str(_) | Value::List(_),
            line,
            ..
        }) => Err(Error::gml(*line, format!("{key} must be an integer"))),
        None => Err(Error::gml(line, format!("missing {key}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjlist::{read_adjlist, ReadOptions};
    use proptest::prelude::*;

    const EXAMPLE_GML: &str = "\
graph [
  node [
    id 0
    label \"A\"
  ]
  node [
    id 1
    label \"B\"
  ]
  node [
    id 2
    label \"C\"
  ]
  edge [
    source 0
    target 1
  ]
  edge [
    source 0
    target 2
  ]
]
";

    fn example() -> AdjGraph {
        read_adjlist("A B C\nB A\nC A\n".as_bytes(), &ReadOptions::default()).unwrap()
    }

    fn to_gml(graph: &AdjGraph) -> String {
        let mut out = Vec::new();
        write_gml(graph, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_example() {
        assert_eq!(to_gml(&example()), EXAMPLE_GML);
    }

    #[test]
    fn test_example_reads_back() {
        let graph = example();
        let back = parse_gml(&to_gml(&graph)).unwrap();

        assert_eq!(back.node_set(), graph.node_set());
        assert_eq!(back.edge_set(), graph.edge_set());
        assert_eq!(back.edge_count(), 2);
    }

    #[test]
    fn test_escape_labels() {
        let mut graph = AdjGraph::new();
        graph.add_edge("say \"hi\"", "café & co");
        let text = to_gml(&graph);

        assert!(text.contains("label \"say &#34;hi&#34;\""));
        assert!(text.contains("label \"caf&#233; &#38; co\""));
        let back = parse_gml(&text).unwrap();
        assert!(back.contains_edge("say \"hi\"", "café & co"));
    }

    #[test]
    fn test_unescape_references() {
        assert_eq!(unescape("a&amp;b&#x41;&#66;&lt;"), "a&bAB<");
        assert_eq!(unescape("AT&T; & friends"), "AT&T; & friends");
    }

    #[test]
    fn test_read_without_labels_and_with_extras() {
        let src = "# comment\n\
                   Creator \"someone\"\n\
                   graph [\n\
                   \x20 name \"g\"\n\
                   \x20 directed 0\n\
                   \x20 node [ id 3 weight 1.5 ]\n\
                   \x20 edge [ source 3 target 4 ]\n\
                   \x20 node [ id 4 graphics [ x 1 y 2 ] ]\n\
                   ]\n";
        let graph = parse_gml(src).unwrap();

        assert_eq!(graph.labels().collect::<Vec<_>>(), vec!["3", "4"]);
        assert!(graph.contains_edge("3", "4"));
    }

    #[test]
    fn test_read_rejects_directed() {
        let err = parse_gml("graph [\n  directed 1\n]\n").unwrap_err();
        assert!(matches!(err, Error::Gml { line: 2, .. }));
    }

    #[test]
    fn test_read_rejects_unknown_node() {
        let src = "graph [\n  node [ id 0 ]\n  edge [ source 0 target 9 ]\n]";
        let err = parse_gml(src).unwrap_err();
        match err {
            Error::Gml { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("unknown node id 9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_rejects_deep_nesting() {
        let depth = 200_000;
        let src = format!("graph [\n{}{}]", "x [ ".repeat(depth), "] ".repeat(depth));
        match parse_gml(&src).unwrap_err() {
            Error::Gml { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("nesting too deep"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let shallow = format!(
            "graph [\n  node [ id 0 {}{} ]\n]",
            "x [ ".repeat(MAX_DEPTH - 2),
            "] ".repeat(MAX_DEPTH - 2)
        );
        assert_eq!(parse_gml(&shallow).unwrap().node_count(), 1);
    }

    #[test]
    fn test_read_rejects_real_id() {
        let err = parse_gml("graph [ node [ id 1.5 ] ]").unwrap_err();
        match err {
            Error::Gml { message, .. } => assert!(message.contains("found 1.5")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_rejects_duplicates() {
        let dup_id = parse_gml("graph [ node [ id 0 label \"a\" ] node [ id 0 label \"b\" ] ]");
        assert!(matches!(dup_id, Err(Error::Gml { .. })));

        let dup_label = parse_gml("graph [ node [ id 0 label \"a\" ] node [ id 1 label \"a\" ] ]");
        assert!(matches!(dup_label, Err(Error::Gml { .. })));
    }

    #[test]
    fn test_read_malformed() {
        assert!(matches!(parse_gml(""), Err(Error::Gml { line: 1, .. })));
        assert!(matches!(
            parse_gml("graph [\n  node [ id 0 ]\n"),
            Err(Error::Gml { line: 1, .. })
        ));
        assert!(matches!(
            parse_gml("graph [ node [ label \"x\" ] ]"),
            Err(Error::Gml { .. })
        ));
        assert!(matches!(
            parse_gml("graph [ label \"open ]"),
            Err(Error::Gml { .. })
        ));
        assert!(matches!(parse_gml("graph [ ; ]"), Err(Error::Gml { .. })));
    }

    proptest! {
        #[test]
        fn test_gml_round_trip(
            labels in prop::collection::vec("\\PC{1,6}", 1..8),
            picks in prop::collection::vec((0usize..8, 0usize..8), 0..16),
        ) {
            let mut graph = AdjGraph::new();
            for label in &labels {
                graph.add_node(label);
            }
            let names: Vec<String> = graph.labels().map(str::to_string).collect();
            for (a, b) in picks {
                graph.add_edge(&names[a % names.len()], &names[b % names.len()]);
            }

            let back = parse_gml(&to_gml(&graph)).unwrap();
            prop_assert_eq!(back.node_set(), graph.node_set());
            prop_assert_eq!(back.edge_set(), graph.edge_set());
        }
    }
}
