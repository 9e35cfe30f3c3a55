use std::path::PathBuf;

use adjlist2gml::adjlist::{Delimiter, NodeType, ReadOptions};
use adjlist2gml::{convert, init_logging, ConvertOptions};
use anyhow::{Context, Result};
use clap::Parser;

/// Convert an adjacency-list file to GML.
///
/// The output is written next to the input with the first `.csv` in its
/// name replaced by `.txt`, unless `--output` is given.
#[derive(Parser, Debug)]
#[command(name = "adjlist2gml", version, about, long_about = None)]
struct Args {
    /// Adjacency-list input file
    input: PathBuf,

    /// Write GML here instead of the derived path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Token separator: a single character, `tab`, or `whitespace`
    #[arg(short, long, default_value = "whitespace")]
    delimiter: Delimiter,

    /// Comment character; the rest of a line after it is ignored
    #[arg(long, default_value_t = '#', conflicts_with = "no_comments")]
    comments: char,

    /// Treat every character as data
    #[arg(long)]
    no_comments: bool,

    /// Node label type (`string` or `int`)
    #[arg(long, default_value_t = NodeType::String)]
    nodetype: NodeType,

    /// Print a JSON summary of the conversion to stdout
    #[arg(long)]
    summary: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = ConvertOptions {
        read: ReadOptions {
            delimiter: args.delimiter,
            comments: (!args.no_comments).then_some(args.comments),
            node_type: args.nodetype,
        },
        output: args.output,
    };

    let summary = convert(&args.input, &options)
        .with_context(|| format!("converting {}", args.input.display()))?;

    if args.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
