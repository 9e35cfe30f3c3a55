use std::path::PathBuf;

use adjlist2gml::adjlist::{Delimiter, WriteOptions};
use adjlist2gml::{convert_to_adjlist, init_logging, ReverseOptions};
use anyhow::{Context, Result};
use clap::Parser;

/// Convert a GML file back to an adjacency list.
///
/// The output is written next to the input with the first `.txt` in its
/// name replaced by `.csv`, unless `--output` is given.
#[derive(Parser, Debug)]
#[command(name = "gml2adjlist", version, about, long_about = None)]
struct Args {
    /// GML input file
    input: PathBuf,

    /// Write the adjacency list here instead of the derived path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Token separator: a single character, `tab`, or `whitespace`
    #[arg(short, long, default_value = "whitespace")]
    delimiter: Delimiter,

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

    let options = ReverseOptions {
        write: WriteOptions {
            delimiter: args.delimiter,
            ..WriteOptions::default()
        },
        output: args.output,
    };

    let summary = convert_to_adjlist(&args.input, &options)
        .with_context(|| format!("converting {}", args.input.display()))?;

    if args.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
