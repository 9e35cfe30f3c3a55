//! Convert graphs between adjacency-list text and GML.

pub mod adjlist;
pub mod convert;
pub mod error;
pub mod gml;
pub mod graph;
pub mod paths;

pub use convert::{convert, convert_to_adjlist, ConversionSummary, ConvertOptions, ReverseOptions};
pub use error::{Error, Result};
pub use graph::AdjGraph;

/// Initialise stderr logging: `RUST_LOG` if set, else `warn` raised by `verbose`.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}
