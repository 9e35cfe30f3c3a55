//! Output path derivation.
//!
//! The converters name their output after the input by swapping a marker
//! substring (`.csv` for adjacency lists, `.txt` for GML). Only the first
//! occurrence is replaced. A path without the marker derives to itself, which
//! `resolve_output_path` rejects rather than clobbering the input.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

pub const ADJLIST_SUFFIX: &str = ".csv";
pub const GML_SUFFIX: &str = ".txt";

/// Replace the first occurrence of `from` in `input` with `to`.
pub fn swap_suffix(input: &Path, from: &str, to: &str) -> Result<PathBuf> {
    let text = input.to_str().ok_or_else(|| Error::NonUtf8Path {
        path: input.to_path_buf(),
    })?;
    Ok(PathBuf::from(text.replacen(from, to, 1)))
}

/// GML output path for an adjacency-list input: first `.csv` becomes `.txt`.
pub fn derive_output_path(input: &Path) -> Result<PathBuf> {
    swap_suffix(input, ADJLIST_SUFFIX, GML_SUFFIX)
}

/// Adjacency-list output path for a GML input: first `.txt` becomes `.csv`.
pub fn derive_adjlist_path(input: &Path) -> Result<PathBuf> {
    swap_suffix(input, GML_SUFFIX, ADJLIST_SUFFIX)
}

/// Pick the output path (explicit or derived) and refuse to reuse the input.
pub fn resolve_output_path(
    input: &Path,
    explicit: Option<&Path>,
    derive: fn(&Path) -> Result<PathBuf>,
) -> Result<PathBuf> {
    let output = match explicit {
        Some(path) => path.to_path_buf(),
        None => derive(input)?,
    };
    if same_file(input, &output) {
        return Err(Error::SelfOverwrite { path: output });
    }
    debug!(input = %input.display(), output = %output.display(), "resolved output path");
    Ok(output)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("foo.csv")).unwrap(),
            PathBuf::from("foo.txt")
        );
        assert_eq!(
            derive_output_path(Path::new("data/graph.csv")).unwrap(),
            PathBuf::from("data/graph.txt")
        );
    }

    #[test]
    fn test_derive_replaces_first_occurrence_only() {
        assert_eq!(
            derive_output_path(Path::new("a.csv.csv")).unwrap(),
            PathBuf::from("a.txt.csv")
        );
    }

    #[test]
    fn test_derive_without_suffix_is_unchanged() {
        assert_eq!(
            derive_output_path(Path::new("graph.txt")).unwrap(),
            PathBuf::from("graph.txt")
        );
    }

    #[test]
    fn test_resolve_rejects_self_overwrite() {
        let err = resolve_output_path(Path::new("graph.txt"), None, derive_output_path)
            .unwrap_err();
        assert!(matches!(err, Error::SelfOverwrite { .. }));

        let err = resolve_output_path(
            Path::new("graph.csv"),
            Some(Path::new("graph.csv")),
            derive_output_path,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SelfOverwrite { .. }));
    }

    #[test]
    fn test_resolve_rejects_same_file_via_other_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("graph.dat");
        fs::write(&input, "A B\n").unwrap();
        let other = dir.path().join(".").join("graph.dat");

        let err = resolve_output_path(&input, Some(&other), derive_output_path).unwrap_err();
        assert!(matches!(err, Error::SelfOverwrite { .. }));
    }

    #[test]
    fn test_resolve_explicit_output() {
        let out = resolve_output_path(
            Path::new("graph.txt"),
            Some(Path::new("graph.gml")),
            derive_output_path,
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("graph.gml"));
    }

    #[test]
    fn test_derive_adjlist_path() {
        assert_eq!(
            derive_adjlist_path(Path::new("net.txt")).unwrap(),
            PathBuf::from("net.csv")
        );
    }
}
