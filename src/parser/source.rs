//! Content source abstraction for reading form files.

use anyhow::{Context, Result};
use camino::Utf8Path;

/// Trait for abstracting where form text comes from (filesystem, memory).
pub trait ContentSource {
    /// Read the file at the given logical path and return its content as a string.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
}

/// Reads files directly from the local filesystem.
pub struct FsSource;

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path.as_std_path())
            .with_context(|| format!("Failed to read {}", path))
    }
}
