//! Extraction over a directory tree of form files.
//!
//! Each file is parsed independently, so the work is spread with rayon.

use crate::model::Document;
use crate::parser::{ContentSource, FormParser, FsSource};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

/// All files below `root` whose extension equals `ext` (ASCII
/// case-insensitive), sorted.
pub fn collect_form_files(root: impl AsRef<Utf8Path>, ext: &str) -> Result<Vec<Utf8PathBuf>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root.as_std_path()) {
        let entry = entry.with_context(|| format!("Read dir {}", root))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|p| anyhow::anyhow!("Non-UTF8 path {}", p.display()))?;
        if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every path from the filesystem, preserving input order.
pub fn parse_many(paths: &[Utf8PathBuf]) -> Vec<(Utf8PathBuf, Result<Document>)> {
    parse_many_with(paths, || FsSource)
}

/// Parse every path through a per-file source built by `make_source`.
pub fn parse_many_with<S, F>(
    paths: &[Utf8PathBuf],
    make_source: F,
) -> Vec<(Utf8PathBuf, Result<Document>)>
where
    S: ContentSource,
    F: Fn() -> S + Sync,
{
    paths
        .par_iter()
        .map(|p| {
            let mut parser = FormParser::new(make_source());
            (p.clone(), parser.parse_form_file(p))
        })
        .collect()
}

/// One-line outcome of a batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub ok: bool,
    pub description: Option<String>,
    pub grids: usize,
    pub popups: usize,
    pub error: Option<String>,
}

impl FileSummary {
    pub fn new(path: &Utf8Path, result: &Result<Document>) -> Self {
        match result {
            Ok(doc) => Self {
                path: path.to_string(),
                ok: true,
                description: doc.description.clone(),
                grids: doc.grids.len(),
                popups: doc.popups.len(),
                error: None,
            },
            Err(err) => Self {
                path: path.to_string(),
                ok: false,
                description: None,
                grids: 0,
                popups: 0,
                error: Some(format!("{:#}", err)),
            },
        }
    }
}
