use crate::errors::{Error, Result};
use ignore::WalkBuilder;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filters applied while walking a directory tree.
///
/// A single-file root bypasses all of them.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// File extensions to keep (case-insensitive, leading dot optional). Empty keeps everything.
    pub extensions: Vec<String>,
    /// Path components that exclude any file below them.
    pub exclude: Vec<String>,
    /// Honour `.gitignore`, `.ignore` and hidden-file rules.
    pub respect_gitignore: bool,
}

impl WalkOptions {
    fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

/// Returns every file reachable under `root`, sorted by file name at each level.
///
/// Directories are descended into but never yielded. A root that is itself a
/// file yields exactly that file.
pub fn enumerate(root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::NotFound(root.to_path_buf()));
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let extensions = options.normalized_extensions();
    let mut files = Vec::new();

    if options.respect_gitignore {
        let mut walker = WalkBuilder::new(root);
        walker.standard_filters(true).sort_by_file_name(|a, b| a.cmp(b));
        for entry in walker.build() {
            let entry = entry?;
            push_if_selected(&mut files, entry.path(), &extensions, &options.exclude);
        }
    } else {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            push_if_selected(&mut files, entry.path(), &extensions, &options.exclude);
        }
    }

    debug!("enumerated {} file(s) under {}", files.len(), root.display());
    Ok(files)
}

fn push_if_selected(files: &mut Vec<PathBuf>, path: &Path, extensions: &[String], exclude: &[String]) {
    let should_exclude = exclude
        .iter()
        .any(|ex| path.components().any(|c| c.as_os_str() == ex.as_str()));

    if !should_exclude && path.is_file() && should_process_file(path, extensions) {
        files.push(path.to_path_buf());
    }
}

/// Determines if a file should be processed based on its extension.
fn should_process_file(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }

    path.extension()
        .and_then(|os| os.to_str())
        .map(|s| extensions.contains(&s.to_lowercase()))
        .unwrap_or(false)
}
