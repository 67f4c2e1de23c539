//! The working set that pattern operations are applied to.
//!
//! A [`TargetCollection`] holds items of one [`TargetKind`]: either the full
//! text of files, or file paths of which only the stem is ever matched. Each
//! collection keeps the values it was loaded with next to the values it is
//! currently working on, so changes can be staged across several operations
//! and only persisted by an explicit commit (see `persist`).

use crate::enumerator::{self, WalkOptions};
use crate::errors::{Error, Result};
use crate::patterns::{Pattern, PatternEngine, Preview, ReplacementSpec};
use log::{debug, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Which notion of "string to transform" a collection works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TargetKind {
    /// The full text of each file.
    Content,
    /// Each file's name, without directory or extension.
    Pathname,
}

/// A single transformable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Content {
        text: String,
        /// The file the text was read from, if any.
        source: Option<PathBuf>,
    },
    Pathname {
        dir: PathBuf,
        stem: String,
        ext: Option<String>,
    },
}

impl Item {
    pub fn content(text: impl Into<String>, source: Option<PathBuf>) -> Self {
        Item::Content {
            text: text.into(),
            source,
        }
    }

    /// Splits `path` into directory, stem and extension.
    pub fn pathname(path: &Path) -> Result<Self> {
        let stem = match path.file_stem() {
            Some(stem) => stem
                .to_str()
                .ok_or_else(|| not_utf8(path))?
                .to_string(),
            None => String::new(),
        };
        let ext = path
            .extension()
            .map(|ext| {
                ext.to_str()
                    .map(str::to_string)
                    .ok_or_else(|| not_utf8(path))
            })
            .transpose()?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok(Item::Pathname { dir, stem, ext })
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Item::Content { .. } => TargetKind::Content,
            Item::Pathname { .. } => TargetKind::Pathname,
        }
    }

    /// The part of the item that patterns are matched against.
    pub fn subject(&self) -> &str {
        match self {
            Item::Content { text, .. } => text,
            Item::Pathname { stem, .. } => stem,
        }
    }

    /// A copy of this item with its subject replaced. Directory, extension and
    /// source are carried over unchanged.
    pub fn with_subject(&self, subject: String) -> Self {
        match self {
            Item::Content { source, .. } => Item::Content {
                text: subject,
                source: source.clone(),
            },
            Item::Pathname { dir, ext, .. } => Item::Pathname {
                dir: dir.clone(),
                stem: subject,
                ext: ext.clone(),
            },
        }
    }

    /// The path this item reads from or renames, if it has one.
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Item::Content { source, .. } => source.clone(),
            Item::Pathname { dir, stem, ext } => {
                let file_name = match ext {
                    Some(ext) => format!("{stem}.{ext}"),
                    None => stem.clone(),
                };
                Some(dir.join(file_name))
            }
        }
    }

    /// The full value of the item: file text, or the reassembled path.
    pub fn value(&self) -> String {
        match self {
            Item::Content { text, .. } => text.clone(),
            Item::Pathname { .. } => self
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Match count for one item of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMatches {
    pub label: String,
    pub count: usize,
}

/// A preview of one item, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct ItemPreview {
    pub label: String,
    pub matches: usize,
    pub preview: Preview,
}

/// Result of a non-mutating search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub pattern: String,
    pub total: usize,
    pub items: Vec<ItemMatches>,
    /// One entry per item when the search ran verbosely.
    pub previews: Vec<ItemPreview>,
}

/// Result of a mutating operation.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// The working values after the operation.
    pub values: Vec<String>,
    /// Number of items whose working value changed in this operation.
    pub changed: usize,
    /// One entry per item (and per pass) when the operation ran verbosely.
    pub previews: Vec<ItemPreview>,
}

/// An ordered set of items of one kind, with their load-time snapshot.
#[derive(Debug, Clone)]
pub struct TargetCollection {
    pub(crate) kind: TargetKind,
    pub(crate) engine: PatternEngine,
    pub(crate) original: Vec<Item>,
    pub(crate) working: Vec<Item>,
    /// Whether items are backed by files on disk.
    pub(crate) backed: bool,
}

impl TargetCollection {
    /// Builds a collection from literal strings with no backing files.
    ///
    /// In pathname mode each string is parsed as a path.
    pub fn from_literals(kind: TargetKind, values: Vec<String>, engine: PatternEngine) -> Result<Self> {
        let items = values
            .into_iter()
            .map(|value| match kind {
                TargetKind::Content => Ok(Item::content(value, None)),
                TargetKind::Pathname => Item::pathname(Path::new(&value)),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::with_items(kind, items, engine, false))
    }

    /// Builds a collection from every file under `root`.
    ///
    /// Content mode reads each file; binary files (a NUL byte within the first
    /// kilobyte) are skipped. Pathname mode only records the paths.
    pub fn from_path(kind: TargetKind, root: &Path, walk: &WalkOptions, engine: PatternEngine) -> Result<Self> {
        let files = enumerator::enumerate(root, walk)?;
        let mut items = Vec::with_capacity(files.len());

        for path in files {
            match kind {
                TargetKind::Content => {
                    if let Some(text) = read_text(&path)? {
                        items.push(Item::content(text, Some(path)));
                    }
                }
                TargetKind::Pathname => items.push(Item::pathname(&path)?),
            }
        }

        info!("loaded {} {:?} item(s) from {}", items.len(), kind, root.display());
        Ok(Self::with_items(kind, items, engine, true))
    }

    /// Builds a collection from exactly one of literal input or a root path.
    pub fn from_inputs(
        kind: TargetKind,
        literals: Option<Vec<String>>,
        root: Option<&Path>,
        walk: &WalkOptions,
        engine: PatternEngine,
    ) -> Result<Self> {
        match (literals, root) {
            (Some(values), None) => Self::from_literals(kind, values, engine),
            (None, Some(root)) => Self::from_path(kind, root, walk, engine),
            (Some(_), Some(_)) => Err(Error::Config(
                "supply either literal input or a path, not both".into(),
            )),
            (None, None) => Err(Error::Config("supply literal input or a path".into())),
        }
    }

    fn with_items(kind: TargetKind, items: Vec<Item>, engine: PatternEngine, backed: bool) -> Self {
        Self {
            kind,
            engine,
            original: items.clone(),
            working: items,
            backed,
        }
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn engine(&self) -> &PatternEngine {
        &self.engine
    }

    pub fn is_backed(&self) -> bool {
        self.backed
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn original(&self) -> &[Item] {
        &self.original
    }

    pub fn working(&self) -> &[Item] {
        &self.working
    }

    pub fn working_values(&self) -> Vec<String> {
        self.working.iter().map(Item::value).collect()
    }

    /// Number of items whose working value differs from the original.
    pub fn changed_count(&self) -> usize {
        self.original
            .iter()
            .zip(&self.working)
            .filter(|(original, working)| original != working)
            .count()
    }

    /// A human-readable name for item `index`: its original path, or its
    /// position for literal content.
    pub fn label(&self, index: usize) -> String {
        match self.original.get(index).and_then(Item::path) {
            Some(path) => path.display().to_string(),
            None => format!("#{}", index + 1),
        }
    }

    /// Counts matches of `pattern` in every working value.
    pub fn search(&self, pattern: &Pattern, verbose: bool) -> SearchReport {
        let engine = &self.engine;
        let identity = ReplacementSpec::identity();

        let results: Vec<(usize, Option<Preview>)> = self
            .working
            .par_iter()
            .map(|item| {
                let count = engine.count(pattern, item.subject());
                let preview = verbose.then(|| engine.apply(pattern, item.subject(), &identity, true).1);
                (count, preview.flatten())
            })
            .collect();

        let mut report = SearchReport {
            pattern: pattern.as_str().to_string(),
            total: 0,
            items: Vec::with_capacity(results.len()),
            previews: Vec::new(),
        };
        for (index, (count, preview)) in results.into_iter().enumerate() {
            let label = self.label(index);
            report.total += count;
            if let Some(preview) = preview {
                report.previews.push(ItemPreview {
                    label: label.clone(),
                    matches: count,
                    preview,
                });
            }
            report.items.push(ItemMatches { label, count });
        }
        report
    }

    /// Rewrites every match of `pattern` in the working values.
    pub fn search_and_replace(
        &mut self,
        pattern: &Pattern,
        spec: &ReplacementSpec,
        verbose: bool,
    ) -> Result<TransformOutcome> {
        spec.validate(pattern)?;
        self.transform(pattern, spec, verbose)
    }

    /// Deletes every match of `pattern` from the working values.
    pub fn remove(&mut self, pattern: &Pattern, verbose: bool) -> Result<TransformOutcome> {
        self.transform(pattern, &ReplacementSpec::Literal(String::new()), verbose)
    }

    /// Applies `spec` to each working item's subject. Items are independent,
    /// so the per-item work runs on the current rayon pool; order is kept.
    ///
    /// A pathname result that would no longer name a file in its own
    /// directory fails with `Config` and leaves the working values untouched.
    fn transform(&mut self, pattern: &Pattern, spec: &ReplacementSpec, verbose: bool) -> Result<TransformOutcome> {
        let engine = &self.engine;

        let results: Vec<(Item, usize, Option<Preview>)> = self
            .working
            .par_iter()
            .map(|item| {
                let matches = engine.count(pattern, item.subject());
                if matches == 0 {
                    return (item.clone(), 0, None);
                }
                let (subject, preview) = engine.apply(pattern, item.subject(), spec, verbose);
                (item.with_subject(subject), matches, preview)
            })
            .collect();

        if self.kind == TargetKind::Pathname {
            for (index, (item, _, _)) in results.iter().enumerate() {
                if *item != self.working[index] {
                    check_stem(item.subject(), &self.label(index))?;
                }
            }
        }

        let mut outcome = TransformOutcome::default();
        let mut working = Vec::with_capacity(results.len());
        for (index, (item, matches, preview)) in results.into_iter().enumerate() {
            if item != self.working[index] {
                outcome.changed += 1;
            }
            if verbose {
                outcome.previews.push(ItemPreview {
                    label: self.label(index),
                    matches,
                    preview: preview.unwrap_or_else(|| Preview {
                        matched: item.subject().to_string(),
                        replaced: item.subject().to_string(),
                    }),
                });
            }
            working.push(item);
        }

        debug!(
            "pattern '{}' changed {} of {} item(s)",
            pattern.as_str(),
            outcome.changed,
            working.len()
        );
        self.working = working;
        outcome.values = self.working_values();
        Ok(outcome)
    }
}

/// Rejects a rewritten stem that is empty, a relative directory reference,
/// or that contains a path separator.
pub(crate) fn check_stem(stem: &str, label: &str) -> Result<()> {
    if stem.is_empty() {
        return Err(Error::Config(format!("{label}: file name stem would become empty")));
    }
    if stem == "." || stem == ".." || stem.chars().any(std::path::is_separator) {
        return Err(Error::Config(format!(
            "{label}: new file name '{stem}' would move the file out of its directory"
        )));
    }
    Ok(())
}

fn not_utf8(path: &Path) -> Error {
    Error::io(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidData, "file name is not valid UTF-8"),
    )
}

/// Reads a file as UTF-8 text, returning `None` for binary files.
fn read_text(path: &Path) -> Result<Option<String>> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

    if bytes.iter().take(1024).any(|&b| b == 0) {
        debug!("skipping binary file {}", path.display());
        return Ok(None);
    }

    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| Error::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
