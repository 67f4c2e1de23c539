//! `mdtedit` is a library for regex-based editing of file contents and file names.
//!
//! It provides the core logic for the `mdtedit` command-line tool but can also be
//! used as a standalone library. The main components are:
//!
//! - `patterns`: The `PatternEngine`, which counts, removes and replaces regex
//!   matches in a string and renders highlighted previews.
//! - `target`: The `TargetCollection`, a working set of file contents or file
//!   names that keeps the loaded values next to the staged ones.
//! - `derived`: Built-in edits (markdown link stripping, whitespace cleanup).
//! - `persist`: Writing staged values back to disk.
//! - `enumerator`: Collecting the files below a root path.
//! - `config`: Loading user settings from YAML files.
//!
//! Nothing is written to disk until `TargetCollection::commit` is called.

pub mod cli;
pub mod commands;
pub mod config;
pub mod derived;
pub mod enumerator;
pub mod errors;
pub mod highlight;
pub mod output_formatter;
pub mod patterns;
pub mod persist;
pub mod target;

// Re-export main types for easier access by library users.
pub use errors::{Error, Result};
pub use highlight::{HighlightConfig, Rgb};
pub use output_formatter::{OutputFormat, OutputFormatter};
pub use patterns::{Pattern, PatternEngine, Preview, ReplacementSpec};
pub use persist::{CommitMode, CommitSummary};
pub use target::{Item, TargetCollection, TargetKind};
