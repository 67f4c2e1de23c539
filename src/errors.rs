use std::path::{Path, PathBuf};
use thiserror::Error;

/// The primary error type for all operations in `mdtedit`.
///
/// The first five variants are the tool's own failure categories; the rest wrap
/// errors from the libraries it is built on.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or contradictory operation parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A requested root path or file does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A read, write or rename failed on a specific path.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The original and working lists no longer have the same length.
    #[error("Integrity error: {original} original items but {working} working items")]
    Integrity { original: usize, working: usize },

    /// A documented extension point that has no implementation yet.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// An error that occurred during regex compilation.
    #[error("Pattern compilation failed: {0}")]
    Regex(#[from] regex::Error),

    /// An error that occurred while parsing a YAML configuration file.
    #[error("Config parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An I/O error on a stream that has no path (e.g. standard output).
    #[error("IO error: {0}")]
    Stream(#[from] std::io::Error),

    /// An error from the `ignore` crate, used for gitignore-aware traversal.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// An error from the `walkdir` crate.
    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// An error that occurred while building the Rayon thread pool.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An error related to CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An error related to JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attaches the offending path to an I/O error.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// A convenient type alias for `Result<T, mdtedit::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
