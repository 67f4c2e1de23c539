use crate::enumerator::WalkOptions;
use crate::errors::{Error, Result};
use crate::highlight::HighlightConfig;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG: &str = ".mdtedit.yaml";

/// User-level settings, usually read from a YAML file.
///
/// ```yaml
/// highlight:
///   matched: [255, 0, 0]
///   replacement: [0, 255, 0]
/// verbose: true
/// extensions: [md, txt]
/// exclude: [.git, node_modules]
/// respect_gitignore: false
/// workers: 4
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preview colours.
    pub highlight: HighlightConfig,
    /// Print previews unless silenced on the command line.
    pub verbose: bool,
    /// Extensions to process when walking a directory.
    pub extensions: Vec<String>,
    /// Path components to skip when walking a directory.
    pub exclude: Vec<String>,
    /// Honour `.gitignore` files when walking a directory.
    pub respect_gitignore: bool,
    /// Worker threads for per-item transforms.
    pub workers: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            highlight: HighlightConfig::default(),
            verbose: true,
            extensions: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: false,
            workers: None,
        }
    }
}

impl Settings {
    /// Walk options from these settings, extended by command-line values.
    pub fn walk_options(&self, extensions: &[String], exclude: &[String], gitignore: bool) -> WalkOptions {
        WalkOptions {
            extensions: if extensions.is_empty() {
                self.extensions.clone()
            } else {
                extensions.to_vec()
            },
            exclude: self.exclude.iter().chain(exclude).cloned().collect(),
            respect_gitignore: self.respect_gitignore || gitignore,
        }
    }
}

/// A utility for locating and loading [`Settings`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file to use.
    ///
    /// An explicit path must exist. Otherwise the search order is:
    /// 1. `.mdtedit.yaml` in the current directory.
    /// 2. `mdtedit/config.yaml` in the user configuration directory.
    ///
    /// Returns `Ok(None)` when no file is found and none was requested.
    pub fn find_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            return Ok(Some(local));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("mdtedit").join("config.yaml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        Ok(None)
    }

    /// Loads `Settings` from a YAML file.
    pub fn load(path: &Path) -> Result<Settings> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// Finds and loads settings, falling back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Settings> {
        match Self::find_config(explicit)? {
            Some(path) => {
                log::debug!("using config file {}", path.display());
                Self::load(&path)
            }
            None => Ok(Settings::default()),
        }
    }
}
