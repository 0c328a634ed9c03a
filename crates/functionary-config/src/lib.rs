//! Generation options for the functionary manifest generator
//!
//! Options use the same key names as the JavaScript generator they replace
//! (`directory`, `JSDoc`, `guessTypes`, `writeFile`) so existing option files
//! keep working. Unknown keys are rejected rather than ignored.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Source file read from the configured directory
pub const SOURCE_FILE_NAME: &str = "functions.js";

/// Errors raised while loading generation options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_true() -> bool {
    true
}

/// Options for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateOptions {
    /// Directory holding `functions.js`; relative paths resolve against the caller
    pub directory: PathBuf,

    /// Consult JSDoc comments at all
    #[serde(rename = "JSDoc", alias = "jsdoc", default = "default_true")]
    pub jsdoc: bool,

    /// Guess parameter types from their names
    #[serde(rename = "guessTypes", alias = "guess_types", default)]
    pub guess_types: bool,

    /// Persist `package.yaml` instead of returning the text
    #[serde(rename = "writeFile", alias = "write_file", default = "default_true")]
    pub write_file: bool,

    /// Where `package.yaml` is written; defaults to the working directory
    #[serde(
        rename = "outputDir",
        alias = "output_dir",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub output_dir: Option<PathBuf>,
}

impl GenerateOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        GenerateOptions {
            directory: directory.into(),
            jsdoc: true,
            guess_types: false,
            write_file: true,
            output_dir: None,
        }
    }

    pub fn jsdoc(mut self, enabled: bool) -> Self {
        self.jsdoc = enabled;
        self
    }

    pub fn guess_types(mut self, enabled: bool) -> Self {
        self.guess_types = enabled;
        self
    }

    pub fn write_file(mut self, enabled: bool) -> Self {
        self.write_file = enabled;
        self
    }

    pub fn output_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(directory.into());
        self
    }

    /// Parse options from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file.
    ///
    /// A relative `directory` (or `outputDir`) is taken relative to the file
    /// that names it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut options = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent() {
            options.directory = options.resolve_directory(base);
            options.output_dir = options.output_dir.map(|dir| resolve_against(base, dir));
        }

        Ok(options)
    }

    /// Absolute source directory, resolving a relative path against `base`
    pub fn resolve_directory(&self, base: &Path) -> PathBuf {
        resolve_against(base, self.directory.clone())
    }

    /// Path of the source file inside the resolved directory
    pub fn source_path(&self, base: &Path) -> PathBuf {
        self.resolve_directory(base).join(SOURCE_FILE_NAME)
    }

    /// Directory `package.yaml` is written to
    pub fn resolve_output_dir(&self, base: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => resolve_against(base, dir.clone()),
            None => base.to_path_buf(),
        }
    }
}

fn resolve_against(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
