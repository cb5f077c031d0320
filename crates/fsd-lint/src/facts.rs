//! Import facts: one per import statement, as produced by an external parser.
//!
//! Facts are read as a JSON array:
//!
//! ```json
//! [
//!   { "sourceFile": "src/features/checkout/ui/form.tsx",
//!     "specifier": "@entities/user/model", "line": 4 },
//!   { "sourceFile": "scripts/seed.ts", "fromLayer": "shared",
//!     "specifier": "@shared" }
//! ]
//! ```
//!
//! `fromLayer`/`fromSlice` are optional; when absent the importer's layer
//! is resolved from `sourceFile` (see [`crate::context`]).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFact {
    pub source_file: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_layer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_slice: Option<String>,

    pub specifier: String,

    #[serde(default)]
    pub line: usize,

    #[serde(default)]
    pub column: usize,
}

impl ImportFact {
    #[must_use]
    pub fn new(source_file: impl Into<PathBuf>, specifier: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            from_layer: None,
            from_slice: None,
            specifier: specifier.into(),
            line: 0,
            column: 0,
        }
    }

    /// Pins the importer's layer instead of resolving it from the path.
    #[must_use]
    pub fn in_layer(mut self, layer: impl Into<String>, slice: Option<&str>) -> Self {
        self.from_layer = Some(layer.into());
        self.from_slice = slice.map(String::from);
        self
    }

    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

#[derive(Debug, Error)]
pub enum FactsError {
    #[error("failed to read facts file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse facts file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a JSON array of facts from disk.
///
/// # Errors
///
/// Returns [`FactsError`] if the file is unreadable or not a fact array.
pub fn load(path: &Path) -> Result<Vec<ImportFact>, FactsError> {
    let content = std::fs::read_to_string(path).map_err(|e| FactsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&content).map_err(|e| FactsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parses a JSON array of facts.
///
/// # Errors
///
/// Returns the underlying [`serde_json::Error`] on malformed input.
pub fn parse(content: &str) -> Result<Vec<ImportFact>, serde_json::Error> {
    serde_json::from_str(content)
}
