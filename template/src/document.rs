//! Locally-authored parameter documents.
//!
//! The operator writes these by hand, so entries are kept as raw JSON
//! values: a malformed entry degrades to the merge skip rule instead of
//! failing the whole file.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("could not read parameter document: {0}")]
    Io(#[from] io::Error),
    #[error("parameter document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The local input file: `{"parameters": {<key>: {...}}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalDocument {
    #[serde(default)]
    pub parameters: Map<String, JsonValue>,
}

impl LocalDocument {
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path)?;
        let document = serde_json::from_reader(io::BufReader::new(file))?;
        Ok(document)
    }
}
