use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid unit pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Line threshold must be a finite, non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("Lexicon entry with empty `wrong` form (correct = {0:?})")]
    EmptyLexiconKey(String),

    #[error("Failed to parse OCR export: {0}")]
    OcrExport(#[source] serde_json::Error),

    #[error("Failed to serialize annotation record: {0}")]
    Serialize(#[source] serde_json::Error),
}
