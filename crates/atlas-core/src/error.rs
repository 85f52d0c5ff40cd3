//! Error types for Atlas

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Atlas operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Geographic dataset not found: {}", .0.display())]
    DatasetMissing(PathBuf),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("No country code for: {0}")]
    Resolution(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Flag not found for code '{0}'")]
    FlagNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Package error: {0}")]
    Package(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("ID collision: languages '{first}' and '{second}' both map to {kind} id {id}")]
    IdCollision {
        kind: String,
        first: String,
        second: String,
        id: u64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

impl AtlasError {
    /// Whether this error aborts the whole run instead of degrading one asset
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AtlasError::DatasetMissing(_)
                | AtlasError::Dataset(_)
                | AtlasError::Catalog(_)
                | AtlasError::Config(_)
                | AtlasError::IdCollision { .. }
        )
    }
}

/// Result type alias for Atlas operations
pub type Result<T> = std::result::Result<T, AtlasError>;

impl From<toml::de::Error> for AtlasError {
    fn from(err: toml::de::Error) -> Self {
        AtlasError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for AtlasError {
    fn from(err: toml::ser::Error) -> Self {
        AtlasError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for AtlasError {
    fn from(err: serde_json::Error) -> Self {
        AtlasError::JsonError(err.to_string())
    }
}
