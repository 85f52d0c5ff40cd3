//! Collaborator traits and the asset kinds they produce
//!
//! Every external source the pipeline talks to sits behind one of these
//! traits so runs can be exercised offline with deterministic fakes.

use atlas_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::codes::CountryCode;
use crate::dataset::{GeoDataset, GeoRecord};
use crate::writer::PackageSpec;

/// The kind of media asset attached to a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Map,
    Flag,
    Audio,
}

impl AssetKind {
    /// Directory name under a language root
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetKind::Map => "maps",
            AssetKind::Flag => "flags",
            AssetKind::Audio => "audio",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Map => write!(f, "map"),
            AssetKind::Flag => write!(f, "flag"),
            AssetKind::Audio => write!(f, "audio"),
        }
    }
}

/// Machine translation of short strings
pub trait Translator: Send {
    /// Provider name (e.g. "google", "mock")
    fn name(&self) -> &str;

    /// Translate `text` from `source` into `target`
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Text-to-speech synthesis
pub trait Speaker: Send {
    fn name(&self) -> &str;

    /// Extension of the audio container this speaker produces, without the dot
    fn file_extension(&self) -> &str;

    /// Synthesize `text` spoken in `language`
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// Flag image retrieval by country code.
///
/// Implementations fail with `AtlasError::FlagNotFound` when the source has
/// no flag for the code and `AtlasError::Network` for transport failures.
pub trait FlagSource: Send {
    fn name(&self) -> &str;

    /// Fetch the flag image (PNG bytes) for `code`
    fn fetch(&self, code: &CountryCode) -> Result<Vec<u8>>;
}

/// Country name to ISO code lookup
pub trait CountryCodeResolver: Send {
    /// Exact lookup of a name, failing with `AtlasError::Resolution`
    fn lookup(&self, name: &str) -> Result<CountryCode>;

    /// Alternate names (common and official) for every known country
    fn alternate_names(&self) -> Vec<(CountryCode, String)>;
}

/// Renders the highlighted map image for one dataset record
pub trait MapRenderer: Send {
    /// Render `target` against the rest of `dataset`, returning PNG bytes
    fn render(&self, dataset: &GeoDataset, target: &GeoRecord) -> Result<Vec<u8>>;
}

/// Serializes an assembled bundle to its on-disk package
pub trait PackageWriter: Send {
    /// Extension of the bundle file, without the leading dot
    fn file_extension(&self) -> &str;

    /// Write the package and return the path of the bundle file
    fn write(&self, package: &PackageSpec<'_>) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_dirs() {
        assert_eq!(AssetKind::Map.dir_name(), "maps");
        assert_eq!(AssetKind::Flag.dir_name(), "flags");
        assert_eq!(AssetKind::Audio.dir_name(), "audio");
        assert_eq!(AssetKind::Flag.to_string(), "flag");
    }
}
