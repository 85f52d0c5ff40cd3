pub mod build;
pub mod catalog;
pub mod codes;
pub mod ids;

use anyhow::{Context, Result};
use atlas_gen::AtlasConfig;
use std::path::Path;

/// Explicit `--config` file, or the global < project < env layering
pub fn load_config(path: Option<&str>) -> Result<AtlasConfig> {
    tracing::debug!(config = ?path, "loading configuration");
    match path {
        Some(p) => AtlasConfig::load_from_file(Path::new(p))
            .with_context(|| format!("Failed to load config from {}", p)),
        None => AtlasConfig::load().context("Failed to load config"),
    }
}
