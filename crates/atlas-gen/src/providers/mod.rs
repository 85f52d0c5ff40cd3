//! Provider registry
//!
//! Maps provider names to concrete implementations.

pub mod flagcdn;
pub mod google;
pub(crate) mod http;
pub mod iso;
pub mod mock;
pub mod raster;

use crate::config::AtlasConfig;
use crate::provider::{FlagSource, PackageWriter, Speaker, Translator};
use crate::writer::{AnkiPackageWriter, JsonDeckWriter};
use atlas_core::{AtlasError, Result};

fn ensure_enabled(config: &AtlasConfig, role: &str) -> Result<()> {
    if config.is_enabled(role) {
        Ok(())
    } else {
        Err(AtlasError::Config(format!(
            "Provider '{}' is disabled in configuration",
            role
        )))
    }
}

/// Create a translator by name with configuration
pub fn create_translator(name: &str, config: &AtlasConfig) -> Result<Box<dyn Translator>> {
    ensure_enabled(config, "translator")?;
    match name {
        "mock" => Ok(Box::new(mock::MockTranslator::new())),
        "google" => Ok(Box::new(google::GoogleTranslator::from_config(config)?)),
        _ => Err(AtlasError::Config(format!(
            "Unknown translator '{}'. Available: {}",
            name,
            available_translators().join(", ")
        ))),
    }
}

/// Create a speaker by name with configuration
pub fn create_speaker(name: &str, config: &AtlasConfig) -> Result<Box<dyn Speaker>> {
    ensure_enabled(config, "speaker")?;
    match name {
        "mock" => Ok(Box::new(mock::MockSpeaker::new())),
        "google" => Ok(Box::new(google::GoogleSpeaker::from_config(config)?)),
        _ => Err(AtlasError::Config(format!(
            "Unknown speaker '{}'. Available: {}",
            name,
            available_speakers().join(", ")
        ))),
    }
}

/// Create a flag source by name with configuration
pub fn create_flag_source(name: &str, config: &AtlasConfig) -> Result<Box<dyn FlagSource>> {
    ensure_enabled(config, "flags")?;
    match name {
        "mock" => Ok(Box::new(mock::MockFlagSource::new())),
        "flagcdn" => Ok(Box::new(flagcdn::FlagCdnSource::from_config(config)?)),
        _ => Err(AtlasError::Config(format!(
            "Unknown flag source '{}'. Available: {}",
            name,
            available_flag_sources().join(", ")
        ))),
    }
}

/// Create a bundle writer by format name
pub fn create_package_writer(name: &str) -> Result<Box<dyn PackageWriter>> {
    match name {
        "anki" => Ok(Box::new(AnkiPackageWriter::new())),
        "json" => Ok(Box::new(JsonDeckWriter::new())),
        _ => Err(AtlasError::Config(format!(
            "Unknown package format '{}'. Available: {}",
            name,
            available_package_writers().join(", ")
        ))),
    }
}

pub fn available_translators() -> Vec<&'static str> {
    vec!["mock", "google"]
}

pub fn available_speakers() -> Vec<&'static str> {
    vec!["mock", "google"]
}

pub fn available_flag_sources() -> Vec<&'static str> {
    vec!["mock", "flagcdn"]
}

pub fn available_package_writers() -> Vec<&'static str> {
    vec!["anki", "json"]
}
