//! Atlas Gen - localized capital-city flashcard pipeline
//!
//! Turns a geographic dataset and a country/capital catalog into per-language
//! flashcard decks with map, flag and narration media. External services sit
//! behind collaborator traits with network and offline implementations.

pub mod catalog;
pub mod codes;
pub mod config;
pub mod context;
pub mod dataset;
pub mod ids;
pub mod localize;
pub mod package;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod quiz;
pub mod report;
pub mod store;
pub mod writer;

#[cfg(test)]
mod testing;

pub use catalog::{Catalog, Entity};
pub use codes::{CountryCode, IdentifierResolver, ResolvedVia};
pub use config::{AtlasConfig, GenerationConfig, NarrationStyle};
pub use context::RunContext;
pub use dataset::{GeoDataset, GeoRecord};
pub use ids::{allocate, allocate_all, DeckIds};
pub use localize::{Localized, Localizer};
pub use package::{assemble, Bundle, Card};
pub use pipeline::{run_from_config, Collaborators, Pipeline, RunSummary};
pub use provider::{
    AssetKind, CountryCodeResolver, FlagSource, MapRenderer, PackageWriter, Speaker, Translator,
};
pub use quiz::QuizEntry;
pub use report::{AssetOutcome, RunReport, Stage, Warning};
pub use store::{AssetResult, AssetStore};
pub use writer::{AnkiPackageWriter, JsonDeckWriter, PackageSpec};
