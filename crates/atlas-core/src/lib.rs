//! Atlas Core - Foundational types for the Atlas flashcard generator
//!
//! This crate provides the types every other Atlas crate depends on:
//! - `ContentHash` - SHA-256 based content hashing and stable digests
//! - `Rgb`, `BoundingBox` - Raster and geographic value types
//! - Error types and Result alias

mod error;
mod hash;
mod types;

pub use error::{AtlasError, Result};
pub use hash::ContentHash;
pub use types::{BoundingBox, Rgb};
