//! Stable deck and model identifiers per language
//!
//! Derived from SHA-256 of the language tag so they survive across runs,
//! processes and machines. Deck and model ids live in disjoint ranges.

use atlas_core::{AtlasError, ContentHash, Result};
use std::collections::HashMap;

pub const MODEL_ID_BASE: u64 = 1_607_392_319_000;
pub const DECK_ID_BASE: u64 = 2_050_000_000;
pub const ID_SPAN: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckIds {
    pub language: String,
    pub deck_id: u64,
    pub model_id: u64,
}

pub fn allocate(language: &str) -> DeckIds {
    let h = ContentHash::from_str(language).leading_u64();
    DeckIds {
        language: language.to_string(),
        deck_id: DECK_ID_BASE + h % ID_SPAN,
        model_id: MODEL_ID_BASE + h % ID_SPAN,
    }
}

/// Allocate ids for every language, failing if any two collide
pub fn allocate_all(languages: &[String]) -> Result<Vec<DeckIds>> {
    let mut decks: HashMap<u64, &str> = HashMap::new();
    let mut models: HashMap<u64, &str> = HashMap::new();
    let mut allocated = Vec::with_capacity(languages.len());

    for language in languages {
        let ids = allocate(language);
        if let Some(first) = decks.insert(ids.deck_id, language.as_str()) {
            return Err(collision("deck", first, language, ids.deck_id));
        }
        if let Some(first) = models.insert(ids.model_id, language.as_str()) {
            return Err(collision("model", first, language, ids.model_id));
        }
        allocated.push(ids);
    }
    Ok(allocated)
}

fn collision(kind: &str, first: &str, second: &str, id: u64) -> AtlasError {
    AtlasError::IdCollision {
        kind: kind.to_string(),
        first: first.to_string(),
        second: second.to_string(),
        id,
    }
}
