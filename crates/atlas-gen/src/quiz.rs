//! Machine-readable quiz export, one entry per card in card order

use atlas_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::package::Card;
use crate::provider::AssetKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizEntry {
    pub country_en: String,
    pub country: String,
    pub capital: String,
    /// `maps/<file>` relative to the language directory
    pub map: Option<String>,
    pub flag: Option<String>,
    pub audio: Option<String>,
}

fn relative(kind: AssetKind, path: Option<&Path>) -> Option<String> {
    let name = path?.file_name()?.to_string_lossy().into_owned();
    Some(format!("{}/{}", kind.dir_name(), name))
}

impl QuizEntry {
    pub fn from_card(card: &Card) -> Self {
        Self {
            country_en: card.entity.clone(),
            country: card.country.clone(),
            capital: card.answer_text.clone(),
            map: relative(AssetKind::Map, card.map.as_deref()),
            flag: relative(AssetKind::Flag, card.flag.as_deref()),
            audio: relative(AssetKind::Audio, card.audio.as_deref()),
        }
    }
}

pub fn from_cards(cards: &[Card]) -> Vec<QuizEntry> {
    cards.iter().map(QuizEntry::from_card).collect()
}

/// Pretty JSON, two-space indent, non-ASCII kept as is
pub fn write_quiz(path: &Path, entries: &[QuizEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    crate::store::write_atomic(path, json.as_bytes())
}

pub fn load_quiz(path: &Path) -> Result<Vec<QuizEntry>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
