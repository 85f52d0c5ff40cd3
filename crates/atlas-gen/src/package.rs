//! Card and bundle assembly
//!
//! A bundle's media list is every present asset referenced by its cards, in
//! audio, map, flag order per card, with duplicates removed by first
//! occurrence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::ids::DeckIds;

/// One flashcard for an (entity, language) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Catalog key, also the source-language country name
    pub entity: String,
    pub language: String,
    /// Localized country name
    pub country: String,
    pub question_text: String,
    pub answer_text: String,
    pub map: Option<PathBuf>,
    pub flag: Option<PathBuf>,
    pub audio: Option<PathBuf>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Card {
    /// `<img src="...">`, or empty without a map
    pub fn map_tag(&self) -> String {
        image_tag(self.map.as_deref())
    }

    pub fn flag_tag(&self) -> String {
        image_tag(self.flag.as_deref())
    }

    /// `[sound:...]`, or empty without audio
    pub fn audio_tag(&self) -> String {
        self.audio
            .as_deref()
            .map(|p| format!("[sound:{}]", file_name(p)))
            .unwrap_or_default()
    }

    /// Present media in packaging order
    pub fn media(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.audio, &self.map, &self.flag]
            .into_iter()
            .filter_map(|p| p.as_ref())
    }
}

fn image_tag(path: Option<&Path>) -> String {
    path.map(|p| format!("<img src=\"{}\">", file_name(p)))
        .unwrap_or_default()
}

/// Everything needed to write one language's package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub ids: DeckIds,
    pub cards: Vec<Card>,
    /// Distinct paths in first-seen order
    pub media_files: Vec<PathBuf>,
}

impl Bundle {
    pub fn language(&self) -> &str {
        &self.ids.language
    }
}

pub fn assemble(ids: DeckIds, cards: Vec<Card>) -> Bundle {
    let mut seen = HashSet::new();
    let media_files = cards
        .iter()
        .flat_map(|card| card.media())
        .filter(|path| seen.insert(path.as_path()))
        .cloned()
        .collect();

    Bundle {
        ids,
        cards,
        media_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::allocate;

    fn card(entity: &str, audio: Option<&str>, map: Option<&str>, flag: Option<&str>) -> Card {
        Card {
            entity: entity.to_string(),
            language: "nl".to_string(),
            country: entity.to_string(),
            question_text: format!("What is the capital of {}?", entity),
            answer_text: "X".to_string(),
            map: map.map(PathBuf::from),
            flag: flag.map(PathBuf::from),
            audio: audio.map(PathBuf::from),
        }
    }

    #[test]
    fn test_tags() {
        let c = card(
            "Belgium",
            Some("decks/nl/audio/Belgium_nl.mp3"),
            Some("decks/nl/maps/Belgium_map.png"),
            None,
        );
        assert_eq!(c.map_tag(), "<img src=\"Belgium_map.png\">");
        assert_eq!(c.audio_tag(), "[sound:Belgium_nl.mp3]");
        assert_eq!(c.flag_tag(), "");
    }

    #[test]
    fn test_media_order_and_dedup() {
        let cards = vec![
            card("A", Some("a.wav"), Some("a_map.png"), Some("shared.png")),
            card("B", None, Some("b_map.png"), Some("shared.png")),
            card("C", Some("a.wav"), None, None),
        ];
        let bundle = assemble(allocate("nl"), cards);
        let media: Vec<&str> = bundle
            .media_files
            .iter()
            .map(|p| p.to_str().unwrap())
            .collect();
        assert_eq!(media, vec!["a.wav", "a_map.png", "shared.png", "b_map.png"]);
        assert_eq!(bundle.cards.len(), 3);
        assert_eq!(bundle.language(), "nl");
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = assemble(allocate("en"), Vec::new());
        assert!(bundle.cards.is_empty());
        assert!(bundle.media_files.is_empty());
    }
}
