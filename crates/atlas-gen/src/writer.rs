//! Deck package writers
//!
//! `AnkiPackageWriter` produces an importable `.apkg`. `JsonDeckWriter`
//! serializes the same deck as a plain JSON document. Both copy every
//! referenced file into a flat `media/` directory next to the bundle.

use atlas_core::{AtlasError, ContentHash, Result};
use genanki_rs::{Deck, Field, Model, Note, Package, Template};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::provider::PackageWriter;

/// Note fields in model order
pub const MODEL_FIELDS: [&str; 6] = ["Question", "Country", "Capital", "Map", "Flag", "Audio"];

const TEMPLATE_NAME: &str = "Card 1";
const FRONT_TEMPLATE: &str = "{{Question}}<br>{{Map}}";
const BACK_TEMPLATE: &str =
    "{{FrontSide}}<hr id=\"answer\">{{Capital}}<br>{{Flag}}<br>{{Audio}}";
const CARD_CSS: &str = ".card {\n  font-family: arial;\n  font-size: 20px;\n  text-align: center;\n  color: black;\n  background-color: white;\n}\n";

/// One note: the entity key plus field values in `MODEL_FIELDS` order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSpec {
    pub key: String,
    pub fields: Vec<String>,
}

/// Input to a `PackageWriter`
#[derive(Debug, Clone)]
pub struct PackageSpec<'a> {
    pub deck_id: u64,
    pub model_id: u64,
    pub deck_name: String,
    pub model_name: String,
    pub notes: Vec<NoteSpec>,
    pub media_files: &'a [PathBuf],
    /// Path of the bundle file to write
    pub destination: PathBuf,
}

/// GUID stable across runs: first ten hex chars of SHA-256 over deck id and key
pub fn note_guid(deck_id: u64, key: &str) -> String {
    let hex = ContentHash::from_parts(&[&deck_id.to_string(), key]).to_hex();
    hex[..10].to_string()
}

fn check_fields(notes: &[NoteSpec]) -> Result<()> {
    for note in notes {
        if note.fields.len() != MODEL_FIELDS.len() {
            return Err(AtlasError::Package(format!(
                "Note '{}' has {} fields, expected {}",
                note.key,
                note.fields.len(),
                MODEL_FIELDS.len()
            )));
        }
    }
    Ok(())
}

/// `media/` beside the bundle destination
fn media_dir_for(destination: &Path) -> Result<PathBuf> {
    destination
        .parent()
        .map(|parent| parent.join("media"))
        .ok_or_else(|| {
            AtlasError::Package(format!(
                "Bundle destination has no parent: {}",
                destination.display()
            ))
        })
}

/// Copy media into `media_dir` by file name, skipping names already there.
/// Returns the copied paths in input order.
fn copy_media(media_dir: &Path, media_files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(media_dir)?;
    let mut copied = Vec::with_capacity(media_files.len());
    for source in media_files {
        let name = source.file_name().ok_or_else(|| {
            AtlasError::Package(format!("Media path has no file name: {}", source.display()))
        })?;
        let target = media_dir.join(name);
        if !target.is_file() {
            let bytes = std::fs::read(source).map_err(|e| {
                AtlasError::Package(format!("Cannot read media {}: {}", source.display(), e))
            })?;
            crate::store::write_atomic(&target, &bytes)?;
        }
        copied.push(target);
    }
    Ok(copied)
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

/// Writes Anki `.apkg` packages
#[derive(Debug, Default)]
pub struct AnkiPackageWriter;

impl AnkiPackageWriter {
    pub fn new() -> Self {
        Self
    }

    fn model(package: &PackageSpec<'_>) -> Result<Model> {
        Ok(Model::new_with_options(
            anki_id(package.model_id, "model")?,
            &package.model_name,
            MODEL_FIELDS.iter().map(|name| Field::new(name)).collect(),
            vec![Template::new(TEMPLATE_NAME)
                .qfmt(FRONT_TEMPLATE)
                .afmt(BACK_TEMPLATE)],
            Some(CARD_CSS),
            None,
            None,
            None,
            None,
        ))
    }

    fn deck(package: &PackageSpec<'_>, model: &Model) -> Result<Deck> {
        let mut deck = Deck::new(anki_id(package.deck_id, "deck")?, &package.deck_name, "");
        for note in &package.notes {
            let guid = note_guid(package.deck_id, &note.key);
            let fields: Vec<&str> = note.fields.iter().map(String::as_str).collect();
            let note = Note::new_with_options(model.clone(), fields, None, None, Some(&guid))
                .map_err(|e| {
                    AtlasError::Package(format!("Invalid note '{}': {}", note.key, e))
                })?;
            deck.add_note(note);
        }
        Ok(deck)
    }
}

/// Anki stores identifiers as signed 64-bit integers
fn anki_id(id: u64, kind: &str) -> Result<i64> {
    i64::try_from(id)
        .map_err(|_| AtlasError::Package(format!("{} id {} does not fit in i64", kind, id)))
}

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| AtlasError::Package(format!("Path is not UTF-8: {}", path.display())))
}

impl PackageWriter for AnkiPackageWriter {
    fn file_extension(&self) -> &str {
        "apkg"
    }

    fn write(&self, package: &PackageSpec<'_>) -> Result<PathBuf> {
        check_fields(&package.notes)?;
        let model = Self::model(package)?;
        let deck = Self::deck(package, &model)?;

        let media = copy_media(&media_dir_for(&package.destination)?, package.media_files)?;
        let media_paths = media
            .iter()
            .map(|p| utf8_path(p))
            .collect::<Result<Vec<_>>>()?;
        let mut apkg = Package::new(vec![deck], media_paths)
            .map_err(|e| AtlasError::Package(format!("Cannot assemble package: {}", e)))?;

        let tmp = crate::store::temp_sibling(&package.destination)?;
        let written = apkg
            .write_to_file(utf8_path(&tmp)?)
            .map_err(|e| AtlasError::Package(format!("Cannot write package: {}", e)))
            .and_then(|_| std::fs::rename(&tmp, &package.destination).map_err(AtlasError::from));
        if let Err(e) = written {
            std::fs::remove_file(&tmp).ok();
            return Err(e);
        }

        tracing::debug!(
            path = %package.destination.display(),
            notes = package.notes.len(),
            media = media.len(),
            "wrote anki package"
        );
        Ok(package.destination.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckDocument {
    pub deck: DeckInfo,
    pub model: ModelInfo,
    pub notes: Vec<NoteEntry>,
    /// Media file names, relative to the sibling `media/` directory
    pub media: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckInfo {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: u64,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<CardTemplate>,
    pub css: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub name: String,
    pub qfmt: String,
    pub afmt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub guid: String,
    pub fields: Vec<String>,
}

impl DeckDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Writes the deck as a JSON document, for inspection or other importers
#[derive(Debug, Default)]
pub struct JsonDeckWriter;

impl JsonDeckWriter {
    pub fn new() -> Self {
        Self
    }
}

impl PackageWriter for JsonDeckWriter {
    fn file_extension(&self) -> &str {
        "deck.json"
    }

    fn write(&self, package: &PackageSpec<'_>) -> Result<PathBuf> {
        check_fields(&package.notes)?;
        let media = copy_media(&media_dir_for(&package.destination)?, package.media_files)?;

        let notes = package
            .notes
            .iter()
            .map(|note| NoteEntry {
                guid: note_guid(package.deck_id, &note.key),
                fields: note.fields.clone(),
            })
            .collect();

        let document = DeckDocument {
            deck: DeckInfo {
                id: package.deck_id,
                name: package.deck_name.clone(),
            },
            model: ModelInfo {
                id: package.model_id,
                name: package.model_name.clone(),
                fields: MODEL_FIELDS.iter().map(|f| f.to_string()).collect(),
                templates: vec![CardTemplate {
                    name: TEMPLATE_NAME.to_string(),
                    qfmt: FRONT_TEMPLATE.to_string(),
                    afmt: BACK_TEMPLATE.to_string(),
                }],
                css: CARD_CSS.to_string(),
            },
            notes,
            media: file_names(&media),
        };

        let json = serde_json::to_string_pretty(&document)?;
        crate::store::write_atomic(&package.destination, json.as_bytes())?;
        tracing::debug!(path = %package.destination.display(), "wrote deck document");
        Ok(package.destination.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{contains, read_package};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atlas_writer_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn note(key: &str) -> NoteSpec {
        NoteSpec {
            key: key.to_string(),
            fields: vec![
                format!("What is the capital of {}?", key),
                key.to_string(),
                "Brussels".to_string(),
                format!("<img src=\"{}_map.png\">", key),
                String::new(),
                String::new(),
            ],
        }
    }

    fn spec<'a>(dir: &Path, media: &'a [PathBuf], notes: Vec<NoteSpec>, file: &str) -> PackageSpec<'a> {
        PackageSpec {
            deck_id: 2_050_563_999,
            model_id: 1_607_392_882_999,
            deck_name: "European capitals (nl)".to_string(),
            model_name: "European capitals (nl) card".to_string(),
            notes,
            media_files: media,
            destination: dir.join("nl").join(file),
        }
    }

    fn map_asset(dir: &Path) -> PathBuf {
        let asset = dir.join("nl").join("maps").join("Belgium_map.png");
        crate::store::write_atomic(&asset, b"png").unwrap();
        asset
    }

    #[test]
    fn test_guid_stable() {
        let a = note_guid(2_050_563_999, "Belgium");
        assert_eq!(a.len(), 10);
        assert_eq!(a, note_guid(2_050_563_999, "Belgium"));
        assert_ne!(a, note_guid(2_050_555_598, "Belgium"));
    }

    #[test]
    fn test_anki_package_is_importable_zip() {
        let dir = temp_dir();
        let media = vec![map_asset(&dir)];
        let spec = spec(&dir, &media, vec![note("Belgium")], "european_capitals_nl.apkg");

        let written = AnkiPackageWriter::new().write(&spec).unwrap();
        let bytes = std::fs::read(&written).unwrap();
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let contents = read_package(&written);
        assert!(contents.entries.iter().any(|e| e == "collection.anki2"));
        assert_eq!(contents.media, vec!["Belgium_map.png".to_string()]);
        assert!(contains(&contents.collection, b"What is the capital of Belgium?"));
        assert!(contains(
            &contents.collection,
            note_guid(2_050_563_999, "Belgium").as_bytes()
        ));
        assert!(dir.join("nl/media/Belgium_map.png").is_file());

        // Only the package itself is left beside media/
        let mut names: Vec<String> = std::fs::read_dir(dir.join("nl"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["european_capitals_nl.apkg", "maps", "media"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_anki_rejects_out_of_range_id() {
        let dir = temp_dir();
        let mut spec = spec(&dir, &[], vec![note("Belgium")], "x.apkg");
        spec.deck_id = u64::MAX;
        assert!(matches!(
            AnkiPackageWriter::new().write(&spec),
            Err(AtlasError::Package(_))
        ));
        assert!(!dir.join("nl/x.apkg").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_json_deck_and_media() {
        let dir = temp_dir();
        let media = vec![map_asset(&dir)];
        let spec = spec(&dir, &media, vec![note("Belgium")], "european_capitals_nl.deck.json");

        let written = JsonDeckWriter::new().write(&spec).unwrap();

        let doc = DeckDocument::load(&written).unwrap();
        assert_eq!(doc.deck.id, 2_050_563_999);
        assert_eq!(doc.model.fields, MODEL_FIELDS.to_vec());
        assert_eq!(doc.notes.len(), 1);
        assert_eq!(doc.notes[0].guid, note_guid(2_050_563_999, "Belgium"));
        assert_eq!(doc.media, vec!["Belgium_map.png".to_string()]);
        assert_eq!(
            std::fs::read(dir.join("nl").join("media").join("Belgium_map.png")).unwrap(),
            b"png"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_field_count_rejected() {
        let dir = temp_dir();
        let bad = NoteSpec {
            key: "Belgium".to_string(),
            fields: vec!["only one".to_string()],
        };
        let writers: [(&dyn PackageWriter, &str); 2] = [
            (&AnkiPackageWriter, "x.apkg"),
            (&JsonDeckWriter, "x.deck.json"),
        ];
        for (writer, file) in writers {
            let spec = spec(&dir, &[], vec![bad.clone()], file);
            assert!(matches!(writer.write(&spec), Err(AtlasError::Package(_))));
            assert!(!dir.join("nl").join(file).exists());
        }

        std::fs::remove_dir_all(&dir).ok();
    }
}
