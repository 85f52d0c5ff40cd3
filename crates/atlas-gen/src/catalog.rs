//! Country → capital catalog
//!
//! Keys are the canonical dataset names (Natural Earth `NAME`), capitals are
//! in the source language. Catalog order is card order.

use atlas_core::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One country with its source-language capital
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "name")]
    pub key: String,
    pub capital: String,
}

const BUILTIN: &[(&str, &str)] = &[
    ("Albania", "Tirana"),
    ("Andorra", "Andorra la Vella"),
    ("Austria", "Vienna"),
    ("Belarus", "Minsk"),
    ("Belgium", "Brussels"),
    ("Bosnia and Herz.", "Sarajevo"),
    ("Bulgaria", "Sofia"),
    ("Croatia", "Zagreb"),
    ("Czechia", "Prague"),
    ("Denmark", "Copenhagen"),
    ("Estonia", "Tallinn"),
    ("Finland", "Helsinki"),
    ("France", "Paris"),
    ("Germany", "Berlin"),
    ("Greece", "Athens"),
    ("Hungary", "Budapest"),
    ("Iceland", "Reykjavik"),
    ("Ireland", "Dublin"),
    ("Italy", "Rome"),
    ("Kosovo", "Pristina"),
    ("Latvia", "Riga"),
    ("Liechtenstein", "Vaduz"),
    ("Lithuania", "Vilnius"),
    ("Luxembourg", "Luxembourg"),
    ("Malta", "Valletta"),
    ("Moldova", "Chisinau"),
    ("Monaco", "Monaco"),
    ("Montenegro", "Podgorica"),
    ("Netherlands", "Amsterdam"),
    ("North Macedonia", "Skopje"),
    ("Norway", "Oslo"),
    ("Poland", "Warsaw"),
    ("Portugal", "Lisbon"),
    ("Romania", "Bucharest"),
    ("San Marino", "San Marino"),
    ("Serbia", "Belgrade"),
    ("Slovakia", "Bratislava"),
    ("Slovenia", "Ljubljana"),
    ("Spain", "Madrid"),
    ("Sweden", "Stockholm"),
    ("Switzerland", "Bern"),
    ("Ukraine", "Kyiv"),
    ("United Kingdom", "London"),
    ("Vatican", "Vatican City"),
];

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "country", default)]
    countries: Vec<Entity>,
}

/// Ordered, duplicate-free table of entities
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
}

impl Catalog {
    /// The built-in table of European capitals
    pub fn builtin() -> Self {
        Self {
            entities: BUILTIN
                .iter()
                .map(|(key, capital)| Entity {
                    key: key.to_string(),
                    capital: capital.to_string(),
                })
                .collect(),
        }
    }

    /// Build a catalog, rejecting duplicate keys and blank capitals
    pub fn from_entities(entities: Vec<Entity>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity.key.as_str()) {
                return Err(AtlasError::Catalog(format!(
                    "Duplicate catalog entry '{}'",
                    entity.key
                )));
            }
            if entity.capital.trim().is_empty() {
                return Err(AtlasError::Catalog(format!(
                    "Catalog entry '{}' has no capital",
                    entity.key
                )));
            }
        }
        Ok(Self { entities })
    }

    /// Load a catalog TOML file of `[[country]]` tables
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = toml::from_str(&content).map_err(|e| {
            AtlasError::Catalog(format!("Failed to parse catalog {}: {}", path.display(), e))
        })?;
        Self::from_entities(file.countries)
    }

    /// Built-in table, or the file at `path` when given
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn capital(&self, key: &str) -> Option<&str> {
        self.get(key).map(|e| e.capital.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
