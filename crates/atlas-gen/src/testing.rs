//! Shared fixtures for pipeline tests

use atlas_core::{AtlasError, Result};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, Entity};
use crate::codes::IdentifierResolver;
use crate::config::AtlasConfig;
use crate::dataset::{GeoDataset, GeoRecord, Polygon};
use crate::pipeline::{Collaborators, REPORT_FILE};
use crate::provider::MapRenderer;
use crate::providers::iso::IsoCountryTable;
use crate::providers::mock::{CallCounter, MockFlagSource, MockSpeaker, MockTranslator};
use crate::providers::raster::RasterMapRenderer;
use crate::writer::AnkiPackageWriter;

pub fn temp_root() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("atlas_pipeline_test_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn test_config(root: &Path, languages: &[&str]) -> AtlasConfig {
    let mut config = AtlasConfig::default();
    config.pipeline.languages = languages.iter().map(|l| l.to_string()).collect();
    config.pipeline.output_dir = root.to_path_buf();
    config.pipeline.language_pause_ms = 0;
    config.map.width = 32;
    config.map.height = 32;
    config
}

pub fn catalog(entries: &[(&str, &str)]) -> Catalog {
    Catalog::from_entities(
        entries
            .iter()
            .map(|(key, capital)| Entity {
                key: key.to_string(),
                capital: capital.to_string(),
            })
            .collect(),
    )
    .unwrap()
}

/// Fresh mocks; grab counters before handing them to `collaborators`
#[derive(Default)]
pub struct Fakes {
    pub translator: MockTranslator,
    pub speaker: MockSpeaker,
    pub flags: MockFlagSource,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            translator: MockTranslator::new(),
            speaker: MockSpeaker::new(),
            flags: MockFlagSource::new(),
        }
    }
}

pub fn collaborators(
    translator: MockTranslator,
    speaker: MockSpeaker,
    flags: MockFlagSource,
) -> Collaborators {
    Collaborators {
        translator: Box::new(translator),
        speaker: Box::new(speaker),
        flags: Box::new(flags),
        codes: IdentifierResolver::new(Box::new(IsoCountryTable::new())),
        renderer: Box::new(RasterMapRenderer::new(32, 32, 0.5)),
        writer: Box::new(AnkiPackageWriter::new()),
    }
}

fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon {
    vec![vec![
        [min_x, min_y],
        [max_x, min_y],
        [max_x, max_y],
        [min_x, max_y],
        [min_x, min_y],
    ]]
}

/// Rough boxes around a few countries plus a dataset-only entity and a
/// record on another continent
pub fn sample_dataset() -> GeoDataset {
    GeoDataset::new(vec![
        GeoRecord::new("Belgium", "Europe", vec![rect(2.5, 49.5, 6.4, 51.5)]),
        GeoRecord::new("Netherlands", "Europe", vec![rect(3.3, 50.8, 7.2, 53.5)]),
        GeoRecord::new("Andorra", "Europe", vec![rect(1.4, 42.4, 1.8, 42.7)]),
        GeoRecord::new("France", "Europe", vec![rect(-4.8, 42.3, 8.2, 51.1)]),
        GeoRecord::new("Narnia", "Europe", vec![rect(10.0, 60.0, 12.0, 61.0)]),
        GeoRecord::new("Atlantis", "Europe", vec![rect(-20.0, 35.0, -18.0, 36.0)]),
        GeoRecord::new("Japan", "Asia", vec![rect(129.0, 31.0, 146.0, 45.0)]),
    ])
}

/// Raster renderer that counts its calls
pub struct CountingRenderer {
    calls: CallCounter,
    inner: RasterMapRenderer,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self {
            calls: CallCounter::default(),
            inner: RasterMapRenderer::new(16, 16, 0.5),
        }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl MapRenderer for CountingRenderer {
    fn render(&self, dataset: &GeoDataset, target: &GeoRecord) -> Result<Vec<u8>> {
        self.calls.bump();
        self.inner.render(dataset, target)
    }
}

pub struct FailingRenderer;

impl MapRenderer for FailingRenderer {
    fn render(&self, _dataset: &GeoDataset, target: &GeoRecord) -> Result<Vec<u8>> {
        Err(AtlasError::Render(format!("cannot draw {}", target.name)))
    }
}

/// Every file under `root` keyed by relative path, except the run report
/// and `.apkg` packages, which both embed write timestamps
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let stamped = path.file_name().and_then(|n| n.to_str()) == Some(REPORT_FILE)
                || path.extension().and_then(|e| e.to_str()) == Some("apkg");
            if path.is_dir() {
                walk(root, &path, out);
            } else if !stamped {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// What an `.apkg` archive holds
pub struct PackageContents {
    pub entries: Vec<String>,
    /// Media file names in archive index order
    pub media: Vec<String>,
    /// Raw bytes of the embedded collection database
    pub collection: Vec<u8>,
}

pub fn read_package(path: &Path) -> PackageContents {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let entries: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();

    let mut json = String::new();
    archive
        .by_name("media")
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let map: HashMap<String, String> = serde_json::from_str(&json).unwrap();
    let mut indexed: Vec<(usize, String)> = map
        .into_iter()
        .map(|(index, name)| (index.parse().unwrap(), name))
        .collect();
    indexed.sort();

    let mut collection = Vec::new();
    archive
        .by_name("collection.anki2")
        .unwrap()
        .read_to_end(&mut collection)
        .unwrap();

    PackageContents {
        entries,
        media: indexed.into_iter().map(|(_, name)| name).collect(),
        collection,
    }
}
