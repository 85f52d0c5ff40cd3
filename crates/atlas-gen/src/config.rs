//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `ATLAS_LANGUAGES`, `ATLAS_OUTPUT_DIR`,
//!    `ATLAS_DATASET`, `ATLAS_{PROVIDER}_API_URL`
//! 2. Project-local: `.atlas/config.toml`
//! 3. Global: `~/.atlas/config.toml`

use atlas_core::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Providers that accept an `api_url` override from the environment
const URL_PROVIDERS: [&str; 3] = ["translator", "speaker", "flags"];

/// What the narration clip says
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationStyle {
    /// "{country}: {capital}"
    CountryCapital,
    /// Only the capital name
    Capital,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Which provider backs each collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub translator: String,
    pub speaker: String,
    pub flags: String,
    /// Bundle format: "anki" or "json"
    pub package: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            translator: "google".to_string(),
            speaker: "google".to_string(),
            flags: "flagcdn".to_string(),
            package: "anki".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Provider selection that never touches the network
    pub fn offline() -> Self {
        Self {
            translator: "mock".to_string(),
            speaker: "mock".to_string(),
            flags: "mock".to_string(),
            package: "anki".to_string(),
        }
    }
}

/// Map raster settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    pub pad_factor: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            pad_factor: 0.5,
        }
    }
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Requested languages; the first is the primary language
    pub languages: Vec<String>,
    pub source_language: String,
    /// Used in bundle file names: `<topic>_<L>.apkg`
    pub topic: String,
    /// Deck title, `{language}` is substituted
    pub deck_title: String,
    pub output_dir: PathBuf,
    pub dataset: PathBuf,
    /// Optional catalog TOML; the built-in table is used when absent
    pub catalog: Option<PathBuf>,
    pub continent: String,
    pub language_pause_ms: u64,
    pub narration: NarrationStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            languages: ["nl", "en", "fr", "de", "es"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source_language: "en".to_string(),
            topic: "european_capitals".to_string(),
            deck_title: "European capitals ({language})".to_string(),
            output_dir: PathBuf::from("decks"),
            dataset: PathBuf::from("data/ne_110m_admin_0_countries.geojson"),
            catalog: None,
            continent: "Europe".to_string(),
            language_pause_ms: 1200,
            narration: NarrationStyle::CountryCapital,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PipelineSection {
    languages: Option<Vec<String>>,
    source_language: Option<String>,
    topic: Option<String>,
    deck_title: Option<String>,
    output_dir: Option<PathBuf>,
    dataset: Option<PathBuf>,
    catalog: Option<PathBuf>,
    continent: Option<String>,
    language_pause_ms: Option<u64>,
    narration: Option<NarrationStyle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GenerationSection {
    translator: Option<String>,
    speaker: Option<String>,
    flags: Option<String>,
    package: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MapSection {
    width: Option<u32>,
    height: Option<u32>,
    pad_factor: Option<f64>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AtlasConfigFile {
    #[serde(default)]
    pipeline: PipelineSection,
    #[serde(default)]
    providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    generation: GenerationSection,
    #[serde(default)]
    map: MapSection,
    /// Language tag -> question template containing `{country}`
    #[serde(default)]
    questions: HashMap<String, String>,
    /// Entity key -> country code overrides
    #[serde(default)]
    codes: HashMap<String, String>,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct AtlasConfig {
    pub pipeline: PipelineConfig,
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
    pub map: MapConfig,
    pub questions: HashMap<String, String>,
    pub codes: HashMap<String, String>,
}

impl AtlasConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = AtlasConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".atlas/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config);
        Ok(Self::resolve(config))
    }

    /// Load config from a specific file path only (plus env overrides)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(Self::resolve(config))
    }

    /// Get API URL override for a provider
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    /// The language whose flag files are canonical
    pub fn primary_language(&self) -> Option<&str> {
        self.pipeline.languages.first().map(|s| s.as_str())
    }

    /// Pause inserted between language batches
    pub fn language_pause(&self) -> Duration {
        Duration::from_millis(self.pipeline.language_pause_ms)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.languages.is_empty() {
            return Err(AtlasError::Config(
                "At least one language must be requested".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for lang in &self.pipeline.languages {
            if lang.trim().is_empty() {
                return Err(AtlasError::Config("Empty language tag".to_string()));
            }
            // Tags become directory names under the output root
            if !lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(AtlasError::Config(format!(
                    "Language tag '{}' may only contain letters, digits, '-' and '_'",
                    lang
                )));
            }
            if !seen.insert(lang.as_str()) {
                return Err(AtlasError::Config(format!(
                    "Language '{}' requested more than once",
                    lang
                )));
            }
        }

        for (lang, template) in &self.questions {
            if !template.contains("{country}") {
                return Err(AtlasError::Config(format!(
                    "Question template for '{}' has no {{country}} placeholder",
                    lang
                )));
            }
        }

        if self.map.width == 0 || self.map.height == 0 {
            return Err(AtlasError::Config(
                "Map width and height must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".atlas").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<AtlasConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            AtlasError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge_into(base: &mut AtlasConfigFile, overlay: AtlasConfigFile) {
        let p = overlay.pipeline;
        let b = &mut base.pipeline;
        if p.languages.is_some() {
            b.languages = p.languages;
        }
        if p.source_language.is_some() {
            b.source_language = p.source_language;
        }
        if p.topic.is_some() {
            b.topic = p.topic;
        }
        if p.deck_title.is_some() {
            b.deck_title = p.deck_title;
        }
        if p.output_dir.is_some() {
            b.output_dir = p.output_dir;
        }
        if p.dataset.is_some() {
            b.dataset = p.dataset;
        }
        if p.catalog.is_some() {
            b.catalog = p.catalog;
        }
        if p.continent.is_some() {
            b.continent = p.continent;
        }
        if p.language_pause_ms.is_some() {
            b.language_pause_ms = p.language_pause_ms;
        }
        if p.narration.is_some() {
            b.narration = p.narration;
        }

        for (name, provider) in overlay.providers {
            let entry = base.providers.entry(name).or_default();
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            entry.enabled = provider.enabled;
        }

        let g = overlay.generation;
        if g.translator.is_some() {
            base.generation.translator = g.translator;
        }
        if g.speaker.is_some() {
            base.generation.speaker = g.speaker;
        }
        if g.flags.is_some() {
            base.generation.flags = g.flags;
        }
        if g.package.is_some() {
            base.generation.package = g.package;
        }

        let m = overlay.map;
        if m.width.is_some() {
            base.map.width = m.width;
        }
        if m.height.is_some() {
            base.map.height = m.height;
        }
        if m.pad_factor.is_some() {
            base.map.pad_factor = m.pad_factor;
        }

        base.questions.extend(overlay.questions);
        base.codes.extend(overlay.codes);
    }

    fn apply_env_overrides(config: &mut AtlasConfigFile) {
        if let Ok(langs) = std::env::var("ATLAS_LANGUAGES") {
            config.pipeline.languages = Some(parse_language_list(&langs));
        }
        if let Ok(dir) = std::env::var("ATLAS_OUTPUT_DIR") {
            config.pipeline.output_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dataset) = std::env::var("ATLAS_DATASET") {
            config.pipeline.dataset = Some(PathBuf::from(dataset));
        }
        for name in &URL_PROVIDERS {
            let env_key = format!("ATLAS_{}_API_URL", name.to_uppercase());
            if let Ok(url) = std::env::var(&env_key) {
                let entry = config.providers.entry(name.to_string()).or_default();
                entry.api_url = Some(url);
            }
        }
    }

    fn resolve(file: AtlasConfigFile) -> Self {
        let defaults = PipelineConfig::default();
        let p = file.pipeline;
        let pipeline = PipelineConfig {
            languages: p.languages.unwrap_or(defaults.languages),
            source_language: p.source_language.unwrap_or(defaults.source_language),
            topic: p.topic.unwrap_or(defaults.topic),
            deck_title: p.deck_title.unwrap_or(defaults.deck_title),
            output_dir: p.output_dir.unwrap_or(defaults.output_dir),
            dataset: p.dataset.unwrap_or(defaults.dataset),
            catalog: p.catalog,
            continent: p.continent.unwrap_or(defaults.continent),
            language_pause_ms: p.language_pause_ms.unwrap_or(defaults.language_pause_ms),
            narration: p.narration.unwrap_or(defaults.narration),
        };

        let generation_defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            translator: file
                .generation
                .translator
                .unwrap_or(generation_defaults.translator),
            speaker: file.generation.speaker.unwrap_or(generation_defaults.speaker),
            flags: file.generation.flags.unwrap_or(generation_defaults.flags),
            package: file.generation.package.unwrap_or(generation_defaults.package),
        };

        let map_defaults = MapConfig::default();
        let map = MapConfig {
            width: file.map.width.unwrap_or(map_defaults.width),
            height: file.map.height.unwrap_or(map_defaults.height),
            pad_factor: file.map.pad_factor.unwrap_or(map_defaults.pad_factor),
        };

        AtlasConfig {
            pipeline,
            providers: file.providers,
            generation,
            map,
            questions: file.questions,
            codes: file.codes,
        }
    }
}

/// Split a comma-separated language list, dropping blanks
pub fn parse_language_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}
