//! Full pipeline run

use anyhow::{Context, Result};
use atlas_gen::config::parse_language_list;
use atlas_gen::provider::AssetKind;
use atlas_gen::{AtlasConfig, GenerationConfig};
use std::path::PathBuf;

/// Command-line values layered over the loaded configuration
#[derive(Debug, Default)]
pub struct BuildOverrides {
    pub languages: Option<String>,
    pub output: Option<String>,
    pub dataset: Option<String>,
    pub catalog: Option<String>,
    pub offline: bool,
    pub package: Option<String>,
    pub no_pause: bool,
}

impl BuildOverrides {
    fn apply(self, config: &mut AtlasConfig) {
        if let Some(languages) = self.languages {
            config.pipeline.languages = parse_language_list(&languages);
        }
        if let Some(output) = self.output {
            config.pipeline.output_dir = PathBuf::from(output);
        }
        if let Some(dataset) = self.dataset {
            config.pipeline.dataset = PathBuf::from(dataset);
        }
        if let Some(catalog) = self.catalog {
            config.pipeline.catalog = Some(PathBuf::from(catalog));
        }
        if self.offline {
            let package = std::mem::take(&mut config.generation.package);
            config.generation = GenerationConfig {
                package,
                ..GenerationConfig::offline()
            };
        }
        if let Some(package) = self.package {
            config.generation.package = package;
        }
        if self.no_pause {
            config.pipeline.language_pause_ms = 0;
        }
    }
}

pub fn run(config_path: Option<&str>, overrides: BuildOverrides) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    overrides.apply(&mut config);

    println!(
        "Building '{}' decks for {} language(s): {}",
        config.pipeline.continent,
        config.pipeline.languages.len(),
        config.pipeline.languages.join(", ")
    );
    println!(
        "  Providers: translator={}, speaker={}, flags={}, package={}",
        config.generation.translator,
        config.generation.speaker,
        config.generation.flags,
        config.generation.package
    );
    println!("  Output: {}", config.pipeline.output_dir.display());

    let summary = atlas_gen::run_from_config(config).context("Build failed")?;

    println!();
    for language in &summary.report.languages {
        println!(
            "[{}] {} card(s), {} media file(s)",
            language.language, language.cards, language.media_files
        );
        println!("  Deck: {} (id {})", language.bundle_path, language.deck_id);
        println!("  Model id: {}", language.model_id);
        println!("  Quiz: {}", language.quiz_path);
    }

    println!();
    for (label, kind) in [
        ("Maps", AssetKind::Map),
        ("Flags", AssetKind::Flag),
        ("Audio", AssetKind::Audio),
    ] {
        let counts = summary.report.assets.get(kind);
        println!(
            "{}: {} reused, {} generated, {} copied, {} placeholder, {} fallback, {} missing",
            label,
            counts.reused,
            counts.generated,
            counts.copied,
            counts.placeholder,
            counts.fallback,
            counts.missing
        );
    }

    let warnings = &summary.report.warnings;
    if warnings.is_empty() {
        println!("\nNo warnings.");
    } else {
        println!("\n{} warning(s):", warnings.len());
        for warning in warnings {
            match &warning.language {
                Some(language) => println!(
                    "  {} [{}] {}: {}",
                    warning.entity, language, warning.stage, warning.message
                ),
                None => println!("  {} {}: {}", warning.entity, warning.stage, warning.message),
            }
        }
    }
    println!("Report: {}", summary.report_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = AtlasConfig::default();
        BuildOverrides {
            languages: Some("nl, en,,fr".to_string()),
            output: Some("out".to_string()),
            dataset: Some("world.geojson".to_string()),
            catalog: Some("capitals.toml".to_string()),
            offline: true,
            package: Some("json".to_string()),
            no_pause: true,
        }
        .apply(&mut config);

        assert_eq!(config.pipeline.languages, vec!["nl", "en", "fr"]);
        assert_eq!(config.pipeline.output_dir, PathBuf::from("out"));
        assert_eq!(config.pipeline.dataset, PathBuf::from("world.geojson"));
        assert_eq!(config.pipeline.catalog, Some(PathBuf::from("capitals.toml")));
        assert_eq!(config.generation.translator, "mock");
        assert_eq!(config.generation.speaker, "mock");
        assert_eq!(config.generation.flags, "mock");
        assert_eq!(config.generation.package, "json");
        assert_eq!(config.pipeline.language_pause_ms, 0);
    }

    #[test]
    fn test_offline_keeps_package_format() {
        let mut config = AtlasConfig::default();
        config.generation.package = "json".to_string();
        BuildOverrides {
            offline: true,
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.generation.speaker, "mock");
        assert_eq!(config.generation.package, "json");
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = AtlasConfig::default();
        let before = config.pipeline.languages.clone();
        BuildOverrides::default().apply(&mut config);
        assert_eq!(config.pipeline.languages, before);
    }
}
