//! End-to-end generation run
//!
//! Phase one ensures maps and flags for every entity, phase two localizes,
//! narrates and packages one language at a time. Everything runs on the
//! calling thread in catalog and language order.

use atlas_core::{AtlasError, Result};
use std::path::PathBuf;

use crate::catalog::{Catalog, Entity};
use crate::codes::IdentifierResolver;
use crate::config::AtlasConfig;
use crate::context::RunContext;
use crate::dataset::GeoDataset;
use crate::ids::{allocate_all, DeckIds};
use crate::localize::Localizer;
use crate::package::{assemble, Bundle, Card};
use crate::provider::{AssetKind, FlagSource, MapRenderer, PackageWriter, Speaker, Translator};
use crate::providers::{self, iso::IsoCountryTable, raster::RasterMapRenderer};
use crate::quiz;
use crate::report::{LanguageReport, RunReport};
use crate::store::AssetStore;
use crate::writer::{NoteSpec, PackageSpec};

pub const REPORT_FILE: &str = "run_report.toml";

/// Every external collaborator a run talks to
pub struct Collaborators {
    pub translator: Box<dyn Translator>,
    pub speaker: Box<dyn Speaker>,
    pub flags: Box<dyn FlagSource>,
    pub codes: IdentifierResolver,
    pub renderer: Box<dyn MapRenderer>,
    pub writer: Box<dyn PackageWriter>,
}

impl Collaborators {
    /// Providers selected by `[generation]`, built-in resolver, renderer and writer
    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        let generation = &config.generation;
        Ok(Self {
            translator: providers::create_translator(&generation.translator, config)?,
            speaker: providers::create_speaker(&generation.speaker, config)?,
            flags: providers::create_flag_source(&generation.flags, config)?,
            codes: IdentifierResolver::new(Box::new(IsoCountryTable::new()))
                .with_overrides(&config.codes),
            renderer: Box::new(RasterMapRenderer::from_config(&config.map)),
            writer: providers::create_package_writer(&generation.package)?,
        })
    }
}

/// What a completed run produced
#[derive(Debug)]
pub struct RunSummary {
    pub bundles: Vec<Bundle>,
    pub report: RunReport,
    pub report_path: PathBuf,
}

pub struct Pipeline {
    config: AtlasConfig,
    catalog: Catalog,
    collaborators: Collaborators,
}

impl Pipeline {
    pub fn new(config: AtlasConfig, catalog: Catalog, collaborators: Collaborators) -> Self {
        Self {
            config,
            catalog,
            collaborators,
        }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Run against an already loaded dataset
    pub fn run(&self, dataset: &GeoDataset) -> Result<RunSummary> {
        self.config.validate()?;
        let languages = &self.config.pipeline.languages;
        let ids = allocate_all(languages)?;
        let primary = self
            .config
            .primary_language()
            .ok_or_else(|| AtlasError::Config("No languages requested".to_string()))?;

        let region = dataset.filter_continent(&self.config.pipeline.continent);
        let entities: Vec<&Entity> = self
            .catalog
            .iter()
            .filter(|e| region.contains(&e.key))
            .collect();
        for record in region.records() {
            if !self.catalog.contains(&record.name) {
                tracing::debug!(entity = %record.name, "in dataset but not in catalog, skipped");
            }
        }
        tracing::info!(
            entities = entities.len(),
            languages = languages.len(),
            "starting run"
        );

        let store = AssetStore::new(
            &self.config.pipeline.output_dir,
            self.collaborators.speaker.file_extension(),
        );
        for language in languages {
            store.prepare_language(language)?;
        }

        let mut ctx = RunContext::new();
        for entity in &entities {
            self.ensure_images(&mut ctx, &store, &region, entity, primary)?;
        }

        let mut bundles = Vec::with_capacity(ids.len());
        for (index, deck_ids) in ids.into_iter().enumerate() {
            if index > 0 {
                let pause = self.config.language_pause();
                if !pause.is_zero() {
                    std::thread::sleep(pause);
                }
            }
            let bundle = self.build_language(&mut ctx, &store, &entities, deck_ids)?;
            bundles.push(bundle);
        }

        let report_path = store.root().join(REPORT_FILE);
        let report = ctx.into_report();
        report.save(&report_path)?;

        Ok(RunSummary {
            bundles,
            report,
            report_path,
        })
    }

    /// Maps for every language (rendered at most once) and the flag in the
    /// primary language, copied to the others
    fn ensure_images(
        &self,
        ctx: &mut RunContext,
        store: &AssetStore,
        region: &GeoDataset,
        entity: &Entity,
        primary: &str,
    ) -> Result<()> {
        let key = entity.key.as_str();
        let languages = &self.config.pipeline.languages;

        let mut rendered: Option<std::result::Result<Vec<u8>, String>> = None;
        for language in languages {
            store.ensure_map(ctx, key, language, || {
                let bytes = rendered.get_or_insert_with(|| {
                    region
                        .get(key)
                        .ok_or_else(|| format!("'{}' not in dataset", key))
                        .and_then(|record| {
                            self.collaborators
                                .renderer
                                .render(region, record)
                                .map_err(|e| e.to_string())
                        })
                });
                bytes.clone().map_err(AtlasError::Render)
            })?;
        }

        let code = ctx.code_for(&self.collaborators.codes, key);
        let fetch = code
            .as_ref()
            .map(|code| move || self.collaborators.flags.fetch(code));
        store.ensure_flag(ctx, key, primary, fetch)?;
        for language in languages.iter().filter(|l| l.as_str() != primary) {
            store.replicate_flag(ctx, key, primary, language)?;
        }
        Ok(())
    }

    fn build_language(
        &self,
        ctx: &mut RunContext,
        store: &AssetStore,
        entities: &[&Entity],
        deck_ids: DeckIds,
    ) -> Result<Bundle> {
        let pipeline = &self.config.pipeline;
        let language = deck_ids.language.clone();
        let source = pipeline.source_language.as_str();
        tracing::info!(language = %language, "building language");

        let localizer = Localizer::new(
            self.collaborators.translator.as_ref(),
            source,
            &self.config.questions,
            pipeline.narration,
        );
        let speaker = self.collaborators.speaker.as_ref();

        let mut cards = Vec::with_capacity(entities.len());
        for entity in entities {
            let key = entity.key.as_str();
            let text = localizer.localize(ctx, entity, &language);

            let audio = store.ensure_audio(
                ctx,
                key,
                &language,
                || speaker.synthesize(&text.narration_text, &language),
                Some(|| speaker.synthesize(&text.fallback_narration, source)),
            )?;

            let present = |kind: AssetKind| {
                store
                    .exists(key, &language, kind)
                    .then(|| store.path_for(key, &language, kind))
            };
            cards.push(Card {
                entity: entity.key.clone(),
                language: language.clone(),
                country: text.country.clone(),
                question_text: text.question_text.clone(),
                answer_text: text.answer_text.clone(),
                map: present(AssetKind::Map),
                flag: present(AssetKind::Flag),
                audio: audio.present().map(|p| p.to_path_buf()),
            });
        }

        let bundle = assemble(deck_ids, cards);
        let language_dir = store.language_dir(&language);
        let deck_name = pipeline.deck_title.replace("{language}", &language);
        let bundle_path = {
            let spec = PackageSpec {
                deck_id: bundle.ids.deck_id,
                model_id: bundle.ids.model_id,
                model_name: format!("{} card", deck_name),
                deck_name,
                notes: bundle
                    .cards
                    .iter()
                    .map(|card| NoteSpec {
                        key: card.entity.clone(),
                        fields: vec![
                            card.question_text.clone(),
                            card.country.clone(),
                            card.answer_text.clone(),
                            card.map_tag(),
                            card.flag_tag(),
                            card.audio_tag(),
                        ],
                    })
                    .collect(),
                media_files: &bundle.media_files,
                destination: language_dir.join(format!(
                    "{}_{}.{}",
                    pipeline.topic,
                    language,
                    self.collaborators.writer.file_extension()
                )),
            };
            self.collaborators.writer.write(&spec)?
        };

        let quiz_path = language_dir.join(format!("quiz_data_{}.json", language));
        quiz::write_quiz(&quiz_path, &quiz::from_cards(&bundle.cards))?;

        tracing::info!(
            language = %language,
            cards = bundle.cards.len(),
            media = bundle.media_files.len(),
            "wrote bundle"
        );
        ctx.report.languages.push(LanguageReport {
            language: language.clone(),
            deck_id: bundle.ids.deck_id,
            model_id: bundle.ids.model_id,
            cards: bundle.cards.len(),
            media_files: bundle.media_files.len(),
            bundle_path: bundle_path.display().to_string(),
            quiz_path: quiz_path.display().to_string(),
        });
        Ok(bundle)
    }
}

/// Load catalog and dataset named by `config`, build the configured
/// collaborators and run. The dataset is loaded before anything is written.
pub fn run_from_config(config: AtlasConfig) -> Result<RunSummary> {
    let catalog = Catalog::load_or_builtin(config.pipeline.catalog.as_deref())?;
    let dataset = GeoDataset::load(&config.pipeline.dataset)?;
    let collaborators = Collaborators::from_config(&config)?;
    Pipeline::new(config, catalog, collaborators).run(&dataset)
}
