//! Filesystem asset cache
//!
//! Every asset lives at a canonical path derived from (entity, language,
//! kind). A file at that path is the only cache signal: present means
//! reuse, absent means generate. Writes go through a temporary sibling and
//! a rename so a failed run never leaves a half-written file behind.

use atlas_core::{AtlasError, Result, Rgb};
use std::path::{Path, PathBuf};

use crate::context::RunContext;
use crate::provider::AssetKind;
use crate::providers::raster::encode_png;
use crate::report::{AssetOutcome, Stage};

pub const PLACEHOLDER_FLAG_WIDTH: u32 = 320;
pub const PLACEHOLDER_FLAG_HEIGHT: u32 = 200;

/// Outcome of an ensure call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResult {
    pub path: PathBuf,
    /// A usable file exists at `path`
    pub ok: bool,
    pub outcome: AssetOutcome,
}

impl AssetResult {
    fn new(path: PathBuf, outcome: AssetOutcome) -> Self {
        Self {
            path,
            ok: outcome.is_present(),
            outcome,
        }
    }

    /// The path when the file is usable
    pub fn present(&self) -> Option<&Path> {
        self.ok.then_some(self.path.as_path())
    }
}

enum Attempt {
    Reused,
    Generated,
    Failed(AtlasError),
}

/// Output tree rooted at the configured directory
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    audio_extension: String,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>, audio_extension: &str) -> Self {
        Self {
            root: root.into(),
            audio_extension: audio_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn language_dir(&self, language: &str) -> PathBuf {
        self.root.join(language)
    }

    pub fn media_dir(&self, language: &str) -> PathBuf {
        self.language_dir(language).join("media")
    }

    /// Create `maps/`, `flags/`, `audio/` and `media/` for a language
    pub fn prepare_language(&self, language: &str) -> Result<()> {
        let dir = self.language_dir(language);
        for kind in [AssetKind::Map, AssetKind::Flag, AssetKind::Audio] {
            std::fs::create_dir_all(dir.join(kind.dir_name()))?;
        }
        std::fs::create_dir_all(self.media_dir(language))?;
        Ok(())
    }

    /// File name of an asset. Map and flag names carry a suffix so both can
    /// share one flat media directory.
    pub fn file_name(&self, key: &str, language: &str, kind: AssetKind) -> String {
        let stem = sanitize_key(key);
        match kind {
            AssetKind::Map => format!("{}_map.png", stem),
            AssetKind::Flag => format!("{}_flag.png", stem),
            AssetKind::Audio => format!("{}_{}.{}", stem, language, self.audio_extension),
        }
    }

    pub fn path_for(&self, key: &str, language: &str, kind: AssetKind) -> PathBuf {
        self.language_dir(language)
            .join(kind.dir_name())
            .join(self.file_name(key, language, kind))
    }

    pub fn exists(&self, key: &str, language: &str, kind: AssetKind) -> bool {
        self.path_for(key, language, kind).is_file()
    }

    fn attempt<F>(&self, path: &Path, generator: F) -> Result<Attempt>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "cache hit");
            return Ok(Attempt::Reused);
        }
        match generator() {
            Ok(bytes) => {
                write_atomic(path, &bytes)?;
                Ok(Attempt::Generated)
            }
            Err(e) => Ok(Attempt::Failed(e)),
        }
    }

    /// Generic ensure: reuse, or generate and write. Generator failures are
    /// returned in the result, write failures are errors.
    pub fn ensure<F>(&self, path: PathBuf, generator: F) -> Result<(AssetResult, Option<AtlasError>)>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        Ok(match self.attempt(&path, generator)? {
            Attempt::Reused => (AssetResult::new(path, AssetOutcome::Reused), None),
            Attempt::Generated => (AssetResult::new(path, AssetOutcome::Generated), None),
            Attempt::Failed(e) => (AssetResult::new(path, AssetOutcome::Missing), Some(e)),
        })
    }

    /// Map for one language. No fallback: a failed render leaves the card
    /// without an image.
    pub fn ensure_map<F>(
        &self,
        ctx: &mut RunContext,
        key: &str,
        language: &str,
        render: F,
    ) -> Result<AssetResult>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let path = self.path_for(key, language, AssetKind::Map);
        let (result, error) = self.ensure(path, render)?;
        if let Some(e) = error {
            ctx.warn(key, Some(language), Stage::Map, e.to_string());
        }
        ctx.record(AssetKind::Map, result.outcome);
        Ok(result)
    }

    /// Flag in the primary language. A failed or impossible fetch writes the
    /// neutral placeholder instead.
    pub fn ensure_flag<F>(
        &self,
        ctx: &mut RunContext,
        key: &str,
        primary_language: &str,
        fetch: Option<F>,
    ) -> Result<AssetResult>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let path = self.path_for(key, primary_language, AssetKind::Flag);
        let failure = match fetch {
            Some(fetch) => match self.attempt(&path, fetch)? {
                Attempt::Reused => {
                    ctx.record(AssetKind::Flag, AssetOutcome::Reused);
                    return Ok(AssetResult::new(path, AssetOutcome::Reused));
                }
                Attempt::Generated => {
                    ctx.record(AssetKind::Flag, AssetOutcome::Generated);
                    return Ok(AssetResult::new(path, AssetOutcome::Generated));
                }
                Attempt::Failed(e) => e.to_string(),
            },
            None if path.is_file() => {
                ctx.record(AssetKind::Flag, AssetOutcome::Reused);
                return Ok(AssetResult::new(path, AssetOutcome::Reused));
            }
            None => "no country code".to_string(),
        };

        ctx.warn(
            key,
            Some(primary_language),
            Stage::Flag,
            format!("{}; using placeholder", failure),
        );
        write_atomic(&path, &placeholder_flag()?)?;
        ctx.record(AssetKind::Flag, AssetOutcome::Placeholder);
        Ok(AssetResult::new(path, AssetOutcome::Placeholder))
    }

    /// Byte-copy the primary language's flag into `language` when absent
    pub fn replicate_flag(
        &self,
        ctx: &mut RunContext,
        key: &str,
        primary_language: &str,
        language: &str,
    ) -> Result<AssetResult> {
        let target = self.path_for(key, language, AssetKind::Flag);
        let outcome = if target.is_file() {
            AssetOutcome::Reused
        } else {
            let source = self.path_for(key, primary_language, AssetKind::Flag);
            if source.is_file() {
                let bytes = std::fs::read(&source)?;
                write_atomic(&target, &bytes)?;
                AssetOutcome::Copied
            } else {
                ctx.warn(key, Some(language), Stage::Flag, "primary flag missing, nothing to copy");
                AssetOutcome::Missing
            }
        };
        ctx.record(AssetKind::Flag, outcome);
        Ok(AssetResult::new(target, outcome))
    }

    /// Narration audio. When `synthesize` fails, `fallback` (source-language
    /// narration) is tried once before giving up.
    pub fn ensure_audio<F, G>(
        &self,
        ctx: &mut RunContext,
        key: &str,
        language: &str,
        synthesize: F,
        fallback: Option<G>,
    ) -> Result<AssetResult>
    where
        F: FnOnce() -> Result<Vec<u8>>,
        G: FnOnce() -> Result<Vec<u8>>,
    {
        let path = self.path_for(key, language, AssetKind::Audio);
        let error = match self.attempt(&path, synthesize)? {
            Attempt::Reused => {
                ctx.record(AssetKind::Audio, AssetOutcome::Reused);
                return Ok(AssetResult::new(path, AssetOutcome::Reused));
            }
            Attempt::Generated => {
                ctx.record(AssetKind::Audio, AssetOutcome::Generated);
                return Ok(AssetResult::new(path, AssetOutcome::Generated));
            }
            Attempt::Failed(e) => e,
        };
        ctx.warn(key, Some(language), Stage::Speech, error.to_string());

        let outcome = match fallback {
            Some(fallback) => match fallback() {
                Ok(bytes) => {
                    write_atomic(&path, &bytes)?;
                    AssetOutcome::Fallback
                }
                Err(e) => {
                    ctx.warn(
                        key,
                        Some(language),
                        Stage::Speech,
                        format!("source-language retry failed: {}", e),
                    );
                    AssetOutcome::Missing
                }
            },
            None => AssetOutcome::Missing,
        };
        ctx.record(AssetKind::Audio, outcome);
        Ok(AssetResult::new(path, outcome))
    }
}

/// Keys become file stems; path separators would escape the directory
pub fn sanitize_key(key: &str) -> String {
    key.replace(['/', '\\'], "_")
}

/// Hidden `.{name}.{pid}.tmp` next to `path`; creates the parent directory
pub(crate) fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| AtlasError::Package(format!("No parent directory: {}", path.display())))?;
    std::fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parent.join(format!(".{}.{}.tmp", file_name, std::process::id())))
}

/// Write through a temporary sibling and rename into place
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path)?;

    if let Err(e) = std::fs::write(&tmp, bytes).and_then(|_| std::fs::rename(&tmp, path)) {
        std::fs::remove_file(&tmp).ok();
        return Err(e.into());
    }
    Ok(())
}

/// Neutral grey PNG used when no real flag is available
pub fn placeholder_flag() -> Result<Vec<u8>> {
    let img = image::RgbImage::from_pixel(
        PLACEHOLDER_FLAG_WIDTH,
        PLACEHOLDER_FLAG_HEIGHT,
        image::Rgb(Rgb::PLACEHOLDER_GREY.to_array()),
    );
    encode_png(&img)
}
