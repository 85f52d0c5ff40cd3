//! Mock providers for testing and offline runs
//!
//! Identity translation, silent WAV narration with the spoken text embedded
//! as a title tag, and solid-colour flags. No network calls. Each mock counts
//! its calls and can be told to fail for chosen inputs.

use crate::codes::CountryCode;
use crate::provider::{FlagSource, Speaker, Translator};
use atlas_core::{AtlasError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::raster::encode_png;

/// Shared call counter that stays readable after the mock is boxed
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Translator returning canned translations, or the input unchanged
#[derive(Default)]
pub struct MockTranslator {
    entries: HashMap<(String, String), String>,
    failing: HashSet<String>,
    calls: CallCounter,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate `text` into `language` as `translated`
    pub fn with_entry(mut self, language: &str, text: &str, translated: &str) -> Self {
        self.entries.insert(
            (language.to_string(), text.to_string()),
            translated.to_string(),
        );
        self
    }

    /// Fail every call targeting `language`
    pub fn failing_for(mut self, language: &str) -> Self {
        self.failing.insert(language.to_string());
        self
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self.calls.bump();
        if self.failing.contains(target) {
            return Err(AtlasError::Translation(format!(
                "mock failure for '{}' {}->{}",
                text, source, target
            )));
        }
        Ok(self
            .entries
            .get(&(target.to_string(), text.to_string()))
            .cloned()
            .unwrap_or_else(|| text.to_string()))
    }
}

/// Speaker producing a short silent WAV whose title tag holds the text
#[derive(Default)]
pub struct MockSpeaker {
    failing: HashSet<String>,
    calls: CallCounter,
}

impl MockSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call for `language`
    pub fn failing_for(mut self, language: &str) -> Self {
        self.failing.insert(language.to_string());
        self
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl Speaker for MockSpeaker {
    fn name(&self) -> &str {
        "mock"
    }

    fn file_extension(&self) -> &str {
        "wav"
    }

    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        self.calls.bump();
        if self.failing.contains(language) {
            return Err(AtlasError::Synthesis(format!(
                "mock failure for '{}' ({})",
                text, language
            )));
        }
        Ok(silence_wav(text, 0.25))
    }
}

/// Flag source drawing a solid colour derived from the code
#[derive(Default)]
pub struct MockFlagSource {
    failing: HashSet<CountryCode>,
    calls: CallCounter,
}

impl MockFlagSource {
    pub const WIDTH: u32 = 320;
    pub const HEIGHT: u32 = 200;

    pub fn new() -> Self {
        Self::default()
    }

    /// Report `FlagNotFound` for `code`
    pub fn failing_for(mut self, code: &str) -> Self {
        self.failing.insert(CountryCode::new(code));
        self
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl FlagSource for MockFlagSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, code: &CountryCode) -> Result<Vec<u8>> {
        self.calls.bump();
        if self.failing.contains(code) {
            return Err(AtlasError::FlagNotFound(code.to_string()));
        }

        let hash_val = code
            .as_str()
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        let color = image::Rgb([
            ((hash_val >> 16) & 0xFF) as u8,
            ((hash_val >> 8) & 0xFF) as u8,
            (hash_val & 0xFF) as u8,
        ]);
        let img = image::RgbImage::from_pixel(Self::WIDTH, Self::HEIGHT, color);
        encode_png(&img)
    }
}

/// Mono 16-bit silence with a `LIST/INFO/INAM` chunk carrying `title`
pub fn silence_wav(title: &str, duration_secs: f64) -> Vec<u8> {
    let sample_rate: u32 = 16000;
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let num_samples = (sample_rate as f64 * duration_secs) as u32;
    let data_size = num_samples * (bits_per_sample / 8) as u32 * num_channels as u32;

    // INAM payload is NUL-terminated and padded to an even length
    let mut inam = title.as_bytes().to_vec();
    inam.push(0);
    if inam.len() % 2 == 1 {
        inam.push(0);
    }
    let list_size = 4 + 8 + inam.len() as u32;

    let riff_size = 4 + (8 + 16) + (8 + list_size) + (8 + data_size);
    let mut wav = Vec::with_capacity(riff_size as usize + 8);

    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&riff_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    let block_align = num_channels * (bits_per_sample / 8);
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    wav.extend_from_slice(b"LIST");
    wav.extend_from_slice(&list_size.to_le_bytes());
    wav.extend_from_slice(b"INFO");
    wav.extend_from_slice(b"INAM");
    wav.extend_from_slice(&(inam.len() as u32).to_le_bytes());
    wav.extend_from_slice(&inam);

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.resize(wav.len() + data_size as usize, 0);

    wav
}
