//! Google translation and text-to-speech providers
//!
//! Both use the keyless public endpoints. Requests are short (a country or
//! capital name), so every call blocks synchronously.

use super::http::call_with_retry;
use crate::config::AtlasConfig;
use crate::provider::{Speaker, Translator};
use atlas_core::{AtlasError, Result};
use serde_json::Value;

const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";
/// The TTS endpoint rejects longer inputs
const MAX_TTS_CHARS: usize = 200;

/// Translator backed by the public `translate_a/single` endpoint
pub struct GoogleTranslator {
    api_url: String,
}

impl GoogleTranslator {
    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        let api_url = config
            .api_url("translator")
            .unwrap_or(DEFAULT_TRANSLATE_URL)
            .to_string();
        Ok(Self { api_url })
    }
}

impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let response: Value = call_with_retry(|agent| {
            agent
                .get(&self.api_url)
                .query("client", "gtx")
                .query("sl", source)
                .query("tl", target)
                .query("dt", "t")
                .query("q", text)
                .call()?
                .body_mut()
                .read_json::<Value>()
        })
        .map_err(|e| AtlasError::Translation(format!("'{}' {}->{}: {}", text, source, target, e)))?;

        parse_translation(&response)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array whose first element lists
/// `[translated, original, ...]` segments.
pub fn parse_translation(response: &Value) -> Result<String> {
    let segments = response
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| AtlasError::Translation("Unexpected translation payload".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(AtlasError::Translation("Empty translation".to_string()));
    }
    Ok(text)
}

/// Speaker backed by the public `translate_tts` endpoint (MP3 output)
pub struct GoogleSpeaker {
    api_url: String,
}

impl GoogleSpeaker {
    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        let api_url = config
            .api_url("speaker")
            .unwrap_or(DEFAULT_TTS_URL)
            .to_string();
        Ok(Self { api_url })
    }
}

impl Speaker for GoogleSpeaker {
    fn name(&self) -> &str {
        "google"
    }

    fn file_extension(&self) -> &str {
        "mp3"
    }

    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        if text.chars().count() > MAX_TTS_CHARS {
            return Err(AtlasError::Synthesis(format!(
                "Text longer than {} characters",
                MAX_TTS_CHARS
            )));
        }

        let bytes = call_with_retry(|agent| {
            agent
                .get(&self.api_url)
                .query("ie", "UTF-8")
                .query("client", "tw-ob")
                .query("tl", language)
                .query("q", text)
                .call()?
                .body_mut()
                .read_to_vec()
        })
        .map_err(|e| AtlasError::Synthesis(format!("'{}' ({}): {}", text, language, e)))?;

        if bytes.is_empty() {
            return Err(AtlasError::Synthesis(format!(
                "Empty audio for '{}' ({})",
                text, language
            )));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translation_segments() {
        let json: Value = serde_json::from_str(
            r#"[[["Brussel","Brussels",null,null,10]],null,"en",null,null,null,1.0]"#,
        )
        .unwrap();
        assert_eq!(parse_translation(&json).unwrap(), "Brussel");
    }

    #[test]
    fn test_parse_translation_joins_segments() {
        let json: Value =
            serde_json::from_str(r#"[[["Andorra ","Andorra "],["la Vieja","la Vella"]],null,"en"]"#)
                .unwrap();
        assert_eq!(parse_translation(&json).unwrap(), "Andorra la Vieja");
    }

    #[test]
    fn test_parse_translation_rejects_garbage() {
        let json: Value = serde_json::from_str(r#"{"error": "quota"}"#).unwrap();
        assert!(matches!(
            parse_translation(&json),
            Err(AtlasError::Translation(_))
        ));
    }

    #[test]
    fn test_speaker_rejects_long_text() {
        let speaker = GoogleSpeaker::from_config(&AtlasConfig::default()).unwrap();
        let text = "a".repeat(MAX_TTS_CHARS + 1);
        assert!(matches!(
            speaker.synthesize(&text, "en"),
            Err(AtlasError::Synthesis(_))
        ));
        assert_eq!(speaker.file_extension(), "mp3");
    }
}
