//! flagcdn.com flag source
//!
//! Downloads 320px-wide PNG flags by lower-case alpha-2 code and flattens
//! any transparency onto white so every flag renders the same on a card.

use super::http::call_with_retry;
use super::raster::encode_png;
use crate::codes::CountryCode;
use crate::config::AtlasConfig;
use crate::provider::FlagSource;
use atlas_core::{AtlasError, Result};

const DEFAULT_FLAG_URL: &str = "https://flagcdn.com/w320/{code}.png";

pub struct FlagCdnSource {
    /// URL template containing `{code}`
    url_template: String,
}

impl FlagCdnSource {
    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        let url_template = config
            .api_url("flags")
            .unwrap_or(DEFAULT_FLAG_URL)
            .to_string();
        if !url_template.contains("{code}") {
            return Err(AtlasError::Config(format!(
                "Flag URL template '{}' has no {{code}} placeholder",
                url_template
            )));
        }
        Ok(Self { url_template })
    }

    pub fn url_for(&self, code: &CountryCode) -> String {
        self.url_template.replace("{code}", code.as_str())
    }
}

impl FlagSource for FlagCdnSource {
    fn name(&self) -> &str {
        "flagcdn"
    }

    fn fetch(&self, code: &CountryCode) -> Result<Vec<u8>> {
        let url = self.url_for(code);
        let bytes = call_with_retry(|agent| agent.get(&url).call()?.body_mut().read_to_vec())
            .map_err(|e| match e {
                ureq::Error::StatusCode(404) => AtlasError::FlagNotFound(code.to_string()),
                other => AtlasError::Network(format!("{}: {}", url, other)),
            })?;
        Ok(normalize_flag(bytes))
    }
}

/// Composite the image onto a white background and re-encode as PNG.
/// Bytes that do not decode as an image are returned unchanged.
pub fn normalize_flag(bytes: Vec<u8>) -> Vec<u8> {
    let decoded = match image::load_from_memory(&bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            tracing::debug!(error = %e, "flag not decodable, keeping raw bytes");
            return bytes;
        }
    };

    let (width, height) = decoded.dimensions();
    let flattened = image::RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = decoded.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let c = c as u32;
            let a = a as u32;
            ((c * a + 255 * (255 - a)) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    });

    encode_png(&flattened).unwrap_or(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_url_template() {
        let source = FlagCdnSource::from_config(&AtlasConfig::default()).unwrap();
        assert_eq!(
            source.url_for(&CountryCode::new("BE")),
            "https://flagcdn.com/w320/be.png"
        );
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let mut config = AtlasConfig::default();
        config.providers = HashMap::from([(
            "flags".to_string(),
            crate::config::ProviderConfig {
                api_url: Some("https://example.com/flag.png".to_string()),
                enabled: true,
            },
        )]);
        assert!(matches!(
            FlagCdnSource::from_config(&config),
            Err(AtlasError::Config(_))
        ));
    }

    #[test]
    fn test_normalize_flattens_alpha() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        rgba.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));
        let mut png = Vec::new();
        rgba.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let normalized = normalize_flag(png);
        let img = image::load_from_memory(&normalized).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        // Fully transparent becomes white
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_normalize_keeps_undecodable_bytes() {
        let raw = b"<svg/>".to_vec();
        assert_eq!(normalize_flag(raw.clone()), raw);
    }
}
