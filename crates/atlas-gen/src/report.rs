//! Run report for tracking what a pipeline run produced
//!
//! Records per-language bundle output, asset outcome counts and every
//! degradation warning so a run can be audited after the fact.

use atlas_core::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::provider::AssetKind;

/// Pipeline stage a warning originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Resolve,
    Map,
    Flag,
    Translate,
    Speech,
    Package,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Resolve => "resolve",
            Stage::Map => "map",
            Stage::Flag => "flag",
            Stage::Translate => "translate",
            Stage::Speech => "speech",
            Stage::Package => "package",
        };
        write!(f, "{}", s)
    }
}

/// A non-fatal failure that degraded one entity's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub entity: String,
    #[serde(default)]
    pub language: Option<String>,
    pub stage: Stage,
    pub message: String,
}

/// How an asset request was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetOutcome {
    /// File already existed, nothing was called
    Reused,
    /// Generator succeeded and the file was written
    Generated,
    /// Generator failed; a placeholder was written instead
    Placeholder,
    /// Primary generator failed; the source-language fallback succeeded
    Fallback,
    /// Byte copy of the primary language's file
    Copied,
    /// Nothing usable; the card carries no reference
    Missing,
}

impl AssetOutcome {
    /// Whether a file is present at the canonical path afterwards
    pub fn is_present(&self) -> bool {
        !matches!(self, AssetOutcome::Missing)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub reused: usize,
    pub generated: usize,
    pub placeholder: usize,
    pub fallback: usize,
    pub copied: usize,
    pub missing: usize,
}

impl OutcomeCounts {
    pub fn add(&mut self, outcome: AssetOutcome) {
        let slot = match outcome {
            AssetOutcome::Reused => &mut self.reused,
            AssetOutcome::Generated => &mut self.generated,
            AssetOutcome::Placeholder => &mut self.placeholder,
            AssetOutcome::Fallback => &mut self.fallback,
            AssetOutcome::Copied => &mut self.copied,
            AssetOutcome::Missing => &mut self.missing,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.reused + self.generated + self.placeholder + self.fallback + self.copied + self.missing
    }
}

/// Outcome counts per asset kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTotals {
    pub maps: OutcomeCounts,
    pub flags: OutcomeCounts,
    pub audio: OutcomeCounts,
}

impl AssetTotals {
    pub fn get(&self, kind: AssetKind) -> &OutcomeCounts {
        match kind {
            AssetKind::Map => &self.maps,
            AssetKind::Flag => &self.flags,
            AssetKind::Audio => &self.audio,
        }
    }

    pub fn get_mut(&mut self, kind: AssetKind) -> &mut OutcomeCounts {
        match kind {
            AssetKind::Map => &mut self.maps,
            AssetKind::Flag => &mut self.flags,
            AssetKind::Audio => &mut self.audio,
        }
    }
}

/// What was written for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageReport {
    pub language: String,
    pub deck_id: u64,
    pub model_id: u64,
    pub cards: usize,
    pub media_files: usize,
    pub bundle_path: String,
    pub quiz_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: String,
    #[serde(default)]
    pub assets: AssetTotals,
    #[serde(default)]
    pub languages: Vec<LanguageReport>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// TOML wrapper
#[derive(Debug, Serialize, Deserialize)]
struct ReportFile {
    report: RunReport,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            generated_at: now_iso8601(),
            assets: AssetTotals::default(),
            languages: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: AssetKind, outcome: AssetOutcome) {
        self.assets.get_mut(kind).add(outcome);
    }

    pub fn warnings_for(&self, entity: &str) -> impl Iterator<Item = &Warning> {
        let entity = entity.to_string();
        self.warnings.iter().filter(move |w| w.entity == entity)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: ReportFile = toml::from_str(&content)
            .map_err(|e| AtlasError::TomlParseError(format!("Failed to parse run report: {}", e)))?;
        Ok(file.report)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = ReportFile {
            report: self.clone(),
        };
        let content = toml::to_string_pretty(&file).map_err(|e| {
            AtlasError::TomlSerError(format!("Failed to serialize run report: {}", e))
        })?;
        crate::store::write_atomic(path, content.as_bytes())
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

fn now_iso8601() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_timestamp(secs)
}

/// Format seconds since the Unix epoch as `YYYY-MM-DDTHH:MM:SSZ`
fn format_timestamp(secs: u64) -> String {
    let days = (secs / 86400) as i64;
    let time_secs = secs % 86400;
    let (y, m, d) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        y,
        m,
        d,
        time_secs / 3600,
        (time_secs % 3600) / 60,
        time_secs % 60
    )
}

/// Proleptic Gregorian date for a day count relative to 1970-01-01
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + if m <= 2 { 1 } else { 0 };
    (y, m, d)
}
