//! Per-run mutable state
//!
//! Owns the resolved-code cache and the run report. Threaded through every
//! stage so nothing lives in globals.

use std::collections::HashMap;

use crate::codes::{CountryCode, IdentifierResolver};
use crate::provider::AssetKind;
use crate::report::{AssetOutcome, RunReport, Stage, Warning};

#[derive(Debug, Default)]
pub struct RunContext {
    codes: HashMap<String, Option<CountryCode>>,
    pub report: RunReport,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key` once per run; later calls return the cached answer
    pub fn code_for(&mut self, resolver: &IdentifierResolver, key: &str) -> Option<CountryCode> {
        if let Some(cached) = self.codes.get(key) {
            return cached.clone();
        }

        let resolved = resolver.resolve_with_source(key);
        let code = match resolved {
            Some((code, via)) => {
                tracing::debug!(entity = key, code = %code, ?via, "resolved country code");
                Some(code)
            }
            None => {
                self.warn(key, None, Stage::Resolve, "no country code; flag will be a placeholder");
                None
            }
        };
        self.codes.insert(key.to_string(), code.clone());
        code
    }

    /// Log a degradation and keep it for the report
    pub fn warn(&mut self, entity: &str, language: Option<&str>, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(
            entity,
            language = language.unwrap_or("-"),
            stage = %stage,
            "{}",
            message
        );
        self.report.warnings.push(Warning {
            entity: entity.to_string(),
            language: language.map(|l| l.to_string()),
            stage,
            message,
        });
    }

    pub fn record(&mut self, kind: AssetKind, outcome: AssetOutcome) {
        self.report.record(kind, outcome);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.report.warnings
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CountryCodeResolver;
    use atlas_core::{AtlasError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingResolver(Arc<AtomicUsize>);

    impl CountryCodeResolver for CountingResolver {
        fn lookup(&self, name: &str) -> Result<CountryCode> {
            self.0.fetch_add(1, Ordering::SeqCst);
            match name {
                "Belgium" => Ok(CountryCode::new("be")),
                _ => Err(AtlasError::Resolution(name.to_string())),
            }
        }

        fn alternate_names(&self) -> Vec<(CountryCode, String)> {
            Vec::new()
        }
    }

    #[test]
    fn test_code_resolved_once_per_entity() {
        let lookups = Arc::new(AtomicUsize::new(0));
        let resolver = IdentifierResolver::new(Box::new(CountingResolver(lookups.clone())));
        let mut ctx = RunContext::new();

        assert_eq!(ctx.code_for(&resolver, "Belgium"), Some(CountryCode::new("be")));
        assert_eq!(ctx.code_for(&resolver, "Belgium"), Some(CountryCode::new("be")));
        assert_eq!(lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unresolved_code_is_cached_and_warned() {
        let lookups = Arc::new(AtomicUsize::new(0));
        let resolver = IdentifierResolver::new(Box::new(CountingResolver(lookups.clone())));
        let mut ctx = RunContext::new();

        assert_eq!(ctx.code_for(&resolver, "Atlantis"), None);
        assert_eq!(ctx.code_for(&resolver, "Atlantis"), None);
        assert_eq!(lookups.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.warnings()[0].stage, Stage::Resolve);
        assert_eq!(ctx.warnings()[0].language, None);
    }

    #[test]
    fn test_record_counts_outcomes() {
        let mut ctx = RunContext::new();
        ctx.record(AssetKind::Map, AssetOutcome::Generated);
        ctx.record(AssetKind::Map, AssetOutcome::Reused);
        let report = ctx.into_report();
        assert_eq!(report.assets.maps.total(), 2);
        assert_eq!(report.assets.flags.total(), 0);
    }
}
