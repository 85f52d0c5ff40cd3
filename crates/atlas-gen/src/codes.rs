//! Country code resolution
//!
//! Maps a catalog key to the lower-case ISO alpha-2 code used by flag
//! sources. Resolution order: exact lookup, override table, substring match
//! over alternate names, then nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::provider::CountryCodeResolver;

/// Lower-case ISO 3166-1 alpha-2 code (plus user-assigned ones like `xk`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keys the exact lookup is known to miss
const BUILTIN_OVERRIDES: &[(&str, &str)] = &[
    ("Kosovo", "xk"),
    ("Vatican", "va"),
    ("North Macedonia", "mk"),
    ("Czechia", "cz"),
    ("Moldova", "md"),
    ("Russia", "ru"),
    ("United Kingdom", "gb"),
    ("Bosnia and Herz.", "ba"),
];

/// Which step produced a code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    Lookup,
    Override,
    Substring,
}

pub struct IdentifierResolver {
    lookup: Box<dyn CountryCodeResolver>,
    overrides: HashMap<String, CountryCode>,
}

impl IdentifierResolver {
    /// Resolver with the built-in override table
    pub fn new(lookup: Box<dyn CountryCodeResolver>) -> Self {
        let overrides = BUILTIN_OVERRIDES
            .iter()
            .map(|(key, code)| (key.to_string(), CountryCode::new(code)))
            .collect();
        Self { lookup, overrides }
    }

    /// Add or replace overrides (configuration `[codes]`)
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, code) in overrides {
            self.overrides.insert(key.clone(), CountryCode::new(code));
        }
        self
    }

    /// Resolve a key, first success wins
    pub fn resolve(&self, key: &str) -> Option<CountryCode> {
        self.resolve_with_source(key).map(|(code, _)| code)
    }

    pub fn resolve_with_source(&self, key: &str) -> Option<(CountryCode, ResolvedVia)> {
        if let Ok(code) = self.lookup.lookup(key) {
            return Some((code, ResolvedVia::Lookup));
        }

        if let Some(code) = self.overrides.get(key) {
            return Some((code.clone(), ResolvedVia::Override));
        }

        let needle = key.to_lowercase();
        self.lookup
            .alternate_names()
            .into_iter()
            .find(|(_, name)| name.to_lowercase().contains(&needle))
            .map(|(code, _)| (code, ResolvedVia::Substring))
    }
}
