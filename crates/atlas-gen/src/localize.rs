//! Question, answer and narration text per language
//!
//! Translation failures never abort: the source text is used instead and a
//! warning lands in the run report.

use std::collections::HashMap;

use crate::catalog::Entity;
use crate::config::NarrationStyle;
use crate::context::RunContext;
use crate::provider::Translator;
use crate::report::Stage;

pub const DEFAULT_QUESTION_TEMPLATE: &str = "What is the capital of {country}?";

/// Localized text for one (entity, language) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized {
    pub country: String,
    pub capital: String,
    pub question_text: String,
    pub answer_text: String,
    pub narration_text: String,
    /// Narration built from the untranslated names, for the audio retry
    pub fallback_narration: String,
}

pub struct Localizer<'a> {
    translator: &'a dyn Translator,
    source_language: &'a str,
    questions: &'a HashMap<String, String>,
    narration: NarrationStyle,
}

impl<'a> Localizer<'a> {
    pub fn new(
        translator: &'a dyn Translator,
        source_language: &'a str,
        questions: &'a HashMap<String, String>,
        narration: NarrationStyle,
    ) -> Self {
        Self {
            translator,
            source_language,
            questions,
            narration,
        }
    }

    pub fn localize(&self, ctx: &mut RunContext, entity: &Entity, language: &str) -> Localized {
        let country = self.translate(ctx, &entity.key, &entity.key, language);
        let capital = self.translate(ctx, &entity.key, &entity.capital, language);

        let template = self
            .questions
            .get(language)
            .map(|t| t.as_str())
            .unwrap_or(DEFAULT_QUESTION_TEMPLATE);
        let question_text = template.replace("{country}", &country);

        let narration_text = self.narrate(&country, &capital);
        let fallback_narration = self.narrate(&entity.key, &entity.capital);

        Localized {
            answer_text: capital.clone(),
            country,
            capital,
            question_text,
            narration_text,
            fallback_narration,
        }
    }

    fn narrate(&self, country: &str, capital: &str) -> String {
        match self.narration {
            NarrationStyle::CountryCapital => format!("{}: {}", country, capital),
            NarrationStyle::Capital => capital.to_string(),
        }
    }

    fn translate(&self, ctx: &mut RunContext, key: &str, text: &str, language: &str) -> String {
        if language == self.source_language {
            return text.to_string();
        }
        match self.translator.translate(text, self.source_language, language) {
            Ok(translated) if !translated.trim().is_empty() => translated.trim().to_string(),
            Ok(_) => {
                ctx.warn(
                    key,
                    Some(language),
                    Stage::Translate,
                    format!("empty translation for '{}', keeping source text", text),
                );
                text.to_string()
            }
            Err(e) => {
                ctx.warn(
                    key,
                    Some(language),
                    Stage::Translate,
                    format!("{}; keeping source text '{}'", e, text),
                );
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockTranslator;

    fn entity(key: &str, capital: &str) -> Entity {
        Entity {
            key: key.to_string(),
            capital: capital.to_string(),
        }
    }

    #[test]
    fn test_localize_translates_country_and_capital() {
        let translator = MockTranslator::new()
            .with_entry("nl", "Belgium", "België")
            .with_entry("nl", "Brussels", "Brussel");
        let questions = HashMap::from([(
            "nl".to_string(),
            "Wat is de hoofdstad van {country}?".to_string(),
        )]);
        let localizer = Localizer::new(&translator, "en", &questions, NarrationStyle::CountryCapital);
        let mut ctx = RunContext::new();

        let text = localizer.localize(&mut ctx, &entity("Belgium", "Brussels"), "nl");
        assert_eq!(text.question_text, "Wat is de hoofdstad van België?");
        assert_eq!(text.answer_text, "Brussel");
        assert_eq!(text.narration_text, "België: Brussel");
        assert_eq!(text.fallback_narration, "Belgium: Brussels");
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_source_language_skips_translator() {
        let translator = MockTranslator::new();
        let calls = translator.calls();
        let questions = HashMap::new();
        let localizer = Localizer::new(&translator, "en", &questions, NarrationStyle::CountryCapital);
        let mut ctx = RunContext::new();

        let text = localizer.localize(&mut ctx, &entity("Belgium", "Brussels"), "en");
        assert_eq!(text.question_text, "What is the capital of Belgium?");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_translation_failure_falls_back_to_source() {
        let translator = MockTranslator::new().failing_for("nl");
        let questions = HashMap::new();
        let localizer = Localizer::new(&translator, "en", &questions, NarrationStyle::CountryCapital);
        let mut ctx = RunContext::new();

        let text = localizer.localize(&mut ctx, &entity("Andorra", "Andorra la Vella"), "nl");
        assert_eq!(text.question_text, "What is the capital of Andorra?");
        assert_eq!(text.answer_text, "Andorra la Vella");
        assert_eq!(ctx.warnings().len(), 2);
        assert!(ctx
            .warnings()
            .iter()
            .all(|w| w.stage == Stage::Translate && w.entity == "Andorra"));
    }

    #[test]
    fn test_capital_only_narration() {
        let translator = MockTranslator::new().with_entry("fr", "Brussels", "Bruxelles");
        let questions = HashMap::new();
        let localizer = Localizer::new(&translator, "en", &questions, NarrationStyle::Capital);
        let mut ctx = RunContext::new();

        let text = localizer.localize(&mut ctx, &entity("Belgium", "Brussels"), "fr");
        assert_eq!(text.narration_text, "Bruxelles");
        assert_eq!(text.fallback_narration, "Brussels");
    }
}
