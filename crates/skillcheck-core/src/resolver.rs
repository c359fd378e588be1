//! Resolves a route (language + level, or a custom test id) into a concrete
//! [`TestDefinition`].

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Language, SkillLevel, TestDefinition};
use crate::traits::{CustomTestStore, QuestionBank};

/// Turns test references into definitions using the injected stores.
#[derive(Clone)]
pub struct Resolver {
    bank: Arc<dyn QuestionBank>,
    custom_tests: Arc<dyn CustomTestStore>,
}

impl Resolver {
    pub fn new(bank: Arc<dyn QuestionBank>, custom_tests: Arc<dyn CustomTestStore>) -> Self {
        Self { bank, custom_tests }
    }

    /// Resolve a standard test from raw route parameters.
    ///
    /// Unknown language or level names fail with [`Error::InvalidArgument`];
    /// a known bucket with no questions fails with [`Error::NotFound`].
    pub fn resolve_standard(&self, language: &str, level: &str) -> Result<TestDefinition> {
        let language: Language = language.parse()?;
        let level: SkillLevel = level.parse()?;
        self.resolve_standard_typed(language, level)
    }

    pub fn resolve_standard_typed(
        &self,
        language: Language,
        level: SkillLevel,
    ) -> Result<TestDefinition> {
        let questions = self.bank.questions(language, level)?;
        if questions.is_empty() {
            return Err(Error::NotFound(format!(
                "no questions for {language} ({level})"
            )));
        }
        Ok(TestDefinition::Standard {
            language,
            level,
            questions,
        })
    }

    /// Resolve a custom test for `taker_id`.
    ///
    /// The invite list is checked here so that an uninvited taker never sees
    /// any question content.
    pub fn resolve_custom(&self, test_id: &str, taker_id: &str) -> Result<TestDefinition> {
        let test = self
            .custom_tests
            .get_by_id(test_id)?
            .ok_or_else(|| Error::NotFound(format!("custom test {test_id}")))?;

        if !test.is_invited(taker_id) {
            tracing::warn!(test_id, taker_id, "uninvited taker requested custom test");
            return Err(Error::Authorization(format!(
                "{taker_id} is not invited to {test_id}"
            )));
        }

        Ok(TestDefinition::Custom(test))
    }
}
