//! Test engine orchestrator.
//!
//! Opens sessions through the resolver and forwards session operations,
//! publishing each completed attempt to the result log and, for standard
//! tests, to the skill-status updater. Each collaborator receives the result
//! exactly once per session no matter how many times finish is reached; a
//! delivery that fails is retried by the next finish, next or tick.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{TestDefinition, TestResult};
use crate::resolver::Resolver;
use crate::session::{Advance, SessionConfig, TestSession};
use crate::traits::{
    Clock, CustomTestStore, QuestionBank, ResultLog, SkillStatusUpdater, SystemClock,
};

/// Drives test sessions against injected collaborators.
pub struct TestEngine {
    resolver: Resolver,
    results: Arc<dyn ResultLog>,
    skills: Arc<dyn SkillStatusUpdater>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl TestEngine {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        custom_tests: Arc<dyn CustomTestStore>,
        results: Arc<dyn ResultLog>,
        skills: Arc<dyn SkillStatusUpdater>,
    ) -> Self {
        Self {
            resolver: Resolver::new(bank, custom_tests),
            results,
            skills,
            clock: Arc::new(SystemClock),
            config: SessionConfig::default(),
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve and initialize a standard test for `taker_id`.
    pub fn open_standard(
        &self,
        language: &str,
        level: &str,
        taker_id: &str,
    ) -> Result<TestSession> {
        let definition = self.resolver.resolve_standard(language, level)?;
        self.open(definition, taker_id)
    }

    /// Resolve and initialize a custom test for `taker_id`.
    pub fn open_custom(&self, test_id: &str, taker_id: &str) -> Result<TestSession> {
        let definition = self.resolver.resolve_custom(test_id, taker_id)?;
        self.open(definition, taker_id)
    }

    /// Initialize a session from an already-resolved definition.
    pub fn open(&self, definition: TestDefinition, taker_id: &str) -> Result<TestSession> {
        let session =
            TestSession::initialize(definition, taker_id, Arc::clone(&self.clock), &self.config)?;
        tracing::info!(
            taker = taker_id,
            test = %session.definition().label(),
            questions = session.question_count(),
            budget_secs = session.total_secs(),
            "session opened"
        );
        Ok(session)
    }

    /// Move to the next question, publishing the result if this finishes.
    pub fn next(&self, session: &mut TestSession) -> Result<Advance> {
        let advance = session.next()?;
        if let Advance::Finished(_) = &advance {
            self.publish(session)?;
        }
        Ok(advance)
    }

    /// Let time pass, publishing the result if the budget ran out.
    ///
    /// Ticks on a completed session retry any delivery that failed earlier.
    pub fn tick(
        &self,
        session: &mut TestSession,
        elapsed_secs: u64,
    ) -> Result<Option<TestResult>> {
        match session.tick(elapsed_secs)? {
            Some(finish) => {
                self.publish(session)?;
                Ok(Some(finish.into_result()))
            }
            None => {
                self.publish(session)?;
                Ok(None)
            }
        }
    }

    /// Finish the session and publish its result once.
    pub fn finish(&self, session: &mut TestSession) -> Result<TestResult> {
        let finish = session.finish()?;
        self.publish(session)?;
        Ok(finish.into_result())
    }

    /// Hand the completed result to every collaborator that has not yet
    /// accepted it. Each step is marked only after it succeeds, so a failed
    /// step is retried by the next call and a finished one never repeats.
    fn publish(&self, session: &mut TestSession) -> Result<()> {
        if session.is_delivered() {
            return Ok(());
        }
        let Some(result) = session.result().cloned() else {
            return Ok(());
        };

        if !session.delivery().recorded {
            tracing::info!(
                taker = %result.taker_id,
                test = %session.definition().label(),
                score = result.score,
                passed = result.passed,
                elapsed_secs = result.elapsed_secs,
                "attempt completed"
            );
            self.results.record(result.clone())?;
            session.delivery_mut().recorded = true;
        }

        if let TestDefinition::Standard { language, level, .. } = session.definition() {
            let (language, level) = (*language, *level);
            if !session.delivery().skill_updated {
                self.skills.update_skill_validation(
                    &result.taker_id,
                    language,
                    level,
                    result.passed,
                    result.score,
                )?;
                session.delivery_mut().skill_updated = true;
            }
        }
        Ok(())
    }
}
