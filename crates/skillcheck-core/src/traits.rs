//! Collaborator traits consumed by the test engine.
//!
//! The engine never touches storage directly; it talks to these traits, which
//! `skillcheck-store` implements in memory.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::model::{CustomTest, Language, Question, SkillLevel, TestResult};

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// The global question bank, bucketed by language and difficulty.
pub trait QuestionBank: Send + Sync {
    /// Ordered questions for one bucket. Empty when the bucket has none.
    fn questions(&self, language: Language, level: SkillLevel) -> Result<Vec<Question>>;

    /// Add a question to the bucket named by its language and difficulty.
    fn add_question(&self, question: Question) -> Result<()>;

    /// Replace the question with the same id.
    fn update_question(&self, question: Question) -> Result<()>;

    /// Remove a question wherever it lives.
    fn delete_question(&self, id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Custom tests
// ---------------------------------------------------------------------------

/// Storage for company-authored tests.
pub trait CustomTestStore: Send + Sync {
    fn get_by_id(&self, test_id: &str) -> Result<Option<CustomTest>>;

    fn create(&self, test: CustomTest) -> Result<()>;

    fn update(&self, test: CustomTest) -> Result<()>;

    fn delete(&self, test_id: &str) -> Result<()>;

    /// Add a candidate to the invite list. Inviting twice is a no-op.
    fn invite_candidate(&self, test_id: &str, candidate_id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Skill status
// ---------------------------------------------------------------------------

/// Receives the outcome of a standard test for the taker's profile.
pub trait SkillStatusUpdater: Send + Sync {
    fn update_skill_validation(
        &self,
        taker_id: &str,
        language: Language,
        level: SkillLevel,
        is_validated: bool,
        score: u8,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Result log
// ---------------------------------------------------------------------------

/// Append-only log of completed attempts.
pub trait ResultLog: Send + Sync {
    fn record(&self, result: TestResult) -> Result<()>;

    fn query_by_taker(&self, taker_id: &str) -> Result<Vec<TestResult>>;

    fn query_by_language(&self, language: Language) -> Result<Vec<TestResult>>;
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of wall-clock time for start and end timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
