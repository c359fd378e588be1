//! The timed test session state machine.
//!
//! A session moves `NotStarted -> InProgress -> Completed` and never back.
//! It owns the answer sheet and the countdown value but not the timer: time
//! passes only through [`TestSession::tick`]. Every operation either succeeds
//! or leaves the session exactly as it was.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{
    Question, TestDefinition, TestResult, DEFAULT_CUSTOM_DURATION_SECS, DEFAULT_QUESTION_SECS,
    MIN_QUESTION_SECS,
};
use crate::scoring::ScoreCard;
use crate::traits::Clock;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    InProgress,
    Completed,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::NotStarted => "not started",
            Phase::InProgress => "in progress",
            Phase::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time budget settings applied when a session is initialized.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Budget for a standard-test question without its own.
    pub default_question_secs: u64,
    /// Lower bound for an explicit per-question budget.
    pub min_question_secs: u64,
    /// Budget for a custom test whose duration is unset or zero.
    pub default_custom_duration_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_question_secs: DEFAULT_QUESTION_SECS,
            min_question_secs: MIN_QUESTION_SECS,
            default_custom_duration_secs: DEFAULT_CUSTOM_DURATION_SECS,
        }
    }
}

/// Result of a call to [`TestSession::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    /// This call moved the session to `Completed`.
    Completed(TestResult),
    /// The session was already completed; carries the original result.
    AlreadyCompleted(TestResult),
}

impl Finish {
    pub fn result(&self) -> &TestResult {
        match self {
            Finish::Completed(r) | Finish::AlreadyCompleted(r) => r,
        }
    }

    pub fn into_result(self) -> TestResult {
        match self {
            Finish::Completed(r) | Finish::AlreadyCompleted(r) => r,
        }
    }

    /// Whether this call performed the transition.
    pub fn is_first(&self) -> bool {
        matches!(self, Finish::Completed(_))
    }
}

/// Result of a call to [`TestSession::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at this index.
    Moved(usize),
    /// Next was pressed on the last question.
    Finished(Finish),
}

/// Which collaborators have accepted the completed result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Appended to the result log.
    pub recorded: bool,
    /// Passed to the skill-status updater. Unused for custom tests.
    pub skill_updated: bool,
}

/// One attempt at a test by one taker.
pub struct TestSession {
    definition: TestDefinition,
    taker_id: String,
    clock: Arc<dyn Clock>,
    phase: Phase,
    current: usize,
    answers: Vec<Option<usize>>,
    total_secs: u64,
    remaining_secs: u64,
    started_at: Option<DateTime<Utc>>,
    result: Option<TestResult>,
    delivery: Delivery,
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("test", &self.definition.label())
            .field("taker_id", &self.taker_id)
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("answers", &self.answers)
            .field("remaining_secs", &self.remaining_secs)
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

impl TestSession {
    /// Prepare a session for `taker_id`.
    ///
    /// Fails with [`Error::Authorization`] if the taker is not invited to a
    /// custom test, and with [`Error::EmptyTest`] if there are no questions.
    pub fn initialize(
        definition: TestDefinition,
        taker_id: impl Into<String>,
        clock: Arc<dyn Clock>,
        config: &SessionConfig,
    ) -> Result<Self> {
        let taker_id = taker_id.into();

        if let TestDefinition::Custom(test) = &definition {
            if !test.is_invited(&taker_id) {
                return Err(Error::Authorization(format!(
                    "{taker_id} is not invited to {}",
                    test.id
                )));
            }
        }

        let questions = definition.questions();
        if questions.is_empty() {
            return Err(Error::EmptyTest(definition.label()));
        }

        let total_secs = match &definition {
            TestDefinition::Standard { questions, .. } => questions
                .iter()
                .map(|q| q.time_budget_or(config.default_question_secs, config.min_question_secs))
                .sum(),
            TestDefinition::Custom(test) => test.duration_or(config.default_custom_duration_secs),
        };
        // A zero budget would leave the session in progress with no time.
        let total_secs = total_secs.max(1);
        let slots = questions.len();

        Ok(Self {
            definition,
            taker_id,
            clock,
            phase: Phase::NotStarted,
            current: 0,
            answers: vec![None; slots],
            total_secs,
            remaining_secs: total_secs,
            started_at: None,
            result: None,
            delivery: Delivery::default(),
        })
    }

    /// Begin the attempt and record the start time.
    pub fn start(&mut self) -> Result<()> {
        self.require(Phase::NotStarted, "start")?;
        self.started_at = Some(self.clock.now());
        self.phase = Phase::InProgress;
        tracing::debug!(
            taker = %self.taker_id,
            test = %self.definition.label(),
            budget_secs = self.total_secs,
            "session started"
        );
        Ok(())
    }

    /// Store `option` as the answer to the current question.
    pub fn select_answer(&mut self, option: usize) -> Result<()> {
        self.require(Phase::InProgress, "select an answer")?;
        let len = self.current_question().options.len();
        if option >= len {
            return Err(Error::Range {
                what: "option",
                index: option,
                len,
            });
        }
        self.answers[self.current] = Some(option);
        Ok(())
    }

    /// Move to the next question, or finish from the last one.
    pub fn next(&mut self) -> Result<Advance> {
        match self.phase {
            Phase::NotStarted => Err(self.invalid("advance")),
            Phase::Completed => Ok(Advance::Finished(self.finish()?)),
            Phase::InProgress if self.is_last() => Ok(Advance::Finished(self.finish()?)),
            Phase::InProgress => {
                self.current += 1;
                Ok(Advance::Moved(self.current))
            }
        }
    }

    /// Move to the previous question. Stays put at index 0.
    pub fn previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Let `elapsed_secs` of the budget pass.
    ///
    /// Returns the auto-submitted finish when the budget runs out. Ticks that
    /// arrive after completion are ignored.
    pub fn tick(&mut self, elapsed_secs: u64) -> Result<Option<Finish>> {
        match self.phase {
            Phase::NotStarted => Err(self.invalid("tick")),
            Phase::Completed => Ok(None),
            Phase::InProgress => {
                self.remaining_secs = self.remaining_secs.saturating_sub(elapsed_secs);
                if self.remaining_secs > 0 {
                    return Ok(None);
                }
                tracing::debug!(taker = %self.taker_id, "time is up, submitting");
                self.finish().map(Some)
            }
        }
    }

    /// Grade the attempt and complete the session.
    ///
    /// Calling this again after completion returns the same result wrapped in
    /// [`Finish::AlreadyCompleted`].
    pub fn finish(&mut self) -> Result<Finish> {
        match self.phase {
            Phase::NotStarted => Err(self.invalid("finish")),
            Phase::Completed => match &self.result {
                Some(result) => Ok(Finish::AlreadyCompleted(result.clone())),
                None => Err(self.invalid("finish")),
            },
            Phase::InProgress => {
                let Some(started_at) = self.started_at else {
                    return Err(self.invalid("finish"));
                };
                let ended_at = self.clock.now();
                let card = ScoreCard::grade(self.definition.questions(), &self.answers);

                let result = TestResult {
                    id: Uuid::new_v4(),
                    taker_id: self.taker_id.clone(),
                    language: self.definition.language(),
                    level: self.definition.level(),
                    custom_test_id: self.definition.custom_id().map(str::to_string),
                    score: card.score,
                    passed: card.passed,
                    started_at,
                    ended_at,
                    elapsed_secs: whole_seconds(started_at, ended_at),
                };

                self.result = Some(result.clone());
                self.phase = Phase::Completed;
                tracing::debug!(
                    taker = %self.taker_id,
                    correct = card.correct,
                    total = card.total,
                    score = card.score,
                    "session completed"
                );
                Ok(Finish::Completed(result))
            }
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn definition(&self) -> &TestDefinition {
        &self.definition
    }

    pub fn taker_id(&self) -> &str {
        &self.taker_id
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.definition.questions()[self.current]
    }

    pub fn question_count(&self) -> usize {
        self.answers.len()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.answers.len()
    }

    /// Answer slots, one per question; `None` means unanswered.
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// The result, once completed.
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// Whether every collaborator owed the result has accepted it.
    pub fn is_delivered(&self) -> bool {
        self.result.is_some()
            && self.delivery.recorded
            && (self.delivery.skill_updated || self.definition.custom_id().is_some())
    }

    pub(crate) fn delivery_mut(&mut self) -> &mut Delivery {
        &mut self.delivery
    }

    fn require(&self, phase: Phase, operation: &'static str) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            phase: self.phase.as_str(),
        }
    }
}

/// Elapsed time rounded to the nearest whole second, never negative.
fn whole_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let ms = (end - start).num_milliseconds().max(0) as u64;
    (ms + 500) / 1000
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::{CustomTest, Language, SkillLevel};
    use crate::traits::ManualClock;

    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, &c)| Question {
                id: format!("rs-{i}"),
                language: Language::Rust,
                difficulty: SkillLevel::Intermediate,
                prompt: format!("Question {i}"),
                code: None,
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: c,
                estimated_time: None,
                created_by: None,
            })
            .collect()
    }

    fn standard(correct: &[usize]) -> TestDefinition {
        TestDefinition::Standard {
            language: Language::Rust,
            level: SkillLevel::Intermediate,
            questions: questions(correct),
        }
    }

    fn custom(invited: &[&str], duration: Option<u64>) -> TestDefinition {
        TestDefinition::Custom(CustomTest {
            id: "test-1".into(),
            company_id: "comp1".into(),
            title: "Screening".into(),
            description: String::new(),
            language: Language::Go,
            difficulty: SkillLevel::Advanced,
            questions: questions(&[0, 1, 2]),
            invited_candidates: invited.iter().map(|s| s.to_string()).collect(),
            estimated_duration: duration,
        })
    }

    fn session(definition: TestDefinition) -> (Arc<ManualClock>, TestSession) {
        let clock = Arc::new(ManualClock::new(epoch()));
        let session = TestSession::initialize(
            definition,
            "c1",
            clock.clone(),
            &SessionConfig::default(),
        )
        .unwrap();
        (clock, session)
    }

    fn started(definition: TestDefinition) -> (Arc<ManualClock>, TestSession) {
        let (clock, mut session) = session(definition);
        session.start().unwrap();
        (clock, session)
    }

    fn answer_all(session: &mut TestSession, picks: &[Option<usize>]) {
        for (i, pick) in picks.iter().enumerate() {
            if let Some(p) = pick {
                session.select_answer(*p).unwrap();
            }
            if i + 1 < picks.len() {
                session.next().unwrap();
            }
        }
    }

    #[test]
    fn initialize_standard_sums_question_budgets() {
        let mut def = standard(&[0, 1, 2]);
        if let TestDefinition::Standard { questions, .. } = &mut def {
            questions[0].estimated_time = Some(60);
            questions[1].estimated_time = Some(10);
        }
        let (_, s) = session(def);
        assert_eq!(s.phase(), Phase::NotStarted);
        assert_eq!(s.total_secs(), 60 + 30 + 120);
        assert_eq!(s.remaining_secs(), s.total_secs());
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().iter().all(Option::is_none));
    }

    #[test]
    fn initialize_custom_uses_duration_or_default() {
        let (_, s) = session(custom(&["c1"], Some(600)));
        assert_eq!(s.total_secs(), 600);
        let (_, s) = session(custom(&["c1"], Some(0)));
        assert_eq!(s.total_secs(), 300);
        let (_, s) = session(custom(&["c1"], None));
        assert_eq!(s.total_secs(), 300);
    }

    #[test]
    fn initialize_rejects_uninvited_taker() {
        let clock = Arc::new(ManualClock::new(epoch()));
        let err = TestSession::initialize(
            custom(&["c2"], None),
            "c1",
            clock,
            &SessionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Authorization(_)));
    }

    #[test]
    fn initialize_rejects_empty_test() {
        // A language with no configured questions never reaches finish. The
        // resolver reports an empty bank bucket as NotFound before this point,
        // so EmptyTest is what a hand-built or emptied definition gets.
        let clock = Arc::new(ManualClock::new(epoch()));
        let def = TestDefinition::Standard {
            language: Language::Kotlin,
            level: SkillLevel::Expert,
            questions: vec![],
        };
        let err =
            TestSession::initialize(def, "c1", clock, &SessionConfig::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyTest(_)));
    }

    #[test]
    fn start_twice_is_invalid() {
        let (_, mut s) = started(standard(&[0]));
        let err = s.start().unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
        assert_eq!(s.phase(), Phase::InProgress);
    }

    #[test]
    fn operations_before_start_are_rejected() {
        let (_, mut s) = session(standard(&[0, 1]));
        assert!(matches!(s.select_answer(0), Err(Error::InvalidState { .. })));
        assert!(matches!(s.next(), Err(Error::InvalidState { .. })));
        assert!(matches!(s.tick(1), Err(Error::InvalidState { .. })));
        assert!(matches!(s.finish(), Err(Error::InvalidState { .. })));
        assert_eq!(s.phase(), Phase::NotStarted);
        assert_eq!(s.remaining_secs(), s.total_secs());
    }

    #[test]
    fn select_answer_out_of_range_leaves_state() {
        let (_, mut s) = started(standard(&[0, 1]));
        s.select_answer(2).unwrap();
        let err = s.select_answer(4).unwrap_err();
        assert!(matches!(err, Error::Range { index: 4, len: 4, .. }));
        assert_eq!(s.answers()[0], Some(2));
    }

    #[test]
    fn select_answer_overwrites_and_navigation_keeps_answers() {
        let (_, mut s) = started(standard(&[0, 1, 2]));
        s.select_answer(3).unwrap();
        s.select_answer(0).unwrap();
        assert_eq!(s.next().unwrap(), Advance::Moved(1));
        assert_eq!(s.next().unwrap(), Advance::Moved(2));
        s.select_answer(2).unwrap();
        assert_eq!(s.previous(), 1);
        assert_eq!(s.previous(), 0);
        assert_eq!(s.answers(), &[Some(0), None, Some(2)]);
        assert_eq!(s.answered_count(), 2);
    }

    #[test]
    fn previous_at_zero_stays_at_zero() {
        let (_, mut s) = started(standard(&[0, 1]));
        assert_eq!(s.previous(), 0);
        assert_eq!(s.previous(), 0);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let (_, mut s) = started(standard(&[0, 1]));
        answer_all(&mut s, &[Some(0), Some(1)]);
        let result = s.finish().unwrap().into_result();
        assert_eq!(result.score, 100);
        assert!(result.passed);
        assert_eq!(s.phase(), Phase::Completed);
    }

    #[test]
    fn all_wrong_scores_zero() {
        let (_, mut s) = started(standard(&[0, 1]));
        answer_all(&mut s, &[Some(1), Some(0)]);
        let result = s.finish().unwrap().into_result();
        assert_eq!(result.score, 0);
        assert!(!result.passed);
    }

    #[test]
    fn three_of_four_with_one_unanswered() {
        let (_, mut s) = started(standard(&[0, 1, 2, 3]));
        answer_all(&mut s, &[Some(0), Some(1), None, Some(3)]);
        let result = s.finish().unwrap().into_result();
        assert_eq!(result.score, 75);
        assert!(result.passed);
    }

    #[test]
    fn timeout_scores_unanswered_as_wrong() {
        let (_, mut s) = started(standard(&[0, 0, 0, 0, 0]));
        answer_all(&mut s, &[Some(0), Some(0)]);
        let total = s.total_secs();

        let mut finishes = Vec::new();
        for _ in 0..total {
            if let Some(f) = s.tick(1).unwrap() {
                finishes.push(f);
            }
        }
        assert_eq!(finishes.len(), 1);
        assert!(finishes[0].is_first());
        assert_eq!(finishes[0].result().score, 40);
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.remaining_secs(), 0);

        // Later ticks are inert.
        assert_eq!(s.tick(1).unwrap(), None);
        assert_eq!(s.remaining_secs(), 0);
    }

    #[test]
    fn tick_floors_at_zero() {
        let (_, mut s) = started(custom(&["c1"], Some(30)));
        assert_eq!(s.tick(10).unwrap(), None);
        assert_eq!(s.remaining_secs(), 20);
        let finish = s.tick(1_000).unwrap().unwrap();
        assert!(finish.is_first());
        assert_eq!(s.remaining_secs(), 0);
    }

    #[test]
    fn finish_is_idempotent() {
        let (clock, mut s) = started(standard(&[0, 1]));
        s.select_answer(0).unwrap();
        clock.advance(Duration::seconds(42));
        let first = s.finish().unwrap();
        clock.advance(Duration::seconds(10));
        let second = s.finish().unwrap();
        assert!(first.is_first());
        assert!(!second.is_first());
        assert_eq!(first.result(), second.result());
        assert_eq!(second.result().elapsed_secs, 42);
    }

    #[test]
    fn manual_finish_then_timeout_completes_once() {
        let (_, mut s) = started(custom(&["c1"], Some(5)));
        s.tick(4).unwrap();
        let manual = s.finish().unwrap();
        assert!(manual.is_first());
        assert_eq!(s.tick(1).unwrap(), None);
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.result(), Some(manual.result()));
    }

    #[test]
    fn next_on_last_question_finishes() {
        let (_, mut s) = started(standard(&[0, 1]));
        s.select_answer(0).unwrap();
        s.next().unwrap();
        s.select_answer(1).unwrap();
        let Advance::Finished(finish) = s.next().unwrap() else {
            panic!("expected finish");
        };
        assert!(finish.is_first());
        assert_eq!(finish.result().score, 100);

        // Pressing again replays the same result.
        let Advance::Finished(again) = s.next().unwrap() else {
            panic!("expected finish");
        };
        assert!(!again.is_first());
        assert_eq!(again.result(), finish.result());
    }

    #[test]
    fn completed_session_rejects_answers() {
        let (_, mut s) = started(standard(&[0]));
        s.finish().unwrap();
        assert!(matches!(s.select_answer(0), Err(Error::InvalidState { .. })));
        assert!(matches!(s.start(), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn elapsed_rounds_to_nearest_second() {
        let (clock, mut s) = started(standard(&[0]));
        clock.advance(Duration::milliseconds(2_499));
        assert_eq!(s.finish().unwrap().result().elapsed_secs, 2);

        let (clock, mut s) = started(standard(&[0]));
        clock.advance(Duration::milliseconds(2_500));
        assert_eq!(s.finish().unwrap().result().elapsed_secs, 3);
    }

    #[test]
    fn result_carries_test_identity() {
        let (clock, mut s) = started(custom(&["c1"], None));
        clock.advance(Duration::seconds(3));
        let result = s.finish().unwrap().into_result();
        assert_eq!(result.taker_id, "c1");
        assert_eq!(result.language, Language::Go);
        assert_eq!(result.level, SkillLevel::Advanced);
        assert_eq!(result.custom_test_id.as_deref(), Some("test-1"));
        assert_eq!(result.started_at, epoch());
        assert_eq!(result.ended_at, epoch() + Duration::seconds(3));
    }
}
