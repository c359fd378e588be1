//! Score computation and pass/fail determination.

use serde::{Deserialize, Serialize};

use crate::model::{Question, PASS_THRESHOLD};

/// Outcome of grading a set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Questions answered correctly.
    pub correct: usize,
    /// Total questions in the test.
    pub total: usize,
    /// Percentage score from 0 to 100.
    pub score: u8,
    /// Whether the score meets the pass threshold.
    pub passed: bool,
}

impl ScoreCard {
    /// Grade `answers` against `questions` slot by slot.
    ///
    /// Unanswered slots (`None`) and slots past the end of `answers` are
    /// incorrect. An empty question list scores 0.
    pub fn grade(questions: &[Question], answers: &[Option<usize>]) -> Self {
        let correct = questions
            .iter()
            .enumerate()
            .filter(|(i, q)| {
                answers
                    .get(*i)
                    .copied()
                    .flatten()
                    .is_some_and(|a| q.is_correct(a))
            })
            .count();
        let score = percentage(correct, questions.len());
        Self {
            correct,
            total: questions.len(),
            score,
            passed: is_passing(score),
        }
    }
}

/// `round(100 * correct / total)` with halves rounded up, in integer math.
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u8
}

/// Whether `score` meets the fixed pass threshold.
pub fn is_passing(score: u8) -> bool {
    score >= PASS_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, SkillLevel};

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, &c)| Question {
                id: format!("q{i}"),
                language: Language::Python,
                difficulty: SkillLevel::Beginner,
                prompt: format!("Question {i}"),
                code: None,
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: c,
                estimated_time: None,
                created_by: None,
            })
            .collect()
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 3), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(3, 4), 75);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn percentage_stays_in_range() {
        for total in 1..=50 {
            for correct in 0..=total {
                assert!(percentage(correct, total) <= 100);
            }
        }
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        assert!(is_passing(70));
        assert!(!is_passing(69));
        assert!(is_passing(100));
    }

    #[test]
    fn grade_all_correct() {
        let qs = questions(&[0, 1]);
        let card = ScoreCard::grade(&qs, &[Some(0), Some(1)]);
        assert_eq!(card.correct, 2);
        assert_eq!(card.score, 100);
        assert!(card.passed);
    }

    #[test]
    fn grade_unanswered_never_counts() {
        // Option 0 is correct everywhere; unanswered must not read as 0.
        let qs = questions(&[0, 0, 0]);
        let card = ScoreCard::grade(&qs, &[None, None, None]);
        assert_eq!(card.correct, 0);
        assert_eq!(card.score, 0);

        let card = ScoreCard::grade(&qs, &[Some(0)]);
        assert_eq!(card.correct, 1);
        assert_eq!(card.score, 33);
        assert!(!card.passed);
    }
}
