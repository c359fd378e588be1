//! Aggregate statistics over the result log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Language, SkillLevel, TestResult};

/// Summary of a batch of results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Per-language statistics.
    pub per_language: BTreeMap<Language, LanguageStats>,
    /// Most recent standard-test outcome per taker and (language, level).
    pub latest: BTreeMap<String, Vec<LatestOutcome>>,
}

/// Statistics for a single language across all takers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub attempts: usize,
    pub passed: usize,
    /// Fraction of attempts that passed, 0.0 to 1.0.
    pub pass_rate: f64,
    pub avg_score: f64,
    pub best_score: u8,
}

/// Latest standard-test outcome for one skill of one taker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestOutcome {
    pub language: Language,
    pub level: SkillLevel,
    pub score: u8,
    pub passed: bool,
}

/// Compute aggregate statistics for `results`.
pub fn summarize(results: &[TestResult]) -> ResultSummary {
    let mut grouped: BTreeMap<Language, Vec<&TestResult>> = BTreeMap::new();
    for r in results {
        grouped.entry(r.language).or_default().push(r);
    }

    let per_language = grouped
        .into_iter()
        .map(|(language, group)| {
            let attempts = group.len();
            let passed = group.iter().filter(|r| r.passed).count();
            let total_score: u64 = group.iter().map(|r| u64::from(r.score)).sum();
            let best_score = group.iter().map(|r| r.score).max().unwrap_or(0);
            (
                language,
                LanguageStats {
                    attempts,
                    passed,
                    pass_rate: passed as f64 / attempts as f64,
                    avg_score: total_score as f64 / attempts as f64,
                    best_score,
                },
            )
        })
        .collect();

    // Custom tests do not validate skills, so they are left out here.
    let mut newest: BTreeMap<(String, Language, SkillLevel), &TestResult> = BTreeMap::new();
    for r in results.iter().filter(|r| r.custom_test_id.is_none()) {
        let key = (r.taker_id.clone(), r.language, r.level);
        match newest.get(&key) {
            Some(existing) if existing.ended_at > r.ended_at => {}
            _ => {
                newest.insert(key, r);
            }
        }
    }

    let mut latest: BTreeMap<String, Vec<LatestOutcome>> = BTreeMap::new();
    for ((taker, language, level), r) in newest {
        latest.entry(taker).or_default().push(LatestOutcome {
            language,
            level,
            score: r.score,
            passed: r.passed,
        });
    }

    ResultSummary {
        per_language,
        latest,
    }
}
