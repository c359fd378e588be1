//! Core data model types for skillcheck.
//!
//! Questions, test definitions, results, and the users that take and author
//! tests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Per-question time budget used when a question does not set one.
pub const DEFAULT_QUESTION_SECS: u64 = 120;

/// Smallest per-question time budget an author may configure.
pub const MIN_QUESTION_SECS: u64 = 30;

/// Total budget for a custom test whose duration is unset or zero.
pub const DEFAULT_CUSTOM_DURATION_SECS: u64 = 300;

/// Minimum score (inclusive) needed to pass a test.
pub const PASS_THRESHOLD: u8 = 70;

/// Programming languages that can be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "PHP")]
    Php,
    Ruby,
    Go,
    Swift,
    Kotlin,
    Rust,
    #[serde(rename = "HTML/CSS")]
    HtmlCss,
}

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Language; 12] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Java,
        Language::CSharp,
        Language::Php,
        Language::Ruby,
        Language::Go,
        Language::Swift,
        Language::Kotlin,
        Language::Rust,
        Language::HtmlCss,
    ];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Php => "PHP",
            Language::Ruby => "Ruby",
            Language::Go => "Go",
            Language::Swift => "Swift",
            Language::Kotlin => "Kotlin",
            Language::Rust => "Rust",
            Language::HtmlCss => "HTML/CSS",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "c#" | "csharp" | "cs" => Ok(Language::CSharp),
            "php" => Ok(Language::Php),
            "ruby" | "rb" => Ok(Language::Ruby),
            "go" | "golang" => Ok(Language::Go),
            "swift" => Ok(Language::Swift),
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "rust" | "rs" => Ok(Language::Rust),
            "html/css" | "html" | "css" => Ok(Language::HtmlCss),
            other => Err(Error::InvalidArgument(format!("unknown language: {other}"))),
        }
    }
}

/// Difficulty of a question, and the level of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
        SkillLevel::Expert,
    ];
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillLevel::Beginner => write!(f, "beginner"),
            SkillLevel::Intermediate => write!(f, "intermediate"),
            SkillLevel::Advanced => write!(f, "advanced"),
            SkillLevel::Expert => write!(f, "expert"),
        }
    }
}

impl FromStr for SkillLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            "expert" => Ok(SkillLevel::Expert),
            other => Err(Error::InvalidArgument(format!("unknown level: {other}"))),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier.
    pub id: String,
    /// Language the question belongs to.
    pub language: Language,
    /// Difficulty bucket in the question bank.
    pub difficulty: SkillLevel,
    /// Prompt shown to the taker.
    pub prompt: String,
    /// Optional code sample shown under the prompt.
    #[serde(default)]
    pub code: Option<String>,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_answer: usize,
    /// Time budget in seconds.
    #[serde(default)]
    pub estimated_time: Option<u64>,
    /// Author (company or admin id).
    #[serde(default)]
    pub created_by: Option<String>,
}

impl Question {
    /// Time budget in seconds with the default and minimum applied.
    pub fn time_budget(&self) -> u64 {
        self.time_budget_or(DEFAULT_QUESTION_SECS, MIN_QUESTION_SECS)
    }

    /// Time budget with explicit default and minimum.
    ///
    /// An unset or zero budget falls back to `default`.
    pub fn time_budget_or(&self, default: u64, min: u64) -> u64 {
        match self.estimated_time {
            None | Some(0) => default,
            Some(secs) => secs.max(min),
        }
    }

    /// Whether `option` is the correct answer.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }

    /// Check the structural invariants of this question.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidArgument("question id is empty".into()));
        }
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidArgument(format!(
                "question {} has an empty prompt",
                self.id
            )));
        }
        if self.options.len() < 2 {
            return Err(Error::InvalidArgument(format!(
                "question {} needs at least two options",
                self.id
            )));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(Error::InvalidArgument(format!(
                "question {} has a blank option",
                self.id
            )));
        }
        if self.correct_answer >= self.options.len() {
            return Err(Error::InvalidArgument(format!(
                "question {} correct answer {} out of range for {} options",
                self.id,
                self.correct_answer,
                self.options.len()
            )));
        }
        Ok(())
    }
}

/// A company-authored test with a fixed question set and an invite list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTest {
    pub id: String,
    /// Issuing company.
    pub company_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub language: Language,
    pub difficulty: SkillLevel,
    /// Snapshot of questions; never changes during an attempt.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Candidate ids allowed to take the test.
    #[serde(default)]
    pub invited_candidates: Vec<String>,
    /// Total time budget in seconds.
    #[serde(default)]
    pub estimated_duration: Option<u64>,
}

impl CustomTest {
    pub fn is_invited(&self, candidate_id: &str) -> bool {
        self.invited_candidates.iter().any(|c| c == candidate_id)
    }

    /// Total budget, falling back to `default` when unset or zero.
    pub fn duration_or(&self, default: u64) -> u64 {
        match self.estimated_duration {
            None | Some(0) => default,
            Some(secs) => secs,
        }
    }
}

/// A concrete test ready to be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestDefinition {
    /// Drawn from the question bank by language and level.
    Standard {
        language: Language,
        level: SkillLevel,
        questions: Vec<Question>,
    },
    /// Company-authored test.
    Custom(CustomTest),
}

impl TestDefinition {
    pub fn language(&self) -> Language {
        match self {
            TestDefinition::Standard { language, .. } => *language,
            TestDefinition::Custom(test) => test.language,
        }
    }

    pub fn level(&self) -> SkillLevel {
        match self {
            TestDefinition::Standard { level, .. } => *level,
            TestDefinition::Custom(test) => test.difficulty,
        }
    }

    pub fn questions(&self) -> &[Question] {
        match self {
            TestDefinition::Standard { questions, .. } => questions,
            TestDefinition::Custom(test) => &test.questions,
        }
    }

    /// Custom test id, if any.
    pub fn custom_id(&self) -> Option<&str> {
        match self {
            TestDefinition::Standard { .. } => None,
            TestDefinition::Custom(test) => Some(&test.id),
        }
    }

    /// Short label used in logs and error messages.
    pub fn label(&self) -> String {
        match self {
            TestDefinition::Standard {
                language, level, ..
            } => format!("{language} ({level})"),
            TestDefinition::Custom(test) => format!("custom test {}", test.id),
        }
    }
}

/// Outcome of a completed attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub taker_id: String,
    pub language: Language,
    pub level: SkillLevel,
    /// Set when the attempt was for a custom test.
    #[serde(default)]
    pub custom_test_id: Option<String>,
    /// Score from 0 to 100.
    pub score: u8,
    pub passed: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Whole seconds between start and end.
    pub elapsed_secs: u64,
}

/// A self-reported skill on a candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub language: Language,
    pub level: SkillLevel,
    #[serde(default)]
    pub is_validated: bool,
    #[serde(default)]
    pub score: Option<u8>,
}

/// Any account in the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Role-specific payload of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Role {
    Candidate(CandidateProfile),
    Company(CompanyProfile),
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl CandidateProfile {
    /// Whether the candidate holds a validated skill in `language` at any level.
    pub fn has_validated(&self, language: Language) -> bool {
        self.skills
            .iter()
            .any(|s| s.language == language && s.is_validated)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
}

impl User {
    pub fn as_candidate(&self) -> Option<&CandidateProfile> {
        match &self.role {
            Role::Candidate(profile) => Some(profile),
            Role::Company(_) | Role::Admin => None,
        }
    }

    pub fn as_candidate_mut(&mut self) -> Option<&mut CandidateProfile> {
        match &mut self.role {
            Role::Candidate(profile) => Some(profile),
            Role::Company(_) | Role::Admin => None,
        }
    }

    pub fn as_company(&self) -> Option<&CompanyProfile> {
        match &self.role {
            Role::Company(profile) => Some(profile),
            Role::Candidate(_) | Role::Admin => None,
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self.role {
            Role::Candidate(_) => "candidate",
            Role::Company(_) => "company",
            Role::Admin => "admin",
        }
    }
}
