//! TOML catalog parser.
//!
//! A catalog seeds the question bank, the custom tests, and the user
//! directory. Catalogs can be loaded from a single file or merged from a
//! directory, and validated for common authoring mistakes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    CandidateProfile, CompanyProfile, CustomTest, Language, Question, Role, Skill, SkillLevel,
    User, MIN_QUESTION_SECS,
};

/// Everything a catalog file declares.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Global question bank, in file order.
    pub questions: Vec<Question>,
    pub custom_tests: Vec<CustomTest>,
    pub users: Vec<User>,
}

impl Catalog {
    /// Number of bank questions per (language, level) bucket.
    pub fn question_counts(&self) -> BTreeMap<(Language, SkillLevel), usize> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry((q.language, q.difficulty)).or_insert(0) += 1;
        }
        counts
    }

    /// Append everything from `other`.
    pub fn merge(&mut self, other: Catalog) {
        self.questions.extend(other.questions);
        self.custom_tests.extend(other.custom_tests);
        self.users.extend(other.users);
    }
}

/// Intermediate TOML structure for catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    custom_tests: Vec<TomlCustomTest>,
    #[serde(default)]
    users: Vec<TomlUser>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    prompt: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    estimated_time: Option<u64>,
    #[serde(default)]
    created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlCustomTest {
    id: String,
    company_id: String,
    title: String,
    #[serde(default)]
    description: String,
    language: String,
    difficulty: String,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    invited_candidates: Vec<String>,
    #[serde(default)]
    estimated_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TomlUser {
    id: String,
    #[serde(default)]
    email: String,
    name: String,
    role: String,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    skills: Vec<TomlSkill>,
}

#[derive(Debug, Deserialize)]
struct TomlSkill {
    language: String,
    level: String,
    #[serde(default)]
    is_validated: bool,
    #[serde(default)]
    score: Option<u8>,
}

/// Parse a single TOML file into a [`Catalog`].
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into a [`Catalog`] (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalog = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| convert_question(q, None))
        .collect::<Result<Vec<_>>>()?;

    let custom_tests = parsed
        .custom_tests
        .into_iter()
        .map(|t| {
            let language: Language = t.language.parse()?;
            let difficulty: SkillLevel = t.difficulty.parse()?;
            let questions = t
                .questions
                .into_iter()
                .map(|q| convert_question(q, Some((language, difficulty))))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("in custom test {}", t.id))?;
            Ok(CustomTest {
                id: t.id,
                company_id: t.company_id,
                title: t.title,
                description: t.description,
                language,
                difficulty,
                questions,
                invited_candidates: t.invited_candidates,
                estimated_duration: t.estimated_duration,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let users = parsed
        .users
        .into_iter()
        .map(convert_user)
        .collect::<Result<Vec<_>>>()?;

    Ok(Catalog {
        questions,
        custom_tests,
        users,
    })
}

/// Convert a TOML question, inheriting language and level from the
/// enclosing custom test when they are omitted.
fn convert_question(
    q: TomlQuestion,
    inherited: Option<(Language, SkillLevel)>,
) -> Result<Question> {
    let language = match (q.language, inherited) {
        (Some(l), _) => l.parse()?,
        (None, Some((l, _))) => l,
        (None, None) => anyhow::bail!("question {} has no language", q.id),
    };
    let difficulty = match (q.difficulty, inherited) {
        (Some(d), _) => d.parse()?,
        (None, Some((_, d))) => d,
        (None, None) => anyhow::bail!("question {} has no difficulty", q.id),
    };

    Ok(Question {
        id: q.id,
        language,
        difficulty,
        prompt: q.prompt,
        code: q.code,
        options: q.options,
        correct_answer: q.correct_answer,
        estimated_time: q.estimated_time,
        created_by: q.created_by,
    })
}

fn convert_user(u: TomlUser) -> Result<User> {
    let role = match u.role.to_lowercase().as_str() {
        "candidate" => {
            let skills = u
                .skills
                .into_iter()
                .map(|s| {
                    Ok(Skill {
                        language: s.language.parse()?,
                        level: s.level.parse()?,
                        is_validated: s.is_validated,
                        score: s.score,
                    })
                })
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("in skills of user {}", u.id))?;
            Role::Candidate(CandidateProfile {
                bio: u.bio,
                location: u.location,
                skills,
            })
        }
        "company" => Role::Company(CompanyProfile {
            description: u.description,
            industry: u.industry,
            location: u.location,
            website: u.website,
        }),
        "admin" => Role::Admin,
        other => anyhow::bail!("user {} has unknown role: {other}", u.id),
    };

    Ok(User {
        id: u.id,
        email: u.email,
        name: u.name,
        role,
    })
}

/// Recursively load and merge all `.toml` catalog files in a directory.
pub fn load_catalog_directory(dir: &Path) -> Result<Catalog> {
    let mut catalog = Catalog::default();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            catalog.merge(load_catalog_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalog(&path) {
                Ok(c) => catalog.merge(c),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(catalog)
}

/// Load a catalog from a file or a directory.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if path.is_dir() {
        load_catalog_directory(path)
    } else {
        parse_catalog(path)
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question, test, or user id (if applicable).
    pub item: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn new(item: &str, message: impl Into<String>) -> Self {
        Self {
            item: Some(item.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a catalog for common issues.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Question ids must be unique across the bank and every custom test.
    let mut seen_ids = HashSet::new();
    let all_questions = catalog
        .questions
        .iter()
        .chain(catalog.custom_tests.iter().flat_map(|t| t.questions.iter()));
    for q in all_questions {
        if !seen_ids.insert(q.id.as_str()) {
            warnings.push(ValidationWarning::new(
                &q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
        if let Err(e) = q.validate() {
            warnings.push(ValidationWarning::new(&q.id, e.to_string()));
        }
        if let Some(secs) = q.estimated_time {
            if secs > 0 && secs < MIN_QUESTION_SECS {
                warnings.push(ValidationWarning::new(
                    &q.id,
                    format!("estimated_time {secs}s is below {MIN_QUESTION_SECS}s and will be raised"),
                ));
            }
        }
    }

    let mut seen_users = HashSet::new();
    for u in &catalog.users {
        if !seen_users.insert(u.id.as_str()) {
            warnings.push(ValidationWarning::new(
                &u.id,
                format!("duplicate user ID: {}", u.id),
            ));
        }
    }
    let users: HashMap<&str, &User> = catalog.users.iter().map(|u| (u.id.as_str(), u)).collect();

    let mut seen_tests = HashSet::new();
    for t in &catalog.custom_tests {
        if !seen_tests.insert(t.id.as_str()) {
            warnings.push(ValidationWarning::new(
                &t.id,
                format!("duplicate custom test ID: {}", t.id),
            ));
        }
        if t.questions.is_empty() {
            warnings.push(ValidationWarning::new(&t.id, "custom test has no questions"));
        }
        if t.estimated_duration == Some(0) {
            warnings.push(ValidationWarning::new(
                &t.id,
                "estimated_duration is 0 and will fall back to the default",
            ));
        }
        if t.invited_candidates.is_empty() {
            warnings.push(ValidationWarning::new(&t.id, "nobody is invited to this test"));
        }

        // Only cross-check references when the catalog declares users.
        if users.is_empty() {
            continue;
        }
        if !users
            .get(t.company_id.as_str())
            .is_some_and(|u| u.as_company().is_some())
        {
            warnings.push(ValidationWarning::new(
                &t.id,
                format!("company {} is not a known company", t.company_id),
            ));
        }
        for candidate in &t.invited_candidates {
            if !users
                .get(candidate.as_str())
                .is_some_and(|u| u.as_candidate().is_some())
            {
                warnings.push(ValidationWarning::new(
                    &t.id,
                    format!("invited {candidate} is not a known candidate"),
                ));
            }
        }
    }

    warnings
}
