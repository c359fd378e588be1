//! In-memory question bank.

use std::collections::BTreeMap;
use std::sync::RwLock;

use skillcheck_core::model::{Language, Question, SkillLevel};
use skillcheck_core::traits::QuestionBank;
use skillcheck_core::{Error, Result};

use crate::error::StoreError;

type Buckets = BTreeMap<(Language, SkillLevel), Vec<Question>>;

/// Question bank keyed by (language, difficulty), preserving insertion order
/// inside each bucket.
#[derive(Debug, Default)]
pub struct InMemoryQuestionBank {
    buckets: RwLock<Buckets>,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bank from questions, validating each one.
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Result<Self> {
        let bank = Self::new();
        for q in questions {
            bank.add_question(q)?;
        }
        Ok(bank)
    }

    /// Number of questions in every non-empty bucket.
    pub fn counts(&self) -> Result<BTreeMap<(Language, SkillLevel), usize>> {
        let buckets = self.read()?;
        Ok(buckets
            .iter()
            .filter(|(_, qs)| !qs.is_empty())
            .map(|(key, qs)| (*key, qs.len()))
            .collect())
    }

    /// Look up a question by id in any bucket.
    pub fn find(&self, id: &str) -> Result<Option<Question>> {
        let buckets = self.read()?;
        Ok(buckets.values().flatten().find(|q| q.id == id).cloned())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Buckets>> {
        self.buckets
            .read()
            .map_err(|_| StoreError::LockPoisoned { store: "question bank" }.into())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Buckets>> {
        self.buckets
            .write()
            .map_err(|_| StoreError::LockPoisoned { store: "question bank" }.into())
    }
}

impl QuestionBank for InMemoryQuestionBank {
    fn questions(&self, language: Language, level: SkillLevel) -> Result<Vec<Question>> {
        let buckets = self.read()?;
        Ok(buckets.get(&(language, level)).cloned().unwrap_or_default())
    }

    fn add_question(&self, question: Question) -> Result<()> {
        question.validate()?;
        let mut buckets = self.write()?;
        if buckets.values().flatten().any(|q| q.id == question.id) {
            return Err(StoreError::DuplicateId {
                kind: "question",
                id: question.id,
            }
            .into());
        }
        tracing::debug!(id = %question.id, language = %question.language, "question added");
        buckets
            .entry((question.language, question.difficulty))
            .or_default()
            .push(question);
        Ok(())
    }

    fn update_question(&self, question: Question) -> Result<()> {
        question.validate()?;
        let mut buckets = self.write()?;
        let key = (question.language, question.difficulty);

        let location = buckets.iter().find_map(|(k, qs)| {
            qs.iter().position(|q| q.id == question.id).map(|i| (*k, i))
        });
        let Some((old_key, index)) = location else {
            return Err(Error::NotFound(format!("question {}", question.id)));
        };

        if old_key == key {
            if let Some(bucket) = buckets.get_mut(&key) {
                bucket[index] = question;
            }
        } else {
            // Language or difficulty changed: move to the end of the new bucket.
            if let Some(bucket) = buckets.get_mut(&old_key) {
                bucket.remove(index);
            }
            buckets.entry(key).or_default().push(question);
        }
        Ok(())
    }

    fn delete_question(&self, id: &str) -> Result<()> {
        let mut buckets = self.write()?;
        let mut removed = false;
        for bucket in buckets.values_mut() {
            let before = bucket.len();
            bucket.retain(|q| q.id != id);
            removed |= bucket.len() != before;
        }
        if removed {
            Ok(())
        } else {
            Err(Error::NotFound(format!("question {id}")))
        }
    }
}
