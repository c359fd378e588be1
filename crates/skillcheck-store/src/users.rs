//! In-memory user directory.
//!
//! Holds candidates, companies and admins. Receives skill validation updates
//! from the engine and answers the candidate searches companies run.

use std::collections::BTreeMap;
use std::sync::RwLock;

use skillcheck_core::model::{Language, SkillLevel, User};
use skillcheck_core::traits::SkillStatusUpdater;
use skillcheck_core::{Error, Result};

use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct InMemoryUsers {
    users: RwLock<BTreeMap<String, User>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: impl IntoIterator<Item = User>) -> Result<Self> {
        let store = Self::new();
        for user in users {
            store.insert(user)?;
        }
        Ok(store)
    }

    /// Add a user. Ids must be unique.
    pub fn insert(&self, user: User) -> Result<()> {
        let mut users = self.write()?;
        if users.contains_key(&user.id) {
            return Err(StoreError::DuplicateId {
                kind: "user",
                id: user.id,
            }
            .into());
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<User>> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Candidates holding a validated skill in every one of `languages`.
    ///
    /// An empty `languages` matches every candidate.
    pub fn search_by_validated(&self, languages: &[Language]) -> Result<Vec<User>> {
        let users = self.read()?;
        Ok(users
            .values()
            .filter(|u| {
                u.as_candidate()
                    .is_some_and(|p| languages.iter().all(|l| p.has_validated(*l)))
            })
            .cloned()
            .collect())
    }

    /// Candidates whose name or bio contains `query`, ignoring case.
    pub fn search_by_text(&self, query: &str) -> Result<Vec<User>> {
        let needle = query.trim().to_lowercase();
        let users = self.read()?;
        Ok(users
            .values()
            .filter(|u| {
                u.as_candidate().is_some_and(|p| {
                    needle.is_empty()
                        || u.name.to_lowercase().contains(&needle)
                        || p.bio.to_lowercase().contains(&needle)
                })
            })
            .cloned()
            .collect())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, User>>> {
        self.users
            .read()
            .map_err(|_| StoreError::LockPoisoned { store: "users" }.into())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, User>>> {
        self.users
            .write()
            .map_err(|_| StoreError::LockPoisoned { store: "users" }.into())
    }
}

impl SkillStatusUpdater for InMemoryUsers {
    fn update_skill_validation(
        &self,
        taker_id: &str,
        language: Language,
        level: SkillLevel,
        is_validated: bool,
        score: u8,
    ) -> Result<()> {
        let mut users = self.write()?;
        let user = users
            .get_mut(taker_id)
            .ok_or_else(|| Error::NotFound(format!("user {taker_id}")))?;
        let profile = user
            .as_candidate_mut()
            .ok_or_else(|| Error::InvalidArgument(format!("user {taker_id} is not a candidate")))?;

        match profile
            .skills
            .iter_mut()
            .find(|s| s.language == language && s.level == level)
        {
            Some(skill) => {
                skill.is_validated = is_validated;
                skill.score = Some(score);
                tracing::info!(
                    taker = taker_id,
                    %language,
                    %level,
                    is_validated,
                    score,
                    "skill validation updated"
                );
            }
            None => {
                tracing::debug!(
                    taker = taker_id,
                    %language,
                    %level,
                    "no matching skill on profile, nothing to update"
                );
            }
        }
        Ok(())
    }
}
