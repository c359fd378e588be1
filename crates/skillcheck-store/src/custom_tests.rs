//! In-memory store for company-authored tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use skillcheck_core::model::CustomTest;
use skillcheck_core::traits::CustomTestStore;
use skillcheck_core::{Error, Result};

use crate::error::StoreError;

/// Custom tests keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryCustomTests {
    tests: RwLock<BTreeMap<String, CustomTest>>,
}

impl InMemoryCustomTests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tests(tests: impl IntoIterator<Item = CustomTest>) -> Result<Self> {
        let store = Self::new();
        for test in tests {
            store.create(test)?;
        }
        Ok(store)
    }

    /// Tests issued by `company_id`, ordered by id.
    pub fn list_for_company(&self, company_id: &str) -> Result<Vec<CustomTest>> {
        let tests = self.read()?;
        Ok(tests
            .values()
            .filter(|t| t.company_id == company_id)
            .cloned()
            .collect())
    }

    /// Tests `candidate_id` has been invited to, ordered by id.
    pub fn list_for_candidate(&self, candidate_id: &str) -> Result<Vec<CustomTest>> {
        let tests = self.read()?;
        Ok(tests
            .values()
            .filter(|t| t.is_invited(candidate_id))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, CustomTest>>> {
        self.tests
            .read()
            .map_err(|_| StoreError::LockPoisoned { store: "custom tests" }.into())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, CustomTest>>> {
        self.tests
            .write()
            .map_err(|_| StoreError::LockPoisoned { store: "custom tests" }.into())
    }
}

impl CustomTestStore for InMemoryCustomTests {
    fn get_by_id(&self, test_id: &str) -> Result<Option<CustomTest>> {
        Ok(self.read()?.get(test_id).cloned())
    }

    fn create(&self, test: CustomTest) -> Result<()> {
        if test.id.trim().is_empty() {
            return Err(Error::InvalidArgument("custom test id is empty".into()));
        }
        for q in &test.questions {
            q.validate()?;
        }
        let mut tests = self.write()?;
        if tests.contains_key(&test.id) {
            return Err(StoreError::DuplicateId {
                kind: "custom test",
                id: test.id,
            }
            .into());
        }
        tracing::debug!(id = %test.id, company = %test.company_id, "custom test created");
        tests.insert(test.id.clone(), test);
        Ok(())
    }

    fn update(&self, test: CustomTest) -> Result<()> {
        for q in &test.questions {
            q.validate()?;
        }
        let mut tests = self.write()?;
        match tests.get_mut(&test.id) {
            Some(slot) => {
                *slot = test;
                Ok(())
            }
            None => Err(Error::NotFound(format!("custom test {}", test.id))),
        }
    }

    fn delete(&self, test_id: &str) -> Result<()> {
        let mut tests = self.write()?;
        tests
            .remove(test_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("custom test {test_id}")))
    }

    fn invite_candidate(&self, test_id: &str, candidate_id: &str) -> Result<()> {
        let mut tests = self.write()?;
        let test = tests
            .get_mut(test_id)
            .ok_or_else(|| Error::NotFound(format!("custom test {test_id}")))?;
        if !test.is_invited(candidate_id) {
            test.invited_candidates.push(candidate_id.to_string());
            tracing::info!(test = test_id, candidate = candidate_id, "candidate invited");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillcheck_core::model::{Language, SkillLevel};

    fn test(id: &str, company: &str, invited: &[&str]) -> CustomTest {
        CustomTest {
            id: id.into(),
            company_id: company.into(),
            title: format!("Test {id}"),
            description: String::new(),
            language: Language::Python,
            difficulty: SkillLevel::Intermediate,
            questions: vec![],
            invited_candidates: invited.iter().map(|s| s.to_string()).collect(),
            estimated_duration: Some(600),
        }
    }

    #[test]
    fn create_get_and_reject_duplicate() {
        let store = InMemoryCustomTests::new();
        store.create(test("t1", "comp1", &[])).unwrap();
        assert_eq!(store.get_by_id("t1").unwrap().unwrap().company_id, "comp1");
        assert!(store.get_by_id("t2").unwrap().is_none());
        assert!(matches!(
            store.create(test("t1", "comp2", &[])),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn invite_is_idempotent() {
        let store = InMemoryCustomTests::from_tests([test("t1", "comp1", &[])]).unwrap();
        store.invite_candidate("t1", "c1").unwrap();
        store.invite_candidate("t1", "c1").unwrap();
        let t = store.get_by_id("t1").unwrap().unwrap();
        assert_eq!(t.invited_candidates, ["c1"]);

        assert!(matches!(
            store.invite_candidate("missing", "c1"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn update_and_delete() {
        let store = InMemoryCustomTests::from_tests([test("t1", "comp1", &[])]).unwrap();
        let mut edited = test("t1", "comp1", &["c9"]);
        edited.title = "Renamed".into();
        store.update(edited).unwrap();
        assert_eq!(store.get_by_id("t1").unwrap().unwrap().title, "Renamed");

        assert!(matches!(
            store.update(test("t2", "comp1", &[])),
            Err(Error::NotFound(_))
        ));

        store.delete("t1").unwrap();
        assert!(store.is_empty().unwrap());
        assert!(matches!(store.delete("t1"), Err(Error::NotFound(_))));
    }

    #[test]
    fn listings_by_company_and_candidate() {
        let store = InMemoryCustomTests::from_tests([
            test("t1", "comp1", &["c1", "c2"]),
            test("t2", "comp2", &["c2"]),
            test("t3", "comp1", &[]),
        ])
        .unwrap();

        let ids = |tests: Vec<CustomTest>| tests.into_iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(store.list_for_company("comp1").unwrap()), ["t1", "t3"]);
        assert_eq!(ids(store.list_for_candidate("c2").unwrap()), ["t1", "t2"]);
        assert!(store.list_for_candidate("c3").unwrap().is_empty());
    }
}
