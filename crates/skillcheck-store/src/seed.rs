//! Wiring a parsed catalog into the in-memory stores.

use std::sync::Arc;

use skillcheck_core::catalog::Catalog;
use skillcheck_core::engine::TestEngine;
use skillcheck_core::Result;

use crate::bank::InMemoryQuestionBank;
use crate::custom_tests::InMemoryCustomTests;
use crate::results::InMemoryResultLog;
use crate::users::InMemoryUsers;

/// Shared handles to every store the engine needs.
#[derive(Debug, Clone)]
pub struct Stores {
    pub bank: Arc<InMemoryQuestionBank>,
    pub custom_tests: Arc<InMemoryCustomTests>,
    pub results: Arc<InMemoryResultLog>,
    pub users: Arc<InMemoryUsers>,
}

impl Stores {
    /// Populate stores from a catalog, starting with an empty result log.
    pub fn from_catalog(catalog: Catalog) -> Result<Self> {
        Self::with_results(catalog, InMemoryResultLog::new())
    }

    /// Populate stores from a catalog and an existing result log.
    pub fn with_results(catalog: Catalog, results: InMemoryResultLog) -> Result<Self> {
        let Catalog {
            questions,
            custom_tests,
            users,
        } = catalog;
        let stores = Self {
            bank: Arc::new(InMemoryQuestionBank::from_questions(questions)?),
            custom_tests: Arc::new(InMemoryCustomTests::from_tests(custom_tests)?),
            results: Arc::new(results),
            users: Arc::new(InMemoryUsers::from_users(users)?),
        };
        let custom_tests = stores.custom_tests.len()?;
        tracing::debug!(custom_tests, "stores populated");
        Ok(stores)
    }

    /// An engine backed by these stores.
    pub fn engine(&self) -> TestEngine {
        TestEngine::new(
            self.bank.clone(),
            self.custom_tests.clone(),
            self.results.clone(),
            self.users.clone(),
        )
    }
}
