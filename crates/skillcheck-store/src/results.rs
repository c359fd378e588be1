//! Append-only result log with JSON snapshots.

use std::path::Path;
use std::sync::RwLock;

use anyhow::Context;

use skillcheck_core::model::{Language, TestResult};
use skillcheck_core::traits::ResultLog;
use skillcheck_core::Result;

use crate::error::StoreError;

/// Completed attempts in the order they were recorded.
#[derive(Debug, Default)]
pub struct InMemoryResultLog {
    results: RwLock<Vec<TestResult>>,
}

impl InMemoryResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_results(results: Vec<TestResult>) -> Self {
        Self {
            results: RwLock::new(results),
        }
    }

    /// Every recorded result.
    pub fn all(&self) -> Result<Vec<TestResult>> {
        Ok(self.read()?.clone())
    }

    /// Write the log to a JSON file, creating parent directories.
    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        let results = self.all()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&results).context("failed to serialize results")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results: {}", path.display()))?;
        tracing::debug!(path = %path.display(), count = results.len(), "results saved");
        Ok(())
    }

    /// Load a log from a JSON file. A missing file yields an empty log.
    pub fn load_json(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results: {}", path.display()))?;
        let results: Vec<TestResult> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse results: {}", path.display()))?;
        Ok(Self::from_results(results))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<TestResult>>> {
        self.results
            .read()
            .map_err(|_| StoreError::LockPoisoned { store: "result log" }.into())
    }
}

impl ResultLog for InMemoryResultLog {
    fn record(&self, result: TestResult) -> Result<()> {
        let mut results = self
            .results
            .write()
            .map_err(|_| StoreError::LockPoisoned { store: "result log" })?;
        results.push(result);
        Ok(())
    }

    fn query_by_taker(&self, taker_id: &str) -> Result<Vec<TestResult>> {
        Ok(self
            .read()?
            .iter()
            .filter(|r| r.taker_id == taker_id)
            .cloned()
            .collect())
    }

    fn query_by_language(&self, language: Language) -> Result<Vec<TestResult>> {
        Ok(self
            .read()?
            .iter()
            .filter(|r| r.language == language)
            .cloned()
            .collect())
    }
}
