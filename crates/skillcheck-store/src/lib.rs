//! skillcheck-store: In-memory collaborators and configuration.
//!
//! Implements the `skillcheck-core` traits over process memory so the engine
//! can run without a database, and loads the CLI configuration.

pub mod bank;
pub mod config;
pub mod custom_tests;
pub mod error;
pub mod results;
pub mod seed;
pub mod users;

pub use bank::InMemoryQuestionBank;
pub use config::{load_config, load_config_from, SkillcheckConfig};
pub use custom_tests::InMemoryCustomTests;
pub use error::StoreError;
pub use results::InMemoryResultLog;
pub use seed::Stores;
pub use users::InMemoryUsers;
