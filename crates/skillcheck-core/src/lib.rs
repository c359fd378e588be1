//! skillcheck-core: Timed test sessions, scoring, and test resolution.
//!
//! This crate defines the data model, the collaborator traits, and the
//! session state machine that the rest of skillcheck builds on.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod resolver;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod timer;
pub mod traits;

pub use error::{Error, Result};
