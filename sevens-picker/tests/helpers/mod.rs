//! Test Helper Utilities
//!
//! Shared doubles and fixtures for testing sevens-picker

#![allow(dead_code)]

pub mod doubles;

// Not every test binary uses every helper
#[allow(unused_imports)]
pub use doubles::{catalog_album, rated, ScriptedCatalog, StubSummarizer};
