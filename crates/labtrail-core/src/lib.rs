//! # labtrail-core
//!
//! Core types, traits, and abstractions for the labtrail storage core.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the backend crates depend on:
//! - Entity models and insert/patch request shapes
//! - Repository trait contracts (one per entity, plus search)
//! - Error taxonomy
//! - Request validation and attachment hashing helpers
//! - Structured logging field constants
//! - Backend conformance scenarios shared by both backends' tests

pub mod conformance;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod traits;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use search::{trimmed_query, SearchResults};
pub use traits::*;
pub use validate::{compute_content_hash, is_valid_mime_type, sanitize_filename};
