//! # gemdex-core
//!
//! Normalization and ordering engine for gem package metadata.
//!
//! This crate provides:
//! - Version and requirement types with a segment-wise total order
//! - A schema-driven normalizer from tagged gemspec graphs to `PackageSpec`
//! - Date canonicalization to `YYYY-MM-DD`
//! - A self-contained decoder, sorter, and formatter for spec index streams
//! - A manifest (Gemfile) parser extracting plain package/constraint pairs
//! - `GemdexError` for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: core data types (Version, Dependency, PackageSpec)
//! - `normalize`: tagged object graph to flat record
//! - `date`: date canonicalization
//! - `index`: index stream decoding, ordering, emission
//! - `gemfile`: manifest directive parsing
//! - `error`: error types and result aliases
//!
//! Everything is a pure, single-threaded transformation over one record or
//! stream at a time; records are produced, transformed, and emitted without
//! shared state.

pub mod date;
pub mod error;
pub mod gemfile;
pub mod index;
pub mod normalize;
pub mod types;

// Re-export commonly used types
pub use error::{GemdexError, GemdexResult};
pub use index::IndexRecord;
pub use types::{Dependency, DependencyKind, Op, PackageSpec, Requirement, Version};
