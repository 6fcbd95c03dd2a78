//! Core data types for the normalization and ordering engine.

pub mod dependency;
pub mod spec;
pub mod version;

pub use dependency::{Dependency, DependencyKind, Op, Requirement};
pub use spec::PackageSpec;
pub use version::{Segment, Version};
