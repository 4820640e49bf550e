//! Domain logic - version facts and the fields they expose to templates

pub mod version;

pub use version::{RepositoryVersion, VersionBump, VersionField};
