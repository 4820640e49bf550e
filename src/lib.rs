//! Derive package versions from git tags, and bump them.
//!
//! A [Strategy] describes how a [RepositoryVersion] (the facts `git describe`
//! gives about the checkout) is rendered into a version string. [Versioning]
//! binds a strategy to a project's metadata and source control, and drives
//! version auto-fill and the bump workflow.

pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod git;
pub mod hooks;
pub mod meta;
pub mod strategy;
pub mod versioning;

pub use config::{load_config, ProjectConfig, VersioningSpec};
pub use diagnostics::Diagnostic;
pub use domain::{RepositoryVersion, VersionBump, VersionField};
pub use error::{Result, VersioningError};
pub use git::{Git2Scm, MockScm, Scm};
pub use meta::{Metadata, ProjectMeta};
pub use strategy::{Format, FormatSpec, Strategy, VersionBit};
pub use versioning::{BumpReport, BumpRequest, Versioning};
