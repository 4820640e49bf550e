//! Bump hook
//!
//! A project may ship an executable `bump-hook` script at its root. After a
//! bump has rewritten sources and tagged the release, the script is run
//! with the bump details in its environment. Its failure fails the bump,
//! but nothing done before it is rolled back.

pub mod executor;
pub mod lifecycle;

pub use executor::{is_executable, HookExecutor};
pub use lifecycle::HookContext;

/// File name of the hook, relative to the project root
pub const BUMP_HOOK: &str = "bump-hook";
