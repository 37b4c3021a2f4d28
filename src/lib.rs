//! Checker for PHPStan-style `@template` generics over JSON project files.
//!
//! The solver crates do the inference and checking; this crate lowers a
//! [`project::Project`] into solver state, checks its sites and reports the
//! results:
//!
//! - `project`: the JSON project model
//! - `lower`: declarations and type expressions into solver state
//! - `check`: site checking and deferred binding resolution
//! - `cli`: argument parsing, driver and reporter of the `templar` binary

pub use templar_common as common;
pub use templar_solver as solver;

pub mod check;
pub mod cli;
pub mod lower;
pub mod project;
pub mod tracing_config;

pub use check::{CheckResult, check_project};
pub use project::{CheckOptions, Project};
