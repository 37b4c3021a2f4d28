//! Common types and utilities for the templar generics checker.
//!
//! This crate provides foundational types used across all templar crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, stable codes)
//! - Checker limits and thresholds

// String interning for class and template names
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Diagnostics shared by the solver and the driver
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes};

// Centralized limits and thresholds
pub mod limits;
