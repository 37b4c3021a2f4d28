//! Centralized limits and thresholds for the checker.
//!
//! Declared types are finite trees, so structural recursion terminates on its
//! own. These limits guard the places where user input can describe cycles:
//! inheritance chains and parent edges supplied by the hierarchy.

/// Maximum nesting depth visited while unifying a declared type against an
/// argument type.
///
/// Exceeding it is reported as a type mismatch at the site instead of
/// overflowing the stack on pathological inputs.
pub const MAX_UNIFY_DEPTH: u32 = 64;

/// Maximum nesting depth for subtype checks.
pub const MAX_SUBTYPE_DEPTH: u32 = 64;

/// Maximum number of `@extends`/`@implements` hops followed when mapping a
/// class onto one of its generic ancestors.
///
/// ```php
/// /** @extends Collection<int> */
/// class IntList extends Collection {}
/// /** @extends IntList */
/// class SortedIntList extends IntList {}   // two hops to reach Collection<int>
/// ```
pub const MAX_INHERITANCE_DEPTH: u32 = 32;

/// Default cap on diagnostics printed by the driver. `None` in the options
/// disables the cap.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 200;
