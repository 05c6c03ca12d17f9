//! Error types
//!
//! Neither error is raised on the render path: a tree that no longer
//! matches a compiled plan degrades silently during render and is only
//! reported by explicit validation.

use thiserror::Error;

/// Errors reported by validation and static-only construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JitError {
    /// A candidate tree lacks a child index some compiled dynamic path expects.
    #[error(
        "node tree structure does not match the compiled execution plan: path {path:?} failed at depth {depth}, expected child index {expected} but node only has {available} children"
    )]
    StructureMismatch {
        /// The full dynamic path that failed to resolve.
        path: Vec<usize>,
        /// Depth within the path where resolution stopped.
        depth: usize,
        /// The child index the path expected at that depth.
        expected: usize,
        /// Number of children actually present at that depth.
        available: usize,
    },

    /// Static-only construction received a tree containing dynamic content.
    #[error("flattening requires static content; use a Compiler for dynamic content")]
    DynamicContent,
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, JitError>;
