//! Structural Validation
//!
//! Checks that a candidate tree can stand in for the tree a plan was built
//! from: every dynamic path must resolve. Intended for tests and build
//! steps; render never calls it.

use super::ExecutionPlan;
use crate::error::{JitError, Result};
use crate::node::Node;

/// Check every dynamic path of `plan` against `root`
///
/// Fails with [`JitError::StructureMismatch`] at the first path that does
/// not resolve.
pub fn validate(plan: &ExecutionPlan, root: &dyn Node) -> Result<()> {
    for path in plan.dynamic_paths() {
        path.resolve(root)
            .map_err(|miss| JitError::StructureMismatch {
                path: path.indices().to_vec(),
                depth: miss.depth,
                expected: miss.expected,
                available: miss.available,
            })?;
    }
    Ok(())
}
