//! Plan Executor
//!
//! Replays a compiled plan against the current tree. Static runs are
//! copied verbatim; dynamic paths are resolved against `root` and the
//! resolved node renders itself.
//!
//! A path that no longer resolves contributes no bytes and execution
//! carries on. Render never fails on structural drift; use
//! [`validate`](super::validate) to detect it ahead of time.

use tracing::trace;

use super::{CompiledElement, ExecutionPlan};
use crate::node::Node;

/// Execute `plan` against `root`, appending output to `out`
pub fn execute(plan: &ExecutionPlan, root: &dyn Node, out: &mut Vec<u8>) {
    for element in plan.elements() {
        match element {
            CompiledElement::Static(content) => out.extend_from_slice(content.as_bytes()),
            CompiledElement::Dynamic(path) => match path.resolve(root) {
                Ok(node) => node.render(out),
                Err(miss) => {
                    trace!(
                        path = ?path.indices(),
                        depth = miss.depth,
                        expected = miss.expected,
                        available = miss.available,
                        "dynamic path unresolved, skipping"
                    );
                }
            },
        }
    }
}
