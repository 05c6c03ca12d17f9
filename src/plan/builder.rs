//! Plan Builder
//!
//! Walks a node tree once, depth-first, separating static from dynamic
//! content:
//!
//! - Static subtrees render straight into an accumulating buffer, so
//!   adjacent static output merges into one run.
//! - Dynamic nodes cut the run and record their index path; their subtree
//!   is never entered, it is re-rendered live on every execution.
//! - Containers above a dynamic node contribute their open/close tags to
//!   the static run and are walked child by child.

use tracing::debug;

use super::{CompiledElement, DynamicPath, ExecutionPlan, StaticContent};
use crate::node::{contains_dynamic, Node};

struct Builder {
    elements: Vec<CompiledElement>,
    pending: Vec<u8>,
    /// Scratch prefix, shared across the whole walk
    path: Vec<usize>,
}

impl Builder {
    fn new() -> Self {
        Builder {
            elements: Vec::new(),
            pending: Vec::with_capacity(1024),
            path: Vec::with_capacity(16),
        }
    }

    /// Cut the pending static run into the plan
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        // Copy: the pending buffer is cleared and reused
        self.elements
            .push(CompiledElement::Static(StaticContent::new(&self.pending)));
        self.pending.clear();
    }

    fn walk(&mut self, node: &dyn Node) {
        if node.is_dynamic() {
            self.flush();
            // Copy the scratch prefix; it keeps changing as siblings are walked
            self.elements
                .push(CompiledElement::Dynamic(DynamicPath::new(&self.path)));
            return;
        }

        let children = node.children();
        if !children.iter().any(|c| contains_dynamic(c.as_ref())) {
            // Entire subtree is static
            node.render(&mut self.pending);
            return;
        }

        let wrapping = node.as_wrapping();
        if let Some(tags) = wrapping {
            tags.render_open(&mut self.pending);
        }

        for (i, child) in children.iter().enumerate() {
            self.path.push(i);
            self.walk(child.as_ref());
            self.path.pop();
        }

        if let Some(tags) = wrapping {
            tags.render_close(&mut self.pending);
        }
    }

    fn finish(mut self) -> ExecutionPlan {
        self.flush();
        ExecutionPlan::from_elements(self.elements)
    }
}

/// Compile `root` into an execution plan
pub fn build(root: &dyn Node) -> ExecutionPlan {
    let mut builder = Builder::new();
    builder.walk(root);
    let plan = builder.finish();

    debug!(
        elements = plan.len(),
        static_bytes = plan.static_len(),
        dynamic_paths = plan.dynamic_paths().count(),
        "execution plan built"
    );

    plan
}
