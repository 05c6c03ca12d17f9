//! Execution Plans
//!
//! A plan is the compiled form of a node tree: a linear sequence of frozen
//! static byte runs and index paths to dynamic nodes. Replaying a plan
//! needs no tree traversal except the path lookups.
//!
//! - builder: single depth-first walk producing a plan
//! - executor: replays a plan against a structurally compatible tree
//! - validate: checks every dynamic path resolves in a candidate tree

pub mod builder;
pub mod executor;
pub mod validate;

pub use builder::build;
pub use validate::validate;

use crate::node::Node;

/// Pre-rendered static bytes
///
/// Adjacent static output (across siblings and nesting levels) is merged
/// into a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticContent {
    bytes: Box<[u8]>,
}

impl StaticContent {
    pub fn new(bytes: &[u8]) -> Self {
        StaticContent {
            bytes: bytes.into(),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Child indices leading from the root to a dynamic node
///
/// `[0, 1]` means `root.children()[0].children()[1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicPath {
    indices: Box<[usize]>,
}

/// Where and why a dynamic path failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unresolved {
    pub depth: usize,
    pub expected: usize,
    pub available: usize,
}

impl DynamicPath {
    /// Copy `indices` into a new path
    pub fn new(indices: &[usize]) -> Self {
        DynamicPath {
            indices: indices.into(),
        }
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Follow the path from `root`
    pub fn resolve<'a>(&self, root: &'a dyn Node) -> Result<&'a dyn Node, Unresolved> {
        let mut node = root;
        for (depth, &idx) in self.indices.iter().enumerate() {
            let children = node.children();
            match children.get(idx) {
                Some(child) => node = child.as_ref(),
                None => {
                    return Err(Unresolved {
                        depth,
                        expected: idx,
                        available: children.len(),
                    })
                }
            }
        }
        Ok(node)
    }
}

/// Single compiled rendering operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledElement {
    Static(StaticContent),
    Dynamic(DynamicPath),
}

/// Immutable, ordered sequence of compiled elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    elements: Vec<CompiledElement>,
}

impl ExecutionPlan {
    pub(crate) fn from_elements(elements: Vec<CompiledElement>) -> Self {
        ExecutionPlan { elements }
    }

    #[inline]
    pub fn elements(&self) -> &[CompiledElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the dynamic paths in plan order
    pub fn dynamic_paths(&self) -> impl Iterator<Item = &DynamicPath> {
        self.elements.iter().filter_map(|e| match e {
            CompiledElement::Dynamic(path) => Some(path),
            CompiledElement::Static(_) => None,
        })
    }

    /// Total number of frozen static bytes
    pub fn static_len(&self) -> usize {
        self.elements
            .iter()
            .map(|e| match e {
                CompiledElement::Static(content) => content.as_bytes().len(),
                CompiledElement::Dynamic(_) => 0,
            })
            .sum()
    }

    /// Replay the plan against `root`, appending output to `out`
    pub fn execute(&self, root: &dyn Node, out: &mut Vec<u8>) {
        executor::execute(self, root, out)
    }
}
