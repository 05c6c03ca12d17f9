//! Function components and conditionals
//!
//! These nodes are always dynamic: their output depends on closure state or
//! a per-render condition, so they are never frozen into a plan.

use super::{Node, NodeBox};

type NodeFn = dyn Fn() -> NodeBox + Send + Sync;
type NodesFn = dyn Fn() -> Vec<NodeBox> + Send + Sync;

/// Component producing a single node, re-invoked on every render
pub struct Func {
    f: Box<NodeFn>,
}

impl Func {
    pub fn new<F, N>(f: F) -> Self
    where
        F: Fn() -> N + Send + Sync + 'static,
        N: Node + 'static,
    {
        Func {
            f: Box::new(move || Box::new(f()) as NodeBox),
        }
    }
}

impl Node for Func {
    fn render(&self, buf: &mut Vec<u8>) {
        (self.f)().render(buf);
    }

    fn is_dynamic(&self) -> bool {
        true
    }
}

/// Component producing a sequence of nodes, re-invoked on every render
pub struct Funcs {
    f: Box<NodesFn>,
}

impl Funcs {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Vec<NodeBox> + Send + Sync + 'static,
    {
        Funcs { f: Box::new(f) }
    }
}

impl Node for Funcs {
    fn render(&self, buf: &mut Vec<u8>) {
        for node in (self.f)() {
            node.render(buf);
        }
    }

    fn is_dynamic(&self) -> bool {
        true
    }
}

/// Conditional branch chosen when the tree is built
pub struct When {
    condition: bool,
    then: NodeBox,
    otherwise: Option<NodeBox>,
}

impl When {
    /// Render `then` only when `condition` holds
    pub fn new(condition: bool, then: impl Node + 'static) -> Self {
        When {
            condition,
            then: Box::new(then),
            otherwise: None,
        }
    }

    /// Render `otherwise` when the condition does not hold
    pub fn otherwise(mut self, node: impl Node + 'static) -> Self {
        self.otherwise = Some(Box::new(node));
        self
    }

    fn branch(&self) -> Option<&NodeBox> {
        if self.condition {
            Some(&self.then)
        } else {
            self.otherwise.as_ref()
        }
    }
}

impl Node for When {
    fn render(&self, buf: &mut Vec<u8>) {
        if let Some(node) = self.branch() {
            node.render(buf);
        }
    }

    fn is_dynamic(&self) -> bool {
        true
    }
}
