//! Node Contract
//!
//! The tree abstraction consumed by the plan compiler and the sizing
//! strategies. Every node renders itself into a byte buffer, exposes its
//! ordered children, and reports whether its output may change between
//! renders of the same tree shape.
//!
//! Concrete node kinds:
//! - Element: tag with attributes and children (open/close tags)
//! - Text: static, raw, or dynamic text leaf
//! - Fragment: children without a wrapping tag
//! - Func / Funcs: closures re-invoked on every render
//! - When: conditional branch chosen per render

pub mod element;
pub mod escape;
pub mod func;
pub mod text;

pub use element::{Element, Fragment};
pub use func::{Func, Funcs, When};
pub use text::Text;

/// Owned, type-erased node
pub type NodeBox = Box<dyn Node>;

/// A tree node capable of rendering its own output
pub trait Node: Send + Sync {
    /// Render the complete output of this node (and its subtree) into `buf`
    fn render(&self, buf: &mut Vec<u8>);

    /// Ordered children used for plan building and path resolution
    fn children(&self) -> &[NodeBox] {
        &[]
    }

    /// Whether this node's own output may differ between renders
    ///
    /// A container holding a dynamic child is not itself dynamic; only its
    /// subtree is. See [`contains_dynamic`].
    fn is_dynamic(&self) -> bool {
        false
    }

    /// Open/close tag access for nodes that wrap their children
    fn as_wrapping(&self) -> Option<&dyn Wrapping> {
        None
    }
}

/// Nodes that wrap their children in opening and closing bytes
pub trait Wrapping {
    /// Write the opening tag (including attributes)
    fn render_open(&self, buf: &mut Vec<u8>);

    /// Write the closing tag
    fn render_close(&self, buf: &mut Vec<u8>);
}

/// Check whether a node or any of its descendants is dynamic
pub fn contains_dynamic(node: &dyn Node) -> bool {
    node.is_dynamic() || node.children().iter().any(|c| contains_dynamic(c.as_ref()))
}

/// Render a node directly, without any compilation
pub fn render_to_vec(node: &dyn Node) -> Vec<u8> {
    let mut buf = Vec::new();
    node.render(&mut buf);
    buf
}

/// Boxed element with the given children
pub fn element(tag: &'static str, children: Vec<NodeBox>) -> NodeBox {
    Box::new(Element::new(tag).with_children(children))
}

/// Boxed fragment with the given children
pub fn fragment(children: Vec<NodeBox>) -> NodeBox {
    Box::new(Fragment::new(children))
}

/// Boxed static (escaped) text
pub fn static_text(content: impl Into<String>) -> NodeBox {
    Box::new(Text::new(content))
}

/// Boxed dynamic (escaped) text
pub fn dynamic_text(content: impl Into<String>) -> NodeBox {
    Box::new(Text::dynamic(content))
}

impl<N: Node + ?Sized> Node for Box<N> {
    fn render(&self, buf: &mut Vec<u8>) {
        (**self).render(buf)
    }

    fn children(&self) -> &[NodeBox] {
        (**self).children()
    }

    fn is_dynamic(&self) -> bool {
        (**self).is_dynamic()
    }

    fn as_wrapping(&self) -> Option<&dyn Wrapping> {
        (**self).as_wrapping()
    }
}
