//! Element and Fragment containers

use std::borrow::Cow;

use super::escape::escape_into;
use super::{Node, NodeBox, Wrapping};

/// Elements rendered without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Tagged element with attributes and children
///
/// Attribute values are written as part of the opening tag. When the
/// element is not dynamic and sits above a dynamic descendant, the opening
/// tag is frozen into the plan on the first render, so per-call attribute
/// values are not picked up. Mark such elements with [`Element::dynamic`]
/// to have them re-rendered every time.
pub struct Element {
    tag: Cow<'static, str>,
    attributes: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    children: Vec<NodeBox>,
    dynamic: bool,
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            dynamic: false,
        }
    }

    /// Add an attribute (value is escaped on output)
    pub fn attr(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append a child
    pub fn child(mut self, node: impl Node + 'static) -> Self {
        self.children.push(Box::new(node));
        self
    }

    /// Append several boxed children
    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeBox>) -> Self {
        self.children.extend(children);
        self
    }

    /// Re-render this element (tags, attributes and subtree) on every render
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    fn is_void(&self) -> bool {
        self.children.is_empty() && VOID_ELEMENTS.contains(&&*self.tag)
    }
}

impl Wrapping for Element {
    fn render_open(&self, buf: &mut Vec<u8>) {
        buf.push(b'<');
        buf.extend_from_slice(self.tag.as_bytes());
        for (name, value) in &self.attributes {
            buf.push(b' ');
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b"=\"");
            escape_into(value, buf);
            buf.push(b'"');
        }
        buf.push(b'>');
    }

    fn render_close(&self, buf: &mut Vec<u8>) {
        if self.is_void() {
            return;
        }
        buf.extend_from_slice(b"</");
        buf.extend_from_slice(self.tag.as_bytes());
        buf.push(b'>');
    }
}

impl Node for Element {
    fn render(&self, buf: &mut Vec<u8>) {
        self.render_open(buf);
        for child in &self.children {
            child.render(buf);
        }
        self.render_close(buf);
    }

    fn children(&self) -> &[NodeBox] {
        &self.children
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    fn as_wrapping(&self) -> Option<&dyn Wrapping> {
        Some(self)
    }
}

/// Container that renders its children with no wrapping tag
#[derive(Default)]
pub struct Fragment {
    children: Vec<NodeBox>,
}

impl Fragment {
    pub fn new(children: Vec<NodeBox>) -> Self {
        Fragment { children }
    }
}

impl Node for Fragment {
    fn render(&self, buf: &mut Vec<u8>) {
        for child in &self.children {
            child.render(buf);
        }
    }

    fn children(&self) -> &[NodeBox] {
        &self.children
    }
}
