//! Text leaves

use super::escape::escape_into;
use super::Node;

/// Text leaf node
///
/// Static text is frozen into the plan at compile time; dynamic text is
/// re-rendered from the current tree on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    content: String,
    dynamic: bool,
    raw: bool,
}

impl Text {
    /// Static text, escaped on output
    pub fn new(content: impl Into<String>) -> Self {
        Text {
            content: content.into(),
            dynamic: false,
            raw: false,
        }
    }

    /// Dynamic text, escaped on output
    pub fn dynamic(content: impl Into<String>) -> Self {
        Text {
            content: content.into(),
            dynamic: true,
            raw: false,
        }
    }

    /// Static text written verbatim (caller guarantees it is safe markup)
    pub fn raw(content: impl Into<String>) -> Self {
        Text {
            content: content.into(),
            dynamic: false,
            raw: true,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Node for Text {
    fn render(&self, buf: &mut Vec<u8>) {
        if self.raw {
            buf.extend_from_slice(self.content.as_bytes());
        } else {
            escape_into(&self.content, buf);
        }
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}
