//! Static Flattener
//!
//! Pre-renders a fully static tree once and serves the frozen bytes. No
//! rendering logic runs after construction.

use std::io::{self, Write};
use std::sync::Arc;

use crate::error::{JitError, Result};
use crate::node::{contains_dynamic, render_to_vec, Node};

/// Pre-rendered static content
#[derive(Debug, Clone)]
pub struct Flattener {
    bytes: Arc<[u8]>,
}

impl Flattener {
    /// Render `root` once
    ///
    /// Fails with [`JitError::DynamicContent`] if any node in the tree is
    /// dynamic.
    pub fn new(root: &dyn Node) -> Result<Self> {
        if contains_dynamic(root) {
            return Err(JitError::DynamicContent);
        }
        Ok(Flattener {
            bytes: render_to_vec(root).into(),
        })
    }

    /// The frozen output
    #[inline]
    pub fn render(&self) -> &[u8] {
        &self.bytes
    }

    /// Write the frozen output to `w`
    pub fn render_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
