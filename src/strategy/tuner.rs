//! Adaptive Tuner
//!
//! Renders the live tree directly (no plan) but sizes every output buffer
//! from an [`AdaptiveSizer`]. Suited to content whose shape changes between
//! renders, where a compiled plan would not apply.

use std::io::{self, Write};

use crate::buffer;
use crate::config::SizerConfig;
use crate::node::Node;
use crate::sizer::AdaptiveSizer;

/// Size-only adaptive renderer
#[derive(Debug, Default)]
pub struct Tuner {
    sizer: AdaptiveSizer,
}

impl Tuner {
    /// Create a tuner with default sizing (5 samples, 20%, 115%)
    pub fn new() -> Self {
        Tuner {
            sizer: AdaptiveSizer::new(),
        }
    }

    pub fn with_config(config: SizerConfig) -> Self {
        Tuner {
            sizer: AdaptiveSizer::with_config(config),
        }
    }

    /// Replace sizing parameters and restart sampling
    pub fn configure(&self, config: SizerConfig) -> &Self {
        self.sizer.configure(config);
        self
    }

    /// Discard learned sizes and restart sampling
    pub fn reset(&self) -> &Self {
        self.sizer.reset();
        self
    }

    pub fn sizer(&self) -> &AdaptiveSizer {
        &self.sizer
    }

    /// Render `root` into a buffer sized from the current baseline
    pub fn render(&self, root: &dyn Node) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.sizer.baseline());
        root.render(&mut out);
        self.sizer.update(out.len());
        out
    }

    /// Render `root` into `w` through a pooled buffer
    pub fn render_to<W: Write + ?Sized>(&self, root: &dyn Node, w: &mut W) -> io::Result<()> {
        let mut buf = buffer::get(self.sizer.baseline());
        root.render(&mut buf);
        self.sizer.update(buf.len());
        w.write_all(&buf)
    }
}
