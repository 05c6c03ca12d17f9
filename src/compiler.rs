//! Plan Compiler
//!
//! Builds an execution plan from the first tree it renders, then replays
//! that plan for every later render. Static content (including attributes
//! of walked elements) is frozen from the first call; dynamic content is
//! re-evaluated from the tree passed to each call.
//!
//! ```
//! use rustyjit::node::{dynamic_text, element, static_text};
//! use rustyjit::Compiler;
//!
//! let compiler = Compiler::new();
//! let alice = compiler.render(element("div", vec![static_text("Hello "), dynamic_text("Alice")]).as_ref());
//! let bob = compiler.render(element("div", vec![static_text("Hello "), dynamic_text("Bob")]).as_ref());
//! assert_eq!(alice, b"<div>Hello Alice</div>");
//! assert_eq!(bob, b"<div>Hello Bob</div>");
//! ```

use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use crate::buffer::{self, BufferPool};
use crate::config::CompilerConfig;
use crate::error::Result;
use crate::node::Node;
use crate::plan::{self, ExecutionPlan};
use crate::sizer::{deviates, AdaptiveSizer};

/// Compiles a tree shape once and renders it many times
#[derive(Debug)]
pub struct Compiler {
    /// Built exactly once; concurrent first callers wait for the build
    plan: OnceLock<ExecutionPlan>,
    sizer: AdaptiveSizer,
    /// Deviation (percent) before a render size is fed to the sizer
    update_threshold_pct: AtomicU32,
    /// Source of scratch buffers for compile and `render_to`
    pool: &'static BufferPool,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Create a compiler with default settings (15% update threshold)
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Compiler {
            plan: OnceLock::new(),
            sizer: AdaptiveSizer::with_config(config.sizer),
            update_threshold_pct: AtomicU32::new(config.update_threshold_pct),
            pool: buffer::global(),
        }
    }

    /// Draw scratch buffers from `pool` instead of the process-wide pool
    pub fn with_buffer_pool(mut self, pool: &'static BufferPool) -> Self {
        self.pool = pool;
        self
    }

    /// Update sizing behaviour; an existing plan is kept
    pub fn configure(&self, config: CompilerConfig) -> &Self {
        self.update_threshold_pct
            .store(config.update_threshold_pct, Ordering::Relaxed);
        self.sizer.configure(config.sizer);
        self
    }

    pub fn config(&self) -> CompilerConfig {
        CompilerConfig {
            update_threshold_pct: self.update_threshold_pct.load(Ordering::Relaxed),
            sizer: self.sizer.config(),
        }
    }

    /// The compiled plan, if a render has happened
    pub fn plan(&self) -> Option<&ExecutionPlan> {
        self.plan.get()
    }

    pub fn is_compiled(&self) -> bool {
        self.plan.get().is_some()
    }

    pub fn sizer(&self) -> &AdaptiveSizer {
        &self.sizer
    }

    /// Render `root`, building the plan on first use
    pub fn render(&self, root: &dyn Node) -> Vec<u8> {
        let plan = self.plan_for(root);
        let predicted = self.sizer.baseline();

        let mut out = Vec::with_capacity(predicted);
        plan.execute(root, &mut out);
        self.observe(predicted, out.len());
        out
    }

    /// Render `root` into `w` through a pooled buffer
    ///
    /// The buffer is returned to the pool before this returns, whether or
    /// not the write succeeds. Write errors are handed back untouched.
    pub fn render_to<W: Write + ?Sized>(&self, root: &dyn Node, w: &mut W) -> io::Result<()> {
        let plan = self.plan_for(root);
        let predicted = self.sizer.baseline();

        let mut buf = self.pool.get(predicted);
        plan.execute(root, &mut buf);
        self.observe(predicted, buf.len());
        w.write_all(&buf)
    }

    /// Check that `root` resolves every dynamic path of the plan
    ///
    /// Succeeds trivially before the first render. Never called by render.
    pub fn validate(&self, root: &dyn Node) -> Result<()> {
        match self.plan.get() {
            Some(plan) => plan::validate(plan, root),
            None => Ok(()),
        }
    }

    fn plan_for(&self, root: &dyn Node) -> &ExecutionPlan {
        self.plan.get_or_init(|| self.compile(root))
    }

    /// Build the plan and seed the sizer with one real output size
    fn compile(&self, root: &dyn Node) -> ExecutionPlan {
        let plan = plan::build(root);

        let mut buf = self.pool.get(plan.static_len());
        plan.execute(root, &mut buf);
        self.sizer.update(buf.len());

        plan
    }

    /// Feed the sizer only on significant prediction misses
    #[inline]
    fn observe(&self, predicted: usize, actual: usize) {
        if predicted == 0
            || deviates(
                predicted,
                actual,
                self.update_threshold_pct.load(Ordering::Relaxed),
            )
        {
            self.sizer.update(actual);
        }
    }
}
