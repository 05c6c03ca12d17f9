//! RustyJIT - Compiled rendering for node trees
//!
//! Strategies:
//! A: Plan compiler (Compiler, compile) - static runs frozen, dynamic nodes by path
//! B: Adaptive tuner (Tuner, tune) - live tree walk, learned buffer sizes
//! C: Flattener (Flattener, flatten) - static-only, pre-rendered once
//! D: Parallel (validate_parallel, render_parallel) - many trees, one plan
//!
//! ```
//! use rustyjit::node::{dynamic_text, element, static_text};
//!
//! let page = |name: &str| element("p", vec![static_text("Hi "), dynamic_text(name)]);
//! assert_eq!(rustyjit::compile("greeting", page("Ann").as_ref()), b"<p>Hi Ann</p>");
//! assert_eq!(rustyjit::compile("greeting", page("Bo").as_ref()), b"<p>Hi Bo</p>");
//! ```

pub mod buffer;
pub mod compiler;
pub mod config;
pub mod error;
pub mod node;
pub mod plan;
pub mod registry;
pub mod sizer;
pub mod strategy;

pub use compiler::Compiler;
pub use config::{CompilerConfig, SizerConfig};
pub use error::{JitError, Result};
pub use node::{Node, NodeBox};
pub use plan::{CompiledElement, DynamicPath, ExecutionPlan, StaticContent};
pub use registry::{
    compile, compile_config, compile_to, flatten, flatten_to, reset_compile, reset_flatten,
    reset_tune, tune, tune_config, tune_to, Registry,
};
pub use sizer::{AdaptiveSizer, Phase, Snapshot};
pub use strategy::parallel::{render_parallel, validate_all, validate_parallel};
pub use strategy::{Flattener, Tuner};
