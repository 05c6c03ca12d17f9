//! Rendering Strategies
//!
//! Lighter-weight consumers built around the core engines:
//! - Tuner: adaptive buffer sizing only, always walks the live tree
//! - Flattener: static-only pre-rendering, rejects dynamic content
//! - Parallel: validate or render many trees against one compiler (rayon)

pub mod flatten;
pub mod parallel;
pub mod tuner;

pub use flatten::Flattener;
pub use tuner::Tuner;
