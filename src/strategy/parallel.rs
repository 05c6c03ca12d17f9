//! Parallel Validation and Rendering
//!
//! Uses Rayon to check or render many trees against one compiler. The
//! compiler is shared; each tree is handled on its own worker.

use rayon::prelude::*;

use crate::compiler::Compiler;
use crate::error::Result;
use crate::node::Node;

/// Validate every candidate tree against the compiler's plan
///
/// Results are returned in input order.
pub fn validate_parallel<N>(compiler: &Compiler, candidates: &[N]) -> Vec<Result<()>>
where
    N: Node,
{
    candidates
        .par_iter()
        .map(|candidate| compiler.validate(candidate))
        .collect()
}

/// Validate every candidate, failing on the first mismatch found
pub fn validate_all<N>(compiler: &Compiler, candidates: &[N]) -> Result<()>
where
    N: Node,
{
    candidates
        .par_iter()
        .try_for_each(|candidate| compiler.validate(candidate))
}

/// Render every tree, in input order
///
/// The plan is built from whichever tree reaches the compiler first, so
/// all trees should share one shape.
pub fn render_parallel<N>(compiler: &Compiler, roots: &[N]) -> Vec<Vec<u8>>
where
    N: Node,
{
    roots.par_iter().map(|root| compiler.render(root)).collect()
}
