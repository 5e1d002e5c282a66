//! Solver interfaces.

use crate::utils::convergence::SolveStats;

/// Common interface for iterative solvers over an operator `A` and preconditioner `P`.
pub trait LinearSolver<A: ?Sized, P: ?Sized, V> {
    type Error;
    type Scalar: Copy + PartialOrd;
    /// Solve A·x = b, reading the initial guess from `x` and writing the result into it.
    /// Returns iteration stats (including the termination status).
    fn solve(
        &mut self,
        a: &A,
        pc: &P,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<Self::Scalar>, Self::Error>;
}

pub mod cg;
pub use cg::{CgSolution, CgSolver, conjgrad, conjgrad_with_info};
