//! Helpers shared by the solver: termination logic and statistics.

pub mod convergence;

pub use convergence::{Convergence, Curvature, SolveStats, TerminationStatus};
