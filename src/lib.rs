//! conjgrad: preconditioned conjugate gradient over abstract operators
//!
//! This crate solves symmetric positive-(semi)definite systems A·x = b where `A` is only available as
//! an operator `v ↦ A·v`. The inner product and preconditioner are injected the same way. Every
//! numerical outcome, including breakdown on negative curvature, is reported as a `TerminationStatus`.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use crate::config::*;
pub use crate::context::*;
pub use crate::core::*;
pub use crate::error::*;
pub use crate::solver::*;
pub use crate::utils::*;
