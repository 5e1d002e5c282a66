//! Runtime-configured CG solves.
//!
//! `CgContext` collects the capabilities of a solve as trait objects, so that
//! the operator, preconditioner and inner product can be chosen at runtime
//! (for instance from parsed options) instead of being fixed by generic
//! parameters.
//!
//! # Usage
//!
//! 1. Construct a `CgContext` from `CgOptions`.
//! 2. Set the operator, and optionally a preconditioner and inner product.
//! 3. Call `solve_context` to solve `A x = b`.

use crate::config::options::CgOptions;
use crate::core::traits::{EuclideanInner, Identity, InnerProduct, LinearOperator, Preconditioner, Vector};
use crate::error::CgError;
use crate::solver::cg::{CgSolution, CgSolver};

/// Capabilities and options for a CG solve.
pub struct CgContext<V: Vector> {
    /// The operator `A`; required.
    pub op: Option<Box<dyn LinearOperator<V>>>,
    /// `M⁻¹`; identity when unset.
    pub pc: Option<Box<dyn Preconditioner<V>>>,
    /// Euclidean when unset.
    pub ip: Option<Box<dyn InnerProduct<V>>>,
    pub options: CgOptions,
}

impl<V: Vector + 'static> CgContext<V> {
    pub fn new(options: CgOptions) -> Self {
        Self { op: None, pc: None, ip: None, options }
    }

    pub fn set_operator(&mut self, op: impl LinearOperator<V> + 'static) -> &mut Self {
        self.op = Some(Box::new(op));
        self
    }

    pub fn set_preconditioner(&mut self, pc: impl Preconditioner<V> + 'static) -> &mut Self {
        self.pc = Some(Box::new(pc));
        self
    }

    pub fn set_inner_product(&mut self, ip: impl InnerProduct<V> + 'static) -> &mut Self {
        self.ip = Some(Box::new(ip));
        self
    }

    /// Solve `A x = b` starting from `x0` (zero when `None`).
    ///
    /// # Returns
    /// * `Ok(CgSolution)` for every numerical outcome
    /// * `Err(CgError::Configuration)` if no operator was set
    /// * `Err(CgError::InvalidInput)` if `x0` and `b` differ in dimension
    pub fn solve_context(&self, b: &V, x0: Option<&V>) -> Result<CgSolution<V, V::Scalar>, CgError> {
        let op = self
            .op
            .as_deref()
            .ok_or(CgError::Configuration("no operator set; call set_operator before solving"))?;
        let solver = CgSolver::<V::Scalar>::from_options(&self.options)?;
        match (&self.ip, &self.pc) {
            (Some(ip), Some(pc)) => solver.with_inner_product(&**ip).solve_from(op, &**pc, b, x0),
            (Some(ip), None) => solver.with_inner_product(&**ip).solve_from(op, &Identity, b, x0),
            (None, Some(pc)) => solver.with_inner_product(EuclideanInner).solve_from(op, &**pc, b, x0),
            (None, None) => solver.with_inner_product(EuclideanInner).solve_from(op, &Identity, b, x0),
        }
    }
}
