//! Preconditioned Conjugate Gradient with curvature-aware termination.
//!
//! Solves A·x = b for a symmetric positive-(semi)definite operator `A` that is only
//! available through its action `v ↦ A·v`. Each pass first tests the residual
//! (absolute ‖r‖₂, then relative ‖r‖₁), then the curvature ⟨p, Ap⟩:
//!
//! ```text
//! r = b - A x0   (r = b when no initial guess)
//! z = M⁻¹ r;  p = z;  rs = ⟨r, z⟩
//! loop while k < max_iters:
//!     ‖r‖₂ < tol            -> AbsoluteToleranceReached
//!     ‖r‖₁ ≤ termcond       -> RelativeToleranceReached
//!     Ap = A p;  curv = ⟨p, Ap⟩
//!     0 ≤ curv ≤ 3ε         -> CurvatureConverged
//!     curv < 0              -> CurvatureNegative (k = 0: x = -(rs/curv)·b)
//!     α = rs / curv;  x += α p;  r -= α Ap
//!     z = M⁻¹ r;  rs' = ⟨r, z⟩;  p = z + (rs'/rs) p;  rs = rs'
//! MaxIterationsReached
//! ```
//!
//! with `termcond = rtol · ‖b‖₁ · min(√‖b‖₁, 0.5)`.
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM. §9.2
//! - Shewchuk, J. R. (1994). An Introduction to the Conjugate Gradient Method Without the Agonizing Pain.

use tracing::info;

use crate::config::options::{CgOptions, Verbosity};
use crate::core::traits::{EuclideanInner, Identity, InnerProduct, LinearOperator, Preconditioner, Vector};
use crate::error::CgError;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, Curvature, SolveStats, TerminationStatus};

/// Solution vector plus the diagnostics of the solve that produced it.
#[derive(Clone, Debug)]
pub struct CgSolution<V, T> {
    pub x: V,
    pub stats: SolveStats<T>,
}

impl<V, T> CgSolution<V, T> {
    pub fn iterations(&self) -> usize {
        self.stats.iterations
    }

    pub fn status(&self) -> TerminationStatus {
        self.stats.status
    }

    /// Drops the diagnostics.
    pub fn into_x(self) -> V {
        self.x
    }
}

/// CG solver configured with stopping criteria, reporting level and inner product.
pub struct CgSolver<T, I = EuclideanInner> {
    pub conv: Convergence<T>,
    pub verbosity: Verbosity,
    pub inner: I,
    pub monitor: Option<Box<dyn FnMut(usize, T)>>,
    /// `rs` after every completed iteration of the most recent solve, index 0
    /// holding the initial value. Reset at the start of each solve.
    pub rs_history: Vec<T>,
}

impl<T: num_traits::Float> CgSolver<T, EuclideanInner> {
    /// Solver with the Euclidean inner product, `rtol = 0.1` and the default 20·N cap.
    pub fn new(tol: T) -> Self {
        let rtol = num_traits::cast::<f64, T>(1e-1).unwrap_or_else(T::zero);
        Self {
            conv: Convergence { tol, rtol, max_iters: None },
            verbosity: Verbosity::Silent,
            inner: EuclideanInner,
            monitor: None,
            rs_history: Vec::new(),
        }
    }

    pub fn from_options(opts: &CgOptions) -> Result<Self, CgError> {
        let mut solver = Self::new(T::zero());
        solver.conv = opts.convergence()?;
        solver.verbosity = opts.verbosity;
        Ok(solver)
    }
}

impl<T: num_traits::Float, I> CgSolver<T, I> {
    pub fn with_rtol(mut self, rtol: T) -> Self {
        self.conv.rtol = rtol;
        self
    }
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.conv.max_iters = Some(max_iters);
        self
    }
    pub fn with_verbosity(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.verbosity = verbosity.into();
        self
    }
    /// Replaces the inner product used for `rs` and the curvature.
    pub fn with_inner_product<J>(self, inner: J) -> CgSolver<T, J> {
        CgSolver {
            conv: self.conv,
            verbosity: self.verbosity,
            inner,
            monitor: self.monitor,
            rs_history: self.rs_history,
        }
    }
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where F: FnMut(usize, T) + 'static {
        self.monitor = Some(Box::new(f));
        self
    }
    pub fn clear_history(&mut self) {
        self.rs_history.clear();
    }

    /// Runs the iteration from `x0` (zero when `None`).
    ///
    /// Only a dimension mismatch between `x0` and `b`, or a failing
    /// preconditioner, is an error; every numerical outcome is a
    /// [`TerminationStatus`] in the returned stats.
    pub fn solve_from<V, A, P>(
        &mut self,
        a: &A,
        pc: &P,
        b: &V,
        x0: Option<&V>,
    ) -> Result<CgSolution<V, T>, CgError>
    where
        V: Vector<Scalar = T>,
        A: LinearOperator<V> + ?Sized,
        P: Preconditioner<V> + ?Sized,
        I: InnerProduct<V>,
    {
        let n = b.len();
        if let Some(x0) = x0 {
            if x0.len() != n {
                return Err(CgError::InvalidInput(format!(
                    "initial guess has dimension {}, right-hand side has {}",
                    x0.len(),
                    n
                )));
            }
        }
        let max_iters = self.conv.max_iters_for(n);
        let termcond = self.conv.termcond(b.norm1());

        let (mut x, mut r) = match x0 {
            Some(x0) => {
                let mut ax = b.zeros_like();
                a.apply(x0, &mut ax);
                let mut r = b.clone();
                r.axpy(-T::one(), &ax);
                (x0.clone(), r)
            }
            None => (b.zeros_like(), b.clone()),
        };
        let mut z = b.zeros_like();
        pc.apply(&r, &mut z)?;
        let mut p = z.clone();
        let mut ap = b.zeros_like();
        let mut rs = self.inner.dot(&r, &z);
        self.rs_history.clear();
        self.rs_history.push(rs);
        let mut k = 0usize;

        let status = loop {
            if k >= max_iters {
                break TerminationStatus::MaxIterationsReached;
            }
            if let Some(status) = self.conv.check_residual(r.norm2(), r.norm1(), termcond) {
                break status;
            }
            a.apply(&p, &mut ap);
            let curv = self.inner.dot(&p, &ap);
            match self.conv.classify_curvature(curv) {
                Curvature::Converged => break TerminationStatus::CurvatureConverged,
                Curvature::Negative => {
                    if k == 0 {
                        // steepest-descent fallback, scaled onto b
                        x.copy_from(b);
                        x.scale(-(rs / curv));
                    }
                    break TerminationStatus::CurvatureNegative;
                }
                Curvature::Positive => {}
            }
            let alpha = rs / curv;
            x.axpy(alpha, &p);
            r.axpy(-alpha, &ap);
            pc.apply(&r, &mut z)?;
            let rs_new = self.inner.dot(&r, &z);
            // rs = 0 with r ≠ 0 only happens for a singular preconditioner; restart along z.
            let beta = if rs == T::zero() { T::zero() } else { rs_new / rs };
            p.aypx(beta, &z);
            rs = rs_new;
            k += 1;
            self.rs_history.push(rs);
            if let Some(ref mut monitor) = self.monitor {
                monitor(k, rs);
            }
            if self.verbosity >= Verbosity::Iterations {
                let rs = rs.to_f64().unwrap_or(f64::NAN);
                info!(iter = k, rs, "iter: {} - rs: {:.4}", k, rs);
            }
        };

        if self.verbosity >= Verbosity::Summary {
            info!(status = status.code(), iterations = k, "ConjGrad: {}", status);
        }
        let stats = SolveStats {
            iterations: k,
            final_residual: r.norm2(),
            status,
            converged: status.is_converged(),
        };
        Ok(CgSolution { x, stats })
    }

    /// [`solve_from`](Self::solve_from) with the identity preconditioner.
    pub fn solve_unpreconditioned<V, A>(
        &mut self,
        a: &A,
        b: &V,
        x0: Option<&V>,
    ) -> Result<CgSolution<V, T>, CgError>
    where
        V: Vector<Scalar = T>,
        A: LinearOperator<V> + ?Sized,
        I: InnerProduct<V>,
    {
        self.solve_from(a, &Identity, b, x0)
    }
}

impl<A, P, V, T, I> LinearSolver<A, P, V> for CgSolver<T, I>
where
    A: LinearOperator<V> + ?Sized,
    P: Preconditioner<V> + ?Sized,
    V: Vector<Scalar = T>,
    T: num_traits::Float,
    I: InnerProduct<V>,
{
    type Error = CgError;
    type Scalar = T;

    /// `x` is the initial guess on entry and the final iterate on exit.
    fn solve(&mut self, a: &A, pc: &P, b: &V, x: &mut V) -> Result<SolveStats<T>, CgError> {
        let solution = self.solve_from(a, pc, b, Some(&*x))?;
        *x = solution.x;
        Ok(solution.stats)
    }
}

/// Solves A·x = b from a zero guess with the Euclidean inner product and no
/// preconditioner, returning only `x`.
pub fn conjgrad<V, A>(a: &A, b: &V, opts: &CgOptions) -> Result<V, CgError>
where
    V: Vector,
    A: LinearOperator<V> + ?Sized,
{
    conjgrad_with_info(a, b, opts).map(CgSolution::into_x)
}

/// Like [`conjgrad`] but also returns the iteration count and termination status.
pub fn conjgrad_with_info<V, A>(a: &A, b: &V, opts: &CgOptions) -> Result<CgSolution<V, V::Scalar>, CgError>
where
    V: Vector,
    A: LinearOperator<V> + ?Sized,
{
    CgSolver::<V::Scalar>::from_options(opts)?.solve_unpreconditioned(a, b, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::FnOperator;
    use std::cell::Cell;
    use std::rc::Rc;

    // Simple dense matrix type for testing
    struct DenseMat {
        data: Vec<Vec<f64>>,
    }
    impl LinearOperator<Vec<f64>> for DenseMat {
        fn apply(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for (i, row) in self.data.iter().enumerate() {
                y[i] = row.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
            }
        }
    }

    #[test]
    fn cg_solves_simple_spd() {
        // SPD system: [[4,1],[1,3]] x = [1,2]
        let a = DenseMat { data: vec![vec![4.0, 1.0], vec![1.0, 3.0]] };
        let b = vec![1.0, 2.0];
        let mut solver = CgSolver::new(1e-12).with_rtol(0.0);
        let sol = solver.solve_unpreconditioned(&a, &b, None).unwrap();
        let expected = vec![1.0 / 11.0, 7.0 / 11.0];
        for (xi, ei) in sol.x.iter().zip(expected.iter()) {
            assert!((xi - ei).abs() < 1e-10, "xi = {}, expected = {}", xi, ei);
        }
        assert!(sol.iterations() <= 2, "took {} iterations", sol.iterations());
        assert!(matches!(
            sol.status(),
            TerminationStatus::AbsoluteToleranceReached | TerminationStatus::RelativeToleranceReached
        ));
    }

    #[test]
    fn zero_max_iters_returns_initial_guess() {
        let a = DenseMat { data: vec![vec![4.0, 1.0], vec![1.0, 3.0]] };
        let b = vec![1.0, 2.0];
        let x0 = vec![0.3, -0.7];
        let mut solver = CgSolver::new(1e-12).with_max_iters(0);
        let sol = solver.solve_unpreconditioned(&a, &b, Some(&x0)).unwrap();
        assert_eq!(sol.x, x0);
        assert_eq!(sol.iterations(), 0);
        assert_eq!(sol.status(), TerminationStatus::MaxIterationsReached);

        let sol = solver.solve_unpreconditioned(&a, &b, None).unwrap();
        assert_eq!(sol.x, vec![0.0, 0.0]);
        assert_eq!(sol.status(), TerminationStatus::MaxIterationsReached);
    }

    #[test]
    fn mismatched_initial_guess_is_rejected_before_apply() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let a = FnOperator(move |x: &Vec<f64>, y: &mut Vec<f64>| {
            counter.set(counter.get() + 1);
            y.copy_from_slice(x);
        });
        let mut solver = CgSolver::new(1e-10);
        let err = solver
            .solve_unpreconditioned(&a, &vec![1.0, 2.0], Some(&vec![0.0; 3]))
            .unwrap_err();
        assert!(matches!(err, CgError::InvalidInput(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn zero_operator_reports_converged_curvature() {
        let a = FnOperator(|_: &Vec<f64>, y: &mut Vec<f64>| y.iter_mut().for_each(|yi| *yi = 0.0));
        let mut solver = CgSolver::new(1e-10);
        let sol = solver.solve_unpreconditioned(&a, &vec![1.0, 1.0], None).unwrap();
        assert_eq!(sol.status(), TerminationStatus::CurvatureConverged);
        assert_eq!(sol.iterations(), 0);
        assert_eq!(sol.x, vec![0.0, 0.0]);
        // vanished curvature stops the iteration but x does not solve A·x = b
        assert!(!sol.stats.converged);
    }

    #[test]
    fn monitor_and_history_track_rs() {
        let a = DenseMat { data: vec![vec![4.0, 1.0], vec![1.0, 3.0]] };
        let seen = Rc::new(Cell::new(0usize));
        let seen_in = seen.clone();
        let mut solver = CgSolver::new(1e-12)
            .with_rtol(0.0)
            .with_monitor(move |k, _rs| seen_in.set(k));
        let sol = solver.solve_unpreconditioned(&a, &vec![1.0, 2.0], None).unwrap();
        assert_eq!(seen.get(), sol.iterations());
        assert_eq!(solver.rs_history.len(), sol.iterations() + 1);
        assert_eq!(solver.rs_history[0], 5.0);
        solver.clear_history();
        assert!(solver.rs_history.is_empty());
    }

    #[test]
    fn history_covers_only_the_latest_solve() {
        let a = DenseMat { data: vec![vec![4.0, 1.0], vec![1.0, 3.0]] };
        let mut solver = CgSolver::new(1e-12).with_rtol(0.0);
        let first = solver.solve_unpreconditioned(&a, &vec![3.0, -1.0], None).unwrap();
        assert_eq!(solver.rs_history.len(), first.iterations() + 1);
        assert_eq!(solver.rs_history[0], 10.0);

        let second = solver.solve_unpreconditioned(&a, &vec![1.0, 2.0], None).unwrap();
        assert_eq!(solver.rs_history.len(), second.iterations() + 1);
        assert_eq!(solver.rs_history[0], 5.0);
    }
}
