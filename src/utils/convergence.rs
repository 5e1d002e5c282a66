//! Convergence tracking & termination checks for the CG iteration.

use std::fmt;

use num_traits::Float;

/// Terminal outcome of one solve. Exactly one is produced per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminationStatus {
    /// ‖r‖₂ < tol
    AbsoluteToleranceReached,
    /// ‖r‖₁ ≤ rtol·‖b‖₁·min(√‖b‖₁, 0.5)
    RelativeToleranceReached,
    /// 0 ≤ ⟨p, Ap⟩ ≤ 3ε
    CurvatureConverged,
    /// ⟨p, Ap⟩ < 0
    CurvatureNegative,
    /// The iteration cap was hit.
    MaxIterationsReached,
}

impl TerminationStatus {
    /// Stable numeric code, 0 through 4 in declaration order.
    pub fn code(self) -> u8 {
        match self {
            Self::AbsoluteToleranceReached => 0,
            Self::RelativeToleranceReached => 1,
            Self::CurvatureConverged => 2,
            Self::CurvatureNegative => 3,
            Self::MaxIterationsReached => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::AbsoluteToleranceReached),
            1 => Some(Self::RelativeToleranceReached),
            2 => Some(Self::CurvatureConverged),
            3 => Some(Self::CurvatureNegative),
            4 => Some(Self::MaxIterationsReached),
            _ => None,
        }
    }

    /// True when one of the residual tolerances was met.
    ///
    /// `CurvatureConverged` is a normal stop but not a solution: the search
    /// direction lost its curvature, so the residual may still be large.
    pub fn is_converged(self) -> bool {
        matches!(self, Self::AbsoluteToleranceReached | Self::RelativeToleranceReached)
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::AbsoluteToleranceReached => "Absolute tolerance reached",
            Self::RelativeToleranceReached => "Relative tolerance reached",
            Self::CurvatureConverged => "Curvature has converged",
            Self::CurvatureNegative => "Curvature is negative",
            Self::MaxIterationsReached => "Maximum iterations reached",
        };
        f.write_str(msg)
    }
}

/// Sign class of the curvature ⟨p, Ap⟩.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curvature {
    /// Safe to divide by.
    Positive,
    /// Within `[0, 3ε]`.
    Converged,
    Negative,
}

/// Stopping criteria.
#[derive(Clone, Debug)]
pub struct Convergence<T> {
    /// Absolute tolerance on ‖r‖₂.
    pub tol: T,
    /// Relative factor applied to ‖b‖₁.
    pub rtol: T,
    /// Iteration cap; `None` means 20·N.
    pub max_iters: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    /// ‖r‖₂ at exit.
    pub final_residual: T,
    pub status: TerminationStatus,
    pub converged: bool,
}

impl<T: Float> Convergence<T> {
    /// Iteration cap for a system of dimension `n`.
    pub fn max_iters_for(&self, n: usize) -> usize {
        self.max_iters.unwrap_or(20 * n)
    }

    /// Relative threshold `rtol · ‖b‖₁ · clamp(√‖b‖₁, 0, 0.5)`.
    pub fn termcond(&self, b_norm1: T) -> T {
        let half = num_traits::cast::<f64, T>(0.5).unwrap_or_else(T::one);
        let factor = b_norm1.sqrt().max(T::zero()).min(half);
        self.rtol * b_norm1 * factor
    }

    /// Residual-based stop test, absolute first.
    pub fn check_residual(&self, r_norm2: T, r_norm1: T, termcond: T) -> Option<TerminationStatus> {
        if r_norm2 < self.tol {
            Some(TerminationStatus::AbsoluteToleranceReached)
        } else if r_norm1 <= termcond {
            Some(TerminationStatus::RelativeToleranceReached)
        } else {
            None
        }
    }

    /// Classifies the curvature against the `[0, 3ε]` band.
    ///
    /// NaN lands in `Positive`: it is neither inside the band nor below zero.
    pub fn classify_curvature(&self, curv: T) -> Curvature {
        let three = num_traits::cast::<f64, T>(3.0).unwrap_or_else(|| T::one() + T::one() + T::one());
        if curv >= T::zero() && curv <= three * T::epsilon() {
            Curvature::Converged
        } else if curv < T::zero() {
            Curvature::Negative
        } else {
            Curvature::Positive
        }
    }
}
