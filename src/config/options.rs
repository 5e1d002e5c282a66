//! Command-line or API options for the CG solver.
//!
//! This module provides the `CgOptions` struct, which collects the numeric
//! controls of a solve: absolute and relative tolerances, the iteration cap,
//! and the verbosity level. Options can be built in code or parsed from
//! PETSc-style flags (`-cg_tol 1e-8 -cg_max_it 200 -cg_verbose 1`).

use crate::error::CgError;
use crate::utils::convergence::Convergence;

/// How much the solver reports through `tracing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Silent,
    /// Final status only.
    Summary,
    /// Final status plus one event per iteration.
    Iterations,
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        match level {
            0 => Verbosity::Silent,
            1 => Verbosity::Summary,
            _ => Verbosity::Iterations,
        }
    }
}

/// Solver controls.
#[derive(Clone, Debug, PartialEq)]
pub struct CgOptions {
    /// Absolute tolerance on ‖r‖₂
    pub tol: f64,

    /// Relative factor combined with ‖b‖₁
    pub rtol: f64,

    /// Iteration cap (20·N when unset)
    pub max_iters: Option<usize>,

    pub verbosity: Verbosity,
}

impl Default for CgOptions {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            rtol: 1e-1,
            max_iters: None,
            verbosity: Verbosity::Silent,
        }
    }
}

impl CgOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = Some(max_iters);
        self
    }
    pub fn with_verbosity(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.verbosity = verbosity.into();
        self
    }

    /// Rejects negative or NaN tolerances.
    pub fn validate(&self) -> Result<(), CgError> {
        if !(self.tol >= 0.0) {
            return Err(CgError::InvalidOption(format!("tol must be non-negative, got {}", self.tol)));
        }
        if !(self.rtol >= 0.0) {
            return Err(CgError::InvalidOption(format!("rtol must be non-negative, got {}", self.rtol)));
        }
        Ok(())
    }

    /// Parses `-cg_tol`, `-cg_rtol`, `-cg_max_it` and `-cg_verbose` from an
    /// argument list, starting from the defaults. Unknown flags are skipped.
    pub fn from_args<I, S>(args: I) -> Result<Self, CgError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();
        let mut it = args.into_iter();
        while let Some(flag) = it.next() {
            let flag = flag.as_ref();
            match flag {
                "-cg_tol" => opts.tol = parse_value(flag, it.next())?,
                "-cg_rtol" => opts.rtol = parse_value(flag, it.next())?,
                "-cg_max_it" => opts.max_iters = Some(parse_value(flag, it.next())?),
                "-cg_verbose" => opts.verbosity = Verbosity::from(parse_value::<u8, _>(flag, it.next())?),
                _ => {}
            }
        }
        opts.validate()?;
        Ok(opts)
    }

    /// Converts to the solver's stopping criteria for scalar type `T`.
    pub fn convergence<T: num_traits::Float>(&self) -> Result<Convergence<T>, CgError> {
        self.validate()?;
        let cast = |name: &str, v: f64| {
            num_traits::cast::<f64, T>(v).ok_or_else(|| CgError::InvalidOption(format!("{name} = {v} is not representable")))
        };
        Ok(Convergence {
            tol: cast("tol", self.tol)?,
            rtol: cast("rtol", self.rtol)?,
            max_iters: self.max_iters,
        })
    }
}

fn parse_value<V, S>(flag: &str, value: Option<S>) -> Result<V, CgError>
where
    V: std::str::FromStr,
    S: AsRef<str>,
{
    let value = value.ok_or_else(|| CgError::InvalidOption(format!("{flag} expects a value")))?;
    value
        .as_ref()
        .parse()
        .map_err(|_| CgError::InvalidOption(format!("{flag}: cannot parse '{}'", value.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let o = CgOptions::default();
        assert_eq!(o.tol, 1e-10);
        assert_eq!(o.rtol, 1e-1);
        assert_eq!(o.max_iters, None);
        assert_eq!(o.verbosity, Verbosity::Silent);
    }

    #[test]
    fn parses_petsc_style_flags() {
        let o = CgOptions::from_args(["-cg_tol", "1e-8", "-foo", "-cg_max_it", "50", "-cg_verbose", "3"]).unwrap();
        assert_eq!(o.tol, 1e-8);
        assert_eq!(o.max_iters, Some(50));
        assert_eq!(o.verbosity, Verbosity::Iterations);
        assert_eq!(o.rtol, 1e-1);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            CgOptions::from_args(["-cg_tol", "abc"]),
            Err(CgError::InvalidOption(_))
        ));
        assert!(matches!(CgOptions::from_args(["-cg_rtol"]), Err(CgError::InvalidOption(_))));
        assert!(matches!(
            CgOptions::from_args(["-cg_tol", "-1"]),
            Err(CgError::InvalidOption(_))
        ));
        assert!(CgOptions::new().with_rtol(f64::NAN).validate().is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(Verbosity::from(0), Verbosity::Silent);
        assert_eq!(Verbosity::from(1), Verbosity::Summary);
        assert_eq!(Verbosity::from(7), Verbosity::Iterations);
    }
}
