//! Context module for conjgrad.
//!
//! Contexts hold solver capabilities as trait objects and run a solve from
//! runtime configuration.
//!
//! Modules:
//! - [`cg_context`]: Contains the `CgContext` struct for configuring and running CG solves.
//!
//! # Example
//! ```rust,ignore
//! use conjgrad::{CgContext, CgOptions};
//! let mut ctx = CgContext::<Vec<f64>>::new(CgOptions::default());
//! ctx.set_operator(a);
//! let sol = ctx.solve_context(&b, None)?;
//! ```

pub mod cg_context;
pub use cg_context::CgContext;
