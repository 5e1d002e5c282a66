//! Core traits and their implementations for standard vector and matrix types.

pub mod traits;
pub mod wrappers;

pub use traits::{
    EuclideanInner, FnInnerProduct, FnOperator, FnPreconditioner, Identity, InnerProduct,
    LinearOperator, Preconditioner, Vector,
};
