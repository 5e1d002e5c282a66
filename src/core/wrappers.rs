//! Wrappers for `Vec<T>` vectors and faer dense matrices.
//!
//! This module provides implementations of the core traits so that plain Rust vectors can act as the
//! solver's vector type and `faer::Mat` / `faer::MatRef` can act as operators. Reductions (sum, norms)
//! run sequentially by default; with the `rayon` feature enabled they use parallel iterators.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use crate::core::traits::{LinearOperator, Vector};
use faer::{Mat, MatRef};
use num_traits::Float;

#[cfg(feature = "rayon")]
fn reduce<T, F>(x: &[T], f: F) -> T
where
    T: Float + Send + Sync,
    F: Fn(T) -> T + Send + Sync,
{
    use rayon::prelude::*;
    x.par_iter()
        .map(|xi| f(*xi))
        .reduce(|| T::zero(), |acc, v| acc + v)
}

#[cfg(not(feature = "rayon"))]
fn reduce<T, F>(x: &[T], f: F) -> T
where
    T: Float + Send + Sync,
    F: Fn(T) -> T + Send + Sync,
{
    x.iter().map(|xi| f(*xi)).fold(T::zero(), |acc, v| acc + v)
}

/// Implements the vector operations for `Vec<T>`.
///
/// Binary operations require equal lengths and panic otherwise.
impl<T: Float + Send + Sync> Vector for Vec<T> {
    type Scalar = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn zeros_like(&self) -> Self {
        vec![T::zero(); self.as_slice().len()]
    }

    fn copy_from(&mut self, x: &Self) {
        assert_eq!(self.as_slice().len(), x.as_slice().len(), "Vectors must have the same length");
        self.copy_from_slice(x);
    }

    fn axpy(&mut self, alpha: T, x: &Self) {
        assert_eq!(self.as_slice().len(), x.as_slice().len(), "Vectors must have the same length");
        for (yi, xi) in self.iter_mut().zip(x.iter()) {
            *yi = *yi + alpha * *xi;
        }
    }

    fn aypx(&mut self, beta: T, x: &Self) {
        assert_eq!(self.as_slice().len(), x.as_slice().len(), "Vectors must have the same length");
        for (yi, xi) in self.iter_mut().zip(x.iter()) {
            *yi = *xi + beta * *yi;
        }
    }

    fn scale(&mut self, alpha: T) {
        self.iter_mut().for_each(|yi| *yi = alpha * *yi);
    }

    fn mul_elementwise(&mut self, x: &Self) {
        assert_eq!(self.as_slice().len(), x.as_slice().len(), "Vectors must have the same length");
        for (yi, xi) in self.iter_mut().zip(x.iter()) {
            *yi = *yi * *xi;
        }
    }

    fn sum(&self) -> T {
        reduce(self, |xi| xi)
    }

    /// Fused multiply-sum, no temporary.
    fn dot(&self, x: &Self) -> T {
        assert_eq!(self.as_slice().len(), x.as_slice().len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            self.as_slice()
                .par_iter()
                .zip(x.as_slice().par_iter())
                .map(|(a, b)| *a * *b)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            self.iter()
                .zip(x.iter())
                .map(|(a, b)| *a * *b)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }

    fn norm1(&self) -> T {
        reduce(self, |xi| xi.abs())
    }

    fn norm2(&self) -> T {
        reduce(self, |xi| xi * xi).sqrt()
    }
}

/// Implements operator application for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Float> LinearOperator<Vec<T>> for Mat<T> {
    fn apply(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.as_ref().apply(x, y)
    }
}

/// Implements operator application for a matrix reference (`faer::MatRef`).
impl<'a, T: Float> LinearOperator<Vec<T>> for MatRef<'a, T> {
    fn apply(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for i in 0..self.nrows() {
            let mut acc = T::zero();
            for j in 0..self.ncols() {
                acc = acc + self[(i, j)] * x[j];
            }
            y[i] = acc;
        }
    }
}
