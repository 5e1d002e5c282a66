//! Core linear-algebra traits for conjgrad.
//!
//! The solver never sees a matrix. It only needs a vector type with a handful
//! of in-place BLAS-1 style operations, plus three injected capabilities:
//! the operator `A`, the inner product, and the preconditioner `M⁻¹`.

use crate::error::CgError;
use num_traits::Float;

/// Fixed-dimension vector with in-place BLAS-1 operations.
pub trait Vector: Clone {
    /// Element type.
    type Scalar: Float;

    /// Number of elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A zero vector with the same dimension as `self`.
    fn zeros_like(&self) -> Self;

    /// self ← x
    fn copy_from(&mut self, x: &Self);

    /// self ← self + alpha·x
    fn axpy(&mut self, alpha: Self::Scalar, x: &Self);

    /// self ← x + beta·self
    fn aypx(&mut self, beta: Self::Scalar, x: &Self);

    /// self ← alpha·self
    fn scale(&mut self, alpha: Self::Scalar);

    /// self ← self ⊙ x (element-wise product)
    fn mul_elementwise(&mut self, x: &Self);

    /// Sum of all elements.
    fn sum(&self) -> Self::Scalar;

    /// Σ selfᵢ·xᵢ
    fn dot(&self, x: &Self) -> Self::Scalar {
        let mut tmp = self.clone();
        tmp.mul_elementwise(x);
        tmp.sum()
    }

    /// ‖self‖₁
    fn norm1(&self) -> Self::Scalar;

    /// ‖self‖₂
    fn norm2(&self) -> Self::Scalar;
}

/// Operator application: y ← A x.
///
/// `A` is assumed symmetric positive-semidefinite; nothing checks it.
pub trait LinearOperator<V> {
    /// Compute y = A · x.
    fn apply(&self, x: &V, y: &mut V);
}

/// Inner products.
pub trait InnerProduct<V: Vector> {
    /// Compute ⟨x, y⟩.
    fn dot(&self, x: &V, y: &V) -> V::Scalar;
}

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError>;
}

impl<V, A: LinearOperator<V> + ?Sized> LinearOperator<V> for &A {
    fn apply(&self, x: &V, y: &mut V) {
        (**self).apply(x, y)
    }
}

impl<V, A: LinearOperator<V> + ?Sized> LinearOperator<V> for Box<A> {
    fn apply(&self, x: &V, y: &mut V) {
        (**self).apply(x, y)
    }
}

impl<V: Vector, I: InnerProduct<V> + ?Sized> InnerProduct<V> for &I {
    fn dot(&self, x: &V, y: &V) -> V::Scalar {
        (**self).dot(x, y)
    }
}

impl<V: Vector, I: InnerProduct<V> + ?Sized> InnerProduct<V> for Box<I> {
    fn dot(&self, x: &V, y: &V) -> V::Scalar {
        (**self).dot(x, y)
    }
}

impl<V, P: Preconditioner<V> + ?Sized> Preconditioner<V> for &P {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        (**self).apply(r, z)
    }
}

impl<V, P: Preconditioner<V> + ?Sized> Preconditioner<V> for Box<P> {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        (**self).apply(r, z)
    }
}

/// Standard Euclidean inner product: element-wise multiply, then sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanInner;

impl<V: Vector> InnerProduct<V> for EuclideanInner {
    fn dot(&self, x: &V, y: &V) -> V::Scalar {
        x.dot(y)
    }
}

/// No-op preconditioner: z = r.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<V: Vector> Preconditioner<V> for Identity {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        z.copy_from(r);
        Ok(())
    }
}

/// Wraps a closure `Fn(&V, &mut V)` as a [`LinearOperator`].
pub struct FnOperator<F>(pub F);

impl<V, F: Fn(&V, &mut V)> LinearOperator<V> for FnOperator<F> {
    fn apply(&self, x: &V, y: &mut V) {
        (self.0)(x, y)
    }
}

/// Wraps a closure `Fn(&V, &V) -> Scalar` as an [`InnerProduct`].
pub struct FnInnerProduct<F>(pub F);

impl<V: Vector, F: Fn(&V, &V) -> V::Scalar> InnerProduct<V> for FnInnerProduct<F> {
    fn dot(&self, x: &V, y: &V) -> V::Scalar {
        (self.0)(x, y)
    }
}

/// Wraps a closure `Fn(&V, &mut V) -> Result<(), CgError>` as a [`Preconditioner`].
pub struct FnPreconditioner<F>(pub F);

impl<V, F: Fn(&V, &mut V) -> Result<(), CgError>> Preconditioner<V> for FnPreconditioner<F> {
    fn apply(&self, r: &V, z: &mut V) -> Result<(), CgError> {
        (self.0)(r, z)
    }
}
