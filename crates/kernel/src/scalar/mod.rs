//! Arithmetic modes for the geometry kernel.
//!
//! Every primitive is generic over a [`Scalar`]. Two modes are provided:
//!
//! - [`num_rational::BigRational`]: exact arithmetic. Anything that leaves the
//!   rationals (square roots, trigonometry) is rounded once, under a
//!   [`Precision`] policy.
//! - `f64`: native floating point. Coordinates compare within the epsilon of
//!   a [`Tolerance`]; dot and cross products compare relative to the lengths
//!   they were formed from (see [`Scalar::is_negligible_squared_in`]).
//!
//! The per-call context (`Scalar::Context`) is `Precision` for the exact mode
//! and `Tolerance` for the float mode. Ring operations never consult it in
//! exact mode.

use std::cmp::Ordering;
use std::fmt::Debug;

use num_traits::Signed;

use crate::geometry::vector::Vector;

pub mod float;
pub mod precision;

pub use float::Tolerance;
pub use precision::{Precision, RoundingMode};

/// A coordinate type the kernel can compute with.
pub trait Scalar: Clone + Debug + PartialOrd + Signed + 'static {
    /// Precision policy (exact mode) or comparison tolerance (float mode).
    type Context: Clone + Debug + Default;

    fn from_i64(v: i64) -> Self;

    /// Zero test. Exact in exact mode, `|x| <= epsilon` in float mode.
    fn is_zero_in(&self, ctx: &Self::Context) -> bool;

    /// Zero test for a squared quantity formed from lengths whose squared
    /// product is `scale`. Exact in exact mode, `|x| <= epsilon^2 * |scale|`
    /// in float mode, so `|a x b|^2` against `|a|^2 |b|^2` is an angle test
    /// and `(n . w)^2` against `|n|^2` is a distance test.
    fn is_negligible_squared_in(&self, scale: &Self, ctx: &Self::Context) -> bool;

    /// Square root. Negative input yields zero.
    fn sqrt_in(&self, ctx: &Self::Context) -> Self;

    /// `(sin, cos)` of an angle in radians.
    fn sin_cos_in(&self, ctx: &Self::Context) -> (Self, Self);

    /// Round to the context's precision. Identity in float mode.
    fn round_in(&self, ctx: &Self::Context) -> Self;

    /// Finer context for intermediate irrational steps.
    fn working(ctx: &Self::Context) -> Self::Context;

    /// Rotate `v` by `theta` radians about the (non-zero) `axis` vector.
    fn rotate_vector(
        v: &Vector<Self>,
        axis: &Vector<Self>,
        theta: &Self,
        ctx: &Self::Context,
    ) -> Vector<Self>;

    fn two() -> Self {
        Self::one() + Self::one()
    }

    fn eq_in(&self, other: &Self, ctx: &Self::Context) -> bool {
        (self.clone() - other.clone()).is_zero_in(ctx)
    }

    fn le_in(&self, other: &Self, ctx: &Self::Context) -> bool {
        self <= other || self.eq_in(other, ctx)
    }

    fn lt_in(&self, other: &Self, ctx: &Self::Context) -> bool {
        self < other && !self.eq_in(other, ctx)
    }

    /// Sign with values inside the tolerance band reported as `Equal`.
    fn sign_in(&self, ctx: &Self::Context) -> Ordering {
        if self.is_zero_in(ctx) {
            Ordering::Equal
        } else if self.is_positive() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    /// Sign of a length that has been multiplied by `sqrt(scale)`, reported
    /// as `Equal` when the unscaled length is within tolerance of zero.
    fn sign_scaled_in(&self, scale: &Self, ctx: &Self::Context) -> Ordering {
        if (self.clone() * self.clone()).is_negligible_squared_in(scale, ctx) {
            Ordering::Equal
        } else if self.is_positive() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    fn min_of(self, other: Self) -> Self {
        if other < self { other } else { self }
    }

    fn max_of(self, other: Self) -> Self {
        if other > self { other } else { self }
    }

    /// Clamp into `[0, 1]`.
    fn clamp_unit(self) -> Self {
        self.max_of(Self::zero()).min_of(Self::one())
    }
}
