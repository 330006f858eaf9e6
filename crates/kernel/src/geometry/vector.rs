use std::ops::{Add, Neg, Sub};

use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::scalar::Scalar;

/// A free displacement in 3D space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector<S> {
    pub dx: S,
    pub dy: S,
    pub dz: S,
}

impl<S: Scalar> Vector<S> {
    pub fn new(dx: S, dy: S, dz: S) -> Self {
        Self { dx, dy, dz }
    }

    pub fn zero() -> Self {
        Self::new(S::zero(), S::zero(), S::zero())
    }

    pub fn from_i64s(dx: i64, dy: i64, dz: i64) -> Self {
        Self::new(S::from_i64(dx), S::from_i64(dy), S::from_i64(dz))
    }

    pub fn i() -> Self {
        Self::from_i64s(1, 0, 0)
    }

    pub fn j() -> Self {
        Self::from_i64s(0, 1, 0)
    }

    pub fn k() -> Self {
        Self::from_i64s(0, 0, 1)
    }

    /// Exact zero test, used to reject degenerate directions and normals.
    pub fn is_zero(&self) -> bool {
        self.dx.is_zero() && self.dy.is_zero() && self.dz.is_zero()
    }

    pub fn is_zero_in(&self, ctx: &S::Context) -> bool {
        self.dx.is_zero_in(ctx) && self.dy.is_zero_in(ctx) && self.dz.is_zero_in(ctx)
    }

    pub fn approx_eq_in(&self, other: &Self, ctx: &S::Context) -> bool {
        (self - other).is_zero_in(ctx)
    }

    pub fn scale(&self, k: &S) -> Self {
        Self::new(
            self.dx.clone() * k.clone(),
            self.dy.clone() * k.clone(),
            self.dz.clone() * k.clone(),
        )
    }

    pub fn dot(&self, other: &Self) -> S {
        self.dx.clone() * other.dx.clone()
            + self.dy.clone() * other.dy.clone()
            + self.dz.clone() * other.dz.clone()
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.dy.clone() * other.dz.clone() - self.dz.clone() * other.dy.clone(),
            self.dz.clone() * other.dx.clone() - self.dx.clone() * other.dz.clone(),
            self.dx.clone() * other.dy.clone() - self.dy.clone() * other.dx.clone(),
        )
    }

    pub fn magnitude_squared(&self) -> S {
        self.dot(self)
    }

    pub fn magnitude(&self, ctx: &S::Context) -> S {
        self.magnitude_squared().sqrt_in(ctx)
    }

    /// Unit vector in the same direction.
    pub fn unit(&self, ctx: &S::Context) -> Result<Self> {
        if self.is_zero() {
            return Err(GeometryError::ZeroDirection);
        }
        // Divide by the rounded magnitude, then round the quotient: one
        // rounding per component relative to the exact unit vector.
        let magnitude = self.magnitude_squared().sqrt_in(&S::working(ctx));
        if magnitude.is_zero() {
            return Err(GeometryError::ZeroDirection);
        }
        Ok(Self::new(
            (self.dx.clone() / magnitude.clone()).round_in(ctx),
            (self.dy.clone() / magnitude.clone()).round_in(ctx),
            (self.dz.clone() / magnitude).round_in(ctx),
        ))
    }

    /// True when the vectors are parallel or anti-parallel (or either is zero).
    /// In float mode the angle between them is compared, whatever their lengths.
    pub fn is_scalar_multiple(&self, other: &Self, ctx: &S::Context) -> bool {
        let scale = self.magnitude_squared() * other.magnitude_squared();
        self.cross(other)
            .magnitude_squared()
            .is_negligible_squared_in(&scale, ctx)
    }

    /// Rotate by `theta` radians about `axis` (right-hand rule).
    pub fn rotate(&self, axis: &Self, theta: &S, ctx: &S::Context) -> Result<Self> {
        if axis.is_zero() {
            return Err(GeometryError::ZeroDirection);
        }
        Ok(S::rotate_vector(self, axis, theta, ctx))
    }
}

impl<S: Scalar> Add for Vector<S> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy, self.dz + rhs.dz)
    }
}

impl<S: Scalar> Add<&Vector<S>> for &Vector<S> {
    type Output = Vector<S>;
    fn add(self, rhs: &Vector<S>) -> Self::Output {
        Vector::new(
            self.dx.clone() + rhs.dx.clone(),
            self.dy.clone() + rhs.dy.clone(),
            self.dz.clone() + rhs.dz.clone(),
        )
    }
}

impl<S: Scalar> Sub for Vector<S> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.dx - rhs.dx, self.dy - rhs.dy, self.dz - rhs.dz)
    }
}

impl<S: Scalar> Sub<&Vector<S>> for &Vector<S> {
    type Output = Vector<S>;
    fn sub(self, rhs: &Vector<S>) -> Self::Output {
        Vector::new(
            self.dx.clone() - rhs.dx.clone(),
            self.dy.clone() - rhs.dy.clone(),
            self.dz.clone() - rhs.dz.clone(),
        )
    }
}

impl<S: Scalar> Neg for Vector<S> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.dx, -self.dy, -self.dz)
    }
}

impl AbsDiffEq for Vector<f64> {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.dx.abs_diff_eq(&other.dx, epsilon)
            && self.dy.abs_diff_eq(&other.dy, epsilon)
            && self.dz.abs_diff_eq(&other.dz, epsilon)
    }
}

impl RelativeEq for Vector<f64> {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.dx.relative_eq(&other.dx, epsilon, max_relative)
            && self.dy.relative_eq(&other.dy, epsilon, max_relative)
            && self.dz.relative_eq(&other.dz, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{Precision, RoundingMode, Tolerance};
    use approx::assert_abs_diff_eq;
    use num_rational::BigRational;
    use std::f64::consts::PI;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_dot_and_cross_are_exact() {
        let a = Vector::new(r(1, 3), r(2, 1), r(-1, 2));
        let b = Vector::new(r(3, 1), r(1, 7), r(4, 1));
        assert_eq!(a.dot(&b), r(1, 1) + r(2, 7) - r(2, 1));
        let c = a.cross(&b);
        assert_eq!(c.dot(&a), r(0, 1));
        assert_eq!(c.dot(&b), r(0, 1));
    }

    #[test]
    fn test_cross_basis() {
        let k = Vector::<f64>::i().cross(&Vector::j());
        assert_eq!(k, Vector::k());
    }

    #[test]
    fn test_magnitude_exact_when_rational() {
        let ctx = Precision::new(0, RoundingMode::Floor);
        let v = Vector::<BigRational>::from_i64s(2, 3, 6);
        assert_eq!(v.magnitude(&ctx), r(7, 1));
    }

    #[test]
    fn test_unit_rounds_once() {
        let ctx = Precision::new(-4, RoundingMode::HalfUp);
        let u = Vector::<BigRational>::from_i64s(1, 1, 0).unit(&ctx).unwrap();
        assert_eq!(u.dx, r(7071, 10_000));
        assert_eq!(u.dy, r(7071, 10_000));
        assert_eq!(u.dz, r(0, 1));
    }

    #[test]
    fn test_unit_of_zero_is_error() {
        let ctx = Tolerance::default();
        assert!(matches!(
            Vector::<f64>::zero().unit(&ctx),
            Err(GeometryError::ZeroDirection)
        ));
    }

    #[test]
    fn test_scalar_multiple() {
        let ctx = Precision::default();
        let a = Vector::<BigRational>::from_i64s(1, 2, 3);
        assert!(a.is_scalar_multiple(&a.scale(&r(-5, 2)), &ctx));
        assert!(!a.is_scalar_multiple(&Vector::from_i64s(1, 2, 4), &ctx));
    }

    #[test]
    fn test_scalar_multiple_ignores_float_scale() {
        let ctx = Tolerance::default();
        let tiny_x = Vector::new(1e-6, 0.0, 0.0);
        let tiny_y = Vector::new(0.0, 1e-6, 0.0);
        assert!(!tiny_x.is_scalar_multiple(&tiny_y, &ctx));
        assert!(tiny_x.is_scalar_multiple(&Vector::new(-3e4, 0.0, 0.0), &ctx));
        let huge = Vector::new(1e6, 1e6, 0.0);
        assert!(!huge.is_scalar_multiple(&Vector::new(1e6, 1e6 + 1.0, 0.0), &ctx));
    }

    #[test]
    fn test_rotate_pi_about_diagonal() {
        let ctx = Tolerance::default();
        let v = Vector::new(3.0, 2.0, 1.0);
        let axis = Vector::new(1.0, 1.0, 0.0);
        let rotated = v.rotate(&axis, &PI, &ctx).unwrap();
        assert_abs_diff_eq!(rotated, Vector::new(2.0, 3.0, -1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_round_trip_float() {
        let ctx = Tolerance::default();
        let v = Vector::new(0.3, -1.7, 2.2);
        let axis = Vector::new(-0.4, 0.9, 1.3);
        let there = v.rotate(&axis, &1.234, &ctx).unwrap();
        let back = there.rotate(&axis, &-1.234, &ctx).unwrap();
        assert_abs_diff_eq!(back, v, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_exact_quarter_turn() {
        let ctx = Precision::new(-6, RoundingMode::HalfUp);
        let half_pi = Precision::new(-30, RoundingMode::HalfEven).pi() / r(2, 1);
        let v = Vector::<BigRational>::from_i64s(1, 0, 0);
        let rotated = v.rotate(&Vector::from_i64s(0, 0, 2), &half_pi, &ctx).unwrap();
        assert_eq!(rotated, Vector::from_i64s(0, 1, 0));
    }

    #[test]
    fn test_rotate_zero_axis_is_error() {
        let ctx = Tolerance::default();
        let v = Vector::new(1.0, 0.0, 0.0);
        assert!(v.rotate(&Vector::zero(), &1.0, &ctx).is_err());
    }
}
