use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::intersect::{Geometry, Intersect};
use super::line::Line;
use super::vector::Vector;
use crate::error::Result;
use crate::scalar::Scalar;

/// A position in 3D space, stored as `offset + rel`.
///
/// Compound primitives keep one offset and store their defining points
/// relative to it, so translating them is a single vector addition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point<S> {
    pub offset: Vector<S>,
    pub rel: Vector<S>,
}

impl<S: Scalar> Point<S> {
    pub fn new(x: S, y: S, z: S) -> Self {
        Self::from_vector(Vector::new(x, y, z))
    }

    pub fn from_i64s(x: i64, y: i64, z: i64) -> Self {
        Self::from_vector(Vector::from_i64s(x, y, z))
    }

    pub fn origin() -> Self {
        Self::from_vector(Vector::zero())
    }

    pub fn from_vector(rel: Vector<S>) -> Self {
        Self {
            offset: Vector::zero(),
            rel,
        }
    }

    pub fn with_offset(offset: Vector<S>, rel: Vector<S>) -> Self {
        Self { offset, rel }
    }

    /// Effective position as a vector from the origin.
    pub fn position(&self) -> Vector<S> {
        &self.offset + &self.rel
    }

    pub fn x(&self) -> S {
        self.offset.dx.clone() + self.rel.dx.clone()
    }

    pub fn y(&self) -> S {
        self.offset.dy.clone() + self.rel.dy.clone()
    }

    pub fn z(&self) -> S {
        self.offset.dz.clone() + self.rel.dz.clone()
    }

    /// Vector from `self` to `other`.
    pub fn vector_to(&self, other: &Self) -> Vector<S> {
        &other.position() - &self.position()
    }

    pub fn translate(&mut self, v: &Vector<S>) {
        self.offset = &self.offset + v;
    }

    pub fn translated(&self, v: &Vector<S>) -> Self {
        let mut p = self.clone();
        p.translate(v);
        p
    }

    pub fn approx_eq_in(&self, other: &Self, ctx: &S::Context) -> bool {
        self.vector_to(other).is_zero_in(ctx)
    }

    /// Rotate about `axis` by `theta` radians. Returns a new point with a
    /// zero offset.
    pub fn rotate(&self, axis: &Line<S>, theta: &S, ctx: &S::Context) -> Result<Self> {
        let pivot = axis.point();
        let rotated = pivot.vector_to(self).rotate(axis.direction(), theta, ctx)?;
        Ok(Self::from_vector(&pivot.position() + &rotated))
    }

    pub fn envelope(&self) -> Envelope<S> {
        Envelope::from_point(self)
    }
}

/// Points compare by position, not by how it is split into offset and rel.
impl<S: Scalar> PartialEq for Point<S> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl<S: Scalar> Intersect<S> for Point<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.approx_eq_in(other, ctx)
            .then(|| Geometry::Point(self.clone()))
    }
}

impl AbsDiffEq for Point<f64> {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.position().abs_diff_eq(&other.position(), epsilon)
    }
}

impl RelativeEq for Point<f64> {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.position()
            .relative_eq(&other.position(), epsilon, max_relative)
    }
}
