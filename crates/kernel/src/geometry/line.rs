use serde::{Deserialize, Deserializer, Serialize};

use super::intersect::{Geometry, Intersect};
use super::point::Point;
use super::vector::Vector;
use crate::error::{GeometryError, Result};
use crate::scalar::Scalar;

/// An infinite line through `offset + p` along the non-zero direction `v`.
#[derive(Debug, Clone, Serialize)]
pub struct Line<S> {
    offset: Vector<S>,
    p: Vector<S>,
    v: Vector<S>,
}

impl<S: Scalar> Line<S> {
    pub fn new(point: &Point<S>, direction: Vector<S>) -> Result<Self> {
        if direction.is_zero() {
            return Err(GeometryError::ZeroDirection);
        }
        Ok(Self {
            offset: point.offset.clone(),
            p: point.rel.clone(),
            v: direction,
        })
    }

    /// Build without the zero-direction check; the caller guarantees it.
    pub(crate) fn new_unchecked(point: &Point<S>, direction: Vector<S>) -> Self {
        Self {
            offset: point.offset.clone(),
            p: point.rel.clone(),
            v: direction,
        }
    }

    /// Line through two distinct points, directed from `p` to `q`.
    pub fn from_points(p: &Point<S>, q: &Point<S>) -> Result<Self> {
        Self::new(p, p.vector_to(q))
    }

    pub fn x_axis() -> Self {
        Self::axis(Vector::i())
    }

    pub fn y_axis() -> Self {
        Self::axis(Vector::j())
    }

    pub fn z_axis() -> Self {
        Self::axis(Vector::k())
    }

    fn axis(v: Vector<S>) -> Self {
        Self {
            offset: Vector::zero(),
            p: Vector::zero(),
            v,
        }
    }

    pub fn point(&self) -> Point<S> {
        Point::with_offset(self.offset.clone(), self.p.clone())
    }

    pub fn direction(&self) -> &Vector<S> {
        &self.v
    }

    /// `point + t * direction`.
    pub fn point_at(&self, t: &S) -> Point<S> {
        Point::with_offset(self.offset.clone(), &self.p + &self.v.scale(t))
    }

    /// Parameter of the orthogonal projection of `pt` onto the line.
    pub fn parameter_of(&self, pt: &Point<S>) -> S {
        self.point().vector_to(pt).dot(&self.v) / self.v.magnitude_squared()
    }

    pub fn closest_point(&self, pt: &Point<S>) -> Point<S> {
        self.point_at(&self.parameter_of(pt))
    }

    /// Distance test: `|w x v|^2 / |v|^2` is the squared gap to the line.
    pub fn is_on_line(&self, pt: &Point<S>, ctx: &S::Context) -> bool {
        self.point()
            .vector_to(pt)
            .cross(&self.v)
            .magnitude_squared()
            .is_negligible_squared_in(&self.v.magnitude_squared(), ctx)
    }

    pub fn is_parallel(&self, other: &Self, ctx: &S::Context) -> bool {
        self.v.is_scalar_multiple(&other.v, ctx)
    }

    /// Same infinite line, regardless of the direction's sign or scale.
    pub fn is_collinear(&self, other: &Self, ctx: &S::Context) -> bool {
        self.is_parallel(other, ctx) && self.is_on_line(&other.point(), ctx)
    }

    /// Closest-point parameters `(t, u)` on `self` and `other` for
    /// non-parallel lines. `None` when the directions are exactly parallel.
    pub(crate) fn closest_parameters(&self, other: &Self) -> Option<(S, S)> {
        let w = other.point().vector_to(&self.point());
        let a = self.v.magnitude_squared();
        let b = self.v.dot(&other.v);
        let c = other.v.magnitude_squared();
        let d = self.v.dot(&w);
        let e = other.v.dot(&w);
        let denom = a.clone() * c.clone() - b.clone() * b.clone();
        if denom.is_zero() {
            return None;
        }
        let t = (b.clone() * e.clone() - c * d.clone()) / denom.clone();
        let u = (a * e - b * d) / denom;
        Some((t, u))
    }

    pub fn translate(&mut self, v: &Vector<S>) {
        self.offset = &self.offset + v;
    }

    pub fn rotate(&self, axis: &Line<S>, theta: &S, ctx: &S::Context) -> Result<Self> {
        let point = self.point().rotate(axis, theta, ctx)?;
        let direction = self.v.rotate(axis.direction(), theta, ctx)?;
        Self::new(&point, direction)
    }
}

/// Deserialization goes through [`Line::new`], so a zero direction is
/// rejected rather than stored.
impl<'de, S: Scalar + Deserialize<'de>> Deserialize<'de> for Line<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<S> {
            offset: Vector<S>,
            p: Vector<S>,
            v: Vector<S>,
        }
        let raw = Raw::<S>::deserialize(deserializer)?;
        Self::new(&Point::with_offset(raw.offset, raw.p), raw.v).map_err(serde::de::Error::custom)
    }
}

impl<S: Scalar> Intersect<S> for Line<S> {
    fn intersection(&self, other: &Line<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if self.is_parallel(other, ctx) {
            return self
                .is_on_line(&other.point(), ctx)
                .then(|| Geometry::Line(self.clone()));
        }
        let (t, u) = self.closest_parameters(other)?;
        let a = self.point_at(&t);
        let b = other.point_at(&u);
        // Skew lines have distinct closest points.
        a.approx_eq_in(&b, ctx).then(|| Geometry::Point(a))
    }
}

impl<S: Scalar> Intersect<S, Point<S>> for Line<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.is_on_line(other, ctx)
            .then(|| Geometry::Point(other.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{Precision, Tolerance};
    use num_rational::BigRational;

    fn pt(x: i64, y: i64, z: i64) -> Point<BigRational> {
        Point::from_i64s(x, y, z)
    }

    #[test]
    fn test_zero_direction_rejected() {
        let p = pt(1, 2, 3);
        assert_eq!(
            Line::from_points(&p, &p).unwrap_err(),
            GeometryError::ZeroDirection
        );
    }

    #[test]
    fn test_is_on_line() {
        let ctx = Precision::default();
        let l = Line::from_points(&pt(0, 0, 0), &pt(1, 2, 3)).unwrap();
        assert!(l.is_on_line(&pt(-2, -4, -6), &ctx));
        assert!(!l.is_on_line(&pt(1, 2, 4), &ctx));
    }

    #[test]
    fn test_collinear_ignores_direction_sign() {
        let ctx = Precision::default();
        let a = Line::from_points(&pt(0, 0, 0), &pt(1, 1, 1)).unwrap();
        let b = Line::from_points(&pt(5, 5, 5), &pt(2, 2, 2)).unwrap();
        let c = Line::from_points(&pt(0, 0, 1), &pt(1, 1, 2)).unwrap();
        assert!(a.is_collinear(&b, &ctx));
        assert!(a.is_parallel(&c, &ctx));
        assert!(!a.is_collinear(&c, &ctx));
    }

    #[test]
    fn test_crossing_lines_meet_at_point() {
        let ctx = Precision::default();
        let a = Line::from_points(&pt(0, 0, 0), &pt(2, 2, 0)).unwrap();
        let b = Line::from_points(&pt(0, 2, 0), &pt(2, 0, 0)).unwrap();
        match a.intersection(&b, &ctx) {
            Some(Geometry::Point(p)) => assert_eq!(p, pt(1, 1, 0)),
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_skew_lines_do_not_meet() {
        let ctx = Precision::default();
        let a = Line::<BigRational>::x_axis();
        let b = Line::new(&pt(0, 0, 1), Vector::j()).unwrap();
        assert!(a.intersection(&b, &ctx).is_none());
    }

    #[test]
    fn test_identical_lines_yield_line() {
        let ctx = Tolerance::default();
        let a = Line::<f64>::x_axis();
        let b = Line::new(&Point::new(4.0, 0.0, 0.0), Vector::new(-2.0, 0.0, 0.0)).unwrap();
        assert!(matches!(a.intersection(&b, &ctx), Some(Geometry::Line(_))));
    }

    #[test]
    fn test_parallel_distinct_lines_do_not_meet() {
        let ctx = Tolerance::default();
        let a = Line::<f64>::x_axis();
        let b = Line::new(&Point::new(0.0, 1.0, 0.0), Vector::i()).unwrap();
        assert!(a.intersection(&b, &ctx).is_none());
    }

    #[test]
    fn test_short_float_directions_still_cross() {
        let ctx = Tolerance::default();
        let a = Line::new(&Point::origin(), Vector::new(1e-6, 0.0, 0.0)).unwrap();
        let b = Line::new(&Point::new(0.0, 5.0, 0.0), Vector::new(0.0, 1e-6, 0.0)).unwrap();
        assert!(!a.is_parallel(&b, &ctx));
        match a.intersection(&b, &ctx) {
            Some(Geometry::Point(p)) => assert!(p.approx_eq_in(&Point::origin(), &ctx)),
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_on_line_is_a_distance_test() {
        let ctx = Tolerance::new(1e-6);
        let long = Line::new(&Point::origin(), Vector::new(1e3, 0.0, 0.0)).unwrap();
        assert!(long.is_on_line(&Point::new(7.0, 5e-7, 0.0), &ctx));
        assert!(!long.is_on_line(&Point::new(7.0, 5e-6, 0.0), &ctx));
    }

    #[test]
    fn test_deserialize_rejects_zero_direction() {
        let zero = serde_json::json!({ "dx": 0.0, "dy": 0.0, "dz": 0.0 });
        let raw = serde_json::json!({ "offset": zero.clone(), "p": zero.clone(), "v": zero });
        let err = serde_json::from_value::<Line<f64>>(raw).unwrap_err();
        assert!(err.to_string().contains("zero"), "{err}");

        let line = Line::new(&Point::new(1.0, 2.0, 3.0), Vector::new(0.0, 0.0, 2.0)).unwrap();
        let back: Line<f64> = serde_json::from_str(&serde_json::to_string(&line).unwrap()).unwrap();
        assert_eq!(back.direction(), line.direction());
    }

    #[test]
    fn test_parameter_of_projection() {
        let l = Line::from_points(&pt(0, 0, 0), &pt(2, 0, 0)).unwrap();
        let t = l.parameter_of(&pt(1, 5, 0));
        assert_eq!(t, BigRational::new(1.into(), 2.into()));
    }
}
