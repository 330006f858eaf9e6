use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use super::intersect::{Geometry, Intersect};
use super::line::Line;
use super::point::Point;
use super::segment::LineSegment;
use super::vector::Vector;
use crate::error::{GeometryError, Result};
use crate::scalar::Scalar;

/// An infinite plane through `offset + p` with non-zero normal `n`. The
/// normal need not be unit length.
#[derive(Debug, Clone, Serialize)]
pub struct Plane<S> {
    offset: Vector<S>,
    p: Vector<S>,
    n: Vector<S>,
}

impl<S: Scalar> Plane<S> {
    pub fn new(point: &Point<S>, normal: Vector<S>) -> Result<Self> {
        if normal.is_zero() {
            return Err(GeometryError::ZeroNormal);
        }
        Ok(Self::new_unchecked(point, normal))
    }

    pub(crate) fn new_unchecked(point: &Point<S>, normal: Vector<S>) -> Self {
        Self {
            offset: point.offset.clone(),
            p: point.rel.clone(),
            n: normal,
        }
    }

    /// Plane through three points, normal `(b - a) x (c - a)`.
    pub fn from_points(a: &Point<S>, b: &Point<S>, c: &Point<S>) -> Result<Self> {
        Self::new(a, a.vector_to(b).cross(&a.vector_to(c)))
    }

    pub fn point(&self) -> Point<S> {
        Point::with_offset(self.offset.clone(), self.p.clone())
    }

    pub fn normal(&self) -> &Vector<S> {
        &self.n
    }

    /// `n . (pt - p)`: signed distance scaled by `|n|`.
    pub fn evaluate(&self, pt: &Point<S>) -> S {
        self.n.dot(&self.point().vector_to(pt))
    }

    /// Which side of the plane `pt` lies on; `Greater` is the normal's side.
    pub fn side(&self, pt: &Point<S>, ctx: &S::Context) -> Ordering {
        self.evaluate(pt).sign_scaled_in(&self.n.magnitude_squared(), ctx)
    }

    pub fn is_on_plane(&self, pt: &Point<S>, ctx: &S::Context) -> bool {
        self.side(pt, ctx) == Ordering::Equal
    }

    /// Orthogonal projection of `pt` onto the plane.
    pub fn project(&self, pt: &Point<S>) -> Point<S> {
        let k = self.evaluate(pt) / self.n.magnitude_squared();
        Point::from_vector(&pt.position() - &self.n.scale(&k))
    }

    /// Squared distance to `pt`, exact in exact mode.
    pub fn distance_squared_to_point(&self, pt: &Point<S>) -> S {
        let e = self.evaluate(pt);
        e.clone() * e / self.n.magnitude_squared()
    }

    pub fn is_parallel_to(&self, line: &Line<S>, ctx: &S::Context) -> bool {
        self.is_along(line.direction(), ctx)
    }

    /// `dir` lies in the plane's direction, within angular tolerance.
    fn is_along(&self, dir: &Vector<S>, ctx: &S::Context) -> bool {
        let scale = self.n.magnitude_squared() * dir.magnitude_squared();
        self.n.dot(dir).sign_scaled_in(&scale, ctx) == Ordering::Equal
    }

    pub fn translate(&mut self, v: &Vector<S>) {
        self.offset = &self.offset + v;
    }

    pub fn rotate(&self, axis: &Line<S>, theta: &S, ctx: &S::Context) -> Result<Self> {
        let point = self.point().rotate(axis, theta, ctx)?;
        let normal = self.n.rotate(axis.direction(), theta, ctx)?;
        Self::new(&point, normal)
    }

    /// Parameter where `origin + t * dir` crosses the plane, `None` when
    /// parallel.
    fn crossing(&self, origin: &Point<S>, dir: &Vector<S>, ctx: &S::Context) -> Option<S> {
        if self.is_along(dir, ctx) {
            return None;
        }
        Some(self.n.dot(&origin.vector_to(&self.point())) / self.n.dot(dir))
    }
}

impl<'de, S: Scalar + Deserialize<'de>> Deserialize<'de> for Plane<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<S> {
            offset: Vector<S>,
            p: Vector<S>,
            n: Vector<S>,
        }
        let raw = Raw::<S>::deserialize(deserializer)?;
        Self::new(&Point::with_offset(raw.offset, raw.p), raw.n).map_err(serde::de::Error::custom)
    }
}

impl<S: Scalar> Intersect<S, Point<S>> for Plane<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.is_on_plane(other, ctx)
            .then(|| Geometry::Point(other.clone()))
    }
}

impl<S: Scalar> Intersect<S, Line<S>> for Plane<S> {
    fn intersection(&self, other: &Line<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        match self.crossing(&other.point(), other.direction(), ctx) {
            Some(t) => Some(Geometry::Point(other.point_at(&t))),
            None => self
                .is_on_plane(&other.point(), ctx)
                .then(|| Geometry::Line(other.clone())),
        }
    }
}

impl<S: Scalar> Intersect<S, LineSegment<S>> for Plane<S> {
    fn intersection(&self, other: &LineSegment<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        match self.crossing(&other.p(), &other.direction(), ctx) {
            Some(t) => {
                let x = other.point_at(&t);
                other.is_on_segment(&x, ctx).then_some(Geometry::Point(x))
            }
            None => self
                .is_on_plane(&other.p(), ctx)
                .then(|| Geometry::Segment(other.clone())),
        }
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

    fn xy() -> Plane<BigRational> {
        Plane::new(&Point::origin(), Vector::k()).unwrap()
    }

    #[test]
    fn test_zero_normal_rejected() {
        assert_eq!(
            Plane::<BigRational>::new(&Point::origin(), Vector::zero()).unwrap_err(),
            GeometryError::ZeroNormal
        );
        assert_eq!(
            Plane::from_points(&pt(0, 0, 0), &pt(1, 1, 1), &pt(2, 2, 2)).unwrap_err(),
            GeometryError::ZeroNormal
        );
    }

    #[test]
    fn test_side_and_projection() {
        let ctx = Precision::default();
        let plane = Plane::from_points(&pt(0, 0, 2), &pt(1, 0, 2), &pt(0, 1, 2)).unwrap();
        assert_eq!(plane.side(&pt(5, 5, 3), &ctx), Ordering::Greater);
        assert_eq!(plane.side(&pt(5, 5, 0), &ctx), Ordering::Less);
        assert!(plane.is_on_plane(&pt(-7, 4, 2), &ctx));
        assert_eq!(plane.project(&pt(3, 4, 9)), pt(3, 4, 2));
        assert_eq!(plane.distance_squared_to_point(&pt(3, 4, 9)), BigRational::from_i64(49));
    }

    #[test]
    fn test_line_crossing() {
        let ctx = Precision::default();
        let line = Line::from_points(&pt(1, 1, 1), &pt(2, 3, 2)).unwrap();
        assert_eq!(xy().intersection(&line, &ctx).unwrap().as_point(), Some(&pt(0, -1, 0)));
    }

    #[test]
    fn test_line_in_plane_and_parallel() {
        let ctx = Precision::default();
        let plane = xy();
        assert!(matches!(plane.intersection(&Line::x_axis(), &ctx), Some(Geometry::Line(_))));
        let above = Line::new(&pt(0, 0, 1), Vector::j()).unwrap();
        assert!(plane.intersection(&above, &ctx).is_none());
    }

    #[test]
    fn test_segment_crossing_and_short() {
        let ctx = Precision::default();
        let plane = xy();
        let through = LineSegment::new(&pt(0, 0, -1), &pt(2, 2, 1)).unwrap();
        assert_eq!(plane.intersection(&through, &ctx).unwrap().as_point(), Some(&pt(1, 1, 0)));
        let short = LineSegment::new(&pt(0, 0, 1), &pt(0, 0, 3)).unwrap();
        assert!(through.intersects(&plane, &ctx));
        assert!(!short.intersects(&plane, &ctx));
        let flat = LineSegment::new(&pt(0, 0, 0), &pt(1, 0, 0)).unwrap();
        assert_eq!(plane.intersection(&flat, &ctx).unwrap().as_segment(), Some(&flat));
    }

    #[test]
    fn test_rotate_plane() {
        let ctx = Tolerance::default();
        let plane = Plane::new(&Point::new(0.0, 0.0, 1.0), Vector::k()).unwrap();
        let rotated = plane
            .rotate(&Line::x_axis(), &std::f64::consts::FRAC_PI_2, &ctx)
            .unwrap();
        assert!(rotated.is_on_plane(&Point::new(3.0, -1.0, 7.0), &ctx));
        assert!(!rotated.is_on_plane(&Point::new(0.0, 0.0, 1.0), &ctx));
    }

    #[test]
    fn test_short_normal_still_crosses() {
        let ctx = Tolerance::default();
        let plane = Plane::new(&Point::origin(), Vector::new(0.0, 0.0, 1e-6)).unwrap();
        let line = Line::new(&Point::new(0.0, 0.0, 1.0), Vector::new(1e-6, 0.0, -1e-6)).unwrap();
        assert!(!plane.is_parallel_to(&line, &ctx));
        let hit = plane.intersection(&line, &ctx).unwrap();
        assert!(hit.as_point().unwrap().approx_eq_in(&Point::new(1.0, 0.0, 0.0), &ctx));
    }

    #[test]
    fn test_deserialize_rejects_zero_normal() {
        let zero = serde_json::json!({ "dx": 0.0, "dy": 0.0, "dz": 0.0 });
        let raw = serde_json::json!({ "offset": zero.clone(), "p": zero.clone(), "n": zero });
        let err = serde_json::from_value::<Plane<f64>>(raw).unwrap_err();
        assert!(err.to_string().contains("normal is zero"), "{err}");
    }
}
