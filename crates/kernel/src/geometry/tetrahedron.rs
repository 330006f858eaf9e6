use std::cell::OnceCell;
use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use super::envelope::Envelope;
use super::intersect::{clip_halfspaces, Geometry, HalfSpace, Intersect};
use super::line::Line;
use super::point::Point;
use super::segment::LineSegment;
use super::triangle::Triangle;
use super::vector::Vector;
use crate::error::{GeometryError, Result};
use crate::scalar::Scalar;

/// A solid tetrahedron with non-coplanar vertices.
#[derive(Debug, Clone, Serialize)]
pub struct Tetrahedron<S> {
    offset: Vector<S>,
    p: Vector<S>,
    q: Vector<S>,
    r: Vector<S>,
    s: Vector<S>,
    #[serde(skip, default = "OnceCell::new")]
    envelope: OnceCell<Envelope<S>>,
}

impl<S: Scalar> Tetrahedron<S> {
    pub fn new(p: &Point<S>, q: &Point<S>, r: &Point<S>, s: &Point<S>) -> Result<Self> {
        let triple = p.vector_to(q).cross(&p.vector_to(r)).dot(&p.vector_to(s));
        if triple.is_zero() {
            return Err(GeometryError::DegenerateTetrahedron);
        }
        Ok(Self {
            offset: p.offset.clone(),
            p: p.rel.clone(),
            q: &q.position() - &p.offset,
            r: &r.position() - &p.offset,
            s: &s.position() - &p.offset,
            envelope: OnceCell::new(),
        })
    }

    pub fn vertices(&self) -> [Point<S>; 4] {
        [&self.p, &self.q, &self.r, &self.s]
            .map(|v| Point::with_offset(self.offset.clone(), v.clone()))
    }

    /// Exact volume.
    pub fn volume(&self) -> S {
        let (pq, pr, ps) = (&self.q - &self.p, &self.r - &self.p, &self.s - &self.p);
        pq.cross(&pr).dot(&ps).abs() / S::from_i64(6)
    }

    /// The four faces, each paired with the vertex opposite it.
    fn faces_with_apex(&self) -> [(Triangle<S>, Point<S>); 4] {
        let [p, q, r, s] = self.vertices();
        [
            (Triangle::new_unchecked(&q, &r, &s), p.clone()),
            (Triangle::new_unchecked(&p, &s, &r), q.clone()),
            (Triangle::new_unchecked(&p, &q, &s), r.clone()),
            (Triangle::new_unchecked(&p, &r, &q), s),
        ]
    }

    pub fn faces(&self) -> [Triangle<S>; 4] {
        self.faces_with_apex().map(|(face, _)| face)
    }

    /// Face planes as half-spaces with outward normals.
    fn halfspaces(&self) -> [HalfSpace<S>; 4] {
        self.faces_with_apex().map(|(face, apex)| {
            let [a, ..] = face.vertices();
            let n = face.normal();
            let n = if n.dot(&a.vector_to(&apex)).is_positive() { -n } else { n };
            HalfSpace { a, n }
        })
    }

    /// Inclusive containment.
    pub fn contains_point(&self, pt: &Point<S>, ctx: &S::Context) -> bool {
        self.halfspaces().iter().all(|h| {
            h.n.dot(&h.a.vector_to(pt))
                .sign_scaled_in(&h.n.magnitude_squared(), ctx)
                != Ordering::Greater
        })
    }

    pub fn envelope(&self) -> &Envelope<S> {
        self.envelope.get_or_init(|| {
            let [p, q, r, s] = self.vertices();
            Envelope::from_corners(&p, &q).union(&Envelope::from_corners(&r, &s))
        })
    }

    pub fn translate(&mut self, v: &Vector<S>) {
        self.offset = &self.offset + v;
        self.envelope.take();
    }

    pub fn translated(&self, v: &Vector<S>) -> Self {
        let mut t = self.clone();
        t.translate(v);
        t
    }

    pub fn rotate(&self, axis: &Line<S>, theta: &S, ctx: &S::Context) -> Result<Self> {
        let [p, q, r, s] = self.vertices();
        Self::new(
            &p.rotate(axis, theta, ctx)?,
            &q.rotate(axis, theta, ctx)?,
            &r.rotate(axis, theta, ctx)?,
            &s.rotate(axis, theta, ctx)?,
        )
    }
}

impl<'de, S: Scalar + Deserialize<'de>> Deserialize<'de> for Tetrahedron<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<S> {
            offset: Vector<S>,
            p: Vector<S>,
            q: Vector<S>,
            r: Vector<S>,
            s: Vector<S>,
        }
        let Raw { offset, p, q, r, s } = Raw::<S>::deserialize(deserializer)?;
        if (&q - &p).cross(&(&r - &p)).dot(&(&s - &p)).is_zero() {
            return Err(serde::de::Error::custom(GeometryError::DegenerateTetrahedron));
        }
        Ok(Self {
            offset,
            p,
            q,
            r,
            s,
            envelope: OnceCell::new(),
        })
    }
}

impl<S: Scalar> Intersect<S, Point<S>> for Tetrahedron<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.contains_point(other, ctx)
            .then(|| Geometry::Point(other.clone()))
    }
}

impl<S: Scalar> Intersect<S, Line<S>> for Tetrahedron<S> {
    fn intersection(&self, other: &Line<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        let (lo, hi) = clip_halfspaces(
            &other.point(),
            other.direction(),
            &self.halfspaces(),
            None,
            None,
            ctx,
        )?;
        Some(Geometry::span(other.point_at(&lo), other.point_at(&hi), ctx))
    }
}

impl<S: Scalar> Intersect<S, LineSegment<S>> for Tetrahedron<S> {
    fn intersection(&self, other: &LineSegment<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if !self.envelope().intersects_in(other.envelope(), ctx) {
            return None;
        }
        let (lo, hi) = clip_halfspaces(
            &other.p(),
            &other.direction(),
            &self.halfspaces(),
            Some(S::zero()),
            Some(S::one()),
            ctx,
        )?;
        if lo.is_zero() && hi.is_one() {
            return Some(Geometry::Segment(other.clone()));
        }
        Some(Geometry::span(other.point_at(&lo), other.point_at(&hi), ctx))
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

    /// Corner tetrahedron `x, y, z >= 0, x + y + z <= 6`.
    fn corner() -> Tetrahedron<BigRational> {
        Tetrahedron::new(&pt(0, 0, 0), &pt(6, 0, 0), &pt(0, 6, 0), &pt(0, 0, 6)).unwrap()
    }

    #[test]
    fn test_coplanar_vertices_rejected() {
        assert_eq!(
            Tetrahedron::new(&pt(0, 0, 0), &pt(1, 0, 0), &pt(0, 1, 0), &pt(1, 1, 0)).unwrap_err(),
            GeometryError::DegenerateTetrahedron
        );
    }

    #[test]
    fn test_volume() {
        assert_eq!(corner().volume(), BigRational::from_i64(36));
    }

    #[test]
    fn test_contains_point_either_orientation() {
        let ctx = Precision::default();
        let flipped =
            Tetrahedron::new(&pt(0, 0, 0), &pt(0, 6, 0), &pt(6, 0, 0), &pt(0, 0, 6)).unwrap();
        for t in [corner(), flipped] {
            assert!(t.contains_point(&pt(1, 1, 1), &ctx));
            assert!(t.contains_point(&pt(2, 2, 2), &ctx));
            assert!(t.contains_point(&pt(0, 0, 0), &ctx));
            assert!(!t.contains_point(&pt(3, 3, 3), &ctx));
            assert!(!t.contains_point(&pt(-1, 1, 1), &ctx));
        }
    }

    #[test]
    fn test_line_through_solid() {
        let ctx = Precision::default();
        let line = Line::new(&pt(1, 1, -10), Vector::k()).unwrap();
        let hit = corner().intersection(&line, &ctx).unwrap();
        let expected = LineSegment::new(&pt(1, 1, 0), &pt(1, 1, 4)).unwrap();
        assert!(hit.as_segment().unwrap().same_span_in(&expected, &ctx));
        let miss = Line::new(&pt(5, 5, 0), Vector::k()).unwrap();
        assert!(corner().intersection(&miss, &ctx).is_none());
    }

    #[test]
    fn test_line_through_vertex_is_point() {
        let ctx = Precision::default();
        let line = Line::new(&pt(6, 0, 0), Vector::from_i64s(1, 1, 0)).unwrap();
        assert_eq!(corner().intersection(&line, &ctx).unwrap().as_point(), Some(&pt(6, 0, 0)));
    }

    #[test]
    fn test_segments() {
        let ctx = Precision::default();
        let t = corner();
        let inside = LineSegment::new(&pt(1, 1, 1), &pt(2, 1, 1)).unwrap();
        assert_eq!(t.intersection(&inside, &ctx).unwrap().as_segment(), Some(&inside));
        let leaving = LineSegment::new(&pt(1, 1, 1), &pt(1, 1, 9)).unwrap();
        let hit = leaving.intersection(&t, &ctx).unwrap();
        assert!(hit.as_segment().unwrap().same_span_in(
            &LineSegment::new(&pt(1, 1, 1), &pt(1, 1, 4)).unwrap(),
            &ctx
        ));
        let outside = LineSegment::new(&pt(4, 4, 0), &pt(4, 4, 3)).unwrap();
        assert!(t.intersection(&outside, &ctx).is_none());
    }

    #[test]
    fn test_translate_resets_envelope() {
        let ctx = Tolerance::default();
        let mut t = Tetrahedron::new(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(1.0, 0.0, 0.0),
            &Point::new(0.0, 1.0, 0.0),
            &Point::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        assert_eq!(t.envelope().xmax, 1.0);
        t.translate(&Vector::new(10.0, 0.0, 0.0));
        assert_eq!(t.envelope().xmin, 10.0);
        assert!(t.contains_point(&Point::new(10.2, 0.2, 0.2), &ctx));
        assert_eq!(t.faces().len(), 4);
    }

    #[test]
    fn test_small_tetrahedron_containment() {
        let ctx = Tolerance::default();
        let t = Tetrahedron::new(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(1e-4, 0.0, 0.0),
            &Point::new(0.0, 1e-4, 0.0),
            &Point::new(0.0, 0.0, 1e-4),
        )
        .unwrap();
        assert!(t.contains_point(&Point::new(2e-5, 2e-5, 2e-5), &ctx));
        assert!(!t.contains_point(&Point::new(2e-4, 0.0, 0.0), &ctx));
    }

    #[test]
    fn test_deserialize_rejects_coplanar_vertices() {
        let v = |x: f64, y: f64| serde_json::json!({ "dx": x, "dy": y, "dz": 0.0 });
        let raw = serde_json::json!({
            "offset": v(0.0, 0.0),
            "p": v(0.0, 0.0),
            "q": v(1.0, 0.0),
            "r": v(0.0, 1.0),
            "s": v(1.0, 1.0),
        });
        let err = serde_json::from_value::<Tetrahedron<f64>>(raw).unwrap_err();
        assert!(err.to_string().contains("coplanar"), "{err}");
    }
}
