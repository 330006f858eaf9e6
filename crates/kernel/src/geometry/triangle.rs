use std::cell::OnceCell;
use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use super::envelope::Envelope;
use super::intersect::{Geometry, Intersect};
use super::line::Line;
use super::plane::Plane;
use super::point::Point;
use super::segment::LineSegment;
use super::vector::Vector;
use crate::error::{GeometryError, Result};
use crate::scalar::Scalar;

/// A triangle with non-collinear vertices `p`, `q`, `r`.
#[derive(Debug, Clone, Serialize)]
pub struct Triangle<S> {
    offset: Vector<S>,
    p: Vector<S>,
    q: Vector<S>,
    r: Vector<S>,
    #[serde(skip, default = "OnceCell::new")]
    envelope: OnceCell<Envelope<S>>,
}

impl<S: Scalar> Triangle<S> {
    pub fn new(p: &Point<S>, q: &Point<S>, r: &Point<S>) -> Result<Self> {
        if p.vector_to(q).cross(&p.vector_to(r)).is_zero() {
            return Err(GeometryError::DegenerateTriangle);
        }
        Ok(Self::new_unchecked(p, q, r))
    }

    pub(crate) fn new_unchecked(p: &Point<S>, q: &Point<S>, r: &Point<S>) -> Self {
        Self {
            offset: p.offset.clone(),
            p: p.rel.clone(),
            q: &q.position() - &p.offset,
            r: &r.position() - &p.offset,
            envelope: OnceCell::new(),
        }
    }

    pub fn vertices(&self) -> [Point<S>; 3] {
        [&self.p, &self.q, &self.r].map(|v| Point::with_offset(self.offset.clone(), v.clone()))
    }

    /// `(q - p) x (r - p)`; its direction follows the vertex winding.
    pub fn normal(&self) -> Vector<S> {
        (&self.q - &self.p).cross(&(&self.r - &self.p))
    }

    pub fn plane(&self) -> Plane<S> {
        Plane::new_unchecked(
            &Point::with_offset(self.offset.clone(), self.p.clone()),
            self.normal(),
        )
    }

    /// Edges `pq`, `qr`, `rp`.
    pub fn edges(&self) -> [LineSegment<S>; 3] {
        let [p, q, r] = self.vertices();
        [
            LineSegment::new_unchecked(&p, &q),
            LineSegment::new_unchecked(&q, &r),
            LineSegment::new_unchecked(&r, &p),
        ]
    }

    /// Twice the area, squared. Exact in exact mode.
    pub fn area_squared_times_four(&self) -> S {
        self.normal().magnitude_squared()
    }

    /// Inclusive containment: on the plane and on the inner side of all
    /// three edges.
    pub fn contains_point(&self, pt: &Point<S>, ctx: &S::Context) -> bool {
        let n = self.normal();
        if !self.plane().is_on_plane(pt, ctx) {
            return false;
        }
        let n2 = n.magnitude_squared();
        self.edges().iter().all(|edge| {
            let e = edge.direction();
            let side = e.cross(&edge.p().vector_to(pt)).dot(&n);
            side.sign_scaled_in(&(e.magnitude_squared() * n2.clone()), ctx) != Ordering::Less
        })
    }

    pub fn envelope(&self) -> &Envelope<S> {
        self.envelope.get_or_init(|| {
            let [p, q, r] = self.vertices();
            Envelope::from_corners(&p, &q).union(&Envelope::from_point(&r))
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

    /// Rotated copy. Fails if rounding makes the vertices collinear.
    pub fn rotate(&self, axis: &Line<S>, theta: &S, ctx: &S::Context) -> Result<Self> {
        let [p, q, r] = self.vertices();
        Self::new(
            &p.rotate(axis, theta, ctx)?,
            &q.rotate(axis, theta, ctx)?,
            &r.rotate(axis, theta, ctx)?,
        )
    }

    /// Points where `target` meets the boundary edges. Edges lying on the
    /// target contribute both endpoints.
    fn boundary_hits<T>(&self, target: &T, ctx: &S::Context) -> Vec<Point<S>>
    where
        LineSegment<S>: Intersect<S, T>,
    {
        let mut hits = Vec::new();
        for edge in self.edges() {
            match edge.intersection(target, ctx) {
                Some(Geometry::Point(x)) => hits.push(x),
                Some(Geometry::Segment(s)) => {
                    hits.push(s.p());
                    hits.push(s.q());
                }
                _ => {}
            }
        }
        hits
    }
}

impl<'de, S: Scalar + Deserialize<'de>> Deserialize<'de> for Triangle<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<S> {
            offset: Vector<S>,
            p: Vector<S>,
            q: Vector<S>,
            r: Vector<S>,
        }
        let Raw { offset, p, q, r } = Raw::<S>::deserialize(deserializer)?;
        if (&q - &p).cross(&(&r - &p)).is_zero() {
            return Err(serde::de::Error::custom(GeometryError::DegenerateTriangle));
        }
        Ok(Self {
            offset,
            p,
            q,
            r,
            envelope: OnceCell::new(),
        })
    }
}

impl<S: Scalar> Intersect<S, Point<S>> for Triangle<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.contains_point(other, ctx)
            .then(|| Geometry::Point(other.clone()))
    }
}

impl<S: Scalar> Intersect<S, Line<S>> for Triangle<S> {
    fn intersection(&self, other: &Line<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        match self.plane().intersection(other, ctx)? {
            Geometry::Point(x) => self
                .contains_point(&x, ctx)
                .then_some(Geometry::Point(x)),
            // Coplanar: the line crosses the boundary at most twice.
            _ => Geometry::span_of(&self.boundary_hits(other, ctx), ctx),
        }
    }
}

impl<S: Scalar> Intersect<S, LineSegment<S>> for Triangle<S> {
    fn intersection(&self, other: &LineSegment<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if !self.envelope().intersects_in(other.envelope(), ctx) {
            return None;
        }
        match self.plane().intersection(other, ctx)? {
            Geometry::Point(x) => self
                .contains_point(&x, ctx)
                .then_some(Geometry::Point(x)),
            _ => {
                let mut hits = self.boundary_hits(other, ctx);
                hits.extend(
                    [other.p(), other.q()]
                        .into_iter()
                        .filter(|end| self.contains_point(end, ctx)),
                );
                Geometry::span_of(&hits, ctx)
            }
        }
    }
}
