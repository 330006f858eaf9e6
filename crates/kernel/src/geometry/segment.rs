use std::cell::OnceCell;
use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use super::collinear::Overlap;
use super::envelope::Envelope;
use super::intersect::{Geometry, Intersect};
use super::line::Line;
use super::point::Point;
use super::vector::Vector;
use crate::error::{GeometryError, Result};
use crate::scalar::Scalar;

/// A bounded line between two distinct points.
#[derive(Debug, Clone, Serialize)]
pub struct LineSegment<S> {
    offset: Vector<S>,
    p: Vector<S>,
    q: Vector<S>,
    #[serde(skip, default = "OnceCell::new")]
    envelope: OnceCell<Envelope<S>>,
}

impl<S: Scalar> LineSegment<S> {
    pub fn new(p: &Point<S>, q: &Point<S>) -> Result<Self> {
        if p == q {
            return Err(GeometryError::DegenerateSegment);
        }
        Ok(Self::new_unchecked(p, q))
    }

    /// Build without the distinct-endpoint check; the caller guarantees it.
    pub(crate) fn new_unchecked(p: &Point<S>, q: &Point<S>) -> Self {
        Self {
            offset: p.offset.clone(),
            p: p.rel.clone(),
            q: &q.position() - &p.offset,
            envelope: OnceCell::new(),
        }
    }

    pub fn p(&self) -> Point<S> {
        Point::with_offset(self.offset.clone(), self.p.clone())
    }

    pub fn q(&self) -> Point<S> {
        Point::with_offset(self.offset.clone(), self.q.clone())
    }

    /// Vector from `p` to `q`.
    pub fn direction(&self) -> Vector<S> {
        &self.q - &self.p
    }

    /// Supporting line, directed from `p` to `q`.
    pub fn line(&self) -> Line<S> {
        Line::new_unchecked(&self.p(), self.direction())
    }

    /// `p + t * (q - p)`.
    pub fn point_at(&self, t: &S) -> Point<S> {
        Point::with_offset(self.offset.clone(), &self.p + &self.direction().scale(t))
    }

    pub fn midpoint(&self) -> Point<S> {
        self.point_at(&(S::one() / S::two()))
    }

    pub fn length_squared(&self) -> S {
        self.direction().magnitude_squared()
    }

    pub fn length(&self, ctx: &S::Context) -> S {
        self.length_squared().sqrt_in(ctx)
    }

    pub fn reversed(&self) -> Self {
        Self::new_unchecked(&self.q(), &self.p())
    }

    /// Inclusive membership: on the supporting line and between the ends.
    pub fn is_on_segment(&self, pt: &Point<S>, ctx: &S::Context) -> bool {
        if !self.line().is_on_line(pt, ctx) {
            return false;
        }
        // Signed distances past `p` and past `q`, each scaled by the length.
        let d = self.direction();
        let len2 = d.magnitude_squared();
        let before_p = self.p().vector_to(pt).dot(&d);
        let past_q = self.q().vector_to(pt).dot(&d);
        before_p.sign_scaled_in(&len2, ctx) != Ordering::Less
            && past_q.sign_scaled_in(&len2, ctx) != Ordering::Greater
    }

    /// Same set of points, endpoints in either order.
    pub fn same_span_in(&self, other: &Self, ctx: &S::Context) -> bool {
        let (p, q) = (self.p(), self.q());
        let (op, oq) = (other.p(), other.q());
        (p.approx_eq_in(&op, ctx) && q.approx_eq_in(&oq, ctx))
            || (p.approx_eq_in(&oq, ctx) && q.approx_eq_in(&op, ctx))
    }

    pub fn is_collinear(&self, other: &Self, ctx: &S::Context) -> bool {
        self.line().is_collinear(&other.line(), ctx)
    }

    /// Memoised bounding box; reset by [`LineSegment::translate`].
    pub fn envelope(&self) -> &Envelope<S> {
        self.envelope
            .get_or_init(|| Envelope::from_corners(&self.p(), &self.q()))
    }

    pub fn translate(&mut self, v: &Vector<S>) {
        self.offset = &self.offset + v;
        self.envelope.take();
    }

    pub fn translated(&self, v: &Vector<S>) -> Self {
        let mut s = self.clone();
        s.translate(v);
        s
    }

    /// Rotated copy. Fails if rounding makes the endpoints coincide.
    pub fn rotate(&self, axis: &Line<S>, theta: &S, ctx: &S::Context) -> Result<Self> {
        let p = self.p().rotate(axis, theta, ctx)?;
        let q = self.q().rotate(axis, theta, ctx)?;
        Self::new(&p, &q)
    }
}

/// Deserialization rejects coincident endpoints, as [`LineSegment::new`] does.
impl<'de, S: Scalar + Deserialize<'de>> Deserialize<'de> for LineSegment<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<S> {
            offset: Vector<S>,
            p: Vector<S>,
            q: Vector<S>,
        }
        let Raw { offset, p, q } = Raw::<S>::deserialize(deserializer)?;
        if p == q {
            return Err(serde::de::Error::custom(GeometryError::DegenerateSegment));
        }
        Ok(Self {
            offset,
            p,
            q,
            envelope: OnceCell::new(),
        })
    }
}

/// Directed equality: `p == p` and `q == q`. See
/// [`LineSegment::same_span_in`] for the undirected test.
impl<S: Scalar> PartialEq for LineSegment<S> {
    fn eq(&self, other: &Self) -> bool {
        self.p() == other.p() && self.q() == other.q()
    }
}

impl<S: Scalar> Intersect<S, Point<S>> for LineSegment<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.is_on_segment(other, ctx)
            .then(|| Geometry::Point(other.clone()))
    }
}

impl<S: Scalar> Intersect<S, Line<S>> for LineSegment<S> {
    fn intersection(&self, other: &Line<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        match self.line().intersection(other, ctx)? {
            Geometry::Line(_) => Some(Geometry::Segment(self.clone())),
            Geometry::Point(x) => self
                .is_on_segment(&x, ctx)
                .then_some(Geometry::Point(x)),
            _ => None,
        }
    }
}

impl<S: Scalar> Intersect<S> for LineSegment<S> {
    fn intersection(&self, other: &LineSegment<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if !self.envelope().intersects_in(other.envelope(), ctx) {
            return None;
        }
        match self.line().intersection(&other.line(), ctx)? {
            Geometry::Line(_) => Overlap::classify(self, other, ctx).intersection(self, other, ctx),
            Geometry::Point(x) => (self.is_on_segment(&x, ctx) && other.is_on_segment(&x, ctx))
                .then_some(Geometry::Point(x)),
            _ => None,
        }
    }
}
