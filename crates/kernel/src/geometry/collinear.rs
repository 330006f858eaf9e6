//! Aggregates of collinear line segments.
//!
//! Two collinear segments relate in one of five ways ([`Overlap`]), decided
//! by which endpoints of each lie on the other. The same classification
//! yields both their union (used by [`CollinearSegments::simplify`]) and
//! their intersection.

use std::cell::OnceCell;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument, trace};

use super::envelope::Envelope;
use super::intersect::{Geometry, Intersect};
use super::line::Line;
use super::point::Point;
use super::segment::LineSegment;
use super::vector::Vector;
use crate::error::{GeometryError, Result};
use crate::scalar::Scalar;

/// One of the four endpoints of a segment pair `(l1, l2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    P1,
    Q1,
    P2,
    Q2,
}

impl Endpoint {
    fn of<S: Scalar>(self, l1: &LineSegment<S>, l2: &LineSegment<S>) -> Point<S> {
        match self {
            Endpoint::P1 => l1.p(),
            Endpoint::Q1 => l1.q(),
            Endpoint::P2 => l2.p(),
            Endpoint::Q2 => l2.q(),
        }
    }
}

/// How two collinear segments overlap.
///
/// `inner` endpoints bound the intersection, `outer` endpoints bound the
/// union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    Disjoint,
    /// Sharing exactly one point.
    Touching { at: Endpoint, outer: [Endpoint; 2] },
    /// One segment inside the other, possibly sharing an endpoint.
    Nested { inner: [Endpoint; 2], outer: [Endpoint; 2] },
    Partial { inner: [Endpoint; 2], outer: [Endpoint; 2] },
    /// Same span, endpoints possibly reversed.
    Identical,
}

impl Overlap {
    /// Classify two segments that are already known to be collinear.
    pub fn classify<S: Scalar>(l1: &LineSegment<S>, l2: &LineSegment<S>, ctx: &S::Context) -> Self {
        use Endpoint::{P1, P2, Q1, Q2};

        let contained = (
            l2.is_on_segment(&l1.p(), ctx),
            l2.is_on_segment(&l1.q(), ctx),
            l1.is_on_segment(&l2.p(), ctx),
            l1.is_on_segment(&l2.q(), ctx),
        );
        let overlap = match contained {
            (false, false, false, false) => Overlap::Disjoint,
            (true, true, true, true) => Overlap::Identical,
            // l1 inside l2; a contained l2 endpoint is then shared with l1.
            (true, true, false, false) | (true, true, true, false) | (true, true, false, true) => {
                Overlap::Nested { inner: [P1, Q1], outer: [P2, Q2] }
            }
            (false, false, true, true) | (true, false, true, true) | (false, true, true, true) => {
                Overlap::Nested { inner: [P2, Q2], outer: [P1, Q1] }
            }
            (true, false, true, false) => Overlap::Partial { inner: [P1, P2], outer: [Q1, Q2] },
            (true, false, false, true) => Overlap::Partial { inner: [P1, Q2], outer: [Q1, P2] },
            (false, true, true, false) => Overlap::Partial { inner: [Q1, P2], outer: [P1, Q2] },
            (false, true, false, true) => Overlap::Partial { inner: [Q1, Q2], outer: [P1, P2] },
            // A lone contained endpoint only arises within tolerance of the
            // other segment's end.
            (true, false, false, false) => {
                Overlap::Touching { at: P1, outer: farthest_pair(l1, l2) }
            }
            (false, true, false, false) => {
                Overlap::Touching { at: Q1, outer: farthest_pair(l1, l2) }
            }
            (false, false, true, false) => {
                Overlap::Touching { at: P2, outer: farthest_pair(l1, l2) }
            }
            (false, false, false, true) => {
                Overlap::Touching { at: Q2, outer: farthest_pair(l1, l2) }
            }
        };
        match overlap {
            Overlap::Partial { inner, outer }
                if inner[0].of(l1, l2).approx_eq_in(&inner[1].of(l1, l2), ctx) =>
            {
                Overlap::Touching { at: inner[0], outer }
            }
            other => other,
        }
    }

    /// The union span, or `None` when disjoint.
    pub fn union<S: Scalar>(
        &self,
        l1: &LineSegment<S>,
        l2: &LineSegment<S>,
    ) -> Option<LineSegment<S>> {
        match self {
            Overlap::Disjoint => None,
            Overlap::Identical => Some(l1.clone()),
            Overlap::Touching { outer, .. }
            | Overlap::Nested { outer, .. }
            | Overlap::Partial { outer, .. } => Some(LineSegment::new_unchecked(
                &outer[0].of(l1, l2),
                &outer[1].of(l1, l2),
            )),
        }
    }

    /// The shared part: a segment, a point when touching, or `None`.
    pub fn intersection<S: Scalar>(
        &self,
        l1: &LineSegment<S>,
        l2: &LineSegment<S>,
        ctx: &S::Context,
    ) -> Option<Geometry<S>> {
        match self {
            Overlap::Disjoint => None,
            Overlap::Identical => Some(Geometry::Segment(l1.clone())),
            Overlap::Touching { at, .. } => Some(Geometry::Point(at.of(l1, l2))),
            Overlap::Nested { inner, .. } | Overlap::Partial { inner, .. } => Some(Geometry::span(
                inner[0].of(l1, l2),
                inner[1].of(l1, l2),
                ctx,
            )),
        }
    }
}

/// The two endpoints furthest apart, which span the union of overlapping
/// collinear segments.
fn farthest_pair<S: Scalar>(l1: &LineSegment<S>, l2: &LineSegment<S>) -> [Endpoint; 2] {
    use Endpoint::{P1, P2, Q1, Q2};
    let pairs = [[P1, Q1], [P2, Q2], [P1, P2], [P1, Q2], [Q1, P2], [Q1, Q2]];
    let mut best = pairs[0];
    let mut best_d2 = S::zero();
    for pair in pairs {
        let d2 = pair[0].of(l1, l2).vector_to(&pair[1].of(l1, l2)).magnitude_squared();
        if d2 > best_d2 {
            best = pair;
            best_d2 = d2;
        }
    }
    best
}

/// Union of two segments if they are collinear and share at least a point.
pub fn merge<S: Scalar>(
    l1: &LineSegment<S>,
    l2: &LineSegment<S>,
    ctx: &S::Context,
) -> Option<LineSegment<S>> {
    if !l1.is_collinear(l2, ctx) {
        return None;
    }
    Overlap::classify(l1, l2, ctx).union(l1, l2)
}

/// A possibly disconnected set of collinear segments.
///
/// Members are stored relative to a shared offset, so [`translate`] is a
/// single vector addition.
///
/// [`translate`]: CollinearSegments::translate
#[derive(Debug, Clone, Serialize)]
pub struct CollinearSegments<S> {
    offset: Vector<S>,
    members: Vec<LineSegment<S>>,
    #[serde(skip, default = "OnceCell::new")]
    envelope: OnceCell<Envelope<S>>,
}

impl<S: Scalar> CollinearSegments<S> {
    pub fn new(segments: Vec<LineSegment<S>>, ctx: &S::Context) -> Result<Self> {
        let line = segments.first().ok_or(GeometryError::EmptyAggregate)?.line();
        if let Some(index) = segments
            .iter()
            .position(|s| !line.is_collinear(&s.line(), ctx))
        {
            return Err(GeometryError::NotCollinear { index });
        }
        Ok(Self::from_members(segments))
    }

    pub(crate) fn from_members(members: Vec<LineSegment<S>>) -> Self {
        Self {
            offset: Vector::zero(),
            members,
            envelope: OnceCell::new(),
        }
    }

    /// Members in absolute coordinates.
    pub fn members(&self) -> Vec<LineSegment<S>> {
        self.members
            .iter()
            .map(|s| s.translated(&self.offset))
            .collect()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// The common supporting line.
    pub fn line(&self) -> Line<S> {
        let mut line = self.members[0].line();
        line.translate(&self.offset);
        line
    }

    pub fn envelope(&self) -> &Envelope<S> {
        self.envelope.get_or_init(|| {
            let mut members = self.members().into_iter();
            let first = members.next().map(|s| s.envelope().clone());
            members.fold(first, |acc, s| acc.map(|e| e.union(s.envelope())))
                .unwrap_or_else(|| Envelope::from_point(&Point::from_vector(self.offset.clone())))
        })
    }

    pub fn translate(&mut self, v: &Vector<S>) {
        self.offset = &self.offset + v;
        self.envelope.take();
    }

    /// Rotated copy. Members are re-placed by their parameters on the
    /// rotated supporting line, so they stay exactly collinear even when
    /// rotation rounds.
    pub fn rotate(&self, axis: &Line<S>, theta: &S, ctx: &S::Context) -> Result<Self> {
        let line = self.line();
        let rotated = line.rotate(axis, theta, ctx)?;
        let members = self
            .members()
            .iter()
            .map(|s| {
                LineSegment::new(
                    &rotated.point_at(&line.parameter_of(&s.p())),
                    &rotated.point_at(&line.parameter_of(&s.q())),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_members(members))
    }

    pub fn contains_point(&self, pt: &Point<S>, ctx: &S::Context) -> bool {
        self.members().iter().any(|s| s.is_on_segment(pt, ctx))
    }

    /// Merge overlapping or abutting members until no pair merges.
    #[instrument(level = "debug", skip_all, fields(members = self.members.len()))]
    pub fn simplified(&self, ctx: &S::Context) -> Self {
        let mut segments = self.members.clone();
        let mut merges = 0usize;
        loop {
            let mut merged_any = false;
            let mut i = 0;
            while i < segments.len() {
                let mut j = i + 1;
                while j < segments.len() {
                    let union = Overlap::classify(&segments[i], &segments[j], ctx)
                        .union(&segments[i], &segments[j]);
                    match union {
                        Some(union) => {
                            trace!(i, j, "merged collinear pair");
                            segments[i] = union;
                            segments.remove(j);
                            merges += 1;
                            merged_any = true;
                            // The grown segment may now reach earlier-rejected ones.
                            j = i + 1;
                        }
                        None => j += 1,
                    }
                }
                i += 1;
            }
            if !merged_any {
                break;
            }
        }
        debug!(merges, remaining = segments.len(), "simplified collinear aggregate");
        Self {
            offset: self.offset.clone(),
            members: segments,
            envelope: OnceCell::new(),
        }
    }

    /// Simplify, collapsing to a bare segment when one member remains.
    pub fn simplify(&self, ctx: &S::Context) -> Geometry<S> {
        self.simplified(ctx).into_geometry()
    }

    pub fn into_geometry(self) -> Geometry<S> {
        if self.members.len() == 1 {
            match self.members().pop() {
                Some(s) => Geometry::Segment(s),
                None => Geometry::Aggregate(self),
            }
        } else {
            Geometry::Aggregate(self)
        }
    }

    /// Combine collinear intersection pieces. Points covered by a segment
    /// are dropped and duplicates collapse.
    fn resolve(
        points: Vec<Point<S>>,
        segments: Vec<LineSegment<S>>,
        ctx: &S::Context,
    ) -> Option<Geometry<S>> {
        let merged = (!segments.is_empty()).then(|| Self::from_members(segments).simplified(ctx));
        let mut isolated: Vec<Point<S>> = Vec::new();
        for p in points {
            let covered = merged.as_ref().is_some_and(|m| m.contains_point(&p, ctx));
            if !covered && !isolated.iter().any(|q| q.approx_eq_in(&p, ctx)) {
                isolated.push(p);
            }
        }
        match (merged, isolated.len()) {
            (None, 0) => None,
            (None, 1) => isolated.pop().map(Geometry::Point),
            (Some(m), 0) => Some(m.into_geometry()),
            (merged, _) => {
                debug!(points = isolated.len(), "collinear intersection mixes points and segments");
                Some(Geometry::Mixed {
                    points: isolated,
                    segments: merged.map(|m| m.members()).unwrap_or_default(),
                })
            }
        }
    }
}

/// Deserialization re-checks the aggregate, so [`CollinearSegments::line`]
/// always has a member to read. Collinearity is tested under the default
/// context.
impl<'de, S: Scalar + Deserialize<'de>> Deserialize<'de> for CollinearSegments<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<S: Scalar> {
            offset: Vector<S>,
            members: Vec<LineSegment<S>>,
        }
        let Raw { offset, members } = Raw::<S>::deserialize(deserializer)?;
        let mut aggregate =
            Self::new(members, &S::Context::default()).map_err(serde::de::Error::custom)?;
        aggregate.offset = offset;
        Ok(aggregate)
    }
}

impl<S: Scalar> Intersect<S, Point<S>> for CollinearSegments<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.contains_point(other, ctx)
            .then(|| Geometry::Point(other.clone()))
    }
}

impl<S: Scalar> Intersect<S, Line<S>> for CollinearSegments<S> {
    fn intersection(&self, other: &Line<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        for member in self.members() {
            match member.intersection(other, ctx) {
                Some(Geometry::Point(x)) => return Some(Geometry::Point(x)),
                // A non-point hit means the line carries the whole aggregate.
                Some(_) => return Some(Geometry::Aggregate(self.clone())),
                None => {}
            }
        }
        None
    }
}

impl<S: Scalar> Intersect<S, LineSegment<S>> for CollinearSegments<S> {
    fn intersection(&self, other: &LineSegment<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if !self.envelope().intersects_in(other.envelope(), ctx) {
            return None;
        }
        let members = self.members();
        if !self.line().is_collinear(&other.line(), ctx) {
            // Crossing the carrier line: at most one point.
            return members.iter().find_map(|m| m.intersection(other, ctx));
        }
        let mut points = Vec::new();
        let mut segments = Vec::new();
        for member in &members {
            match member.intersection(other, ctx) {
                Some(Geometry::Point(x)) => points.push(x),
                Some(Geometry::Segment(s)) => segments.push(s),
                _ => {}
            }
        }
        Self::resolve(points, segments, ctx)
    }
}

impl<S: Scalar> Intersect<S> for CollinearSegments<S> {
    fn intersection(&self, other: &CollinearSegments<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if !self.envelope().intersects_in(other.envelope(), ctx) {
            return None;
        }
        let others = other.members();
        if !self.line().is_collinear(&other.line(), ctx) {
            return others.iter().find_map(|m| self.intersection(m, ctx));
        }
        let mut points = Vec::new();
        let mut segments = Vec::new();
        for a in self.members() {
            for b in &others {
                match Overlap::classify(&a, b, ctx).intersection(&a, b, ctx) {
                    Some(Geometry::Point(x)) => points.push(x),
                    Some(Geometry::Segment(s)) => segments.push(s),
                    _ => {}
                }
            }
        }
        Self::resolve(points, segments, ctx)
    }
}

impl<S: Scalar> Intersect<S, Envelope<S>> for CollinearSegments<S> {
    /// Each member is clipped to the box and the pieces resolve as for a
    /// collinear segment.
    fn intersection(&self, other: &Envelope<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if !self.envelope().intersects_in(other, ctx) {
            return None;
        }
        let mut points = Vec::new();
        let mut segments = Vec::new();
        for member in self.members() {
            match other.intersection(&member, ctx) {
                Some(Geometry::Point(x)) => points.push(x),
                Some(Geometry::Segment(s)) => segments.push(s),
                _ => {}
            }
        }
        Self::resolve(points, segments, ctx)
    }
}
