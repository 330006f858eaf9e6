//! Minimum distances between primitives.
//!
//! Every pair computes the squared distance, which stays exact in exact
//! mode. [`Distance::distance`] takes the one square root at the end.
//! Pairs that already intersect short-circuit to zero.

use super::collinear::CollinearSegments;
use super::envelope::Envelope;
use super::intersect::Intersect;
use super::line::Line;
use super::plane::Plane;
use super::point::Point;
use super::segment::LineSegment;
use super::tetrahedron::Tetrahedron;
use super::triangle::Triangle;
use crate::scalar::Scalar;

pub trait Distance<S: Scalar, Rhs: ?Sized = Self> {
    fn distance_squared(&self, other: &Rhs, ctx: &S::Context) -> S;

    fn distance(&self, other: &Rhs, ctx: &S::Context) -> S {
        self.distance_squared(other, ctx).sqrt_in(ctx)
    }
}

fn min_over<S: Scalar>(values: impl IntoIterator<Item = S>) -> S {
    values
        .into_iter()
        .reduce(S::min_of)
        .unwrap_or_else(S::zero)
}

// Point

impl<S: Scalar> Distance<S> for Point<S> {
    fn distance_squared(&self, other: &Point<S>, _ctx: &S::Context) -> S {
        self.vector_to(other).magnitude_squared()
    }
}

impl<S: Scalar> Distance<S, Line<S>> for Point<S> {
    /// `|w|^2 - (w . v)^2 / |v|^2` for `w` from the line's point.
    fn distance_squared(&self, other: &Line<S>, _ctx: &S::Context) -> S {
        let w = other.point().vector_to(self);
        let v = other.direction();
        let along = w.dot(v);
        let d2 = w.magnitude_squared() - along.clone() * along / v.magnitude_squared();
        d2.max_of(S::zero())
    }
}

impl<S: Scalar> Distance<S, LineSegment<S>> for Point<S> {
    fn distance_squared(&self, other: &LineSegment<S>, ctx: &S::Context) -> S {
        let d = other.direction();
        let t = (other.p().vector_to(self).dot(&d) / d.magnitude_squared()).clamp_unit();
        self.distance_squared(&other.point_at(&t), ctx)
    }
}

impl<S: Scalar> Distance<S, Plane<S>> for Point<S> {
    fn distance_squared(&self, other: &Plane<S>, _ctx: &S::Context) -> S {
        other.distance_squared_to_point(self)
    }
}

impl<S: Scalar> Distance<S, Triangle<S>> for Point<S> {
    fn distance_squared(&self, other: &Triangle<S>, ctx: &S::Context) -> S {
        let plane = other.plane();
        if other.contains_point(&plane.project(self), ctx) {
            return plane.distance_squared_to_point(self);
        }
        min_over(other.edges().iter().map(|e| self.distance_squared(e, ctx)))
    }
}

impl<S: Scalar> Distance<S, Tetrahedron<S>> for Point<S> {
    fn distance_squared(&self, other: &Tetrahedron<S>, ctx: &S::Context) -> S {
        if other.contains_point(self, ctx) {
            return S::zero();
        }
        min_over(other.faces().iter().map(|f| self.distance_squared(f, ctx)))
    }
}

impl<S: Scalar> Distance<S, Envelope<S>> for Point<S> {
    fn distance_squared(&self, other: &Envelope<S>, _ctx: &S::Context) -> S {
        other.distance_squared_to_point(self)
    }
}

impl<S: Scalar> Distance<S, CollinearSegments<S>> for Point<S> {
    fn distance_squared(&self, other: &CollinearSegments<S>, ctx: &S::Context) -> S {
        min_over(other.members().iter().map(|m| self.distance_squared(m, ctx)))
    }
}

// Line

impl<S: Scalar> Distance<S> for Line<S> {
    /// Parallel lines reduce to a point–line distance; otherwise the gap
    /// along the common normal `n = v1 x v2` is `(w . n)^2 / |n|^2`.
    fn distance_squared(&self, other: &Line<S>, ctx: &S::Context) -> S {
        if self.is_parallel(other, ctx) {
            return other.point().distance_squared(self, ctx);
        }
        if self.intersects(other, ctx) {
            return S::zero();
        }
        let n = self.direction().cross(other.direction());
        let gap = self.point().vector_to(&other.point()).dot(&n);
        gap.clone() * gap / n.magnitude_squared()
    }
}

impl<S: Scalar> Distance<S, LineSegment<S>> for Line<S> {
    /// Only the segment parameter is clamped: the squared distance from
    /// `seg(u)` to the line is convex in `u`.
    fn distance_squared(&self, other: &LineSegment<S>, ctx: &S::Context) -> S {
        if self.intersects(other, ctx) {
            return S::zero();
        }
        let u = match self.closest_parameters(&other.line()) {
            Some((_, u)) if !self.is_parallel(&other.line(), ctx) => u.clamp_unit(),
            _ => S::zero(),
        };
        other.point_at(&u).distance_squared(self, ctx)
    }
}

impl<S: Scalar> Distance<S, Plane<S>> for Line<S> {
    fn distance_squared(&self, other: &Plane<S>, ctx: &S::Context) -> S {
        if other.is_parallel_to(self, ctx) {
            other.distance_squared_to_point(&self.point())
        } else {
            S::zero()
        }
    }
}

impl<S: Scalar> Distance<S, Triangle<S>> for Line<S> {
    /// A line missing the triangle is closest to its boundary.
    fn distance_squared(&self, other: &Triangle<S>, ctx: &S::Context) -> S {
        if other.intersects(self, ctx) {
            return S::zero();
        }
        min_over(other.edges().iter().map(|e| self.distance_squared(e, ctx)))
    }
}

impl<S: Scalar> Distance<S, Tetrahedron<S>> for Line<S> {
    fn distance_squared(&self, other: &Tetrahedron<S>, ctx: &S::Context) -> S {
        if other.intersects(self, ctx) {
            return S::zero();
        }
        min_over(other.faces().iter().map(|f| self.distance_squared(f, ctx)))
    }
}

impl<S: Scalar> Distance<S, CollinearSegments<S>> for Line<S> {
    fn distance_squared(&self, other: &CollinearSegments<S>, ctx: &S::Context) -> S {
        min_over(other.members().iter().map(|m| self.distance_squared(m, ctx)))
    }
}

// LineSegment

impl<S: Scalar> Distance<S> for LineSegment<S> {
    /// Closest points of two segments with both parameters clamped to
    /// `[0, 1]` (Ericson, Real-Time Collision Detection 5.1.9).
    fn distance_squared(&self, other: &LineSegment<S>, ctx: &S::Context) -> S {
        if self.intersects(other, ctx) {
            return S::zero();
        }
        let d1 = self.direction();
        let d2 = other.direction();
        let r = other.p().vector_to(&self.p());
        let a = d1.magnitude_squared();
        let e = d2.magnitude_squared();
        let f = d2.dot(&r);
        let c = d1.dot(&r);
        let b = d1.dot(&d2);
        // `|d1 x d2|^2`; negligible against `|d1|^2 |d2|^2` when parallel.
        let denom = a.clone() * e.clone() - b.clone() * b.clone();

        let mut s = if denom.is_negligible_squared_in(&(a.clone() * e.clone()), ctx) {
            S::zero()
        } else {
            ((b.clone() * f.clone() - c.clone() * e.clone()) / denom).clamp_unit()
        };
        let mut t = (b.clone() * s.clone() + f) / e;
        if t.is_negative() {
            t = S::zero();
            s = (-c / a).clamp_unit();
        } else if t > S::one() {
            t = S::one();
            s = ((b - c) / a).clamp_unit();
        }
        self.point_at(&s).distance_squared(&other.point_at(&t), ctx)
    }
}

impl<S: Scalar> Distance<S, Plane<S>> for LineSegment<S> {
    /// A segment that does not cross the plane is closest at an endpoint.
    fn distance_squared(&self, other: &Plane<S>, ctx: &S::Context) -> S {
        if other.intersects(self, ctx) {
            return S::zero();
        }
        other
            .distance_squared_to_point(&self.p())
            .min_of(other.distance_squared_to_point(&self.q()))
    }
}

impl<S: Scalar> Distance<S, Triangle<S>> for LineSegment<S> {
    fn distance_squared(&self, other: &Triangle<S>, ctx: &S::Context) -> S {
        if other.intersects(self, ctx) {
            return S::zero();
        }
        let edges = other.edges().into_iter().map(|e| self.distance_squared(&e, ctx));
        let ends = [self.p(), self.q()]
            .into_iter()
            .map(|end| end.distance_squared(other, ctx));
        min_over(edges.chain(ends))
    }
}

impl<S: Scalar> Distance<S, Tetrahedron<S>> for LineSegment<S> {
    fn distance_squared(&self, other: &Tetrahedron<S>, ctx: &S::Context) -> S {
        if other.intersects(self, ctx) {
            return S::zero();
        }
        min_over(other.faces().iter().map(|f| self.distance_squared(f, ctx)))
    }
}

impl<S: Scalar> Distance<S, CollinearSegments<S>> for LineSegment<S> {
    fn distance_squared(&self, other: &CollinearSegments<S>, ctx: &S::Context) -> S {
        min_over(other.members().iter().map(|m| self.distance_squared(m, ctx)))
    }
}

// Envelope

impl<S: Scalar> Distance<S> for Envelope<S> {
    fn distance_squared(&self, other: &Envelope<S>, _ctx: &S::Context) -> S {
        self.distance_squared_to(other)
    }
}

/// Distance from one box edge to `target`; a flat axis leaves a corner.
fn edge_distance<S: Scalar, T>(edge: &(Point<S>, Point<S>), target: &T, ctx: &S::Context) -> S
where
    Point<S>: Distance<S, T>,
    LineSegment<S>: Distance<S, T>,
{
    let (a, b) = edge;
    if a == b {
        a.distance_squared(target, ctx)
    } else {
        LineSegment::new_unchecked(a, b).distance_squared(target, ctx)
    }
}

impl<S: Scalar> Distance<S, Line<S>> for Envelope<S> {
    /// A line that misses the box passes closest to one of its edges.
    fn distance_squared(&self, other: &Line<S>, ctx: &S::Context) -> S {
        if self.intersects(other, ctx) {
            return S::zero();
        }
        min_over(self.edges().iter().map(|e| edge_distance(e, other, ctx)))
    }
}

impl<S: Scalar> Distance<S, LineSegment<S>> for Envelope<S> {
    fn distance_squared(&self, other: &LineSegment<S>, ctx: &S::Context) -> S {
        if self.intersects(other, ctx) {
            return S::zero();
        }
        let edges = self.edges();
        let to_edges = edges.iter().map(|e| edge_distance(e, other, ctx));
        let ends = [other.p(), other.q()]
            .into_iter()
            .map(|end| self.distance_squared_to_point(&end));
        min_over(to_edges.chain(ends))
    }
}

// CollinearSegments

impl<S: Scalar> Distance<S> for CollinearSegments<S> {
    fn distance_squared(&self, other: &CollinearSegments<S>, ctx: &S::Context) -> S {
        min_over(self.members().iter().map(|m| m.distance_squared(other, ctx)))
    }
}

/// Aggregate distances as the minimum over members.
macro_rules! member_distance {
    ($($rhs:ident),* $(,)?) => {
        $(
            impl<S: Scalar> Distance<S, $rhs<S>> for CollinearSegments<S> {
                fn distance_squared(&self, other: &$rhs<S>, ctx: &S::Context) -> S {
                    min_over(self.members().iter().map(|m| m.distance_squared(other, ctx)))
                }
            }
        )*
    };
}

member_distance!(Plane, Triangle, Tetrahedron, Envelope);

macro_rules! mirror_distance {
    ($($lhs:ident => $rhs:ident),* $(,)?) => {
        $(
            impl<S: Scalar> Distance<S, $rhs<S>> for $lhs<S> {
                fn distance_squared(&self, other: &$rhs<S>, ctx: &S::Context) -> S {
                    other.distance_squared(self, ctx)
                }
            }
        )*
    };
}

mirror_distance! {
    Line => Point,
    LineSegment => Point,
    Plane => Point,
    Triangle => Point,
    Tetrahedron => Point,
    Envelope => Point,
    CollinearSegments => Point,
    LineSegment => Line,
    Plane => Line,
    Triangle => Line,
    Tetrahedron => Line,
    CollinearSegments => Line,
    Plane => LineSegment,
    Triangle => LineSegment,
    Tetrahedron => LineSegment,
    CollinearSegments => LineSegment,
    Line => Envelope,
    LineSegment => Envelope,
    Plane => CollinearSegments,
    Triangle => CollinearSegments,
    Tetrahedron => CollinearSegments,
    Envelope => CollinearSegments,
}
