//! Pairwise intersection.
//!
//! Each primitive implements [`Intersect`] against the primitives at or
//! below it (a triangle against points, lines and segments, for example).
//! The mirrored impls at the bottom of this file let callers write the
//! arguments in either order.

use std::cmp::Ordering;

use super::collinear::CollinearSegments;
use super::envelope::Envelope;
use super::line::Line;
use super::plane::Plane;
use super::point::Point;
use super::segment::LineSegment;
use super::tetrahedron::Tetrahedron;
use super::triangle::Triangle;
use super::vector::Vector;
use crate::scalar::Scalar;

/// Result of an intersection. An empty intersection is `None`, not a variant.
#[derive(Debug, Clone)]
pub enum Geometry<S> {
    Point(Point<S>),
    Line(Line<S>),
    Segment(LineSegment<S>),
    Aggregate(CollinearSegments<S>),
    /// Isolated points alongside segments, all on one line. Produced by
    /// collinear aggregate intersections that touch at endpoints.
    Mixed {
        points: Vec<Point<S>>,
        segments: Vec<LineSegment<S>>,
    },
}

impl<S: Scalar> Geometry<S> {
    pub fn as_point(&self) -> Option<&Point<S>> {
        match self {
            Geometry::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_segment(&self) -> Option<&LineSegment<S>> {
        match self {
            Geometry::Segment(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Geometry::Point(_))
    }

    /// The span from `a` to `b`: a point when they coincide.
    pub(crate) fn span(a: Point<S>, b: Point<S>, ctx: &S::Context) -> Self {
        if a.approx_eq_in(&b, ctx) {
            Geometry::Point(a)
        } else {
            Geometry::Segment(LineSegment::new_unchecked(&a, &b))
        }
    }

    /// The span covering a set of collinear points.
    pub(crate) fn span_of(points: &[Point<S>], ctx: &S::Context) -> Option<Self> {
        let first = points.first()?;
        let mut best = (first, first, S::zero());
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                let d2 = a.vector_to(b).magnitude_squared();
                if d2 > best.2 {
                    best = (a, b, d2);
                }
            }
        }
        Some(Self::span(best.0.clone(), best.1.clone(), ctx))
    }
}

pub trait Intersect<S: Scalar, Rhs: ?Sized = Self> {
    fn intersection(&self, other: &Rhs, ctx: &S::Context) -> Option<Geometry<S>>;

    fn intersects(&self, other: &Rhs, ctx: &S::Context) -> bool {
        self.intersection(other, ctx).is_some()
    }
}

/// A closed half-space `{x : n . (x - a) <= 0}`.
#[derive(Debug, Clone)]
pub(crate) struct HalfSpace<S> {
    pub a: Point<S>,
    pub n: Vector<S>,
}

/// Clip the parametric line `origin + t * dir` against half-spaces,
/// starting from the parameter range `[lo, hi]` (`None` is unbounded).
/// Returns the surviving closed range, or `None` when it is empty.
///
/// Directions exactly parallel to a boundary plane are decided by the
/// origin's side alone, which makes flat (zero-extent) regions an equality
/// test rather than a division.
pub(crate) fn clip_halfspaces<S: Scalar>(
    origin: &Point<S>,
    dir: &Vector<S>,
    halfspaces: &[HalfSpace<S>],
    mut lo: Option<S>,
    mut hi: Option<S>,
    ctx: &S::Context,
) -> Option<(S, S)> {
    for h in halfspaces {
        let denom = h.n.dot(dir);
        let num = h.n.dot(&origin.vector_to(&h.a));
        if denom.is_zero() {
            if num.sign_scaled_in(&h.n.magnitude_squared(), ctx) == Ordering::Less {
                return None;
            }
            continue;
        }
        let t = num / denom.clone();
        if denom.is_positive() {
            hi = Some(match hi {
                Some(bound) => bound.min_of(t),
                None => t,
            });
        } else {
            lo = Some(match lo {
                Some(bound) => bound.max_of(t),
                None => t,
            });
        }
    }
    let (lo, hi) = (lo?, hi?);
    // Parameters measure multiples of `dir`; compare the gap as a length.
    let reach = S::one() / dir.magnitude_squared();
    match (lo.clone() - hi.clone()).sign_scaled_in(&reach, ctx) {
        Ordering::Greater => None,
        _ => Some((lo, hi)),
    }
}

macro_rules! mirror_intersect {
    ($($lhs:ident => $rhs:ident),* $(,)?) => {
        $(
            impl<S: Scalar> Intersect<S, $rhs<S>> for $lhs<S> {
                fn intersection(&self, other: &$rhs<S>, ctx: &S::Context) -> Option<Geometry<S>> {
                    other.intersection(self, ctx)
                }
            }
        )*
    };
}

mirror_intersect! {
    Point => Line,
    Point => LineSegment,
    Point => Plane,
    Point => Triangle,
    Point => Tetrahedron,
    Point => Envelope,
    Point => CollinearSegments,
    Line => LineSegment,
    Line => Plane,
    Line => Triangle,
    Line => Tetrahedron,
    Line => Envelope,
    Line => CollinearSegments,
    LineSegment => Plane,
    LineSegment => Triangle,
    LineSegment => Tetrahedron,
    LineSegment => Envelope,
    LineSegment => CollinearSegments,
    Envelope => CollinearSegments,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Precision;
    use num_rational::BigRational;

    fn pt(x: i64, y: i64, z: i64) -> Point<BigRational> {
        Point::from_i64s(x, y, z)
    }

    #[test]
    fn test_span_of_picks_extremes() {
        let ctx = Precision::default();
        let points = [pt(2, 0, 0), pt(-1, 0, 0), pt(5, 0, 0), pt(0, 0, 0)];
        let span = Geometry::span_of(&points, &ctx).unwrap();
        let seg = span.as_segment().unwrap();
        assert!(seg.same_span_in(
            &LineSegment::new(&pt(-1, 0, 0), &pt(5, 0, 0)).unwrap(),
            &ctx
        ));
    }

    #[test]
    fn test_span_of_single_point() {
        let ctx = Precision::default();
        let span = Geometry::span_of(&[pt(1, 1, 1), pt(1, 1, 1)], &ctx).unwrap();
        assert_eq!(span.as_point(), Some(&pt(1, 1, 1)));
        assert!(Geometry::<BigRational>::span_of(&[], &ctx).is_none());
    }

    #[test]
    fn test_clip_unit_slab() {
        let ctx = Precision::default();
        // 0 <= x <= 1 along the x axis from x = -1.
        let halfspaces = [
            HalfSpace { a: pt(1, 0, 0), n: Vector::from_i64s(1, 0, 0) },
            HalfSpace { a: pt(0, 0, 0), n: Vector::from_i64s(-1, 0, 0) },
        ];
        let dir = Vector::from_i64s(1, 0, 0);
        let (lo, hi) =
            clip_halfspaces(&pt(-1, 0, 0), &dir, &halfspaces, None, None, &ctx).unwrap();
        assert_eq!(lo, BigRational::from_i64(1));
        assert_eq!(hi, BigRational::from_i64(2));
    }

    #[test]
    fn test_clip_parallel_outside() {
        let ctx = Precision::default();
        let halfspaces = [HalfSpace { a: pt(0, 0, 0), n: Vector::from_i64s(0, 1, 0) }];
        let clipped = clip_halfspaces(
            &pt(0, 1, 0),
            &Vector::from_i64s(1, 0, 0),
            &halfspaces,
            Some(BigRational::from_i64(0)),
            Some(BigRational::from_i64(1)),
            &ctx,
        );
        assert!(clipped.is_none());
    }
}
