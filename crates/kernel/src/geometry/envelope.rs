//! Axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

use super::intersect::{clip_halfspaces, Geometry, HalfSpace, Intersect};
use super::line::Line;
use super::point::Point;
use super::segment::LineSegment;
use super::vector::Vector;
use crate::scalar::Scalar;

/// Closed box `[xmin, xmax] x [ymin, ymax] x [zmin, zmax]`.
///
/// Any axis may have zero extent, so an envelope can be flat, a line or a
/// single point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<S> {
    pub xmin: S,
    pub xmax: S,
    pub ymin: S,
    pub ymax: S,
    pub zmin: S,
    pub zmax: S,
}

fn ordered<S: Scalar>(a: S, b: S) -> (S, S) {
    if b < a { (b, a) } else { (a, b) }
}

impl<S: Scalar> Envelope<S> {
    /// Bounds are swapped per axis if given in the wrong order.
    pub fn new(xmin: S, xmax: S, ymin: S, ymax: S, zmin: S, zmax: S) -> Self {
        let (xmin, xmax) = ordered(xmin, xmax);
        let (ymin, ymax) = ordered(ymin, ymax);
        let (zmin, zmax) = ordered(zmin, zmax);
        Self { xmin, xmax, ymin, ymax, zmin, zmax }
    }

    pub fn from_point(p: &Point<S>) -> Self {
        let (x, y, z) = (p.x(), p.y(), p.z());
        Self {
            xmin: x.clone(),
            xmax: x,
            ymin: y.clone(),
            ymax: y,
            zmin: z.clone(),
            zmax: z,
        }
    }

    /// Box spanned by two opposite corners.
    pub fn from_corners(a: &Point<S>, b: &Point<S>) -> Self {
        Self::new(a.x(), b.x(), a.y(), b.y(), a.z(), b.z())
    }

    /// Tightest box around `points`, `None` when empty.
    pub fn from_points(points: &[Point<S>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(
            rest.iter()
                .fold(Self::from_point(first), |env, p| env.union(&Self::from_point(p))),
        )
    }

    pub fn lower(&self) -> Point<S> {
        Point::new(self.xmin.clone(), self.ymin.clone(), self.zmin.clone())
    }

    pub fn upper(&self) -> Point<S> {
        Point::new(self.xmax.clone(), self.ymax.clone(), self.zmax.clone())
    }

    /// Edge lengths along each axis.
    pub fn extent(&self) -> Vector<S> {
        self.lower().vector_to(&self.upper())
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            xmin: self.xmin.clone().min_of(other.xmin.clone()),
            xmax: self.xmax.clone().max_of(other.xmax.clone()),
            ymin: self.ymin.clone().min_of(other.ymin.clone()),
            ymax: self.ymax.clone().max_of(other.ymax.clone()),
            zmin: self.zmin.clone().min_of(other.zmin.clone()),
            zmax: self.zmax.clone().max_of(other.zmax.clone()),
        }
    }

    /// Common box, `None` if any axis interval empties.
    pub fn overlap(&self, other: &Self) -> Option<Self> {
        let env = Self {
            xmin: self.xmin.clone().max_of(other.xmin.clone()),
            xmax: self.xmax.clone().min_of(other.xmax.clone()),
            ymin: self.ymin.clone().max_of(other.ymin.clone()),
            ymax: self.ymax.clone().min_of(other.ymax.clone()),
            zmin: self.zmin.clone().max_of(other.zmin.clone()),
            zmax: self.zmax.clone().min_of(other.zmax.clone()),
        };
        (env.xmin <= env.xmax && env.ymin <= env.ymax && env.zmin <= env.zmax).then_some(env)
    }

    /// Exact overlap test, touching boxes included.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlap(other).is_some()
    }

    /// Overlap test with the context's tolerance. Used as a cheap reject
    /// before exact intersection work.
    pub fn intersects_in(&self, other: &Self, ctx: &S::Context) -> bool {
        self.xmin.le_in(&other.xmax, ctx)
            && other.xmin.le_in(&self.xmax, ctx)
            && self.ymin.le_in(&other.ymax, ctx)
            && other.ymin.le_in(&self.ymax, ctx)
            && self.zmin.le_in(&other.zmax, ctx)
            && other.zmin.le_in(&self.zmax, ctx)
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.xmin <= other.xmin
            && other.xmax <= self.xmax
            && self.ymin <= other.ymin
            && other.ymax <= self.ymax
            && self.zmin <= other.zmin
            && other.zmax <= self.zmax
    }

    pub fn contains_point(&self, p: &Point<S>, ctx: &S::Context) -> bool {
        let (x, y, z) = (p.x(), p.y(), p.z());
        self.xmin.le_in(&x, ctx)
            && x.le_in(&self.xmax, ctx)
            && self.ymin.le_in(&y, ctx)
            && y.le_in(&self.ymax, ctx)
            && self.zmin.le_in(&z, ctx)
            && z.le_in(&self.zmax, ctx)
    }

    pub fn translate(&mut self, v: &Vector<S>) {
        self.xmin = self.xmin.clone() + v.dx.clone();
        self.xmax = self.xmax.clone() + v.dx.clone();
        self.ymin = self.ymin.clone() + v.dy.clone();
        self.ymax = self.ymax.clone() + v.dy.clone();
        self.zmin = self.zmin.clone() + v.dz.clone();
        self.zmax = self.zmax.clone() + v.dz.clone();
    }

    pub fn translated(&self, v: &Vector<S>) -> Self {
        let mut env = self.clone();
        env.translate(v);
        env
    }

    /// Squared distance from `p` to the box, zero inside.
    pub fn distance_squared_to_point(&self, p: &Point<S>) -> S {
        let dx = axis_gap(&self.xmin, &self.xmax, &p.x(), &p.x());
        let dy = axis_gap(&self.ymin, &self.ymax, &p.y(), &p.y());
        let dz = axis_gap(&self.zmin, &self.zmax, &p.z(), &p.z());
        dx.clone() * dx + dy.clone() * dy + dz.clone() * dz
    }

    /// Squared distance between the closest points of two boxes.
    pub fn distance_squared_to(&self, other: &Self) -> S {
        let dx = axis_gap(&self.xmin, &self.xmax, &other.xmin, &other.xmax);
        let dy = axis_gap(&self.ymin, &self.ymax, &other.ymin, &other.ymax);
        let dz = axis_gap(&self.zmin, &self.zmax, &other.zmin, &other.zmax);
        dx.clone() * dx + dy.clone() * dy + dz.clone() * dz
    }

    /// The eight corners; bit 0 of the index picks `xmax`, bit 1 `ymax`,
    /// bit 2 `zmax`.
    pub fn corners(&self) -> [Point<S>; 8] {
        std::array::from_fn(|i| {
            let pick = |bit: usize, lo: &S, hi: &S| {
                if i & bit == 0 { lo.clone() } else { hi.clone() }
            };
            Point::new(
                pick(1, &self.xmin, &self.xmax),
                pick(2, &self.ymin, &self.ymax),
                pick(4, &self.zmin, &self.zmax),
            )
        })
    }

    /// The twelve edges as corner pairs. Along a flat axis the pair
    /// coincides.
    pub(crate) fn edges(&self) -> Vec<(Point<S>, Point<S>)> {
        let corners = self.corners();
        let mut edges = Vec::with_capacity(12);
        for i in 0..8 {
            for bit in [1, 2, 4] {
                if i & bit == 0 {
                    edges.push((corners[i].clone(), corners[i | bit].clone()));
                }
            }
        }
        edges
    }

    /// The six bounding slabs as inward half-spaces.
    fn halfspaces(&self) -> [HalfSpace<S>; 6] {
        let (lo, hi) = (self.lower(), self.upper());
        [
            HalfSpace { a: hi.clone(), n: Vector::i() },
            HalfSpace { a: lo.clone(), n: -Vector::i() },
            HalfSpace { a: hi.clone(), n: Vector::j() },
            HalfSpace { a: lo.clone(), n: -Vector::j() },
            HalfSpace { a: hi, n: Vector::k() },
            HalfSpace { a: lo, n: -Vector::k() },
        ]
    }
}

/// Gap between the intervals `[lo1, hi1]` and `[lo2, hi2]`, zero if they
/// overlap.
fn axis_gap<S: Scalar>(lo1: &S, hi1: &S, lo2: &S, hi2: &S) -> S {
    if hi1 < lo2 {
        lo2.clone() - hi1.clone()
    } else if hi2 < lo1 {
        lo1.clone() - hi2.clone()
    } else {
        S::zero()
    }
}

impl<S: Scalar> Intersect<S, Point<S>> for Envelope<S> {
    fn intersection(&self, other: &Point<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        self.contains_point(other, ctx)
            .then(|| Geometry::Point(other.clone()))
    }
}

impl<S: Scalar> Intersect<S, Line<S>> for Envelope<S> {
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

impl<S: Scalar> Intersect<S, LineSegment<S>> for Envelope<S> {
    fn intersection(&self, other: &LineSegment<S>, ctx: &S::Context) -> Option<Geometry<S>> {
        if !self.intersects_in(other.envelope(), ctx) {
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

    fn cube() -> Envelope<BigRational> {
        Envelope::from_corners(&pt(-1, -1, -1), &pt(1, 1, 1))
    }

    #[test]
    fn test_box_clips_x_axis() {
        let ctx = Precision::default();
        let hit = cube().intersection(&Line::x_axis(), &ctx).unwrap();
        let seg = hit.as_segment().unwrap();
        assert!(seg.same_span_in(&LineSegment::new(&pt(-1, 0, 0), &pt(1, 0, 0)).unwrap(), &ctx));
    }

    #[test]
    fn test_corners_and_edges() {
        let corners = cube().corners();
        assert_eq!(corners[0], pt(-1, -1, -1));
        assert_eq!(corners[7], pt(1, 1, 1));
        assert_eq!(corners[5], pt(1, -1, 1));
        let edges = cube().edges();
        assert_eq!(edges.len(), 12);
        let four = BigRational::from_i64(4);
        assert!(edges.iter().all(|(a, b)| a.vector_to(b).magnitude_squared() == four));
    }

    #[test]
    fn test_new_orders_bounds() {
        let env = Envelope::<BigRational>::new(
            BigRational::from_i64(3),
            BigRational::from_i64(1),
            BigRational::from_i64(0),
            BigRational::from_i64(0),
            BigRational::from_i64(-2),
            BigRational::from_i64(2),
        );
        assert_eq!(env.lower(), pt(1, 0, -2));
        assert_eq!(env.upper(), pt(3, 0, 2));
        assert_eq!(env.extent(), Vector::from_i64s(2, 0, 4));
    }

    #[test]
    fn test_union_and_overlap() {
        let a = cube();
        let b = Envelope::from_corners(&pt(0, 0, 0), &pt(3, 2, 1));
        let u = a.union(&b);
        assert!(u.contains(&a) && u.contains(&b));
        assert_eq!(u.upper(), pt(3, 2, 1));
        let o = a.overlap(&b).unwrap();
        assert_eq!(o, Envelope::from_corners(&pt(0, 0, 0), &pt(1, 1, 1)));
        let far = Envelope::from_corners(&pt(5, 5, 5), &pt(6, 6, 6));
        assert!(a.overlap(&far).is_none());
        assert!(!a.overlaps(&far));
        // Touching faces still overlap, as a flat box.
        let touching = Envelope::from_corners(&pt(1, -1, -1), &pt(2, 1, 1));
        assert_eq!(a.overlap(&touching).unwrap().extent().dx, BigRational::from_i64(0));
    }

    #[test]
    fn test_from_points() {
        let env = Envelope::from_points(&[pt(1, 5, 0), pt(-2, 0, 3), pt(0, 1, 1)]).unwrap();
        assert_eq!(env, Envelope::from_corners(&pt(-2, 0, 0), &pt(1, 5, 3)));
        assert!(Envelope::<BigRational>::from_points(&[]).is_none());
    }

    #[test]
    fn test_point_membership_is_inclusive() {
        let ctx = Precision::default();
        let env = cube();
        assert!(env.intersects(&pt(1, 1, 1), &ctx));
        assert!(env.intersects(&pt(0, -1, 0), &ctx));
        assert!(!env.intersects(&pt(0, 2, 0), &ctx));
    }

    #[test]
    fn test_segment_partly_inside() {
        let ctx = Precision::default();
        let s = LineSegment::new(&pt(0, 0, 0), &pt(4, 0, 0)).unwrap();
        let hit = cube().intersection(&s, &ctx).unwrap();
        assert!(hit.as_segment().unwrap().same_span_in(
            &LineSegment::new(&pt(0, 0, 0), &pt(1, 0, 0)).unwrap(),
            &ctx
        ));
        let inside = LineSegment::new(&pt(0, 0, 0), &pt(1, 1, 0)).unwrap();
        assert_eq!(cube().intersection(&inside, &ctx).unwrap().as_segment(), Some(&inside));
    }

    #[test]
    fn test_segment_grazing_corner_is_point() {
        let ctx = Precision::default();
        let s = LineSegment::new(&pt(1, 1, 1), &pt(2, 2, 2)).unwrap();
        assert_eq!(cube().intersection(&s, &ctx).unwrap().as_point(), Some(&pt(1, 1, 1)));
    }

    #[test]
    fn test_flat_box_uses_equality() {
        let ctx = Precision::default();
        let flat = Envelope::from_corners(&pt(0, 0, 0), &pt(2, 2, 0));
        let in_plane = Line::new(&pt(0, 1, 0), Vector::i()).unwrap();
        let hit = flat.intersection(&in_plane, &ctx).unwrap();
        assert!(hit.as_segment().unwrap().same_span_in(
            &LineSegment::new(&pt(0, 1, 0), &pt(2, 1, 0)).unwrap(),
            &ctx
        ));
        let above = Line::new(&pt(0, 1, 1), Vector::i()).unwrap();
        assert!(flat.intersection(&above, &ctx).is_none());
        let through = Line::new(&pt(1, 1, 5), Vector::k()).unwrap();
        assert_eq!(flat.intersection(&through, &ctx).unwrap().as_point(), Some(&pt(1, 1, 0)));
    }

    #[test]
    fn test_line_missing_box() {
        let ctx = Tolerance::default();
        let env = Envelope::from_corners(&Point::new(0.0, 0.0, 0.0), &Point::new(1.0, 1.0, 1.0));
        let line = Line::new(&Point::new(0.0, 3.0, 0.0), Vector::new(1.0, 1.0, 0.0)).unwrap();
        assert!(env.intersection(&line, &ctx).is_none());
        assert!(!line.intersects(&env, &ctx));
    }

    #[test]
    fn test_translate_and_distances() {
        let mut env = cube();
        env.translate(&Vector::from_i64s(2, 0, 0));
        assert_eq!(env.lower(), pt(1, -1, -1));
        assert_eq!(env.distance_squared_to_point(&pt(-1, 3, 0)), BigRational::from_i64(8));
        assert_eq!(env.distance_squared_to_point(&pt(2, 0, 0)), BigRational::from_i64(0));
        let other = Envelope::from_corners(&pt(-3, -1, 4), &pt(-2, 0, 5));
        // Gaps of 3 in x and 3 in z.
        assert_eq!(env.distance_squared_to(&other), BigRational::from_i64(18));
    }
}
