//! Three-dimensional geometry kernel with exact and floating-point modes.
//!
//! All primitives are generic over a [`Scalar`]. Use the [`exact`] aliases
//! for arbitrary-precision rationals, or [`float`] for `f64`. Operations
//! that need a tolerance or rounding policy take the mode's context
//! explicitly; nothing reads global state.

pub mod error;
pub mod geometry;
pub mod scalar;

// Re-export key traits and types at crate root for convenience.
pub use error::{GeometryError, Result};
pub use geometry::{Distance, Geometry, Intersect};
pub use scalar::{Precision, RoundingMode, Scalar, Tolerance};

/// Exact-mode primitives over [`num_rational::BigRational`].
pub mod exact {
    use num_rational::BigRational;

    use crate::geometry;

    pub type Vector = geometry::Vector<BigRational>;
    pub type Point = geometry::Point<BigRational>;
    pub type Line = geometry::Line<BigRational>;
    pub type LineSegment = geometry::LineSegment<BigRational>;
    pub type CollinearSegments = geometry::CollinearSegments<BigRational>;
    pub type Plane = geometry::Plane<BigRational>;
    pub type Triangle = geometry::Triangle<BigRational>;
    pub type Tetrahedron = geometry::Tetrahedron<BigRational>;
    pub type Envelope = geometry::Envelope<BigRational>;
    pub type Geometry = geometry::Geometry<BigRational>;
}

/// Float-mode primitives over `f64`.
pub mod float {
    use crate::geometry;

    pub type Vector = geometry::Vector<f64>;
    pub type Point = geometry::Point<f64>;
    pub type Line = geometry::Line<f64>;
    pub type LineSegment = geometry::LineSegment<f64>;
    pub type CollinearSegments = geometry::CollinearSegments<f64>;
    pub type Plane = geometry::Plane<f64>;
    pub type Triangle = geometry::Triangle<f64>;
    pub type Tetrahedron = geometry::Tetrahedron<f64>;
    pub type Envelope = geometry::Envelope<f64>;
    pub type Geometry = geometry::Geometry<f64>;
}
