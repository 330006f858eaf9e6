pub mod vector;
pub mod point;
pub mod line;
pub mod segment;
pub mod collinear;
pub mod plane;
pub mod triangle;
pub mod tetrahedron;
pub mod envelope;
pub mod intersect;
pub mod distance;

pub use collinear::{merge, CollinearSegments, Endpoint, Overlap};
pub use distance::Distance;
pub use envelope::Envelope;
pub use intersect::{Geometry, Intersect};
pub use line::Line;
pub use plane::Plane;
pub use point::Point;
pub use segment::LineSegment;
pub use tetrahedron::Tetrahedron;
pub use triangle::Triangle;
pub use vector::Vector;
