use thiserror::Error;

/// Construction-time precondition failures.
///
/// An empty intersection is not an error; intersections return `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("direction vector is zero")]
    ZeroDirection,

    #[error("plane normal is zero")]
    ZeroNormal,

    #[error("segment endpoints coincide")]
    DegenerateSegment,

    #[error("triangle vertices are collinear")]
    DegenerateTriangle,

    #[error("tetrahedron vertices are coplanar")]
    DegenerateTetrahedron,

    #[error("collinear aggregate needs at least one segment")]
    EmptyAggregate,

    #[error("segment {index} is not collinear with the aggregate")]
    NotCollinear { index: usize },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
