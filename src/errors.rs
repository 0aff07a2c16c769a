//! Validation errors

use crate::float_types::Real;
use nalgebra::Point3;

/// All the possible validation issues we might encounter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (DegeneratePlane) Three points are collinear and span no plane
    #[error("(DegeneratePlane) The points do not define a plane at: {0}")]
    DegeneratePlane(Point3<Real>),
    /// (ZeroLengthVector) A vector of (near) zero length was normalized
    #[error("(ZeroLengthVector) Cannot take the unit of a zero-length vector")]
    ZeroLengthVector,
    /// (SingularBasis) The target basis of a change of basis is not linearly independent
    #[error("(SingularBasis) No transform exists: the target basis is degenerate")]
    SingularBasis,
    /// (TooFewPoints) A polygon has fewer than 3 vertices
    #[error("(TooFewPoints) A polygon needs at least 3 vertices, got {0}")]
    TooFewPoints(usize),
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// (IndexOutOfRange) A face references a point that does not exist
    #[error("(IndexOutOfRange) Face index {index} is out of range (points.len = {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// Malformed arguments handed to a constructor
    #[error("(InvalidInput) {0}")]
    InvalidInput(String),
}
