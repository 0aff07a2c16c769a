//! Helpers on top of nalgebra's `Vector3`, which is the crate's vector type.
//!
//! Everything else (`+`, `-`, scalar `*`, `dot`, `cross`, `lerp`, negation)
//! comes straight from nalgebra and returns new values.

use crate::errors::ValidationError;
use crate::float_types::Real;
use nalgebra::Vector3;

pub trait VectorExt {
    /// Unit vector in the same direction.
    ///
    /// Fails with [`ValidationError::ZeroLengthVector`] instead of producing NaN.
    fn unit(&self) -> Result<Vector3<Real>, ValidationError>;

    /// A vector perpendicular to `self`.
    ///
    /// Built from the two largest components so the result is never zero for
    /// a non-zero input.
    fn perpendicular(&self) -> Vector3<Real>;
}

impl VectorExt for Vector3<Real> {
    fn unit(&self) -> Result<Vector3<Real>, ValidationError> {
        let length = self.norm();
        if !length.is_finite() || length <= Real::EPSILON {
            return Err(ValidationError::ZeroLengthVector);
        }
        Ok(self / length)
    }

    fn perpendicular(&self) -> Vector3<Real> {
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| self[b].abs().total_cmp(&self[a].abs()));
        let [i, j, _] = order;

        let mut perpendicular = Vector3::zeros();
        perpendicular[i] = -self[j];
        perpendicular[j] = self[i];
        perpendicular
    }
}
