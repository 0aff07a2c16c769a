//! Oriented coordinate frames: an origin plus three axes.

use crate::errors::ValidationError;
use crate::float_types::Real;
use crate::mesh::plane::Plane;
use crate::vector::VectorExt;
use nalgebra::{Point3, Vector3};

/// A local coordinate system embedded in world space.
///
/// Frames built by this module are right-handed and orthonormal, but
/// [`Transform::change_basis`](crate::transform::Transform::change_basis)
/// accepts any linearly independent axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point3<Real>,
    pub x_axis: Vector3<Real>,
    pub y_axis: Vector3<Real>,
    pub z_axis: Vector3<Real>,
}

impl Frame {
    /// The world frame: origin at zero, axes along +X, +Y, +Z.
    pub fn world_xy() -> Self {
        Frame {
            origin: Point3::origin(),
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
            z_axis: Vector3::z(),
        }
    }

    /// Frame through three points: origin `a`, x along `b − a`, z along
    /// `(b − a) × (c − a)`.
    pub fn from_points(
        a: &Point3<Real>,
        b: &Point3<Real>,
        c: &Point3<Real>,
    ) -> Result<Self, ValidationError> {
        let x_axis = (*b - *a).unit()?;
        let z_axis = x_axis
            .cross(&(*c - *a))
            .unit()
            .map_err(|_| ValidationError::DegeneratePlane(*a))?;
        let y_axis = z_axis.cross(&x_axis);
        Ok(Frame {
            origin: *a,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Frame lying in `plane`, with z along the plane normal.
    ///
    /// `origin` is projected onto the plane; the x axis is an arbitrary
    /// perpendicular of the normal.
    pub fn from_plane(plane: &Plane, origin: &Point3<Real>) -> Result<Self, ValidationError> {
        let z_axis = plane.normal().unit()?;
        let x_axis = z_axis.perpendicular().unit()?;
        let y_axis = z_axis.cross(&x_axis);
        let origin = *origin - z_axis * (z_axis.dot(&origin.coords) - plane.offset());
        Ok(Frame {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// World position of local coordinates `(u, v, w)`.
    pub fn point_at(&self, u: Real, v: Real, w: Real) -> Point3<Real> {
        self.origin + self.x_axis * u + self.y_axis * v + self.z_axis * w
    }
}
