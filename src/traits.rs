use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::float_types::Real;
use crate::transform::Transform;
use nalgebra::{Point3, Unit, Vector3};

/// Boolean operations + transformations
pub trait CSG: Sized + Clone {
    fn new() -> Self;
    fn union(&self, other: &Self) -> Self;
    fn subtract(&self, other: &Self) -> Self;
    fn intersect(&self, other: &Self) -> Self;
    fn transform(&self, transform: &Transform) -> Self;
    fn bounding_box(&self) -> Aabb;
    fn invalidate_bounding_box(&mut self);
    fn inverse(&self) -> Self;

    /// Returns a new Self translated by vector.
    fn translate_vector(&self, vector: Vector3<Real>) -> Self {
        self.transform(&Transform::translation(vector.x, vector.y, vector.z))
    }

    /// Returns a new Self translated by x, y, and z.
    fn translate(&self, x: Real, y: Real, z: Real) -> Self {
        self.translate_vector(Vector3::new(x, y, z))
    }

    /// Returns a new Self translated so that its bounding-box center is at the origin.
    fn center(&self) -> Self {
        let aabb = self.bounding_box();
        let center = aabb.center();
        self.translate(-center.x, -center.y, -center.z)
    }

    /// Translates the object so that its lowest point sits exactly at z=0.
    fn float(&self) -> Self {
        let aabb = self.bounding_box();
        self.translate(0.0, 0.0, -aabb.mins.z)
    }

    /// Rotates by `x_deg`, `y_deg`, `z_deg` about the world axes, X first.
    fn rotate(&self, x_deg: Real, y_deg: Real, z_deg: Real) -> Self {
        let origin = Point3::origin();
        let rx = Transform::rotation_unit(x_deg.to_radians(), &Vector3::x_axis(), &origin);
        let ry = Transform::rotation_unit(y_deg.to_radians(), &Vector3::y_axis(), &origin);
        let rz = Transform::rotation_unit(z_deg.to_radians(), &Vector3::z_axis(), &origin);

        // Compose them in the desired order
        self.transform(&(rz * ry * rx))
    }

    /// Rotates by `angle_deg` about `axis` through the origin.
    fn rotate_axis(&self, angle_deg: Real, axis: &Unit<Vector3<Real>>) -> Self {
        self.transform(&Transform::rotation_unit(
            angle_deg.to_radians(),
            axis,
            &Point3::origin(),
        ))
    }

    /// Scales by `sx`, `sy`, `sz` about the origin.
    fn scale(&self, sx: Real, sy: Real, sz: Real) -> Self {
        self.transform(&Transform::diagonal(sx, sy, sz))
    }

    /// Reflect across the selected coordinate planes through the origin:
    /// `x` negates x coordinates (mirrors across the YZ plane) and so on.
    fn mirror(&self, x: bool, y: bool, z: bool) -> Self {
        let sign = |flag: bool| if flag { -1.0 } else { 1.0 };
        self.transform(&Transform::diagonal(sign(x), sign(y), sign(z)))
    }
}
