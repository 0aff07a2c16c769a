//! 4×4 affine transforms and the change-of-basis solve.
//!
//! Entries are addressed row-major, `(row, col)`. Points are column vectors,
//! so `a.multiply(&b)` applies `b` first and then `a`.

use crate::errors::ValidationError;
use crate::float_types::{ON_SQRT_EPSILON, Real};
use crate::frame::Frame;
use crate::vector::VectorExt;
use nalgebra::{Matrix3, Matrix4, Point3, Unit, Vector3};
use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub matrix: Matrix4<Real>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<Real>> for Transform {
    fn from(matrix: Matrix4<Real>) -> Self {
        Transform { matrix }
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.multiply(&rhs)
    }
}

impl Transform {
    pub fn identity() -> Self {
        Transform {
            matrix: Matrix4::identity(),
        }
    }

    /// Build from rows.
    pub fn from_array(rows: &[[Real; 4]; 4]) -> Self {
        Transform {
            matrix: Matrix4::from_fn(|r, c| rows[r][c]),
        }
    }

    /// The 16 entries in row-major order.
    pub fn to_array(&self) -> [Real; 16] {
        std::array::from_fn(|i| self.matrix[(i / 4, i % 4)])
    }

    /// `false` if any entry is NaN.
    pub fn is_valid(&self) -> bool {
        !self.matrix.iter().any(|v| v.is_nan())
    }

    /// Matrix product `self · other`.
    pub fn multiply(&self, other: &Transform) -> Transform {
        Transform {
            matrix: self.matrix * other.matrix,
        }
    }

    pub fn translation(dx: Real, dy: Real, dz: Real) -> Self {
        Transform {
            matrix: Matrix4::new_translation(&Vector3::new(dx, dy, dz)),
        }
    }

    pub fn diagonal(d0: Real, d1: Real, d2: Real) -> Self {
        Transform {
            matrix: Matrix4::new_nonuniform_scaling(&Vector3::new(d0, d1, d2)),
        }
    }

    /// Scale about `frame`'s origin. Uniform factors give a plain scaling,
    /// otherwise the factors apply along the frame's axes.
    pub fn scale(frame: &Frame, x_scale: Real, y_scale: Real, z_scale: Real) -> Self {
        if x_scale == y_scale && x_scale == z_scale {
            let scaling = Self::diagonal(x_scale, y_scale, z_scale);
            if frame.origin == Point3::origin() {
                return scaling;
            }
            let delta = frame.origin.coords;
            let to_origin = Self::translation(-delta.x, -delta.y, -delta.z);
            let back = Self::translation(delta.x, delta.y, delta.z);
            return back.multiply(&scaling.multiply(&to_origin));
        }

        Self::shear(
            frame,
            &(frame.x_axis * x_scale),
            &(frame.y_axis * y_scale),
            &(frame.z_axis * z_scale),
        )
    }

    /// Map `frame`'s axes onto `x`, `y`, `z`, keeping the frame origin fixed.
    pub fn shear(frame: &Frame, x: &Vector3<Real>, y: &Vector3<Real>, z: &Vector3<Real>) -> Self {
        let delta = frame.origin.coords;
        let to_origin = Self::translation(-delta.x, -delta.y, -delta.z);
        let back = Self::translation(delta.x, delta.y, delta.z);

        // Rows are the frame axes: world -> frame coordinates
        let mut project = Matrix4::identity();
        project
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&Matrix3::from_rows(&[
                frame.x_axis.transpose(),
                frame.y_axis.transpose(),
                frame.z_axis.transpose(),
            ]));

        // Columns are the new axes
        let mut expand = Matrix4::identity();
        expand
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&Matrix3::from_columns(&[*x, *y, *z]));

        back.multiply(&Transform::from(expand).multiply(&Transform::from(project).multiply(&to_origin)))
    }

    /// Reflection across the plane through `point` with normal `normal`.
    pub fn mirror(point: &Point3<Real>, normal: &Vector3<Real>) -> Result<Self, ValidationError> {
        let n = normal.unit()?;
        let v = n * (2.0 * n.dot(&point.coords));

        let mut matrix = Matrix4::identity();
        matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&(Matrix3::identity() - n * n.transpose() * 2.0));
        matrix[(0, 3)] = v.x;
        matrix[(1, 3)] = v.y;
        matrix[(2, 3)] = v.z;
        Ok(Transform { matrix })
    }

    /// Rotation by `angle` radians about `axis` through `center`.
    pub fn rotation(
        angle: Real,
        axis: &Vector3<Real>,
        center: &Point3<Real>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::rotation_unit(angle, &Unit::new_unchecked(axis.unit()?), center))
    }

    /// Rotation by `angle` radians about a unit `axis` through `center`.
    ///
    /// Sines and cosines within [`ON_SQRT_EPSILON`] of 0 or ±1 are snapped so
    /// quarter turns produce exact matrices.
    pub fn rotation_unit(angle: Real, axis: &Unit<Vector3<Real>>, center: &Point3<Real>) -> Self {
        let (sin_angle, cos_angle) = snapped_sin_cos(angle);
        let mut xform = Self::identity();
        if sin_angle == 0.0 && cos_angle == 1.0 {
            return xform;
        }

        let a = axis.into_inner();
        let one_minus_cos = 1.0 - cos_angle;
        let m = &mut xform.matrix;

        m[(0, 0)] = a.x * a.x * one_minus_cos + cos_angle;
        m[(0, 1)] = a.x * a.y * one_minus_cos - a.z * sin_angle;
        m[(0, 2)] = a.x * a.z * one_minus_cos + a.y * sin_angle;

        m[(1, 0)] = a.y * a.x * one_minus_cos + a.z * sin_angle;
        m[(1, 1)] = a.y * a.y * one_minus_cos + cos_angle;
        m[(1, 2)] = a.y * a.z * one_minus_cos - a.x * sin_angle;

        m[(2, 0)] = a.z * a.x * one_minus_cos - a.y * sin_angle;
        m[(2, 1)] = a.z * a.y * one_minus_cos + a.x * sin_angle;
        m[(2, 2)] = a.z * a.z * one_minus_cos + cos_angle;

        if center != &Point3::origin() {
            // t = c - R c keeps the center fixed
            let c = center.coords;
            let rotated = m.fixed_view::<3, 3>(0, 0) * c;
            m[(0, 3)] = c.x - rotated.x;
            m[(1, 3)] = c.y - rotated.y;
            m[(2, 3)] = c.z - rotated.z;
        }

        xform
    }

    /// Affine map taking coordinates expressed in `source` to coordinates
    /// expressed in `target`.
    ///
    /// Fails with [`ValidationError::SingularBasis`] when `target`'s axes are
    /// not linearly independent.
    pub fn change_basis(source: &Frame, target: &Frame) -> Result<Self, ValidationError> {
        let from_source = Self::from_frame(source);
        let origin = target.origin.coords;
        let to_target_origin = Self::translation(-origin.x, -origin.y, -origin.z);

        let world = Frame::world_xy();
        let rotation = solve_change_of_basis(
            [&world.x_axis, &world.y_axis, &world.z_axis],
            [&target.x_axis, &target.y_axis, &target.z_axis],
        )?;

        Ok(rotation.multiply(&to_target_origin).multiply(&from_source))
    }

    /// Local-to-world matrix of a frame: columns are the axes, translation the origin.
    pub fn from_frame(frame: &Frame) -> Self {
        let mut matrix = Matrix4::identity();
        matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&Matrix3::from_columns(&[frame.x_axis, frame.y_axis, frame.z_axis]));
        matrix[(0, 3)] = frame.origin.x;
        matrix[(1, 3)] = frame.origin.y;
        matrix[(2, 3)] = frame.origin.z;
        Transform { matrix }
    }

    /// Apply to a point, dividing by the homogeneous coordinate when it is non-zero.
    pub fn transform_point(&self, point: &Point3<Real>) -> Point3<Real> {
        let h = self.matrix * point.to_homogeneous();
        let w = if h.w != 0.0 { 1.0 / h.w } else { 1.0 };
        Point3::new(h.x * w, h.y * w, h.z * w)
    }

    /// Apply the linear part only.
    pub fn transform_vector(&self, vector: &Vector3<Real>) -> Vector3<Real> {
        self.linear_part() * vector
    }

    pub fn linear_part(&self) -> Matrix3<Real> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Inverse transpose of the linear part, for carrying normals.
    ///
    /// Falls back to the linear part for singular transforms.
    pub fn normal_matrix(&self) -> Matrix3<Real> {
        let linear = self.linear_part();
        linear
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear)
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> Real {
        self.linear_part().determinant()
    }

    /// `true` if the transform flips handedness and therefore winding.
    pub fn is_reflection(&self) -> bool {
        self.determinant() < 0.0
    }
}

fn snapped_sin_cos(angle: Real) -> (Real, Real) {
    let mut sin_angle = angle.sin();
    let mut cos_angle = angle.cos();

    if sin_angle.abs() >= 1.0 - ON_SQRT_EPSILON && cos_angle.abs() <= ON_SQRT_EPSILON {
        cos_angle = 0.0;
        sin_angle = sin_angle.signum();
    }
    if cos_angle.abs() >= 1.0 - ON_SQRT_EPSILON && sin_angle.abs() <= ON_SQRT_EPSILON {
        cos_angle = cos_angle.signum();
        sin_angle = 0.0;
    }
    if (cos_angle * cos_angle + sin_angle * sin_angle - 1.0).abs() > ON_SQRT_EPSILON {
        let length = cos_angle.hypot(sin_angle);
        if length > 0.0 {
            cos_angle /= length;
            sin_angle /= length;
        }
    }

    (sin_angle, cos_angle)
}

/// Row-reduce the 3×6 system `[G | B]` where `G` is the Gram matrix of the
/// target axes and `B[i][j] = target_i · source_j`, giving the matrix that
/// re-expresses source coordinates in the target basis.
fn solve_change_of_basis(
    source: [&Vector3<Real>; 3],
    target: [&Vector3<Real>; 3],
) -> Result<Transform, ValidationError> {
    let mut r = [[0.0; 6]; 3];
    for i in 0..3 {
        for j in 0..3 {
            r[i][j] = target[i].dot(target[j]);
            r[i][j + 3] = target[i].dot(source[j]);
        }
    }

    // Largest diagonal first, then the larger of the remaining two
    let mut i0 = if r[0][0] >= r[1][1] { 0 } else { 1 };
    if r[2][2] > r[i0][i0] {
        i0 = 2;
    }
    let mut i1 = (i0 + 1) % 3;
    let mut i2 = (i1 + 1) % 3;

    eliminate_column(&mut r, i0, [i1, i2])?;
    if r[i1][i1].abs() < r[i2][i2].abs() {
        std::mem::swap(&mut i1, &mut i2);
    }
    eliminate_column(&mut r, i1, [i0, i2])?;
    eliminate_column(&mut r, i2, [i0, i1])?;

    let mut xform = Transform::identity();
    for (i, row) in r.iter().enumerate() {
        for j in 0..3 {
            xform.matrix[(i, j)] = row[j + 3];
        }
    }
    Ok(xform)
}

/// Normalize pivot row `p` and clear column `p` from the other rows.
fn eliminate_column(
    r: &mut [[Real; 6]; 3],
    p: usize,
    others: [usize; 2],
) -> Result<(), ValidationError> {
    let pivot = r[p][p];
    if !pivot.is_finite() || pivot.abs() < Real::EPSILON {
        return Err(ValidationError::SingularBasis);
    }

    let d = 1.0 / pivot;
    r[p].iter_mut().for_each(|v| *v *= d);
    r[p][p] = 1.0;

    for row in others {
        let factor = r[row][p];
        if factor != 0.0 {
            let pivot_row = r[p];
            r[row]
                .iter_mut()
                .zip(pivot_row.iter())
                .for_each(|(v, pv)| *v -= factor * pv);
            r[row][p] = 0.0;
        }
    }
    Ok(())
}
