//! Primitive solids: cube, sphere and cylinder.

use crate::errors::ValidationError;
use crate::float_types::{PI, Real, TAU};
use crate::mesh::Solid;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use crate::vector::VectorExt;
use nalgebra::{Point3, Vector3};

/// Axis-aligned box spanning `center ± radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeOptions {
    pub center: Point3<Real>,
    /// Half extents per axis
    pub radius: Vector3<Real>,
}

impl Default for CubeOptions {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl CubeOptions {
    /// Same half extent on every axis.
    pub fn uniform(center: Point3<Real>, radius: Real) -> Self {
        Self {
            center,
            radius: Vector3::new(radius, radius, radius),
        }
    }
}

/// UV sphere; `slices` run around the Y axis, `stacks` from pole to pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereOptions {
    pub center: Point3<Real>,
    pub radius: Real,
    pub slices: usize,
    pub stacks: usize,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: 1.0,
            slices: 16,
            stacks: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderOptions {
    pub start: Point3<Real>,
    pub end: Point3<Real>,
    pub radius: Real,
    pub slices: usize,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self {
            start: Point3::new(0.0, -1.0, 0.0),
            end: Point3::new(0.0, 1.0, 0.0),
            radius: 1.0,
            slices: 16,
        }
    }
}

// Corner indices per face (bit 0 = +x, bit 1 = +y, bit 2 = +z) and the face normal
const CUBE_FACES: [([usize; 4], [Real; 3]); 6] = [
    ([0, 4, 6, 2], [-1.0, 0.0, 0.0]),
    ([1, 3, 7, 5], [1.0, 0.0, 0.0]),
    ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
    ([2, 6, 7, 3], [0.0, 1.0, 0.0]),
    ([0, 2, 3, 1], [0.0, 0.0, -1.0]),
    ([4, 5, 7, 6], [0.0, 0.0, 1.0]),
];

fn finite_point(p: &Point3<Real>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

fn positive_finite(value: Real) -> bool {
    value.is_finite() && value > 0.0
}

impl Solid {
    /// Axis-aligned box made of six quads.
    ///
    /// ```
    /// use polysolid::Solid;
    /// use polysolid::shapes::CubeOptions;
    ///
    /// let cube = Solid::cube(CubeOptions::default()).unwrap();
    /// assert_eq!(cube.polygons.len(), 6);
    /// ```
    pub fn cube(options: CubeOptions) -> Result<Solid, ValidationError> {
        let CubeOptions { center: c, radius: r } = options;
        if !finite_point(&c) || !r.iter().all(|&v| positive_finite(v)) {
            return Err(ValidationError::InvalidInput(format!(
                "cube needs a finite center and positive radius, got center {c} radius {r}"
            )));
        }

        let corner = |i: usize| {
            let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
            Point3::new(c.x + r.x * sign(1), c.y + r.y * sign(2), c.z + r.z * sign(4))
        };

        let polygons = CUBE_FACES
            .iter()
            .map(|(indices, [nx, ny, nz])| {
                let normal = Vector3::new(*nx, *ny, *nz);
                let vertices = indices.iter().map(|&i| Vertex::new(corner(i), normal)).collect();
                Polygon::new(vertices, None)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Solid::from_polygons(&polygons))
    }

    /// Sphere tessellated into `slices × stacks` patches, triangles at the poles.
    pub fn sphere(options: SphereOptions) -> Result<Solid, ValidationError> {
        let SphereOptions {
            center,
            radius,
            slices,
            stacks,
        } = options;
        if !finite_point(&center) || !positive_finite(radius) {
            return Err(ValidationError::InvalidInput(format!(
                "sphere needs a finite center and positive radius, got center {center} radius {radius}"
            )));
        }
        if slices < 3 || stacks < 2 {
            return Err(ValidationError::InvalidInput(format!(
                "sphere needs at least 3 slices and 2 stacks, got {slices} and {stacks}"
            )));
        }

        let vertex = |theta: Real, phi: Real| {
            let (theta, phi) = (theta * TAU, phi * PI);
            let dir = Vector3::new(theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            Vertex::new(center + dir * radius, dir)
        };

        let mut polygons = Vec::with_capacity(slices * stacks);
        for i in 0..slices {
            let (t0, t1) = (i as Real / slices as Real, (i + 1) as Real / slices as Real);
            for j in 0..stacks {
                let (p0, p1) = (j as Real / stacks as Real, (j + 1) as Real / stacks as Real);
                let mut vertices = vec![vertex(t0, p0)];
                if j > 0 {
                    vertices.push(vertex(t1, p0));
                }
                if j < stacks - 1 {
                    vertices.push(vertex(t1, p1));
                }
                vertices.push(vertex(t0, p1));
                polygons.push(Polygon::new(vertices, None)?);
            }
        }

        Ok(Solid::from_polygons(&polygons))
    }

    /// Cylinder from `start` to `end`: a triangle fan on each cap plus one
    /// quad per slice around the side.
    pub fn cylinder(options: CylinderOptions) -> Result<Solid, ValidationError> {
        let CylinderOptions {
            start,
            end,
            radius,
            slices,
        } = options;
        if !finite_point(&start) || !finite_point(&end) || !positive_finite(radius) || slices < 3 {
            return Err(ValidationError::InvalidInput(format!(
                "cylinder needs finite ends, a positive radius and at least 3 slices, got radius {radius} slices {slices}"
            )));
        }

        let ray = end - start;
        let axis_z = ray.unit().map_err(|_| {
            ValidationError::InvalidInput("cylinder start and end coincide".to_string())
        })?;
        let is_y = axis_z.y.abs() > 0.5;
        let seed = if is_y { Vector3::x() } else { Vector3::y() };
        let axis_x = seed.cross(&axis_z).unit()?;
        let axis_y = axis_x.cross(&axis_z).unit()?;

        let start_cap = Vertex::new(start, -axis_z);
        let end_cap = Vertex::new(end, axis_z);

        // stack: 0 at start, 1 at end; blend: -1 start cap, 0 side, 1 end cap
        let point = |stack: Real, slice: Real, blend: Real| {
            let angle = slice * TAU;
            let out = axis_x * angle.cos() + axis_y * angle.sin();
            let pos = start + ray * stack + out * radius;
            let normal = out * (1.0 - blend.abs()) + axis_z * blend;
            Vertex::new(pos, normal)
        };

        let mut polygons = Vec::with_capacity(slices * 3);
        for i in 0..slices {
            let t0 = i as Real / slices as Real;
            let t1 = (i + 1) as Real / slices as Real;
            polygons.push(Polygon::new(
                vec![start_cap.clone(), point(0.0, t0, -1.0), point(0.0, t1, -1.0)],
                None,
            )?);
            polygons.push(Polygon::new(
                vec![
                    point(0.0, t1, 0.0),
                    point(0.0, t0, 0.0),
                    point(1.0, t0, 0.0),
                    point(1.0, t1, 0.0),
                ],
                None,
            )?);
            polygons.push(Polygon::new(
                vec![end_cap.clone(), point(1.0, t1, 1.0), point(1.0, t0, 1.0)],
                None,
            )?);
        }

        Ok(Solid::from_polygons(&polygons))
    }
}
