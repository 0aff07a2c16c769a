//! Struct and functions for working with planar `Polygon`s

use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use nalgebra::Point3;

/// A convex polygon, defined by a list of vertices wound counter-clockwise
/// about the outward normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vertex>,

    /// The plane on which this polygon lies. Fragments produced by splitting
    /// carry an exact copy of their parent's plane.
    pub plane: Plane,

    /// Material / group tag, forwarded to the renderer as a material index.
    /// Ids should be small and dense; see
    /// [`MAX_MATERIAL_ID`](crate::mesh::geometry::MAX_MATERIAL_ID).
    pub shared: Option<u32>,
}

impl Polygon {
    /// Create a polygon from vertices, deriving its plane from the first three.
    ///
    /// Fails on fewer than 3 vertices, non-finite coordinates, or collinear
    /// leading vertices.
    pub fn new(vertices: Vec<Vertex>, shared: Option<u32>) -> Result<Self, ValidationError> {
        if vertices.len() < 3 {
            return Err(ValidationError::TooFewPoints(vertices.len()));
        }
        if let Some(bad) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(ValidationError::InvalidCoordinate(bad.pos));
        }
        let plane = Plane::from_vertices(&vertices)?;
        Ok(Polygon {
            vertices,
            plane,
            shared,
        })
    }

    /// Create a flat-shaded polygon from positions: every vertex normal is the
    /// plane normal.
    pub fn from_positions(
        positions: &[Point3<Real>],
        shared: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let [a, b, c, ..] = positions else {
            return Err(ValidationError::TooFewPoints(positions.len()));
        };
        if let Some(bad) = positions
            .iter()
            .find(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(ValidationError::InvalidCoordinate(*bad));
        }
        let plane = Plane::from_points(a, b, c)?;
        let vertices = positions
            .iter()
            .map(|&pos| Vertex::new(pos, plane.normal()))
            .collect();
        Ok(Polygon {
            vertices,
            plane,
            shared,
        })
    }

    /// Assemble a polygon on a known plane without re-deriving it.
    pub const fn with_plane(vertices: Vec<Vertex>, plane: Plane, shared: Option<u32>) -> Self {
        Polygon {
            vertices,
            plane,
            shared,
        }
    }

    /// Reverse winding order, flip vertex normals, and flip the plane normal.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.vertices.iter_mut().for_each(Vertex::flip);
        self.plane.flip();
    }

    pub fn flipped(&self) -> Self {
        let mut polygon = self.clone();
        polygon.flip();
        polygon
    }

    /// Number of triangles a fan triangulation produces.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len().saturating_sub(2)
    }

    /// Fan-triangulate from the first vertex: `(v0, v[i], v[i+1])`.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        let Some(first) = self.vertices.first() else {
            return Vec::new();
        };
        self.vertices
            .windows(2)
            .skip(1)
            .map(|pair| [first.clone(), pair[0].clone(), pair[1].clone()])
            .collect()
    }

    /// Iterate the directed edges of the loop, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<Real>> + '_ {
        self.vertices.iter().map(|v| v.pos)
    }

    /// Axis-aligned bounds of the polygon.
    pub fn bounding_box(&self) -> Aabb {
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for v in &self.vertices {
            mins = mins.inf(&v.pos);
            maxs = maxs.sup(&v.pos);
        }
        Aabb::new(mins, maxs)
    }
}
