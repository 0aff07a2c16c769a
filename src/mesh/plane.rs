//! Struct and functions for working with planes
//!
//! A plane is stored as a unit normal `n` and offset `w`, i.e. the set of
//! points `p` with `n · p = w`.

use crate::errors::ValidationError;
use crate::float_types::{Real, tolerance};
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use crate::transform::Transform;
use crate::vector::VectorExt;
use nalgebra::{Point3, Vector3};

// Plane classification constants
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// The four buckets produced by [`Plane::split_polygon`]:
/// `(coplanar_front, coplanar_back, front, back)`.
pub type PolygonSplit = (Vec<Polygon>, Vec<Polygon>, Vec<Polygon>, Vec<Polygon>);

/// A plane in 3D space defined by a unit normal and an offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal vector of the plane
    pub normal: Vector3<Real>,
    /// Signed distance from the origin along `normal`
    pub w: Real,
}

/// Hashable identity of a plane, used to group coplanar polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKey {
    /// Bit pattern of `(normal.x, normal.y, normal.z, w)`
    Exact([u64; 4]),
    /// `(normal.x, normal.y, normal.z, w)` scaled and rounded
    Quantized([i64; 4]),
}

impl Plane {
    /// Create a plane from a normal (need not be unit) and offset.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Result<Self, ValidationError> {
        Ok(Plane {
            normal: normal.unit()?,
            w,
        })
    }

    /// Create a plane from three points.
    /// The normal direction follows the right-hand rule: (b-a) × (c-a)
    pub fn from_points(
        a: &Point3<Real>,
        b: &Point3<Real>,
        c: &Point3<Real>,
    ) -> Result<Self, ValidationError> {
        let normal = (*b - *a)
            .cross(&(*c - *a))
            .unit()
            .map_err(|_| ValidationError::DegeneratePlane(*a))?;
        Ok(Plane {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    /// Create the plane of a polygon loop from its first three vertices.
    pub fn from_vertices(vertices: &[Vertex]) -> Result<Self, ValidationError> {
        match vertices {
            [a, b, c, ..] => Self::from_points(&a.pos, &b.pos, &c.pos),
            _ => Err(ValidationError::TooFewPoints(vertices.len())),
        }
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Flip the plane (reverse normal and offset)
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// `n · p − w`: positive in front, negative behind.
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] using the crate tolerance.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        self.orient_point_with_tolerance(point, tolerance())
    }

    pub fn orient_point_with_tolerance(&self, point: &Point3<Real>, epsilon: Real) -> i8 {
        let t = self.signed_distance(point);
        if t < -epsilon {
            BACK
        } else if t > epsilon {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Classify a polygon with respect to the plane.
    /// Returns a bitmask of COPLANAR, FRONT, and BACK.
    pub fn classify_polygon(&self, polygon: &Polygon) -> i8 {
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | self.orient_point(&v.pos))
    }

    /// Splits a polygon by this plane using the crate tolerance.
    /// See [`Plane::split_polygon_with_tolerance`].
    pub fn split_polygon(&self, polygon: &Polygon) -> PolygonSplit {
        self.split_polygon_with_tolerance(polygon, tolerance())
    }

    /// Splits a polygon by this plane, returning four buckets:
    /// `(coplanar_front, coplanar_back, front, back)`.
    ///
    /// Coplanar polygons go to `coplanar_front` when they face the same way as
    /// this plane, otherwise to `coplanar_back`. Fragments of a spanning
    /// polygon keep the parent's plane and `shared` tag.
    pub fn split_polygon_with_tolerance(&self, polygon: &Polygon, epsilon: Real) -> PolygonSplit {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let normal = self.normal();

        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point_with_tolerance(&v.pos, epsilon))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        // Dispatch the easy cases
        match polygon_type {
            COPLANAR => {
                if normal.dot(&polygon.plane.normal()) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),

            // True spanning – do the split
            _ => {
                let mut split_front = Vec::<Vertex>::new();
                let mut split_back = Vec::<Vertex>::new();
                let count = polygon.vertices.len();

                for i in 0..count {
                    // j is the vertex following i, we modulo by len to wrap around to the first vertex after the last
                    let j = (i + 1) % count;
                    let type_i = types[i];
                    let type_j = types[j];
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    // If current vertex is definitely not behind plane, it goes to split_front
                    if type_i != BACK {
                        split_front.push(vertex_i.clone());
                    }
                    // If current vertex is definitely not in front, it goes to split_back
                    if type_i != FRONT {
                        split_back.push(vertex_i.clone());
                    }

                    // If the edge between these two vertices crosses the plane,
                    // compute intersection and add that intersection to both sets
                    if (type_i | type_j) == SPANNING {
                        let denom = normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > Real::EPSILON {
                            let t = (self.offset() - normal.dot(&vertex_i.pos.coords)) / denom;
                            let vertex_new = vertex_i.interpolate(vertex_j, t);
                            split_front.push(vertex_new.clone());
                            split_back.push(vertex_new);
                        }
                    }
                }

                if split_front.len() >= 3 {
                    front.push(Polygon::with_plane(split_front, polygon.plane, polygon.shared));
                }
                if split_back.len() >= 3 {
                    back.push(Polygon::with_plane(split_back, polygon.plane, polygon.shared));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }

    /// Image of this plane under an affine transform.
    ///
    /// The normal is carried by the inverse transpose of the linear part, so
    /// the result stays perpendicular to the transformed surface.
    pub fn transformed(&self, transform: &Transform) -> Result<Self, ValidationError> {
        let normal = (transform.normal_matrix() * self.normal).unit()?;
        let anchor = transform.transform_point(&Point3::from(self.normal * self.w));
        Ok(Plane {
            normal,
            w: normal.dot(&anchor.coords),
        })
    }

    /// Exact grouping key. `-0.0` and `0.0` are the same key.
    pub fn exact_key(&self) -> PlaneKey {
        let bits = |v: Real| (v + 0.0).to_bits();
        PlaneKey::Exact([
            bits(self.normal.x),
            bits(self.normal.y),
            bits(self.normal.z),
            bits(self.w),
        ])
    }

    /// Tolerant grouping key: components are multiplied by `scale` and rounded.
    pub fn quantized_key(&self, scale: Real) -> PlaneKey {
        let q = |v: Real| (v * scale).round() as i64;
        PlaneKey::Quantized([
            q(self.normal.x),
            q(self.normal.y),
            q(self.normal.z),
            q(self.w),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points_are_degenerate() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 1.0, 1.0);
        let c = Point3::new(2.0, 2.0, 2.0);
        assert_eq!(
            Plane::from_points(&a, &b, &c),
            Err(ValidationError::DegeneratePlane(a))
        );
    }

    #[test]
    fn signed_zero_shares_a_key() {
        let p = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            w: 0.0,
        };
        let q = Plane {
            normal: Vector3::new(-0.0, 0.0, 1.0),
            w: -0.0,
        };
        assert_eq!(p.exact_key(), q.exact_key());
    }

    #[test]
    fn quantized_key_absorbs_noise() {
        let p = Plane {
            normal: Vector3::z(),
            w: 1.0,
        };
        let q = Plane {
            normal: Vector3::new(1e-14, 0.0, 1.0),
            w: 1.0 + 1e-13,
        };
        assert_ne!(p.exact_key(), q.exact_key());
        assert_eq!(p.quantized_key(1e9), q.quantized_key(1e9));
    }
}
