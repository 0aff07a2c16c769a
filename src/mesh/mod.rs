//! `Solid` struct and implementations of the `CSG` trait for `Solid`

use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::{bsp::Node, polygon::Polygon, vertex::Vertex};
use crate::traits::CSG;
use crate::transform::Transform;
use nalgebra::Point3;
use std::sync::OnceLock;

pub mod bsp;
pub mod geometry;
pub mod plane;
pub mod polygon;
pub mod silhouette;
pub mod vertex;

/// A closed polyhedral solid stored as a soup of convex polygons.
#[derive(Clone, Debug, Default)]
pub struct Solid {
    /// Boundary polygons, wound counter-clockwise about their outward normals
    pub polygons: Vec<Polygon>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,
}

impl Solid {
    /// Build a Solid from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let mut solid = Solid::new();
        solid.polygons = polygons.to_vec();
        solid
    }

    /// Build a flat-shaded Solid from a shared point list and faces that index into it.
    ///
    /// Every face must reference at least three existing points and its
    /// leading three points must not be collinear.
    pub fn polyhedron(
        points: &[Point3<Real>],
        faces: &[Vec<usize>],
    ) -> Result<Self, ValidationError> {
        let mut polygons = Vec::with_capacity(faces.len());
        for face in faces {
            let positions = face
                .iter()
                .map(|&index| {
                    points.get(index).copied().ok_or(ValidationError::IndexOutOfRange {
                        index,
                        len: points.len(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            polygons.push(Polygon::from_positions(&positions, None)?);
        }
        Ok(Solid::from_polygons(&polygons))
    }

    /// Build a flat-shaded Solid from point loops, skipping loops that do not
    /// form a valid polygon.
    pub fn from_polygon_loops(loops: &[Vec<Point3<Real>>], shared: Option<u32>) -> Self {
        let polygons: Vec<Polygon> = loops
            .iter()
            .enumerate()
            .filter_map(|(i, points)| match Polygon::from_positions(points, shared) {
                Ok(polygon) => Some(polygon),
                Err(err) => {
                    tracing::warn!(loop_index = i, error = %err, "skipping degenerate polygon loop");
                    None
                },
            })
            .collect();
        Solid::from_polygons(&polygons)
    }

    /// Helper to collect all vertices from the Solid.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Triangulate each polygon in the Solid returning a Solid containing triangles
    pub fn triangulate(&self) -> Solid {
        let triangles = self
            .polygons
            .iter()
            .flat_map(|poly| {
                poly.triangulate()
                    .into_iter()
                    .map(move |triangle| Polygon::with_plane(triangle.to_vec(), poly.plane, poly.shared))
            })
            .collect::<Vec<_>>();

        Solid::from_polygons(&triangles)
    }

    /// Classify `point` against the enclosed volume using a BSP tree built
    /// from this Solid's polygons. Points on the boundary may go either way.
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        Node::from_polygons(&self.polygons).contains_point(point)
    }

    /// Number of polygons.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

impl CSG for Solid {
    /// Returns a new empty Solid
    fn new() -> Self {
        Solid {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Return a new Solid representing union of the two Solids.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, other: &Solid) -> Solid {
        tracing::debug!(lhs = self.polygons.len(), rhs = other.polygons.len(), "union");

        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());

        let result = Solid::from_polygons(&a.all_polygons());
        tracing::debug!(polygons = result.polygons.len(), "union done");
        result
    }

    /// Return a new Solid representing the space in this Solid excluding the
    /// space in `other`.
    ///
    /// ```text
    /// let c = a.subtract(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    ///
    /// An empty receiver does not short-circuit: `Solid::new().subtract(&b)`
    /// comes back as `b.inverse()`.
    fn subtract(&self, other: &Solid) -> Solid {
        tracing::debug!(lhs = self.polygons.len(), rhs = other.polygons.len(), "subtract");

        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());
        a.invert();

        let result = Solid::from_polygons(&a.all_polygons());
        tracing::debug!(polygons = result.polygons.len(), "subtract done");
        result
    }

    /// Return a new Solid representing intersection of the two Solids.
    ///
    /// ```text
    /// let c = a.intersect(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    ///
    /// An empty receiver does not short-circuit: `Solid::new().intersect(&b)`
    /// comes back as `b`.
    fn intersect(&self, other: &Solid) -> Solid {
        tracing::debug!(lhs = self.polygons.len(), rhs = other.polygons.len(), "intersect");

        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(&b.all_polygons());
        a.invert();

        let result = Solid::from_polygons(&a.all_polygons());
        tracing::debug!(polygons = result.polygons.len(), "intersect done");
        result
    }

    /// Apply an affine transform to every polygon.
    ///
    /// Positions are mapped directly, normals by the inverse transpose. A
    /// transform that flips handedness also reverses each polygon's vertex
    /// order so faces stay outward. Polygons the transform collapses are
    /// dropped.
    fn transform(&self, transform: &Transform) -> Solid {
        let normal_matrix = transform.normal_matrix();
        let reverse_winding = transform.is_reflection();

        let polygons = self
            .polygons
            .iter()
            .filter_map(|poly| {
                let plane = match poly.plane.transformed(transform) {
                    Ok(plane) => plane,
                    Err(err) => {
                        tracing::warn!(error = %err, "dropping polygon collapsed by transform");
                        return None;
                    },
                };

                let mut vertices: Vec<Vertex> = poly
                    .vertices
                    .iter()
                    .map(|v| {
                        let mut vertex = v.clone();
                        vertex.pos = transform.transform_point(&v.pos);
                        vertex.normal = (normal_matrix * v.normal)
                            .try_normalize(Real::EPSILON)
                            .unwrap_or(plane.normal());
                        vertex
                    })
                    .collect();
                if reverse_winding {
                    vertices.reverse();
                }

                Some(Polygon::with_plane(vertices, plane, poly.shared))
            })
            .collect::<Vec<_>>();

        Solid::from_polygons(&polygons)
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`](crate::float_types::parry3d::bounding_volume::Aabb)
    /// indicating the 3D bounds of all `polygons`. An empty Solid gives a
    /// degenerate box at the origin.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut positions = self.polygons.iter().flat_map(|p| p.positions());
            let Some(first) = positions.next() else {
                return Aabb::new(Point3::origin(), Point3::origin());
            };
            let (mins, maxs) = positions.fold((first, first), |(mins, maxs), p| {
                (mins.inf(&p), maxs.sup(&p))
            });
            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Invert this Solid (flip inside vs. outside)
    fn inverse(&self) -> Solid {
        let mut solid = Solid::from_polygons(&self.polygons);
        solid.polygons.iter_mut().for_each(Polygon::flip);
        solid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn tetrahedron_points() -> Vec<Point3<Real>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    fn tetrahedron_faces() -> Vec<Vec<usize>> {
        vec![vec![0, 2, 1], vec![0, 1, 3], vec![0, 3, 2], vec![1, 2, 3]]
    }

    #[test]
    fn polyhedron_builds_outward_tetrahedron() {
        let solid = Solid::polyhedron(&tetrahedron_points(), &tetrahedron_faces()).unwrap();
        assert_eq!(solid.len(), 4);
        assert_eq!(solid.polygons[0].plane.normal(), -Vector3::z());
        assert!(solid.contains_point(&Point3::new(0.1, 0.1, 0.1)));
        assert!(!solid.contains_point(&Point3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn polyhedron_rejects_bad_index() {
        let mut faces = tetrahedron_faces();
        faces[2][1] = 9;
        assert_eq!(
            Solid::polyhedron(&tetrahedron_points(), &faces).err(),
            Some(ValidationError::IndexOutOfRange { index: 9, len: 4 })
        );
    }

    #[test]
    fn polygon_loops_skip_degenerate_input() {
        let loops = vec![
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![Point3::origin(), Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0)],
        ];
        let solid = Solid::from_polygon_loops(&loops, Some(3));
        assert_eq!(solid.len(), 1);
        assert_eq!(solid.polygons[0].shared, Some(3));
    }

    #[test]
    fn empty_solid_contains_nothing() {
        let solid = Solid::new();
        assert!(solid.is_empty());
        assert!(!solid.contains_point(&Point3::origin()));
        assert_eq!(solid.bounding_box().mins, Point3::origin());
    }

    #[test]
    fn triangulate_keeps_plane_and_tag() {
        let square = Polygon::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Some(1),
        )
        .unwrap();
        let tris = Solid::from_polygons(&[square.clone()]).triangulate();
        assert_eq!(tris.len(), 2);
        assert!(tris.polygons.iter().all(|t| t.plane == square.plane && t.shared == Some(1)));
    }
}
