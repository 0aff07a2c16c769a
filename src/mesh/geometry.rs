//! Flattening a [`Solid`] into renderer-ready triangle buffers.

use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingSphere},
};
use crate::mesh::Solid;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector2, Vector3};

/// Largest `shared` id laid out as its own material group. One group is
/// emitted for every id up to the largest in use, so ids are expected to be
/// small and dense.
pub const MAX_MATERIAL_ID: u32 = u16::MAX as u32;

/// A contiguous range of [`Geometry::indices`] drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    pub start: usize,
    pub count: usize,
    pub material_index: u32,
}

/// Unshared triangle buffers: every triangle owns its three vertices.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// `xyz` per vertex
    pub positions: Vec<f32>,
    /// `xyz` per vertex
    pub normals: Vec<f32>,
    /// `uv` per vertex, present iff some vertex carries a uv
    pub uvs: Option<Vec<f32>>,
    /// `rgb` per vertex, present iff some vertex carries a color
    pub colors: Option<Vec<f32>>,
    pub groups: Vec<GeometryGroup>,
    pub indices: Vec<u32>,
    pub bounding_box: Option<Aabb>,
    pub bounding_sphere: Option<BoundingSphere>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Position of vertex `i`, widened back to [`Real`].
    pub fn position(&self, i: usize) -> Option<Point3<Real>> {
        let p = self.positions.get(3 * i..3 * i + 3)?;
        Some(Point3::new(p[0] as Real, p[1] as Real, p[2] as Real))
    }
}

impl Solid {
    /// Fan-triangulate every polygon and lay the triangles out per material.
    ///
    /// Index groups follow `shared` ids `0..=max` (empty for unused ids),
    /// then a default group for untagged polygons with material `max + 1`,
    /// or `0` when nothing is tagged. Ids above [`MAX_MATERIAL_ID`] are
    /// drawn with the default group.
    pub fn to_geometry(&self) -> Geometry {
        let triangle_count: usize = self.polygons.iter().map(|p| p.triangle_count()).sum();
        let vertex_count = triangle_count * 3;

        let has_uv = self.polygons.iter().any(|p| p.vertices.iter().any(|v| v.uv.is_some()));
        let has_color = self
            .polygons
            .iter()
            .any(|p| p.vertices.iter().any(|v| v.color.is_some()));

        let mut positions = Vec::with_capacity(vertex_count * 3);
        let mut normals = Vec::with_capacity(vertex_count * 3);
        let mut uvs = has_uv.then(|| Vec::with_capacity(vertex_count * 2));
        let mut colors = has_color.then(|| Vec::with_capacity(vertex_count * 3));

        let material = |shared: Option<u32>| shared.filter(|&id| id <= MAX_MATERIAL_ID);
        let oversized = self
            .polygons
            .iter()
            .filter(|p| p.shared.is_some_and(|id| id > MAX_MATERIAL_ID))
            .count();
        if oversized > 0 {
            tracing::warn!(
                polygons = oversized,
                max = MAX_MATERIAL_ID,
                "shared ids out of range, using the default group"
            );
        }

        let max_id = self.polygons.iter().filter_map(|p| material(p.shared)).max();
        let mut tagged: Vec<Vec<u32>> = vec![Vec::new(); max_id.map_or(0, |m| m as usize + 1)];
        let mut untagged: Vec<u32> = Vec::new();

        let mut next_index: u32 = 0;
        for polygon in &self.polygons {
            for triangle in polygon.triangulate() {
                let group = match material(polygon.shared) {
                    Some(id) => &mut tagged[id as usize],
                    None => &mut untagged,
                };
                group.extend([next_index, next_index + 1, next_index + 2]);
                next_index += 3;

                for vertex in &triangle {
                    write_vertex(vertex, &mut positions, &mut normals, uvs.as_mut(), colors.as_mut());
                }
            }
        }

        let mut groups = Vec::with_capacity(tagged.len() + 1);
        let mut indices = Vec::with_capacity(vertex_count);
        for (gi, group) in tagged.iter().enumerate() {
            groups.push(GeometryGroup {
                start: indices.len(),
                count: group.len(),
                material_index: gi as u32,
            });
            indices.extend_from_slice(group);
        }
        groups.push(GeometryGroup {
            start: indices.len(),
            count: untagged.len(),
            material_index: tagged.len() as u32,
        });
        indices.extend_from_slice(&untagged);

        let mut geometry = Geometry {
            positions,
            normals,
            uvs,
            colors,
            groups,
            indices,
            bounding_box: None,
            bounding_sphere: None,
        };
        geometry.bounding_box = compute_bounding_box(&geometry);
        geometry.bounding_sphere = geometry
            .bounding_box
            .map(|aabb| compute_bounding_sphere(&geometry, &aabb));
        geometry
    }
}

fn write_vertex(
    vertex: &Vertex,
    positions: &mut Vec<f32>,
    normals: &mut Vec<f32>,
    uvs: Option<&mut Vec<f32>>,
    colors: Option<&mut Vec<f32>>,
) {
    positions.extend(vertex.pos.coords.iter().map(|&c| c as f32));
    normals.extend(vertex.normal.iter().map(|&c| c as f32));
    if let Some(uvs) = uvs {
        let uv = vertex.uv.unwrap_or_else(Vector2::zeros);
        uvs.extend([uv.x as f32, uv.y as f32]);
    }
    if let Some(colors) = colors {
        let color = vertex.color.unwrap_or_else(Vector3::zeros);
        colors.extend(color.iter().map(|&c| c as f32));
    }
}

fn compute_bounding_box(geometry: &Geometry) -> Option<Aabb> {
    let mut points = (0..geometry.vertex_count()).filter_map(|i| geometry.position(i));
    let first = points.next()?;
    let (mins, maxs) = points.fold((first, first), |(mins, maxs), p| (mins.inf(&p), maxs.sup(&p)));
    Some(Aabb::new(mins, maxs))
}

// Center of the box, radius reaching the farthest vertex
fn compute_bounding_sphere(geometry: &Geometry, aabb: &Aabb) -> BoundingSphere {
    let center = aabb.center();
    let radius_squared = (0..geometry.vertex_count())
        .filter_map(|i| geometry.position(i))
        .map(|p| (p - center).norm_squared())
        .fold(0.0, Real::max);
    BoundingSphere::new(center, radius_squared.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::polygon::Polygon;

    fn hexagon(shared: Option<u32>) -> Polygon {
        let positions: Vec<_> = (0..6)
            .map(|i| {
                let a = i as Real * crate::float_types::TAU / 6.0;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        Polygon::from_positions(&positions, shared).unwrap()
    }

    #[test]
    fn empty_solid_has_no_bounds() {
        let geometry = Solid::from_polygons(&[]).to_geometry();
        assert_eq!(geometry.triangle_count(), 0);
        assert!(geometry.bounding_box.is_none());
        assert!(geometry.bounding_sphere.is_none());
        assert_eq!(
            geometry.groups,
            vec![GeometryGroup { start: 0, count: 0, material_index: 0 }]
        );
    }

    #[test]
    fn hexagon_fans_into_four_triangles() {
        let geometry = Solid::from_polygons(&[hexagon(None)]).to_geometry();
        assert_eq!(geometry.triangle_count(), 4);
        assert_eq!(geometry.normals.len(), geometry.positions.len());
        assert_eq!(geometry.indices, (0..12).collect::<Vec<u32>>());
        assert!(geometry.uvs.is_none());
        assert!(geometry.colors.is_none());
    }

    #[test]
    fn uv_buffer_zero_fills_missing_values() {
        let mut poly = hexagon(None);
        poly.vertices[1] = poly.vertices[1].clone().with_uv(Vector2::new(0.5, 0.25));
        let geometry = Solid::from_polygons(&[poly]).to_geometry();
        let uvs = geometry.uvs.unwrap();
        assert_eq!(uvs.len(), 4 * 3 * 2);
        // first triangle is (v0, v1, v2)
        assert_eq!(&uvs[0..6], &[0.0, 0.0, 0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn colors_follow_vertices() {
        let mut poly = hexagon(None);
        for v in &mut poly.vertices {
            *v = v.clone().with_color(Vector3::new(1.0, 0.0, 0.0));
        }
        let geometry = Solid::from_polygons(&[poly]).to_geometry();
        let colors = geometry.colors.unwrap();
        assert_eq!(colors.len(), geometry.positions.len());
        assert_eq!(&colors[0..3], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn oversized_ids_use_the_default_group() {
        let solid = Solid::from_polygons(&[hexagon(Some(u32::MAX)), hexagon(Some(1))]);
        let geometry = solid.to_geometry();
        assert_eq!(
            geometry.groups,
            vec![
                GeometryGroup { start: 0, count: 0, material_index: 0 },
                GeometryGroup { start: 0, count: 12, material_index: 1 },
                GeometryGroup { start: 12, count: 12, material_index: 2 },
            ]
        );
        let expected: Vec<u32> = (12..24).chain(0..12).collect();
        assert_eq!(geometry.indices, expected);
    }
}
