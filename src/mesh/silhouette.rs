//! Per-plane outlines of a [`Solid`]: coplanar polygons are merged in 2D so
//! only the silhouette edges of each flat region remain.
//!
//! Each plane group is mapped into a frame lying on its plane. The polygon
//! loops are welded there (shared and T-junction edges cancel), the welded
//! regions are unioned by a [`PlanarUnion`] engine, and the resulting rings
//! are mapped back to world space.

mod weld;

use crate::errors::ValidationError;
use crate::float_types::{Real, tolerance};
use crate::frame::Frame;
use crate::mesh::Solid;
use crate::mesh::plane::{Plane, PlaneKey};
use crate::mesh::polygon::Polygon;
use crate::transform::Transform;
use geo::{Coord, LineString, MultiPolygon};
use hashbrown::HashMap;
use nalgebra::Point3;
use weld::WeldedLoops;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An open loop of distinct points; the closing edge back to the first point
/// is implied.
pub type Polyline = Vec<Point3<Real>>;

/// A 2D union capability over polygon sets.
pub trait PlanarUnion: Sync {
    fn union(&self, a: &MultiPolygon<Real>, b: &MultiPolygon<Real>) -> MultiPolygon<Real>;
}

/// [`PlanarUnion`] backed by `geo`'s boolean operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoUnion;

impl PlanarUnion for GeoUnion {
    fn union(&self, a: &MultiPolygon<Real>, b: &MultiPolygon<Real>) -> MultiPolygon<Real> {
        geo::BooleanOps::union(a, b)
    }
}

/// How polygons are bucketed into planes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlaneGrouping {
    /// Bit-identical `(normal, w)`
    #[default]
    Exact,
    /// `(normal, w)` multiplied by the scale and rounded
    Quantized(Real),
}

impl PlaneGrouping {
    fn key(&self, plane: &Plane) -> PlaneKey {
        match *self {
            PlaneGrouping::Exact => plane.exact_key(),
            PlaneGrouping::Quantized(scale) => plane.quantized_key(scale),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineLoop {
    pub points: Polyline,
    /// `true` for an interior ring of a merged region
    pub is_hole: bool,
}

/// Merged outline of every polygon sharing one plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneOutline {
    /// Plane of the group's first polygon
    pub plane: Plane,
    pub loops: Vec<OutlineLoop>,
}

/// Bucket polygons by plane key, keeping the order in which planes are first seen.
pub fn group_by_plane(polygons: &[Polygon], grouping: PlaneGrouping) -> Vec<(Plane, Vec<&Polygon>)> {
    let mut slots: HashMap<PlaneKey, usize> = HashMap::new();
    let mut groups: Vec<(Plane, Vec<&Polygon>)> = Vec::new();

    for polygon in polygons {
        let slot = *slots.entry(grouping.key(&polygon.plane)).or_insert_with(|| {
            groups.push((polygon.plane, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(polygon);
    }

    groups
}

/// Union the loops of coplanar `polygons` on `plane`.
///
/// Loops are welded within [`tolerance`] first, so fragments that only meet
/// through T-junctions merge into one region. The welded regions then go
/// through `engine`, the first seeding the accumulator, which resolves any
/// overlap between them. Fails if no frame or change of basis exists for
/// the plane.
pub fn merge_coplanar_loops(
    plane: &Plane,
    polygons: &[&Polygon],
    engine: &impl PlanarUnion,
) -> Result<PlaneOutline, ValidationError> {
    let Some(origin) = polygons.first().and_then(|p| p.vertices.first()) else {
        return Ok(PlaneOutline {
            plane: *plane,
            loops: Vec::new(),
        });
    };

    let frame = Frame::from_plane(plane, &origin.pos)?;
    let world = Frame::world_xy();
    let to_local = Transform::change_basis(&world, &frame)?;
    let to_world = Transform::change_basis(&frame, &world)?;

    let mut welded = WeldedLoops::new(tolerance());
    for polygon in polygons {
        welded.push_ring(polygon.positions().map(|p| {
            let local = to_local.transform_point(&p);
            Coord {
                x: local.x,
                y: local.y,
            }
        }));
    }
    let input_loops = welded.ring_count();

    let mut regions = welded
        .into_regions()
        .into_iter()
        .map(|region| MultiPolygon::new(vec![region]));
    let mut merged = regions.next().unwrap_or_else(|| MultiPolygon::new(Vec::new()));
    for next in regions {
        merged = engine.union(&merged, &next);
    }

    tracing::trace!(input_loops, regions = merged.0.len(), "merged coplanar loops");

    let lift = |ring: &LineString<Real>, is_hole: bool| OutlineLoop {
        points: open_ring(ring)
            .iter()
            .map(|c| to_world.transform_point(&Point3::new(c.x, c.y, 0.0)))
            .collect(),
        is_hole,
    };

    let mut loops = Vec::with_capacity(merged.0.len());
    for region in &merged.0 {
        loops.push(lift(region.exterior(), false));
        loops.extend(region.interiors().iter().map(|hole| lift(hole, true)));
    }
    loops.retain(|outline| !outline.points.is_empty());

    Ok(PlaneOutline {
        plane: *plane,
        loops,
    })
}

// Ring coordinates without the closing duplicate
fn open_ring(ring: &LineString<Real>) -> &[Coord<Real>] {
    match ring.0.as_slice() {
        [first, rest @ .., last] if first == last => {
            let len = rest.len() + 1;
            &ring.0[..len]
        },
        all => all,
    }
}

impl Solid {
    /// Merged outline per distinct plane, in first-seen plane order.
    ///
    /// A plane whose frame cannot be built is reported as `Err` without
    /// affecting the others.
    pub fn plane_outlines(
        &self,
        grouping: PlaneGrouping,
        engine: &impl PlanarUnion,
    ) -> Vec<Result<PlaneOutline, ValidationError>> {
        let groups = group_by_plane(&self.polygons, grouping);

        #[cfg(feature = "parallel")]
        let outlines = groups
            .par_iter()
            .map(|(plane, polygons)| merge_coplanar_loops(plane, polygons, engine))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let outlines = groups
            .iter()
            .map(|(plane, polygons)| merge_coplanar_loops(plane, polygons, engine))
            .collect();

        outlines
    }

    /// Silhouette loops per distinct plane: the edges left once coplanar
    /// neighbours are merged. Exterior and hole rings are both returned.
    ///
    /// Planes that fail to merge are skipped with a warning.
    pub fn duplicate_edges(&self) -> Vec<Vec<Polyline>> {
        self.plane_outlines(PlaneGrouping::Exact, &GeoUnion)
            .into_iter()
            .filter_map(|outline| match outline {
                Ok(outline) => Some(outline.loops.into_iter().map(|l| l.points).collect()),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping plane group");
                    None
                },
            })
            .collect()
    }
}
