mod support;

use approx::assert_abs_diff_eq;
use nalgebra::{Point3, Vector3};
use polysolid::{
    CSG, Polyline, Solid,
    float_types::Real,
    mesh::silhouette::{GeoUnion, PlaneGrouping, PlaneOutline},
    shapes::CylinderOptions,
};

use crate::support::cube;

fn ring_extent(ring: &Polyline) -> (Point3<Real>, Point3<Real>) {
    let mut min = Point3::new(Real::MAX, Real::MAX, Real::MAX);
    let mut max = Point3::new(Real::MIN, Real::MIN, Real::MIN);
    for p in ring {
        min = min.inf(p);
        max = max.sup(p);
    }
    (min, max)
}

#[test]
fn cube_has_one_square_per_face() {
    let solid = cube([0.0, 0.0, 0.0], 1.0);
    let edges = solid.duplicate_edges();
    assert_eq!(edges.len(), 6);
    for (group, polygon) in edges.iter().zip(&solid.polygons) {
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].len(), 4);
        // Every point lies on the face plane
        for p in &group[0] {
            assert_abs_diff_eq!(polygon.plane.signed_distance(p), 0.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn union_merges_split_top_face() {
    let a = cube([0.0, 0.0, 0.0], 1.0);
    let b = cube([1.0, 0.0, 0.0], 1.0);
    let union = a.union(&b);

    let edges = union.duplicate_edges();
    let top: Vec<&Vec<Polyline>> = edges
        .iter()
        .filter(|group| group.iter().flatten().all(|p| (p.z - 1.0).abs() < 1e-9))
        .collect();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].len(), 1);

    let (min, max) = ring_extent(&top[0][0]);
    assert_abs_diff_eq!(min.x, -1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(max.x, 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(min.y, -1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(max.y, 1.0, epsilon = 1e-9);
}

fn outline_facing<'a>(
    outlines: &'a [PlaneOutline],
    normal: Vector3<Real>,
    offset: Real,
) -> &'a PlaneOutline {
    outlines
        .iter()
        .find(|o| (o.plane.normal - normal).norm() < 1e-9 && (o.plane.w - offset).abs() < 1e-9)
        .unwrap()
}

#[test]
fn drilled_cube_face_has_one_ring_and_one_hole() {
    let drill = Solid::cylinder(CylinderOptions {
        start: Point3::new(0.0, 0.0, -2.0),
        end: Point3::new(0.0, 0.0, 2.0),
        radius: 0.5,
        slices: 16,
    })
    .unwrap();
    let drilled = cube([0.0, 0.0, 0.0], 1.0).subtract(&drill);

    let outlines: Vec<PlaneOutline> = drilled
        .plane_outlines(PlaneGrouping::Exact, &GeoUnion)
        .into_iter()
        .map(|o| o.unwrap())
        .collect();

    for normal in [Vector3::z(), -Vector3::z()] {
        let face = outline_facing(&outlines, normal, 1.0);
        assert_eq!(face.loops.len(), 2);

        let shell: Vec<_> = face.loops.iter().filter(|l| !l.is_hole).collect();
        let holes: Vec<_> = face.loops.iter().filter(|l| l.is_hole).collect();
        assert_eq!(shell.len(), 1);
        assert_eq!(holes.len(), 1);

        assert_eq!(shell[0].points.len(), 4);
        let (min, max) = ring_extent(&shell[0].points);
        assert_abs_diff_eq!(min.x, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(max.y, 1.0, epsilon = 1e-9);

        assert_eq!(holes[0].points.len(), 16);
        for p in &holes[0].points {
            assert_abs_diff_eq!(p.x.hypot(p.y), 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(p.z, normal.z, epsilon = 1e-9);
        }
    }

    // The side faces are untouched by the drill
    let side = outline_facing(&outlines, Vector3::x(), 1.0);
    assert_eq!(side.loops.len(), 1);
    assert_eq!(side.loops[0].points.len(), 4);

    let top_edges: Vec<Vec<Polyline>> = drilled
        .duplicate_edges()
        .into_iter()
        .filter(|group| group.iter().flatten().all(|p| (p.z - 1.0).abs() < 1e-9))
        .collect();
    assert_eq!(top_edges.len(), 1);
    assert_eq!(top_edges[0].len(), 2);
}

#[test]
fn overlapping_union_leaves_l_shaped_faces() {
    let a = cube([0.0, 0.0, 0.0], 1.0);
    let b = cube([0.5, 0.3, 0.2], 1.0);
    let outlines: Vec<PlaneOutline> = a
        .union(&b)
        .plane_outlines(PlaneGrouping::Exact, &GeoUnion)
        .into_iter()
        .map(|o| o.unwrap())
        .collect();

    // Every face of both cubes survives, each as a single ring
    assert_eq!(outlines.len(), 12);
    assert!(outlines.iter().all(|o| o.loops.len() == 1 && !o.loops[0].is_hole));

    // Faces reaching into the other cube lose a corner and become L-shaped
    let mut sizes: Vec<usize> = outlines.iter().map(|o| o.loops[0].points.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, [4, 4, 4, 4, 4, 4, 6, 6, 6, 6, 6, 6]);
    assert_eq!(outline_facing(&outlines, Vector3::z(), 1.0).loops[0].points.len(), 6);
    assert_eq!(outline_facing(&outlines, -Vector3::x(), 1.0).loops[0].points.len(), 4);
}

#[test]
fn plane_outlines_report_planes_in_first_seen_order() {
    let solid = cube([0.0, 0.0, 0.0], 1.0);
    let outlines = solid.plane_outlines(PlaneGrouping::Exact, &GeoUnion);
    assert_eq!(outlines.len(), 6);
    for (outline, polygon) in outlines.iter().zip(&solid.polygons) {
        let outline = outline.as_ref().unwrap();
        assert_eq!(outline.plane, polygon.plane);
        assert!(outline.loops.iter().all(|l| !l.is_hole));
    }
}

#[test]
fn quantized_grouping_absorbs_rounding_noise() {
    let solid = cube([0.0, 0.0, 0.0], 1.0);
    let mut nudged = solid.clone();
    for polygon in &mut nudged.polygons {
        polygon.plane.w += 1e-13;
    }
    let mut both = solid.polygons.clone();
    both.extend(nudged.polygons);
    let merged = polysolid::Solid::from_polygons(&both);

    assert_eq!(merged.plane_outlines(PlaneGrouping::Exact, &GeoUnion).len(), 12);
    assert_eq!(merged.plane_outlines(PlaneGrouping::Quantized(1e8), &GeoUnion).len(), 6);
}

#[test]
fn empty_solid_has_no_edges() {
    assert!(polysolid::Solid::from_polygons(&[]).duplicate_edges().is_empty());
}
