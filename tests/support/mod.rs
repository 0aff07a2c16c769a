//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use nalgebra::{Point3, Vector3};
use polysolid::{
    Solid,
    float_types::Real,
    mesh::{bsp::Node, polygon::Polygon, vertex::Vertex},
    shapes::{CubeOptions, SphereOptions},
};

/// Returns the bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box(polygons: &[Polygon]) -> [Real; 6] {
    let mut min = Point3::new(Real::MAX, Real::MAX, Real::MAX);
    let mut max = Point3::new(Real::MIN, Real::MIN, Real::MIN);

    for poly in polygons {
        for v in &poly.vertices {
            min = min.inf(&v.pos);
            max = max.sup(&v.pos);
        }
    }

    [min.x, min.y, min.z, max.x, max.y, max.z]
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon {
    let verts = points
        .iter()
        .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
        .collect();
    Polygon::new(verts, None).unwrap()
}

pub fn cube(center: [Real; 3], radius: Real) -> Solid {
    Solid::cube(CubeOptions::uniform(Point3::from(center), radius)).unwrap()
}

pub fn sphere(center: [Real; 3], radius: Real) -> Solid {
    Solid::sphere(SphereOptions {
        center: Point3::from(center),
        radius,
        ..SphereOptions::default()
    })
    .unwrap()
}

/// `n³` points filling `[lo, hi]³`, nudged off round coordinates so none
/// lands exactly on an axis-aligned face.
pub fn sample_grid(lo: Real, hi: Real, n: usize) -> Vec<Point3<Real>> {
    let step = (hi - lo) / n as Real;
    let nudge = Vector3::new(0.0173, 0.0291, 0.0419) * step;
    let mut points = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let p = Point3::new(
                    lo + (i as Real + 0.5) * step,
                    lo + (j as Real + 0.5) * step,
                    lo + (k as Real + 0.5) * step,
                );
                points.push(p + nudge);
            }
        }
    }
    points
}

/// Points of `samples` where the two solids disagree about containment.
pub fn containment_mismatches(a: &Solid, b: &Solid, samples: &[Point3<Real>]) -> Vec<Point3<Real>> {
    let a_tree = Node::from_polygons(&a.polygons);
    let b_tree = Node::from_polygons(&b.polygons);
    samples
        .iter()
        .filter(|p| a_tree.contains_point(p) != b_tree.contains_point(p))
        .copied()
        .collect()
}

/// Number of `samples` inside `solid`.
pub fn inside_count(solid: &Solid, samples: &[Point3<Real>]) -> usize {
    let tree = Node::from_polygons(&solid.polygons);
    samples.iter().filter(|p| tree.contains_point(p)).count()
}
