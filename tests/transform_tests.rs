use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use polysolid::{
    Frame, Transform, ValidationError,
    float_types::{FRAC_PI_2, PI},
};

fn skewed_frame() -> Frame {
    Frame {
        origin: Point3::new(-1.0, 4.0, 0.5),
        x_axis: Vector3::new(1.0, 0.2, 0.0),
        y_axis: Vector3::new(-0.3, 1.0, 0.4),
        z_axis: Vector3::new(0.1, -0.2, 2.0),
    }
}

#[test]
fn change_basis_round_trip_is_identity() {
    let p = Frame::from_points(
        &Point3::new(1.0, 2.0, 3.0),
        &Point3::new(2.0, 2.5, 3.0),
        &Point3::new(0.0, 3.0, 4.0),
    )
    .unwrap();
    let q = skewed_frame();

    let there = Transform::change_basis(&p, &q).unwrap();
    let back = Transform::change_basis(&q, &p).unwrap();
    let round_trip = back.multiply(&there);

    for point in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.5, -2.0, 7.0),
        Point3::new(-3.0, 0.25, 0.5),
    ] {
        assert_relative_eq!(round_trip.transform_point(&point), point, epsilon = 1e-9);
    }
}

#[test]
fn change_basis_to_frame_gives_local_coordinates() {
    let frame = skewed_frame();
    let to_local = Transform::change_basis(&Frame::world_xy(), &frame).unwrap();
    let to_world = Transform::change_basis(&frame, &Frame::world_xy()).unwrap();

    let local = Point3::new(0.5, -1.5, 2.0);
    let world = frame.point_at(local.x, local.y, local.z);
    assert_relative_eq!(to_local.transform_point(&world), local, epsilon = 1e-9);
    assert_relative_eq!(to_world.transform_point(&local), world, epsilon = 1e-9);
}

#[test]
fn degenerate_target_basis_is_singular() {
    let mut frame = Frame::world_xy();
    frame.x_axis = Vector3::new(1.0, 1.0, 1.0);
    frame.y_axis = Vector3::new(1.0, 1.0, 1.0);
    frame.z_axis = Vector3::new(1.0, 1.0, 1.0);
    assert_eq!(
        Transform::change_basis(&Frame::world_xy(), &frame),
        Err(ValidationError::SingularBasis)
    );
}

#[test]
fn multiply_order() {
    let t = Transform::translation(0.0, 0.0, 5.0);
    let r = Transform::rotation(FRAC_PI_2, &Vector3::x(), &Point3::origin()).unwrap();
    let p = Point3::new(0.0, 1.0, 0.0);
    // rotate first, then translate
    assert_relative_eq!(t.multiply(&r).transform_point(&p), Point3::new(0.0, 0.0, 6.0));
}

#[test]
fn half_turn_is_exact() {
    let r = Transform::rotation(PI, &Vector3::y(), &Point3::new(1.0, 0.0, 0.0)).unwrap();
    assert_eq!(r.transform_point(&Point3::new(2.0, 3.0, 0.0)), Point3::new(0.0, 3.0, 0.0));
}

#[test]
fn transform_vector_ignores_translation() {
    let t = Transform::translation(4.0, 5.0, 6.0);
    assert_eq!(t.transform_vector(&Vector3::x()), Vector3::x());
}

#[test]
fn shear_moves_along_frame_axes() {
    let s = Transform::shear(
        &Frame::world_xy(),
        &Vector3::x(),
        &Vector3::new(1.0, 1.0, 0.0),
        &Vector3::z(),
    );
    assert_relative_eq!(s.transform_point(&Point3::new(0.0, 2.0, 0.0)), Point3::new(2.0, 2.0, 0.0));
    assert_relative_eq!(s.determinant(), 1.0);
}

#[test]
fn homogeneous_divide() {
    let mut t = Transform::identity();
    t.matrix[(3, 3)] = 2.0;
    assert_eq!(t.transform_point(&Point3::new(2.0, 4.0, 6.0)), Point3::new(1.0, 2.0, 3.0));

    // w = 0 keeps the raw coordinates
    t.matrix[(3, 3)] = 0.0;
    assert_eq!(t.transform_point(&Point3::new(2.0, 4.0, 6.0)), Point3::new(2.0, 4.0, 6.0));
}

#[test]
fn normal_matrix_keeps_normals_perpendicular() {
    let s = Transform::diagonal(2.0, 1.0, 1.0);
    // Plane x + y = 0 stretched along x
    let tangent = Vector3::new(1.0, -1.0, 0.0);
    let normal = Vector3::new(1.0, 1.0, 0.0);
    let mapped_tangent = s.transform_vector(&tangent);
    let mapped_normal = s.normal_matrix() * normal;
    assert_relative_eq!(mapped_tangent.dot(&mapped_normal), 0.0);
}
