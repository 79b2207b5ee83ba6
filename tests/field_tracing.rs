#![allow(clippy::unwrap_used)]

mod common;

use approx::assert_abs_diff_eq;
use eoptic::field::{FnField, RadialAxialField, Symmetry, EM, RADIAL_DERIVATIVES};
use eoptic::math::{Point3, Vector3};
use eoptic::tracer::{
    axis_intersection, velocity_vec_xz_plane, xy_plane_intersection, Bounds, PlaneTracer, Tracer,
};
use std::f64::consts::FRAC_PI_2;

/// Axial interpolation of a potential with constant slope, giving `Ez = -1`
/// for `|z| < 10`.
fn uniform_axial_field() -> RadialAxialField {
    let mut c = [[0.0; 6]; RADIAL_DERIVATIVES];
    c[1][5] = 1.0;
    RadialAxialField::new(vec![-10.0, -5.0, 0.0, 5.0, 10.0], vec![c; 4]).unwrap()
}

#[test]
fn uniform_field_conserves_energy_at_plane() {
    common::init_logging();
    let field = uniform_axial_field();
    let a = -EM;
    let bounds = Bounds::radial((-1.0, 1.0), (-5.0, 5.0)).unwrap();
    let tracer = Tracer::new(field, bounds).unwrap();

    let trajectory = tracer.trace(&[0.1, 0.0], &[0.0, 1.0]).unwrap();
    let hit = xy_plane_intersection(&trajectory, 2.0).unwrap();

    assert_abs_diff_eq!(hit[0], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(hit[1], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hit[2], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hit[3], (1.0 + 2.0 * a * 2.0).sqrt(), epsilon = 1e-5);
    assert!(trajectory.final_state().unwrap()[1] > 5.0);
}

#[test]
fn focusing_field_crosses_axis_after_quarter_period() {
    common::init_logging();
    let field = FnField::new(Symmetry::Radial, |p: &Point3, _: &Vector3| {
        Vector3::new(-p.x, 0.0, 0.0)
    });
    let bounds = Bounds::radial((-1.0, 1.0), (-1.0, 3.0)).unwrap();
    let tracer = Tracer::new(field, bounds).unwrap();

    let trajectory = tracer.trace(&[0.1, 0.0], &[0.0, 1.0]).unwrap();
    assert_abs_diff_eq!(axis_intersection(&trajectory).unwrap(), FRAC_PI_2, epsilon = 1e-5);
}

#[test]
fn batch_matches_single_traces() {
    common::init_logging();
    let bounds = Bounds::radial((-1.0, 1.0), (-5.0, 5.0)).unwrap();
    let tracer = Tracer::new(uniform_axial_field(), bounds).unwrap();

    let starts: Vec<(Vec<f64>, Vec<f64>)> = [0.0, 0.05, 0.1]
        .iter()
        .map(|&angle| (vec![0.0, 0.0], velocity_vec_xz_plane(5.0, angle, false, false).unwrap()))
        .collect();
    let batch = tracer.trace_many(&starts);

    for ((position, velocity), result) in starts.iter().zip(batch) {
        let single = tracer.trace(position, velocity).unwrap();
        assert_eq!(result.unwrap(), single);
    }
}

#[test]
fn plane_tracer_decelerates_downward_particles() {
    common::init_logging();
    let a = -EM;
    let tracer = PlaneTracer::new(uniform_axial_field(), 0.0, -3.0, 5.0).unwrap();
    let result = tracer.trace(&[0.0, 0.05], &[10.0, 10.0]).unwrap();

    assert_eq!(result.mask, vec![true, true]);
    let on_axis = &result.intersections[0];
    let v0 = velocity_vec_xz_plane(10.0, 0.0, true, false).unwrap()[1];
    assert_abs_diff_eq!(on_axis[1], -3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(on_axis[3], -(v0 * v0 - 2.0 * a * 3.0).sqrt(), epsilon = 1e-5);
    assert!(result.intersections[1][0] > 0.0);
}
