#![allow(clippy::unwrap_used)]

mod common;

use approx::assert_abs_diff_eq;
use eoptic::geometry::{Path, PathCollection, Surface};
use eoptic::math::Point3;
use eoptic::mesh::{MeshParams, Meshable};
use std::f64::consts::TAU;

#[test]
fn aperture_profile_meshes_through_its_corners() {
    common::init_logging();
    let aperture = Path::aperture(0.2, 0.5, 2.0, 1.0).unwrap().with_name("aperture");
    assert_abs_diff_eq!(aperture.length(), 3.2, epsilon = 1e-12);

    let mesh = aperture.mesh(&MeshParams::with_size(0.05)).unwrap();
    mesh.validate().unwrap();

    assert_eq!(mesh.line_group("aperture").unwrap().len(), mesh.lines.len());
    for p in &mesh.points {
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        assert!(p.x >= 0.5 - 1e-12 && p.x <= 2.0 + 1e-12);
        assert!((p.z - 1.0).abs() <= 0.1 + 1e-12);
    }
    for corner in [Point3::new(0.5, 0.0, 0.9), Point3::new(0.5, 0.0, 1.1)] {
        assert!(mesh.points.iter().any(|p| (p - corner).norm() < 1e-9));
    }
}

#[test]
fn electrodes_keep_their_groups() {
    common::init_logging();
    let lower = Path::aperture(0.2, 0.5, 2.0, -1.0).unwrap().with_name("lower");
    let upper = Path::aperture(0.2, 0.5, 2.0, 1.0).unwrap().with_name("upper");
    let electrodes: PathCollection = lower + upper;

    let mesh = electrodes.mesh(&MeshParams::default()).unwrap();
    mesh.validate().unwrap();

    let lower_lines = mesh.line_group("lower").unwrap();
    let upper_lines = mesh.line_group("upper").unwrap();
    assert_eq!(lower_lines.len() + upper_lines.len(), mesh.lines.len());
    for &i in upper_lines {
        for &p in mesh.lines[i].indices() {
            assert!(mesh.points[p].z > 0.0);
        }
    }
}

#[test]
fn revolved_aperture_meshes_into_triangles() {
    common::init_logging();
    let plate = Path::aperture(0.2, 0.5, 2.0, 0.0)
        .unwrap()
        .revolve_z(TAU)
        .unwrap()
        .with_name("plate");
    let mesh = plate.mesh(&MeshParams::with_size(0.2)).unwrap();
    mesh.validate().unwrap();

    assert!(!mesh.triangles.is_empty());
    assert_eq!(mesh.triangle_group("plate").unwrap().len(), mesh.triangles.len());
    for p in &mesh.points {
        let r = p.x.hypot(p.y);
        assert!(r >= 0.5 - 1e-9 && r <= 2.0 + 1e-9);
        assert!(p.z.abs() <= 0.1 + 1e-12);
    }
    for t in &mesh.triangles {
        assert!(t[0] != t[1] && t[1] != t[2] && t[0] != t[2]);
    }
}

#[test]
fn invalid_mesh_size_is_rejected() {
    let disk = Surface::disk_xy(0.0, 0.0, 1.0).unwrap();
    assert!(disk.mesh(&MeshParams::with_size(0.0)).is_err());
    assert!(disk.mesh(&MeshParams::with_size(f64::NAN)).is_err());
}
