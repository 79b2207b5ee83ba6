pub mod quadrature;
pub mod spline;

pub use quadrature::integrate;
pub use spline::{CubicSpline, SplineCurve3};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Absolute tolerance used to decide whether two path endpoints coincide.
pub const POINT_TOLERANCE: f64 = 1e-8;

/// Returns whether every coordinate of `a` and `b` differs by at most `tolerance`.
#[must_use]
pub fn points_close(a: &Point3, b: &Point3, tolerance: f64) -> bool {
    (a - b).iter().all(|d| d.abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_close_is_componentwise() {
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(points_close(&a, &Point3::new(1.0 + 5e-9, 2.0, 3.0 - 5e-9), POINT_TOLERANCE));
        assert!(!points_close(&a, &Point3::new(1.0, 2.0 + 1e-6, 3.0), POINT_TOLERANCE));
    }
}
