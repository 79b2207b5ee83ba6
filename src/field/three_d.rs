use crate::error::{Result, TracingError};
use crate::math::{Point3, Vector3};
use crate::mesh::Mesh;

use super::radial::{locate, validate_axis};
use super::{Field, Symmetry, EM, MIN_DISTANCE_AXIS};

const N_TRIANGLE_QUAD: usize = 9;

const QUAD_B1: [f64; N_TRIANGLE_QUAD] = [
    0.124_949_503_233_232,
    0.437_525_248_383_384,
    0.437_525_248_383_384,
    0.797_112_651_860_071,
    0.797_112_651_860_071,
    0.165_409_927_389_841,
    0.165_409_927_389_841,
    0.037_477_420_750_088,
    0.037_477_420_750_088,
];

const QUAD_B2: [f64; N_TRIANGLE_QUAD] = [
    0.437_525_248_383_384,
    0.124_949_503_233_232,
    0.437_525_248_383_384,
    0.165_409_927_389_841,
    0.037_477_420_750_088,
    0.797_112_651_860_071,
    0.037_477_420_750_088,
    0.797_112_651_860_071,
    0.165_409_927_389_841,
];

const QUAD_WEIGHTS: [f64; N_TRIANGLE_QUAD] = [
    0.205_950_504_760_887,
    0.205_950_504_760_887,
    0.205_950_504_760_887,
    0.063_691_414_286_223,
    0.063_691_414_286_223,
    0.063_691_414_286_223,
    0.063_691_414_286_223,
    0.063_691_414_286_223,
    0.063_691_414_286_223,
];

/// Number of radial orders in the multipole expansion.
pub const NU_MAX: usize = 4;
/// Number of angular orders in the multipole expansion.
pub const M_MAX: usize = 8;

/// Cubic coefficients of one axial interval: `[cos/sin][nu][m][power]`,
/// highest power first.
pub type Axial3dCoefficients = [[[[f64; 4]; M_MAX]; NU_MAX]; 2];

/// Field of charged triangles with a uniform charge density each.
#[derive(Debug, Clone)]
pub struct Bem3dField {
    triangles: Vec<[Point3; 3]>,
    charges: Vec<f64>,
}

impl Bem3dField {
    /// Creates the field from triangles and their charge densities.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of charges differs from the number of
    /// triangles.
    pub fn new(triangles: Vec<[Point3; 3]>, charges: Vec<f64>) -> Result<Self> {
        if triangles.len() != charges.len() {
            return Err(TracingError::InvalidParameters(format!(
                "{} triangles but {} charges",
                triangles.len(),
                charges.len()
            ))
            .into());
        }
        Ok(Self { triangles, charges })
    }

    /// Creates the field from the triangles of a mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a triangle references a missing point or the
    /// number of charges differs from the number of triangles.
    pub fn from_mesh(mesh: &Mesh, charges: Vec<f64>) -> Result<Self> {
        mesh.validate()?;
        let triangles = mesh
            .triangles
            .iter()
            .map(|t| t.map(|i| mesh.points[i]))
            .collect();
        Self::new(triangles, charges)
    }

    /// Electric field at `point`.
    #[must_use]
    pub fn electric_field(&self, point: &Point3) -> Vector3 {
        self.triangles
            .iter()
            .zip(&self.charges)
            .fold(Vector3::zeros(), |field, ([v1, v2, v3], charge)| {
                let (e1, e2) = (v2 - v1, v3 - v1);
                let area = 0.5 * e1.cross(&e2).norm();
                let integral = (0..N_TRIANGLE_QUAD).fold(Vector3::zeros(), |sum, k| {
                    let source = v1 + QUAD_B1[k] * e1 + QUAD_B2[k] * e2;
                    let d = source - point;
                    let r = d.norm();
                    sum + QUAD_WEIGHTS[k] * d / (4.0 * r * r * r)
                });
                field - *charge * area * integral
            })
    }
}

impl Field for Bem3dField {
    fn symmetry(&self) -> Symmetry {
        Symmetry::ThreeD
    }

    fn acceleration(&self, position: &Point3, _velocity: &Vector3) -> Vector3 {
        EM * self.electric_field(position)
    }
}

/// Field from interpolated coefficients of a multipole expansion around the
/// z-axis.
///
/// Outside the sampled range the field is zero.
#[derive(Debug, Clone)]
pub struct Axial3dField {
    z: Vec<f64>,
    coefficients: Vec<Axial3dCoefficients>,
}

impl Axial3dField {
    /// Creates the field from uniformly spaced sample positions `z` and the
    /// coefficients of every interval between them.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two samples are given, they are not
    /// increasing, or there are fewer coefficient sets than intervals.
    pub fn new(z: Vec<f64>, coefficients: Vec<Axial3dCoefficients>) -> Result<Self> {
        validate_axis(&z, coefficients.len())?;
        Ok(Self { z, coefficients })
    }

    /// Electric field at `point`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_possible_truncation
    )]
    pub fn electric_field(&self, point: &Point3) -> Vector3 {
        let Some((index, dz)) = locate(&self.z, self.coefficients.len(), point.z) else {
            return Vector3::zeros();
        };
        let c = &self.coefficients[index];

        let value = |k: &[f64; 4]| ((k[0] * dz + k[1]) * dz + k[2]) * dz + k[3];
        let slope = |k: &[f64; 4]| (3.0 * k[0] * dz + 2.0 * k[1]) * dz + k[2];
        let a = c[0].map(|row| row.map(|k| value(&k)));
        let b = c[1].map(|row| row.map(|k| value(&k)));
        let a_diff = c[0].map(|row| row.map(|k| slope(&k)));
        let b_diff = c[1].map(|row| row.map(|k| slope(&k)));

        let (x, y) = (point.x, point.y);
        let r = x.hypot(y);
        if r < MIN_DISTANCE_AXIS {
            return Vector3::new(-a[0][1], -b[0][1], -a_diff[0][0]);
        }
        let phi = y.atan2(x);

        let mut field = Vector3::zeros();
        for nu in 0..NU_MAX {
            for m in 0..M_MAX {
                let exp = (2 * nu + m) as i32;
                let (sin, cos) = (m as f64 * phi).sin_cos();
                let diff_r = (a[nu][m] * cos + b[nu][m] * sin) * f64::from(exp) * r.powi(exp - 1);
                let diff_theta = m as f64 * (-a[nu][m] * sin + b[nu][m] * cos) * r.powi(exp);

                field.x -= diff_r * x / r - diff_theta * y / (r * r);
                field.y -= diff_r * y / r + diff_theta * x / (r * r);
                field.z -= (a_diff[nu][m] * cos + b_diff[nu][m] * sin) * r.powi(exp);
            }
        }
        field
    }
}

impl Field for Axial3dField {
    fn symmetry(&self) -> Symmetry {
        Symmetry::ThreeD
    }

    fn acceleration(&self, position: &Point3, _velocity: &Vector3) -> Vector3 {
        EM * self.electric_field(position)
    }
}
