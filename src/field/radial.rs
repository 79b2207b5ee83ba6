use crate::error::{Result, TracingError};
use crate::math::{Point3, Vector3};
use crate::mesh::Mesh;

use super::{ellipe, ellipk, Field, Symmetry, EM, MIN_DISTANCE_AXIS};

/// Number of Gauss–Legendre points per line element.
pub const GAUSS_POINTS: usize = 8;

const GAUSS_QUAD_POINTS: [f64; GAUSS_POINTS] = [
    -0.183_434_642_495_649_8,
    0.183_434_642_495_649_8,
    -0.525_532_409_916_329,
    0.525_532_409_916_329,
    -0.796_666_477_413_626_7,
    0.796_666_477_413_626_7,
    -0.960_289_856_497_536_3,
    0.960_289_856_497_536_3,
];

const GAUSS_QUAD_WEIGHTS: [f64; GAUSS_POINTS] = [
    0.362_683_783_378_362,
    0.362_683_783_378_362,
    0.313_706_645_877_887_3,
    0.313_706_645_877_887_3,
    0.222_381_034_453_374_5,
    0.222_381_034_453_374_5,
    0.101_228_536_290_376_3,
    0.101_228_536_290_376_3,
];

/// Number of axial potential derivatives stored per interpolation interval.
pub const RADIAL_DERIVATIVES: usize = 9;

/// Radial derivative of the potential at `(r0, z0)` of a unit charge ring
/// through `(r, z)`.
fn dr1_potential_ring(r0: f64, z0: f64, r: f64, z: f64) -> f64 {
    if r0.abs() < MIN_DISTANCE_AXIS {
        return 0.0;
    }
    let s = (z - z0).hypot(r + r0);
    let s1 = (r0 + r) / s;
    let t = 4.0 * r * r0 / (s * s);
    let ellipe_term = -(2.0 * r * r0 * s1 - r * s) / (2.0 * r0 * s * s - 8.0 * r0 * r0 * r);
    let ellipk_term = -r / (2.0 * r0 * s);
    ellipe(t) * ellipe_term + ellipk(t) * ellipk_term
}

/// Axial derivative of the potential at `(r0, z0)` of a unit charge ring
/// through `(r, z)`.
fn dz1_potential_ring(r0: f64, z0: f64, r: f64, z: f64) -> f64 {
    let dz = z - z0;
    let rz2 = (r + r0).powi(2) + dz * dz;
    let t = 4.0 * r * r0 / rz2;
    r * dz * ellipe(t) / ((dz * dz + (r - r0).powi(2)) * rz2.sqrt())
}

/// Field of charged rings, given per line element as charge densities at the
/// Gauss–Legendre points.
///
/// Line elements live in the `(r, z)` half plane.
#[derive(Debug, Clone)]
pub struct RadialBemField {
    segments: Vec<[[f64; 2]; 2]>,
    charges: Vec<[f64; GAUSS_POINTS]>,
}

impl RadialBemField {
    /// Creates the field from line elements `[(r1, z1), (r2, z2)]` and their
    /// charge densities.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of charges differs from the number of
    /// segments.
    pub fn new(segments: Vec<[[f64; 2]; 2]>, charges: Vec<[f64; GAUSS_POINTS]>) -> Result<Self> {
        if segments.len() != charges.len() {
            return Err(TracingError::InvalidParameters(format!(
                "{} line elements but {} charge entries",
                segments.len(),
                charges.len()
            ))
            .into());
        }
        Ok(Self { segments, charges })
    }

    /// Creates the field from the line elements of a mesh in the XZ plane,
    /// taking `x` as the radial coordinate. Curved elements contribute their
    /// endpoints only.
    ///
    /// # Errors
    ///
    /// Returns an error if an element references a missing point or the
    /// number of charges differs from the number of line elements.
    pub fn from_mesh(mesh: &Mesh, charges: Vec<[f64; GAUSS_POINTS]>) -> Result<Self> {
        mesh.validate()?;
        let segments = mesh
            .lines
            .iter()
            .map(|line| {
                line.endpoints().map(|i| {
                    let p = mesh.points[i];
                    [p.x, p.z]
                })
            })
            .collect();
        Self::new(segments, charges)
    }

    /// Electric field `(Er, Ez)` at `(r, z)`.
    #[must_use]
    pub fn electric_field(&self, r: f64, z: f64) -> [f64; 2] {
        let mut er = 0.0;
        let mut ez = 0.0;

        for ([v1, v2], charges) in self.segments.iter().zip(&self.charges) {
            let length = (v2[0] - v1[0]).hypot(v2[1] - v1[1]);
            let quadrature = GAUSS_QUAD_POINTS.iter().zip(&GAUSS_QUAD_WEIGHTS).zip(charges);
            for ((point, weight), charge) in quadrature {
                let factor = point / 2.0 + 0.5;
                let rs = v1[0] + factor * (v2[0] - v1[0]);
                let zs = v1[1] + factor * (v2[1] - v1[1]);
                let weight = weight * length / 2.0;

                er -= weight * charge * dr1_potential_ring(r, z, rs, zs);
                ez -= weight * charge * dz1_potential_ring(r, z, rs, zs);
            }
        }
        [er, ez]
    }
}

impl Field for RadialBemField {
    fn symmetry(&self) -> Symmetry {
        Symmetry::Radial
    }

    fn acceleration(&self, position: &Point3, _velocity: &Vector3) -> Vector3 {
        let [er, ez] = self.electric_field(position.x, position.y);
        Vector3::new(EM * er, EM * ez, 0.0)
    }
}

/// Field from interpolated derivatives of the on-axis potential.
///
/// On every interval `[z_i, z_i+1]` each derivative is a quintic in
/// `z - z_i`, stored from the highest power down. Off-axis values follow
/// from the power series of the potential in `r`. Outside the sampled range
/// the field is zero.
#[derive(Debug, Clone)]
pub struct RadialAxialField {
    z: Vec<f64>,
    coefficients: Vec<[[f64; 6]; RADIAL_DERIVATIVES]>,
}

impl RadialAxialField {
    /// Creates the field from uniformly spaced sample positions `z` and the
    /// coefficients of every interval between them.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two samples are given, they are not
    /// increasing, or there are fewer coefficient sets than intervals.
    pub fn new(z: Vec<f64>, coefficients: Vec<[[f64; 6]; RADIAL_DERIVATIVES]>) -> Result<Self> {
        validate_axis(&z, coefficients.len())?;
        Ok(Self { z, coefficients })
    }

    /// Electric field `(Er, Ez)` at `(r, z)`.
    #[must_use]
    pub fn electric_field(&self, r: f64, z: f64) -> [f64; 2] {
        let Some((index, dz)) = locate(&self.z, self.coefficients.len(), z) else {
            return [0.0, 0.0];
        };
        let d = self.coefficients[index].map(|c| c.iter().fold(0.0, |acc, c| acc * dz + c));

        let r2 = r * r;
        let er = r / 2.0
            * (d[2] - r2 / 8.0 * d[4] + r2 * r2 / 192.0 * d[6]
                - r2 * r2 * r2 / 9216.0 * d[8]);
        let ez = -d[1] + r2 / 4.0 * d[3] - r2 * r2 / 64.0 * d[5] + r2 * r2 * r2 / 2304.0 * d[7];
        [er, ez]
    }
}

impl Field for RadialAxialField {
    fn symmetry(&self) -> Symmetry {
        Symmetry::Radial
    }

    fn acceleration(&self, position: &Point3, _velocity: &Vector3) -> Vector3 {
        let [er, ez] = self.electric_field(position.x, position.y);
        Vector3::new(EM * er, EM * ez, 0.0)
    }
}

pub(super) fn validate_axis(z: &[f64], intervals: usize) -> Result<()> {
    if z.len() < 2 {
        return Err(TracingError::InvalidParameters(
            "at least two axial samples are needed".into(),
        )
        .into());
    }
    if z.windows(2).any(|w| w[1] <= w[0]) {
        return Err(TracingError::InvalidParameters(
            "axial samples must be increasing".into(),
        )
        .into());
    }
    if intervals < z.len() - 1 {
        return Err(TracingError::InvalidParameters(format!(
            "{} axial samples need {} coefficient sets, got {intervals}",
            z.len(),
            z.len() - 1
        ))
        .into());
    }
    Ok(())
}

/// Interval index and offset into it for a position strictly inside the
/// sampled range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn locate(z: &[f64], intervals: usize, position: f64) -> Option<(usize, f64)> {
    let (first, last) = (z[0], z[z.len() - 1]);
    if !(first < position && position < last) {
        return None;
    }
    let step = z[1] - z[0];
    let index = (((position - first) / step) as usize).min(intervals - 1);
    Some((index, position - z[index]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{EopticError, MeshError};
    use crate::mesh::LineElement;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn uniform_ring_field() -> RadialBemField {
        RadialBemField::new(vec![[[1.0, 0.0], [2.0, 0.0]]], vec![[1.0; GAUSS_POINTS]]).unwrap()
    }

    #[test]
    fn on_axis_field_of_flat_annulus() {
        let field = uniform_ring_field();
        for z0 in [0.5, 1.0, 3.0] {
            let [er, ez] = field.electric_field(0.0, z0);
            let expected = z0
                * FRAC_PI_2
                * (1.0 / (z0 * z0 + 1.0).sqrt() - 1.0 / (z0 * z0 + 4.0).sqrt());
            assert_eq!(er, 0.0);
            assert_relative_eq!(ez, expected, max_relative = 1e-7);
        }
    }

    #[test]
    fn annulus_field_is_antisymmetric() {
        let field = uniform_ring_field();
        let [er_up, ez_up] = field.electric_field(0.7, 0.4);
        let [er_down, ez_down] = field.electric_field(0.7, -0.4);
        assert_relative_eq!(er_up, er_down, max_relative = 1e-12);
        assert_relative_eq!(ez_up, -ez_down, max_relative = 1e-12);
    }

    #[test]
    fn acceleration_is_scaled_field() {
        let field = uniform_ring_field();
        let [er, ez] = field.electric_field(0.5, 1.0);
        let a = field.acceleration(&Point3::new(0.5, 1.0, 0.0), &Vector3::zeros());
        assert_abs_diff_eq!(a, Vector3::new(EM * er, EM * ez, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn mismatched_charges_are_rejected() {
        assert!(RadialBemField::new(vec![[[1.0, 0.0], [2.0, 0.0]]], vec![]).is_err());
    }

    #[test]
    fn from_mesh_uses_xz_coordinates_of_valid_meshes() {
        let mut mesh = Mesh {
            points: vec![Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
            lines: vec![LineElement::Linear([0, 1])],
            ..Mesh::default()
        };
        let field = RadialBemField::from_mesh(&mesh, vec![[1.0; GAUSS_POINTS]]).unwrap();
        assert_eq!(field.electric_field(0.3, 0.8), uniform_ring_field().electric_field(0.3, 0.8));

        mesh.lines.push(LineElement::Linear([1, 4]));
        assert!(matches!(
            RadialBemField::from_mesh(&mesh, vec![[1.0; GAUSS_POINTS]; 2]),
            Err(EopticError::Mesh(MeshError::IndexOutOfRange { element: 1, index: 4, .. }))
        ));
    }

    fn constant_derivatives(d1: f64, d2: f64) -> RadialAxialField {
        let mut c = [[0.0; 6]; RADIAL_DERIVATIVES];
        c[1][5] = d1;
        c[2][5] = d2;
        RadialAxialField::new(vec![0.0, 1.0, 2.0], vec![c, c]).unwrap()
    }

    #[test]
    fn axial_interpolation_on_and_off_axis() {
        let field = constant_derivatives(-2.0, 0.5);
        assert_eq!(field.electric_field(0.0, 1.5), [0.0, 2.0]);
        let [er, ez] = field.electric_field(0.4, 0.5);
        assert_abs_diff_eq!(er, 0.1, epsilon = 1e-15);
        assert_abs_diff_eq!(ez, 2.0, epsilon = 1e-15);
    }

    #[test]
    fn axial_field_vanishes_outside_samples() {
        let field = constant_derivatives(-2.0, 0.5);
        assert_eq!(field.electric_field(0.0, 0.0), [0.0, 0.0]);
        assert_eq!(field.electric_field(0.0, 2.5), [0.0, 0.0]);
    }

    #[test]
    fn quintic_is_evaluated_in_offset() {
        let mut c = [[0.0; 6]; RADIAL_DERIVATIVES];
        // d1(dz) = dz^2 on the second interval
        c[1][3] = 1.0;
        let field = RadialAxialField::new(
            vec![0.0, 1.0, 2.0],
            vec![[[0.0; 6]; RADIAL_DERIVATIVES], c],
        )
        .unwrap();
        let [_, ez] = field.electric_field(0.0, 1.5);
        assert_abs_diff_eq!(ez, -0.25, epsilon = 1e-15);
    }

    #[test]
    fn axis_validation() {
        let c = [[0.0; 6]; RADIAL_DERIVATIVES];
        assert!(RadialAxialField::new(vec![0.0], vec![c]).is_err());
        assert!(RadialAxialField::new(vec![0.0, 1.0, 0.5], vec![c, c]).is_err());
        assert!(RadialAxialField::new(vec![0.0, 1.0, 2.0], vec![c]).is_err());
    }
}
