//! Initial velocities of electrons from kinetic energies in eV.

use tracing::warn;

use crate::error::{Result, TracingError};

/// Speed (mm/ns) of an electron with a kinetic energy of 1 eV.
const SPEED_PER_SQRT_EV: f64 = 0.593_096_960_491_943_3;

/// Energy above which the non-relativistic speed is noticeably off.
const RELATIVISTIC_EV: f64 = 10_000.0;

/// Velocity (mm/ns) of an electron with `ev` kinetic energy moving along
/// `direction`.
///
/// The direction does not need to be normalized and the result has as many
/// components as the direction.
///
/// # Errors
///
/// Returns an error if the energy is not positive or the direction has zero
/// length.
pub fn velocity_vec(ev: f64, direction: &[f64]) -> Result<Vec<f64>> {
    if ev <= 0.0 || !ev.is_finite() {
        return Err(TracingError::InvalidParameters(
            format!("energy must be positive, got {ev} eV"),
        )
        .into());
    }
    let norm = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(TracingError::InvalidParameters(
            "direction must be a finite non-zero vector".into(),
        )
        .into());
    }
    if ev > RELATIVISTIC_EV {
        warn!(ev, "large energy requested, relativistic effects are ignored");
    }

    let speed = SPEED_PER_SQRT_EV * ev.sqrt();
    Ok(direction.iter().map(|d| speed * d / norm).collect())
}

/// Three-dimensional velocity with the direction given by the polar angle
/// `theta` from the z-axis and the azimuth `phi` from the x-axis.
///
/// # Errors
///
/// Returns an error if the energy is not positive.
pub fn velocity_vec_spherical(ev: f64, theta: f64, phi: f64) -> Result<Vec<f64>> {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    velocity_vec(ev, &[sin_theta * cos_phi, sin_theta * sin_phi, cos_theta])
}

/// Velocity in the xz-plane at `angle` from the z-axis, pointing towards
/// negative z when `downward`.
///
/// The result is `(vr, vz)` or, when `three_dimensional`, `(vx, 0, vz)`.
///
/// # Errors
///
/// Returns an error if the energy is not positive.
pub fn velocity_vec_xz_plane(
    ev: f64,
    angle: f64,
    downward: bool,
    three_dimensional: bool,
) -> Result<Vec<f64>> {
    let sign = if downward { -1.0 } else { 1.0 };
    let (sin, cos) = angle.sin_cos();
    if three_dimensional {
        velocity_vec(ev, &[sin, 0.0, sign * cos])
    } else {
        velocity_vec(ev, &[sin, sign * cos])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn norm(v: &[f64]) -> f64 {
        v.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    #[test]
    fn speed_scales_with_square_root_of_energy() {
        let v = velocity_vec(100.0, &[0.0, 0.0, -3.0]).unwrap();
        assert_abs_diff_eq!(v[2], -5.930_969_604_919_433, epsilon = 1e-12);
        assert_eq!(v[0], 0.0);
        assert_abs_diff_eq!(
            norm(&velocity_vec(1.0, &[1.0, 1.0]).unwrap()),
            SPEED_PER_SQRT_EV,
            epsilon = 1e-15
        );
    }

    #[test]
    fn invalid_inputs() {
        assert!(velocity_vec(0.0, &[1.0, 0.0]).is_err());
        assert!(velocity_vec(-1.0, &[1.0, 0.0]).is_err());
        assert!(velocity_vec(f64::NAN, &[1.0, 0.0]).is_err());
        assert!(velocity_vec(10.0, &[0.0, 0.0]).is_err());
    }

    #[test]
    fn spherical_directions() {
        let v = velocity_vec_spherical(1.0, FRAC_PI_2, FRAC_PI_2).unwrap();
        assert_abs_diff_eq!(v[1], SPEED_PER_SQRT_EV, epsilon = 1e-15);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(v[2], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn xz_plane_orientation() {
        let down = velocity_vec_xz_plane(1.0, 0.0, true, false).unwrap();
        assert_eq!(down.len(), 2);
        assert_abs_diff_eq!(down[1], -SPEED_PER_SQRT_EV, epsilon = 1e-15);

        let up = velocity_vec_xz_plane(4.0, FRAC_PI_2 / 3.0, false, true).unwrap();
        assert_eq!(up.len(), 3);
        assert_abs_diff_eq!(up[0], SPEED_PER_SQRT_EV, epsilon = 1e-15);
        assert_eq!(up[1], 0.0);
        assert!(up[2] > 0.0);
    }
}
