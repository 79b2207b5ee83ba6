//! Runge–Kutta–Fehlberg 4(5) stepping of the equations of motion
//! `x' = v, v' = a(x, v)` with Fehlberg's coefficients.

use crate::field::Field;
use crate::math::{Point3, Vector3};

/// Position followed by velocity.
pub(crate) type State = [f64; 6];

const B2: [f64; 1] = [2.0 / 9.0];
const B3: [f64; 2] = [1.0 / 12.0, 1.0 / 4.0];
const B4: [f64; 3] = [69.0 / 128.0, -243.0 / 128.0, 135.0 / 64.0];
const B5: [f64; 4] = [-17.0 / 12.0, 27.0 / 4.0, -27.0 / 5.0, 16.0 / 15.0];
const B6: [f64; 5] = [65.0 / 432.0, -5.0 / 16.0, 13.0 / 16.0, 4.0 / 27.0, 5.0 / 144.0];

/// Weights of the fifth-order solution.
const CH: [f64; 6] = [47.0 / 450.0, 0.0, 12.0 / 25.0, 32.0 / 225.0, 1.0 / 30.0, 6.0 / 25.0];
/// Difference between the fourth- and fifth-order weights.
const CT: [f64; 6] = [-1.0 / 150.0, 0.0, 3.0 / 100.0, -16.0 / 75.0, -1.0 / 20.0, 6.0 / 25.0];

/// Safety factor applied to the step size estimate.
const SAFETY: f64 = 0.9;
/// Shrink factor after a step that produced a non-finite error.
const MAX_SHRINK: f64 = 0.1;

/// Result of one attempted step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepAttempt {
    /// Change of the state when the step is accepted.
    pub increment: State,
    /// Largest absolute component of the local error estimate.
    pub error: f64,
}

/// `h` times the time derivative of `y`.
fn scaled_derivative<F: Field + ?Sized>(field: &F, y: &State, h: f64) -> State {
    let position = Point3::new(y[0], y[1], y[2]);
    let velocity = Vector3::new(y[3], y[4], y[5]);
    let a = field.acceleration(&position, &velocity);
    [
        h * y[3],
        h * y[4],
        h * y[5],
        h * a.x,
        h * a.y,
        h * a.z,
    ]
}

/// Attempts a step of size `h` from `y`.
pub(crate) fn attempt<F: Field + ?Sized>(field: &F, y: &State, h: f64) -> StepAttempt {
    let stages: [&[f64]; 6] = [&[], &B2, &B3, &B4, &B5, &B6];
    let mut k = [[0.0; 6]; 6];

    for (index, coefficients) in stages.iter().enumerate() {
        let mut stage = *y;
        for (j, c) in coefficients.iter().enumerate() {
            for (s, kj) in stage.iter_mut().zip(&k[j]) {
                *s += c * kj;
            }
        }
        k[index] = scaled_derivative(field, &stage, h);
    }

    let combine = |weights: &[f64; 6]| -> State {
        std::array::from_fn(|i| weights.iter().zip(&k).map(|(w, kj)| w * kj[i]).sum())
    };
    let deviation = combine(&CT);
    let error = if deviation.iter().any(|e| e.is_nan()) {
        f64::NAN
    } else {
        deviation.iter().fold(0.0_f64, |max, e| max.max(e.abs()))
    };

    StepAttempt {
        increment: combine(&CH),
        error,
    }
}

/// Step size to try after a step of size `h` produced `error`.
pub(crate) fn next_step_size(h: f64, error: f64, atol: f64, h_max: f64) -> f64 {
    if !error.is_finite() {
        return MAX_SHRINK * h;
    }
    if error == 0.0 {
        return h_max;
    }
    (SAFETY * h * (atol / error).powf(0.2)).min(h_max)
}
