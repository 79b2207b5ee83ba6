use nalgebra::DVector;

use crate::field::Symmetry;

use super::Trajectory;

/// State where the trajectory crosses `state[coordinate] == value`.
///
/// Scans backwards for the last pair of consecutive states bracketing the
/// value and interpolates every component linearly between them. Returns
/// `None` if no pair brackets the value or `coordinate` is not a state
/// component.
#[must_use]
pub fn plane_intersection(
    trajectory: &Trajectory,
    coordinate: usize,
    value: f64,
) -> Option<DVector<f64>> {
    let states = trajectory.states();
    if states.first().is_none_or(|s| coordinate >= s.len()) {
        return None;
    }

    states.windows(2).rev().find_map(|pair| {
        let (before, after) = (&pair[0], &pair[1]);
        let (c1, c2) = (before[coordinate], after[coordinate]);
        if value < c1.min(c2) || value > c1.max(c2) {
            return None;
        }
        let ratio = if c1 == c2 { 0.0 } else { ((value - c1) / (c1 - c2)).abs() };
        Some(before + (after - before) * ratio)
    })
}

/// State where the trajectory crosses the plane perpendicular to the z-axis
/// at `z`.
#[must_use]
pub fn xy_plane_intersection(trajectory: &Trajectory, z: f64) -> Option<DVector<f64>> {
    plane_intersection(trajectory, trajectory.symmetry().dimensions() - 1, z)
}

/// Axial coordinate where a radially symmetric trajectory crosses the axis.
///
/// The crossing is the first sign change of `r` towards the sign the
/// trajectory ends with. Returns `None` for three-dimensional trajectories,
/// which generally never meet the axis exactly, and for trajectories that do
/// not cross it.
#[must_use]
pub fn axis_intersection(trajectory: &Trajectory) -> Option<f64> {
    if trajectory.symmetry() != Symmetry::Radial {
        return None;
    }
    let states = trajectory.states();
    let last = states.last()?;
    let sign = if last[0] <= 0.0 { -1.0 } else { 1.0 };

    states.windows(2).find_map(|pair| {
        let (before, after) = (&pair[0], &pair[1]);
        if before[0] * sign > 0.0 || after[0] * sign <= 0.0 {
            return None;
        }
        let ratio = before[0].abs() / (after[0] - before[0]).abs();
        Some(before[1] + ratio * (after[1] - before[1]))
    })
}
