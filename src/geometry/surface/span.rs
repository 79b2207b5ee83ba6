use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::geometry::Path;
use crate::math::{Point3, TOLERANCE};

use super::{Surface, SurfaceKind};

impl Surface {
    /// Creates the ruled surface between two paths.
    ///
    /// Both paths are traversed over the same `u` range, the longer of the two
    /// lengths. The `v` length is the mean of the distances between the
    /// starting points and between the endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the two paths coincide at both ends.
    pub fn spanned_by_paths(first: &Path, second: &Path) -> Result<Self> {
        let length_u = first.length().max(second.length());
        let start_gap = (first.starting_point() - second.starting_point()).norm();
        let end_gap = (first.endpoint() - second.endpoint()).norm();
        let length_v = (start_gap + end_gap) / 2.0;
        if length_v < TOLERANCE {
            return Err(GeometryError::NonPositiveLength {
                what: "spanned surface",
                value: length_v,
            }
            .into());
        }

        let breakpoints_u = rescale(first, length_u)
            .chain(rescale(second, length_u))
            .collect();
        Self::build(
            SurfaceKind::Spanned {
                first: Arc::new(first.clone()),
                second: Arc::new(second.clone()),
            },
            length_u,
            length_v,
            breakpoints_u,
            Vec::new(),
        )
    }

    /// Creates a Coons patch bounded by four paths.
    ///
    /// The paths must form a loop: `p1` runs along `v = 0`, `p2` along
    /// `u = max`, `p3` back along `v = max` and `p4` back along `u = 0`.
    /// Breakpoints of opposite sides are merged into the shared parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary paths do not meet end to start.
    pub fn from_boundary_paths(p1: &Path, p2: &Path, p3: &Path, p4: &Path) -> Result<Self> {
        let sides = [p1, p2, p3, p4];
        for (i, side) in sides.iter().enumerate() {
            let next = sides[(i + 1) % 4];
            let (end, start) = (side.endpoint(), next.starting_point());
            if !crate::math::points_close(&end, &start, crate::math::POINT_TOLERANCE) {
                return Err(GeometryError::EndpointMismatch { end, start }.into());
            }
        }

        let length_u = (p1.length() + p3.length()) / 2.0;
        let length_v = (p2.length() + p4.length()) / 2.0;
        let breakpoints_u = rescale(p1, length_u)
            .chain(rescale(p3, length_u).map(|b| length_u - b))
            .collect();
        let breakpoints_v = rescale(p2, length_v)
            .chain(rescale(p4, length_v).map(|b| length_v - b))
            .collect();

        Self::build(
            SurfaceKind::Coons(Arc::new([
                p1.clone(),
                p2.clone(),
                p3.clone(),
                p4.clone(),
            ])),
            length_u,
            length_v,
            breakpoints_u,
            breakpoints_v,
        )
    }
}

/// Breakpoints of `path` mapped onto a parameter range of `length`.
fn rescale(path: &Path, length: f64) -> impl Iterator<Item = f64> + '_ {
    path.breakpoints()
        .iter()
        .map(move |b| (b / path.length() * length).clamp(0.0, length))
}

pub(super) fn spanned_point(first: &Path, second: &Path, s: f64, t: f64) -> Point3 {
    let a = first.point_at(s * first.length());
    let b = second.point_at(s * second.length());
    Point3::from(a.coords * (1.0 - t) + b.coords * t)
}

pub(super) fn coons_point(sides: &[Path; 4], s: f64, t: f64) -> Point3 {
    let [p1, p2, p3, p4] = sides;
    let sum = p1.point_at(s * p1.length()).coords * (1.0 - t)
        + p4.point_at((1.0 - t) * p4.length()).coords * (1.0 - s)
        + p3.point_at((1.0 - s) * p3.length()).coords * t
        + p2.point_at(t * p2.length()).coords * s;
    Point3::from(sum / 2.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn ruled_surface_between_parallel_lines() {
        let bottom = Path::line(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        let top = Path::line(p(0.0, 1.0), p(1.0, 1.0))
            .unwrap()
            .line_to(p(2.0, 1.0))
            .unwrap();
        let surface = Surface::spanned_by_paths(&bottom, &top).unwrap();

        assert_abs_diff_eq!(surface.length_u(), 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(surface.length_v(), 1.0, epsilon = 1e-14);
        assert_eq!(surface.breakpoints_u(), &[1.0]);
        assert_abs_diff_eq!(surface.evaluate(1.5, 0.25).unwrap(), p(1.5, 0.25), epsilon = 1e-14);
    }

    #[test]
    fn identical_paths_do_not_span() {
        let line = Path::line(p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        assert!(Surface::spanned_by_paths(&line, &line).is_err());
    }

    #[test]
    fn coons_patch_of_unit_square() {
        let p1 = Path::line(p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        let p2 = Path::line(p(1.0, 0.0), p(1.0, 1.0)).unwrap();
        let p3 = Path::line(p(1.0, 1.0), p(0.0, 1.0)).unwrap();
        let p4 = Path::line(p(0.0, 1.0), p(0.0, 0.0)).unwrap();
        let patch = Surface::from_boundary_paths(&p1, &p2, &p3, &p4).unwrap();

        assert_abs_diff_eq!(patch.evaluate(0.0, 0.0).unwrap(), p(0.0, 0.0), epsilon = 1e-14);
        assert_abs_diff_eq!(patch.evaluate(0.5, 0.5).unwrap(), p(0.5, 0.5), epsilon = 1e-14);
        assert_abs_diff_eq!(patch.evaluate(1.0, 1.0).unwrap(), p(1.0, 1.0), epsilon = 1e-14);
        assert_abs_diff_eq!(patch.evaluate(0.25, 0.0).unwrap(), p(0.25, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn spanned_breakpoints_follow_each_path() {
        let first = Path::line(p(0.0, 0.0), p(1.0, 0.0))
            .unwrap()
            .line_to(p(2.0, 0.0))
            .unwrap();
        let second = Path::line(p(0.0, 1.0), p(1.0, 1.0))
            .unwrap()
            .line_to(p(4.0, 1.0))
            .unwrap();
        let surface = Surface::spanned_by_paths(&first, &second).unwrap();

        // halfway along the first path, a quarter along the second
        assert_abs_diff_eq!(surface.length_u(), 4.0, epsilon = 1e-14);
        assert_eq!(surface.breakpoints_u(), &[1.0, 2.0]);
        assert_abs_diff_eq!(surface.evaluate(2.0, 0.0).unwrap(), p(1.0, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn coons_breakpoints_of_returning_sides_are_mirrored() {
        let p1 = Path::line(p(0.0, 0.0), p(1.0, 0.0))
            .unwrap()
            .line_to(p(3.0, 0.0))
            .unwrap();
        let p2 = Path::line(p(3.0, 0.0), p(3.0, 2.0)).unwrap();
        let p3 = Path::line(p(3.0, 2.0), p(2.0, 2.0))
            .unwrap()
            .line_to(p(0.0, 2.0))
            .unwrap();
        let p4 = Path::line(p(0.0, 2.0), p(0.0, 0.5))
            .unwrap()
            .line_to(p(0.0, 0.0))
            .unwrap();
        let patch = Surface::from_boundary_paths(&p1, &p2, &p3, &p4).unwrap();

        assert_eq!(patch.breakpoints_u(), &[1.0, 2.0]);
        assert_eq!(patch.breakpoints_v(), &[0.5]);
        assert_abs_diff_eq!(patch.evaluate(2.0, 2.0).unwrap(), p(2.0, 2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(patch.evaluate(0.0, 0.5).unwrap(), p(0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn coons_patch_requires_loop() {
        let p1 = Path::line(p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        let p2 = Path::line(p(1.0, 0.0), p(1.0, 1.0)).unwrap();
        let p3 = Path::line(p(1.0, 1.0), p(0.0, 1.0)).unwrap();
        let p4 = Path::line(p(0.0, 1.0), p(0.0, 0.5)).unwrap();
        assert!(Surface::from_boundary_paths(&p1, &p2, &p3, &p4).is_err());
    }
}
