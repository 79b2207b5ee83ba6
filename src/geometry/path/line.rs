use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};

/// A straight segment parametrized by the distance travelled from `from`.
///
/// The parametric form is: `P(s) = (1 - s / L) * from + (s / L) * to`, which
/// reproduces both endpoints exactly.
#[derive(Debug, Clone)]
pub struct LineSegment {
    from: Point3,
    to: Point3,
    length: f64,
}

impl LineSegment {
    /// Creates a new segment between two points.
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide.
    pub fn new(from: Point3, to: Point3) -> Result<Self> {
        let length = (to - from).norm();
        if length < TOLERANCE {
            return Err(GeometryError::NonPositiveLength {
                what: "line",
                value: length,
            }
            .into());
        }
        Ok(Self { from, to, length })
    }

    /// Returns the starting point.
    #[must_use]
    pub fn from(&self) -> &Point3 {
        &self.from
    }

    /// Returns the endpoint.
    #[must_use]
    pub fn to(&self) -> &Point3 {
        &self.to
    }

    /// Returns the Euclidean length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    pub(crate) fn point_at(&self, s: f64) -> Point3 {
        let t = s / self.length;
        Point3::from(self.from.coords * (1.0 - t) + self.to.coords * t)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn length_3_4_5() {
        let line = LineSegment::new(Point3::origin(), Point3::new(3.0, 4.0, 0.0)).unwrap();
        assert!((line.length() - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn endpoints_are_exact() {
        let from = Point3::new(0.1, 0.2, 0.3);
        let to = Point3::new(-1.7, 2.9, 0.4);
        let line = LineSegment::new(from, to).unwrap();
        assert_eq!(line.point_at(0.0), from);
        assert_eq!(line.point_at(line.length()), to);
    }

    #[test]
    fn midpoint() {
        let line = LineSegment::new(Point3::origin(), Point3::new(2.0, 0.0, 0.0)).unwrap();
        assert!((line.point_at(1.0) - Point3::new(1.0, 0.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn coincident_points_rejected() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(LineSegment::new(p, p).is_err());
    }
}
