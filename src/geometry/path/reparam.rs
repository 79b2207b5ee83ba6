use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use crate::error::{EopticError, GeometryError, Result};
use crate::math::{CubicSpline, Point3, SplineCurve3};

/// A curve given over the unit interval whose speed is not uniform.
#[derive(Clone)]
pub(crate) enum IrregularSource {
    /// User-supplied mapping `[0, 1] -> point`.
    Function(Arc<dyn Fn(f64) -> Point3 + Send + Sync>),
    /// Axis-aligned ellipse in the XY plane starting on the positive x-axis.
    Ellipse { major: f64, minor: f64 },
    /// Cubic spline through points at uniformly spaced parameters.
    Spline(SplineCurve3),
}

impl IrregularSource {
    fn point(&self, u: f64) -> Point3 {
        match self {
            Self::Function(f) => f(u),
            Self::Ellipse { major, minor } => {
                Point3::new(major * (TAU * u).cos(), minor * (TAU * u).sin(), 0.0)
            }
            Self::Spline(curve) => curve.evaluate(u),
        }
    }
}

impl fmt::Debug for IrregularSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Ellipse { major, minor } => f
                .debug_struct("Ellipse")
                .field("major", major)
                .field("minor", minor)
                .finish(),
            Self::Spline(curve) => f.debug_tuple("Spline").field(curve).finish(),
        }
    }
}

/// An irregular curve re-parametrized by arc length.
///
/// The curve is sampled at `n` uniform parameters, a spline through the samples
/// gives the local speed, and the integral of a spline through the speeds gives
/// the arc length at every sample. Inverting that table with another spline
/// maps arc length back to the unit parameter.
#[derive(Debug, Clone)]
pub(crate) struct Reparametrized {
    source: IrregularSource,
    /// Arc length to unit parameter.
    inverse: CubicSpline,
    /// Unit parameter to arc length.
    forward: CubicSpline,
}

impl Reparametrized {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(source: IrregularSource, samples: usize) -> Result<Self> {
        if samples < 3 {
            return Err(GeometryError::InvalidInput(format!(
                "arc-length re-parametrization needs at least 3 samples, got {samples}"
            ))
            .into());
        }

        let last = (samples - 1) as f64;
        let us: Vec<f64> = (0..samples).map(|i| i as f64 / last).collect();
        let points: Vec<Point3> = us.iter().map(|&u| source.point(u)).collect();

        let curve = SplineCurve3::new(&us, &points)?;
        let speeds: Vec<f64> = us.iter().map(|&u| curve.derivative(u).norm()).collect();
        let lengths = CubicSpline::new(us.clone(), speeds)?.cumulative_integral();

        let inverse = CubicSpline::new(lengths.clone(), us.clone()).map_err(|e| match e {
            EopticError::Geometry(GeometryError::Degenerate(_)) => GeometryError::Degenerate(
                "curve speed vanishes, arc length is not strictly increasing".into(),
            )
            .into(),
            other => other,
        })?;
        let forward = CubicSpline::new(us, lengths)?;

        Ok(Self {
            source,
            inverse,
            forward,
        })
    }

    /// Total arc length of the curve.
    pub(crate) fn length(&self) -> f64 {
        self.inverse.knots().last().copied().unwrap_or_default()
    }

    /// Arc length travelled up to unit parameter `u`.
    pub(crate) fn arc_length_at(&self, u: f64) -> f64 {
        self.forward.evaluate(u)
    }

    pub(crate) fn point_at(&self, s: f64) -> Point3 {
        self.source.point(self.inverse.evaluate(s).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn straight_line_with_quadratic_speed() {
        // u -> (u^2, 0, 0) covers [0, 1] with speed 2u
        let source = IrregularSource::Function(Arc::new(|u| Point3::new(u * u, 0.0, 0.0)));
        let curve = Reparametrized::new(source, 200).unwrap();

        assert_abs_diff_eq!(curve.length(), 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(curve.point_at(0.5).x, 0.5, epsilon = 1e-3);
        assert_eq!(curve.point_at(curve.length()), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn constant_curve_is_degenerate() {
        let source = IrregularSource::Function(Arc::new(|_| Point3::new(1.0, 2.0, 3.0)));
        assert!(Reparametrized::new(source, 10).is_err());
    }

    #[test]
    fn too_few_samples() {
        let source = IrregularSource::Ellipse {
            major: 2.0,
            minor: 1.0,
        };
        assert!(Reparametrized::new(source, 2).is_err());
    }
}
