use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// A circular arc in 3D space, parametrized by arc length.
///
/// Defined by a center, radius, an orthonormal in-plane basis and a signed
/// sweep angle. The point at arc length `s` lies at angle
/// `theta = s / length * sweep` measured from `x_unit` towards `y_unit`.
#[derive(Debug, Clone)]
pub struct CircularArc {
    center: Point3,
    radius: f64,
    x_unit: Vector3,
    y_unit: Vector3,
    sweep: f64,
}

impl CircularArc {
    /// Creates an arc around `center` from `start` towards `end`.
    ///
    /// The in-plane basis is `x_unit` pointing at `start` and `y_unit` the part
    /// of `end - center` orthogonal to it. The sweep is the angle of `end` in
    /// that basis; with `reverse` the arc goes the other way round.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` coincides with `center` or if `end` lies on
    /// the line through `center` and `start`, which leaves the plane undefined.
    pub fn through(center: Point3, start: Point3, end: Point3, reverse: bool) -> Result<Self> {
        let to_start = start - center;
        let radius = to_start.norm();
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        let x_unit = to_start / radius;

        let vector = end - center;
        let y_dir = vector - vector.dot(&x_unit) * x_unit;
        let y_len = y_dir.norm();
        if y_len < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "arc end point is collinear with center and start".into(),
            )
            .into());
        }
        let y_unit = y_dir / y_len;

        let mut sweep = vector.dot(&y_unit).atan2(vector.dot(&x_unit));
        if reverse {
            sweep -= TAU;
        }

        Ok(Self {
            center,
            radius,
            x_unit,
            y_unit,
            sweep,
        })
    }

    /// Creates an arc of `radius` in the plane spanned by the orthonormal pair
    /// `x_unit`, `y_unit`, starting on `x_unit` and sweeping `angle` radians.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or the angle is not positive.
    pub fn in_plane(
        center: Point3,
        radius: f64,
        x_unit: Vector3,
        y_unit: Vector3,
        angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        if angle.abs() < TOLERANCE {
            return Err(GeometryError::NonPositiveLength {
                what: "arc",
                value: angle * radius,
            }
            .into());
        }
        Ok(Self {
            center,
            radius,
            x_unit,
            y_unit,
            sweep: angle,
        })
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the signed sweep angle in radians.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Returns the arc length, `|sweep| * radius`.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.sweep.abs() * self.radius
    }

    pub(crate) fn point_at(&self, s: f64) -> Point3 {
        let theta = s / self.length() * self.sweep;
        self.center
            + self.x_unit * (self.radius * theta.cos())
            + self.y_unit * (self.radius * theta.sin())
    }
}
