use std::f64::consts::TAU;
use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::geometry::Path;
use crate::math::{Point3, TOLERANCE};

use super::{Surface, SurfaceKind};

/// Principal axis used for revolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Indices of the two coordinates spanning the plane perpendicular to the
    /// axis, in the order that makes the rotation anti-clockwise.
    fn plane(self) -> (usize, usize) {
        match self {
            Self::X => (1, 2),
            Self::Y => (0, 2),
            Self::Z => (0, 1),
        }
    }

    /// Distance from `p` to the axis.
    #[must_use]
    pub fn radius(self, p: &Point3) -> f64 {
        let (a, b) = self.plane();
        p[a].hypot(p[b])
    }

    /// Rotates `p` anti-clockwise around the axis by `angle` radians.
    #[must_use]
    pub fn rotate(self, p: &Point3, angle: f64) -> Point3 {
        let (a, b) = self.plane();
        let r = p[a].hypot(p[b]);
        let theta = p[b].atan2(p[a]) + angle;
        let mut out = *p;
        out[a] = r * theta.cos();
        out[b] = r * theta.sin();
        out
    }
}

impl Path {
    /// Revolves the path anti-clockwise around `axis` by `angle` radians.
    ///
    /// The second surface parameter runs over `2π` times the average distance
    /// of the path to the axis, regardless of `angle`. This keeps element
    /// sizes along the revolution comparable to those along the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the angle vanishes or the path lies on the axis.
    pub fn revolve(&self, axis: Axis, angle: f64) -> Result<Surface> {
        if angle.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("revolution angle must be nonzero".into()).into());
        }
        let average_radius = self.average(|p| axis.radius(p)).map_err(|_| {
            GeometryError::Degenerate("path to revolve does not evaluate to finite points".into())
        })?;
        let length_v = TAU * average_radius;
        if length_v < TOLERANCE {
            return Err(GeometryError::NonPositiveLength {
                what: "revolution",
                value: length_v,
            }
            .into());
        }

        let mut surface = Surface::build(
            SurfaceKind::Revolved {
                path: Arc::new(self.clone()),
                axis,
                angle,
            },
            self.length(),
            length_v,
            self.breakpoints().to_vec(),
            Vec::new(),
        )?;
        surface.name = self.name().map(str::to_owned);
        Ok(surface)
    }

    /// Revolves the path around the x-axis.
    ///
    /// # Errors
    ///
    /// See [`Path::revolve`].
    pub fn revolve_x(&self, angle: f64) -> Result<Surface> {
        self.revolve(Axis::X, angle)
    }

    /// Revolves the path around the y-axis.
    ///
    /// # Errors
    ///
    /// See [`Path::revolve`].
    pub fn revolve_y(&self, angle: f64) -> Result<Surface> {
        self.revolve(Axis::Y, angle)
    }

    /// Revolves the path around the z-axis.
    ///
    /// # Errors
    ///
    /// See [`Path::revolve`].
    pub fn revolve_z(&self, angle: f64) -> Result<Surface> {
        self.revolve(Axis::Z, angle)
    }
}

pub(super) fn revolved_point(
    path: &Path,
    axis: Axis,
    angle: f64,
    length_v: f64,
    u: f64,
    v: f64,
) -> Point3 {
    axis.rotate(&path.point_at(u), v / length_v * angle)
}
