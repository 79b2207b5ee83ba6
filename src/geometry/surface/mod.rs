mod extrude;
mod revolve;
mod span;

pub use revolve::Axis;

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::path::Path;
use super::transform::PointMap;

#[derive(Debug, Clone)]
enum SurfaceKind {
    Revolved {
        path: Arc<Path>,
        axis: Axis,
        angle: f64,
    },
    Extruded {
        path: Arc<Path>,
        direction: Vector3,
    },
    ExtrudedByPath {
        path: Arc<Path>,
        along: Arc<Path>,
    },
    Spanned {
        first: Arc<Path>,
        second: Arc<Path>,
    },
    Coons(Arc<[Path; 4]>),
    Sphere {
        radius: f64,
    },
    /// A rectangular part of `inner` starting at `(u0, v0)`.
    Section {
        inner: Arc<Surface>,
        u0: f64,
        v0: f64,
    },
    Mapped {
        inner: Arc<Surface>,
        map: PointMap,
    },
}

/// A surface in 3D space parametrized by two lengths `u` in `[0, length_u]`
/// and `v` in `[0, length_v]`.
///
/// Each parameter carries its own set of breakpoints, which become grid lines
/// of the mesh.
#[derive(Debug, Clone)]
pub struct Surface {
    kind: SurfaceKind,
    length_u: f64,
    length_v: f64,
    breakpoints_u: Vec<f64>,
    breakpoints_v: Vec<f64>,
    name: Option<String>,
}

fn checked_breakpoints(mut breakpoints: Vec<f64>, length: f64) -> Result<Vec<f64>> {
    if let Some(&b) = breakpoints.iter().find(|&&b| !(b >= 0.0 && b <= length)) {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "breakpoint",
            value: b,
            min: 0.0,
            max: length,
        }
        .into());
    }
    breakpoints.sort_by(f64::total_cmp);
    breakpoints.dedup();
    Ok(breakpoints)
}

impl Surface {
    fn build(
        kind: SurfaceKind,
        length_u: f64,
        length_v: f64,
        breakpoints_u: Vec<f64>,
        breakpoints_v: Vec<f64>,
    ) -> Result<Self> {
        for length in [length_u, length_v] {
            if !(length > 0.0 && length.is_finite()) {
                return Err(GeometryError::NonPositiveLength {
                    what: "surface",
                    value: length,
                }
                .into());
            }
        }
        Ok(Self {
            kind,
            length_u,
            length_v,
            breakpoints_u: checked_breakpoints(breakpoints_u, length_u)?,
            breakpoints_v: checked_breakpoints(breakpoints_v, length_v)?,
            name: None,
        })
    }

    /// Creates a sphere of `radius` centered at the origin.
    ///
    /// `u` runs along the azimuth over `2πr`, `v` from the north pole to the
    /// south pole over `πr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn sphere(radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("sphere radius must be positive".into()).into());
        }
        Self::build(
            SurfaceKind::Sphere { radius },
            TAU * radius,
            PI * radius,
            Vec::new(),
            Vec::new(),
        )
    }

    fn disk(radius: f64, rim: Point3, axis: Axis) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("disk radius must be positive".into()).into());
        }
        Path::line(Point3::origin(), rim)?.revolve(axis, TAU)
    }

    /// Creates a disk in the XY plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn disk_xy(x0: f64, y0: f64, radius: f64) -> Result<Self> {
        Ok(Self::disk(radius, Point3::new(radius, 0.0, 0.0), Axis::Z)?.move_by(x0, y0, 0.0))
    }

    /// Creates a disk in the XZ plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn disk_xz(x0: f64, z0: f64, radius: f64) -> Result<Self> {
        Ok(Self::disk(radius, Point3::new(radius, 0.0, 0.0), Axis::Y)?.move_by(x0, 0.0, z0))
    }

    /// Creates a disk in the YZ plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn disk_yz(y0: f64, z0: f64, radius: f64) -> Result<Self> {
        Ok(Self::disk(radius, Point3::new(0.0, radius, 0.0), Axis::X)?.move_by(0.0, y0, z0))
    }

    /// Creates a rectangle in the XY plane with a corner at `(xmin, ymin, 0)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is degenerate.
    pub fn rectangle_xy(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        Path::line(Point3::new(xmin, ymin, 0.0), Point3::new(xmin, ymax, 0.0))?
            .extrude(&Vector3::new(xmax - xmin, 0.0, 0.0))
    }

    /// Creates a rectangle in the XZ plane with a corner at `(xmin, 0, zmin)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is degenerate.
    pub fn rectangle_xz(xmin: f64, xmax: f64, zmin: f64, zmax: f64) -> Result<Self> {
        Path::line(Point3::new(xmin, 0.0, zmin), Point3::new(xmin, 0.0, zmax))?
            .extrude(&Vector3::new(xmax - xmin, 0.0, 0.0))
    }

    /// Creates a rectangle in the YZ plane with a corner at `(0, ymin, zmin)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is degenerate.
    pub fn rectangle_yz(ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Result<Self> {
        Path::line(Point3::new(0.0, ymin, zmin), Point3::new(0.0, ymin, zmax))?
            .extrude(&Vector3::new(0.0, ymax - ymin, 0.0))
    }

    /// Creates a plate of thickness `height` with a round hole of `radius`,
    /// extending to `extent` and centered at `z`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is degenerate.
    pub fn aperture(height: f64, radius: f64, extent: f64, z: f64) -> Result<Self> {
        Path::aperture(height, radius, extent, z)?.revolve_z(TAU)
    }

    /// Length of the `u` parameter range.
    #[must_use]
    pub fn length_u(&self) -> f64 {
        self.length_u
    }

    /// Length of the `v` parameter range.
    #[must_use]
    pub fn length_v(&self) -> f64 {
        self.length_v
    }

    /// Sorted breakpoints along `u`.
    #[must_use]
    pub fn breakpoints_u(&self) -> &[f64] {
        &self.breakpoints_u
    }

    /// Sorted breakpoints along `v`.
    #[must_use]
    pub fn breakpoints_v(&self) -> &[f64] {
        &self.breakpoints_v
    }

    /// Element-group name of the surface, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns a copy of the surface tagged with an element-group name.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    /// Evaluates the surface at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either parameter lies outside its range.
    pub fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        for (parameter, value, max) in [("u", u, self.length_u), ("v", v, self.length_v)] {
            let slack = TOLERANCE * max.max(1.0);
            if !(value >= -slack && value <= max + slack) {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter,
                    value,
                    min: 0.0,
                    max,
                }
                .into());
            }
        }
        Ok(self.point_at(u.clamp(0.0, self.length_u), v.clamp(0.0, self.length_v)))
    }

    pub(crate) fn point_at(&self, u: f64, v: f64) -> Point3 {
        match &self.kind {
            SurfaceKind::Revolved { path, axis, angle } => {
                revolve::revolved_point(path, *axis, *angle, self.length_v, u, v)
            }
            SurfaceKind::Extruded { path, direction } => path.point_at(u) + direction * v,
            SurfaceKind::ExtrudedByPath { path, along } => {
                path.point_at(u) + (along.point_at(v) - along.starting_point())
            }
            SurfaceKind::Spanned { first, second } => {
                span::spanned_point(first, second, u / self.length_u, v / self.length_v)
            }
            SurfaceKind::Coons(sides) => {
                span::coons_point(sides, u / self.length_u, v / self.length_v)
            }
            SurfaceKind::Sphere { radius } => {
                let phi = u / radius;
                let theta = v / radius;
                Point3::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.sin() * phi.sin(),
                    radius * theta.cos(),
                )
            }
            SurfaceKind::Section { inner, u0, v0 } => inner.point_at(
                (u0 + u).min(inner.length_u),
                (v0 + v).min(inner.length_v),
            ),
            SurfaceKind::Mapped { inner, map } => map.apply(&inner.point_at(u, v)),
        }
    }

    /// Splits the surface along its breakpoints into sub-surfaces without
    /// breakpoints, ordered by `u` section first.
    #[must_use]
    pub fn sections(&self) -> Vec<Surface> {
        let edges = |breakpoints: &[f64], length: f64| -> Vec<f64> {
            std::iter::once(0.0)
                .chain(breakpoints.iter().copied())
                .chain(std::iter::once(length))
                .collect()
        };
        let edges_u = edges(&self.breakpoints_u, self.length_u);
        let edges_v = edges(&self.breakpoints_v, self.length_v);
        let inner = Arc::new(self.clone());

        let mut sections = Vec::new();
        for u in edges_u.windows(2) {
            for v in edges_v.windows(2) {
                let (length_u, length_v) = (u[1] - u[0], v[1] - v[0]);
                if length_u <= 0.0 || length_v <= 0.0 {
                    continue;
                }
                sections.push(Surface {
                    kind: SurfaceKind::Section {
                        inner: Arc::clone(&inner),
                        u0: u[0],
                        v0: v[0],
                    },
                    length_u,
                    length_v,
                    breakpoints_u: Vec::new(),
                    breakpoints_v: Vec::new(),
                    name: self.name.clone(),
                });
            }
        }
        sections
    }

    /// Applies a point mapping to every point of the surface.
    #[must_use]
    pub fn transform(&self, map: &PointMap) -> Surface {
        let kind = match &self.kind {
            SurfaceKind::Mapped { inner, map: first } => SurfaceKind::Mapped {
                inner: Arc::clone(inner),
                map: first.then(map),
            },
            _ => SurfaceKind::Mapped {
                inner: Arc::new(self.clone()),
                map: map.clone(),
            },
        };
        Self {
            kind,
            ..self.clone()
        }
    }

    /// Maps every point of the surface through `f`.
    #[must_use]
    pub fn map_points<F>(&self, f: F) -> Surface
    where
        F: Fn(&Point3) -> Point3 + Send + Sync + 'static,
    {
        self.transform(&PointMap::custom(f))
    }

    /// Translates the surface.
    #[must_use]
    pub fn move_by(&self, dx: f64, dy: f64, dz: f64) -> Surface {
        self.transform(&PointMap::translation(dx, dy, dz))
    }

    /// Rotates the surface by `angle` radians around the axis through `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis` is zero-length.
    pub fn rotate(&self, axis: &Vector3, angle: f64, origin: &Point3) -> Result<Surface> {
        Ok(self.transform(&PointMap::rotation(axis, angle, origin)?))
    }

    /// Mirrors the surface in the plane through `origin` with the given `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if `normal` is zero-length.
    pub fn mirror(&self, normal: &Vector3, origin: &Point3) -> Result<Surface> {
        Ok(self.transform(&PointMap::mirror(normal, origin)?))
    }
}
