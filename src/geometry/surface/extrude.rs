use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::geometry::Path;
use crate::math::{Vector3, TOLERANCE};

use super::{Surface, SurfaceKind};

impl Path {
    /// Extrudes the path along `vector`, which gives both the direction and
    /// the length of the extrusion.
    ///
    /// # Errors
    ///
    /// Returns an error if `vector` is zero-length.
    pub fn extrude(&self, vector: &Vector3) -> Result<Surface> {
        let length = vector.norm();
        if length < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let mut surface = Surface::build(
            SurfaceKind::Extruded {
                path: Arc::new(self.clone()),
                direction: vector / length,
            },
            self.length(),
            length,
            self.breakpoints().to_vec(),
            Vec::new(),
        )?;
        surface.name = self.name().map(str::to_owned);
        Ok(surface)
    }

    /// Sweeps the path along `along`.
    ///
    /// `along` does not have to start on this path: the surface point at
    /// `(u, v)` is `self(u) + along(v) - along(0)`. Breakpoints of both paths
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be built from the two paths.
    pub fn extrude_by_path(&self, along: &Path) -> Result<Surface> {
        let mut surface = Surface::build(
            SurfaceKind::ExtrudedByPath {
                path: Arc::new(self.clone()),
                along: Arc::new(along.clone()),
            },
            self.length(),
            along.length(),
            self.breakpoints().to_vec(),
            along.breakpoints().to_vec(),
        )?;
        surface.name = self.name().map(str::to_owned);
        Ok(surface)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use approx::assert_abs_diff_eq;

    #[test]
    fn extrusion_translates_path() {
        let line = Path::line(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let surface = line.extrude(&Vector3::new(0.0, 0.0, 2.0)).unwrap();

        assert_abs_diff_eq!(surface.length_v(), 2.0, epsilon = 1e-14);
        let p = surface.evaluate(0.5, 1.0).unwrap();
        assert_abs_diff_eq!(p, Point3::new(0.5, 0.0, 1.0), epsilon = 1e-14);
        assert!(line.extrude(&Vector3::zeros()).is_err());
    }

    #[test]
    fn extrusion_by_path_is_anchored_at_its_start() {
        let profile = Path::line(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let along = Path::line(Point3::new(5.0, 5.0, 0.0), Point3::new(5.0, 5.0, 1.0))
            .unwrap()
            .line_to(Point3::new(5.0, 6.0, 1.0))
            .unwrap();
        let surface = profile.extrude_by_path(&along).unwrap();

        assert_eq!(surface.breakpoints_v(), &[1.0]);
        assert_abs_diff_eq!(
            surface.evaluate(1.0, 2.0).unwrap(),
            Point3::new(1.0, 1.0, 1.0),
            epsilon = 1e-14
        );
    }
}
