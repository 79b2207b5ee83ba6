use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{MeshError, Result};
use crate::geometry::Surface;

use super::{dedup_points, discretize, Mesh, MeshParams, MeshSize};

/// Discretizes a surface into triangles on its `(u, v)` grid.
pub struct MeshSurface {
    params: MeshParams,
}

impl MeshSurface {
    /// Creates a new `MeshSurface` operation.
    #[must_use]
    pub fn new(params: MeshParams) -> Self {
        Self { params }
    }

    /// Element size used for `surface`.
    ///
    /// A factor is turned into an absolute size of a quarter of the shorter
    /// parameter range, divided by the square root of the factor.
    fn element_size(&self, surface: &Surface) -> Result<f64> {
        match self.params.size.validate()? {
            MeshSize::Absolute(size) => Ok(size),
            MeshSize::Factor(factor) => {
                Ok(surface.length_u().min(surface.length_v()) / 4.0 / factor.sqrt())
            }
        }
    }

    /// Executes the discretization.
    ///
    /// Both parameters are sampled like a path, and every grid cell is split
    /// into two triangles. Points shared after evaluation (seams of closed
    /// surfaces, collapsed poles) are merged and triangles that collapse are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh size is invalid or higher-order elements
    /// are requested.
    pub fn execute(&self, surface: &Surface) -> Result<Mesh> {
        if self.params.higher_order {
            return Err(MeshError::Unsupported(
                "higher-order elements are only available for paths".into(),
            )
            .into());
        }
        let size = MeshSize::Absolute(self.element_size(surface)?);
        let us = discretize(surface.length_u(), surface.breakpoints_u(), size, 1)?;
        let vs = discretize(surface.length_v(), surface.breakpoints_v(), size, 1)?;
        let (nu, nv) = (us.len(), vs.len());

        let grid = us
            .iter()
            .flat_map(|&u| vs.iter().map(move |&v| surface.point_at(u, v)))
            .collect();
        let (points, map) = dedup_points(grid);
        let at = |i: usize, j: usize| map[i * nv + j];

        let mut triangles = Vec::with_capacity(2 * (nu - 1) * (nv - 1));
        for i in 0..nu - 1 {
            for j in 0..nv - 1 {
                triangles.push([at(i, j), at(i + 1, j), at(i + 1, j + 1)]);
                triangles.push([at(i, j), at(i + 1, j + 1), at(i, j + 1)]);
            }
        }
        triangles.retain(|[a, b, c]| a != b && b != c && a != c);

        let mut triangle_groups = BTreeMap::new();
        if let Some(name) = surface.name() {
            triangle_groups.insert(name.to_owned(), (0..triangles.len()).collect());
        }
        debug!(
            points = points.len(),
            triangles = triangles.len(),
            name = surface.name(),
            "meshed surface"
        );

        Ok(Mesh {
            points,
            triangles,
            triangle_groups,
            ..Mesh::default()
        })
    }
}
