use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{MeshError, Result};
use crate::geometry::Path;

use super::{dedup_points, discretize, LineElement, Mesh, MeshParams};

/// Discretizes a path into line elements.
pub struct MeshPath {
    params: MeshParams,
}

impl MeshPath {
    /// Creates a new `MeshPath` operation.
    #[must_use]
    pub fn new(params: MeshParams) -> Self {
        Self { params }
    }

    /// Executes the discretization.
    ///
    /// Consecutive samples form linear elements. With higher-order elements
    /// every element spans four consecutive samples, stored as
    /// `[first, last, second, third]`. A named path puts all its elements in
    /// the group of that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh size is invalid.
    pub fn execute(&self, path: &Path) -> Result<Mesh> {
        let multiplier = if self.params.higher_order { 3 } else { 1 };
        let samples = discretize(path.length(), path.breakpoints(), self.params.size, multiplier)?;
        let n = samples.len();

        let elements: Vec<LineElement> = if self.params.higher_order {
            if n % 3 != 1 {
                return Err(MeshError::HigherOrderLayout { samples: n }.into());
            }
            (0..n - 1)
                .step_by(3)
                .map(|i| LineElement::Cubic([i, i + 3, i + 1, i + 2]))
                .collect()
        } else {
            (0..n - 1).map(|i| LineElement::Linear([i, i + 1])).collect()
        };

        let (points, map) = dedup_points(samples.iter().map(|&s| path.point_at(s)).collect());
        let lines: Vec<LineElement> = elements
            .into_iter()
            .map(|e| e.remap(&map))
            .filter(|e| {
                let [a, b] = e.endpoints();
                a != b
            })
            .collect();

        let mut line_groups = BTreeMap::new();
        if let Some(name) = path.name() {
            line_groups.insert(name.to_owned(), (0..lines.len()).collect());
        }
        debug!(
            points = points.len(),
            elements = lines.len(),
            name = path.name(),
            "meshed path"
        );

        Ok(Mesh {
            points,
            lines,
            line_groups,
            ..Mesh::default()
        })
    }
}
