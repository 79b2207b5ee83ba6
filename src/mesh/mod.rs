mod discretize;
mod mesh_path;
mod mesh_surface;

pub use discretize::discretize;
pub use mesh_path::MeshPath;
pub use mesh_surface::MeshSurface;

use std::collections::{BTreeMap, HashMap};
use std::iter::Sum;
use std::ops::Add;

use crate::error::{MeshError, Result};
use crate::geometry::{Path, PathCollection, Surface, SurfaceCollection};
use crate::math::Point3;

/// How finely geometry is divided into elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshSize {
    /// Target element length in model units.
    Absolute(f64),
    /// Scale-free refinement factor; larger values give more elements.
    Factor(f64),
}

impl MeshSize {
    pub(crate) fn validate(self) -> Result<Self> {
        let value = match self {
            Self::Absolute(v) | Self::Factor(v) => v,
        };
        if value > 0.0 && value.is_finite() {
            Ok(self)
        } else {
            Err(MeshError::InvalidMeshSize(value).into())
        }
    }
}

/// Parameters controlling discretization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    /// Element size or refinement factor.
    pub size: MeshSize,
    /// Emit curved line elements with two interior nodes each.
    pub higher_order: bool,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            size: MeshSize::Factor(1.0),
            higher_order: false,
        }
    }
}

impl MeshParams {
    /// Parameters with an absolute element size.
    #[must_use]
    pub fn with_size(size: f64) -> Self {
        Self {
            size: MeshSize::Absolute(size),
            ..Self::default()
        }
    }

    /// Parameters with a refinement factor.
    #[must_use]
    pub fn with_factor(factor: f64) -> Self {
        Self {
            size: MeshSize::Factor(factor),
            ..Self::default()
        }
    }

    /// Returns a copy with higher-order line elements switched on or off.
    #[must_use]
    pub fn higher_order(self, higher_order: bool) -> Self {
        Self {
            higher_order,
            ..self
        }
    }
}

/// A line element referencing mesh points by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineElement {
    /// Straight element between two points.
    Linear([usize; 2]),
    /// Curved element: two endpoints followed by two interior points in
    /// order of increasing parameter.
    Cubic([usize; 4]),
}

impl LineElement {
    /// Point indices of the element.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::Linear(ix) => ix.as_slice(),
            Self::Cubic(ix) => ix.as_slice(),
        }
    }

    /// The two endpoint indices.
    #[must_use]
    pub fn endpoints(&self) -> [usize; 2] {
        match *self {
            Self::Linear([a, b]) | Self::Cubic([a, b, _, _]) => [a, b],
        }
    }

    fn offset(self, by: usize) -> Self {
        match self {
            Self::Linear(ix) => Self::Linear(ix.map(|i| i + by)),
            Self::Cubic(ix) => Self::Cubic(ix.map(|i| i + by)),
        }
    }

    fn remap(self, map: &[usize]) -> Self {
        match self {
            Self::Linear(ix) => Self::Linear(ix.map(|i| map[i])),
            Self::Cubic(ix) => Self::Cubic(ix.map(|i| map[i])),
        }
    }
}

/// Points and elements handed to a boundary-element solver.
///
/// Element groups map a name to the indices of the elements generated from
/// geometry carrying that name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Point coordinates.
    pub points: Vec<Point3>,
    /// Line elements.
    pub lines: Vec<LineElement>,
    /// Triangle elements.
    pub triangles: Vec<[usize; 3]>,
    /// Named groups of line elements.
    pub line_groups: BTreeMap<String, Vec<usize>>,
    /// Named groups of triangle elements.
    pub triangle_groups: BTreeMap<String, Vec<usize>>,
}

impl Mesh {
    /// Returns `true` if the mesh has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indices of the line elements in the named group.
    #[must_use]
    pub fn line_group(&self, name: &str) -> Option<&[usize]> {
        self.line_groups.get(name).map(Vec::as_slice)
    }

    /// Indices of the triangle elements in the named group.
    #[must_use]
    pub fn triangle_group(&self, name: &str) -> Option<&[usize]> {
        self.triangle_groups.get(name).map(Vec::as_slice)
    }

    /// Concatenates two meshes.
    ///
    /// Points of `other` are appended after the points of `self`, its element
    /// indices are offset accordingly and its groups merged into ours.
    #[must_use]
    pub fn union(mut self, other: Mesh) -> Mesh {
        let point_offset = self.points.len();
        let line_offset = self.lines.len();
        let triangle_offset = self.triangles.len();

        self.points.extend(other.points);
        self.lines
            .extend(other.lines.into_iter().map(|l| l.offset(point_offset)));
        self.triangles.extend(
            other
                .triangles
                .into_iter()
                .map(|t| t.map(|i| i + point_offset)),
        );
        merge_groups(&mut self.line_groups, other.line_groups, line_offset);
        merge_groups(&mut self.triangle_groups, other.triangle_groups, triangle_offset);
        self
    }

    /// Checks that every element references existing points.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfRange`] for the first element holding a
    /// point index past the end of `points`.
    pub fn validate(&self) -> Result<()> {
        let n = self.points.len();
        dangling("line", self.lines.iter().map(LineElement::indices), n)?;
        dangling("triangle", self.triangles.iter().map(|t| &t[..]), n)
    }
}

/// Fails on the first element holding an index of `n` or more.
fn dangling<'a>(
    kind: &'static str,
    elements: impl Iterator<Item = &'a [usize]>,
    n: usize,
) -> Result<()> {
    for (element, indices) in elements.enumerate() {
        if let Some(&index) = indices.iter().find(|&&p| p >= n) {
            return Err(MeshError::IndexOutOfRange { kind, element, index }.into());
        }
    }
    Ok(())
}

fn merge_groups(
    into: &mut BTreeMap<String, Vec<usize>>,
    from: BTreeMap<String, Vec<usize>>,
    offset: usize,
) {
    for (name, indices) in from {
        into.entry(name)
            .or_default()
            .extend(indices.into_iter().map(|i| i + offset));
    }
}

impl Add for Mesh {
    type Output = Mesh;

    fn add(self, rhs: Mesh) -> Mesh {
        self.union(rhs)
    }
}

impl Sum for Mesh {
    fn sum<I: Iterator<Item = Mesh>>(iter: I) -> Mesh {
        iter.fold(Mesh::default(), Mesh::union)
    }
}

/// Scale at which coordinates are considered the same point.
const DEDUP_SCALE: f64 = 1e9;

/// Merges coincident points.
///
/// Returns the unique points in first-seen order and, for every input point,
/// its index in the unique list.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn dedup_points(points: Vec<Point3>) -> (Vec<Point3>, Vec<usize>) {
    let mut seen: HashMap<[i64; 3], usize> = HashMap::with_capacity(points.len());
    let mut unique = Vec::with_capacity(points.len());
    let mut map = Vec::with_capacity(points.len());

    for p in points {
        let key = [p.x, p.y, p.z].map(|c| (c * DEDUP_SCALE).round() as i64);
        let index = *seen.entry(key).or_insert_with(|| {
            unique.push(p);
            unique.len() - 1
        });
        map.push(index);
    }
    (unique, map)
}

/// Geometry that can be turned into a [`Mesh`].
pub trait Meshable {
    /// Discretizes the geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh parameters are invalid for this geometry.
    fn mesh(&self, params: &MeshParams) -> Result<Mesh>;
}

impl Meshable for Path {
    fn mesh(&self, params: &MeshParams) -> Result<Mesh> {
        MeshPath::new(*params).execute(self)
    }
}

impl Meshable for Surface {
    fn mesh(&self, params: &MeshParams) -> Result<Mesh> {
        MeshSurface::new(*params).execute(self)
    }
}

impl Meshable for PathCollection {
    fn mesh(&self, params: &MeshParams) -> Result<Mesh> {
        let mesh_path = MeshPath::new(*params);
        self.named_members()
            .iter()
            .try_fold(Mesh::default(), |mesh, path| Ok(mesh + mesh_path.execute(path)?))
    }
}

impl Meshable for SurfaceCollection {
    fn mesh(&self, params: &MeshParams) -> Result<Mesh> {
        let mesh_surface = MeshSurface::new(*params);
        self.named_members()
            .iter()
            .try_fold(Mesh::default(), |mesh, surface| {
                Ok(mesh + mesh_surface.execute(surface)?)
            })
    }
}
