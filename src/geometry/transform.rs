use std::fmt;
use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

/// A mapping applied to every point of a path or surface.
///
/// Affine maps are stored as a homogeneous 4x4 matrix so that successive
/// rigid motions compose into one matrix instead of nesting.
#[derive(Clone)]
pub enum PointMap {
    /// Homogeneous affine transformation.
    Affine(Matrix4),
    /// Arbitrary user-supplied mapping.
    Custom(Arc<dyn Fn(&Point3) -> Point3 + Send + Sync>),
}

impl PointMap {
    /// Translation by `(dx, dy, dz)`.
    #[must_use]
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self::Affine(Matrix4::new_translation(&Vector3::new(dx, dy, dz)))
    }

    /// Rotation by `angle` radians (right-handed) around the line through
    /// `origin` along `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis` is zero-length.
    pub fn rotation(axis: &Vector3, angle: f64, origin: &Point3) -> Result<Self> {
        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = nalgebra::Unit::new_unchecked(axis / len);
        let rotation = nalgebra::Rotation3::from_axis_angle(&axis, angle).to_homogeneous();
        let shift = origin.coords;
        let matrix =
            Matrix4::new_translation(&shift) * rotation * Matrix4::new_translation(&-shift);
        Ok(Self::Affine(matrix))
    }

    /// Reflection in the plane through `origin` with the given `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if `normal` is zero-length.
    pub fn mirror(normal: &Vector3, origin: &Point3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let n = normal / len;
        let reflection = nalgebra::Matrix3::identity() - 2.0 * n * n.transpose();
        let mut matrix = reflection.to_homogeneous();
        let shift = origin.coords - reflection * origin.coords;
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&shift);
        Ok(Self::Affine(matrix))
    }

    /// Wraps an arbitrary point function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Point3) -> Point3 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Applies the mapping to a point.
    #[must_use]
    pub fn apply(&self, p: &Point3) -> Point3 {
        match self {
            Self::Affine(m) => m.transform_point(p),
            Self::Custom(f) => f(p),
        }
    }

    /// Returns the mapping that first applies `self` and then `next`.
    #[must_use]
    pub fn then(&self, next: &PointMap) -> PointMap {
        match (self, next) {
            (Self::Affine(a), Self::Affine(b)) => Self::Affine(b * a),
            _ => {
                let (first, second) = (self.clone(), next.clone());
                Self::custom(move |p| second.apply(&first.apply(p)))
            }
        }
    }
}

impl fmt::Debug for PointMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Affine(m) => f.debug_tuple("Affine").field(m).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
