mod elliptic;
mod radial;
mod three_d;

pub use elliptic::{ellipe, ellipk};
pub use radial::{RadialAxialField, RadialBemField, RADIAL_DERIVATIVES};
pub use three_d::{Axial3dCoefficients, Axial3dField, Bem3dField, M_MAX, NU_MAX};

use std::fmt;
use std::sync::Arc;

use crate::math::{Point3, Vector3};

/// Charge-to-mass ratio of the electron in units of mm and ns.
pub const EM: f64 = -0.175_882_002_272_390_8;

/// Points closer to the symmetry axis than this are treated as on-axis.
pub(crate) const MIN_DISTANCE_AXIS: f64 = 1e-10;

/// Coordinate convention of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    /// Rotationally symmetric around the z-axis. Positions are `(r, z, 0)`
    /// and velocities `(vr, vz, 0)`.
    Radial,
    /// Full three-dimensional positions `(x, y, z)`.
    ThreeD,
}

impl Symmetry {
    /// Number of spatial coordinates.
    #[must_use]
    pub fn dimensions(self) -> usize {
        match self {
            Self::Radial => 2,
            Self::ThreeD => 3,
        }
    }
}

/// A force field that particles can be traced through.
///
/// Implementations hold read-only data and are shared between threads while
/// tracing batches of particles.
pub trait Field: Send + Sync {
    /// Coordinate convention of positions and velocities passed to
    /// [`Field::acceleration`].
    fn symmetry(&self) -> Symmetry;

    /// Acceleration (mm/ns²) of a particle at `position` moving at `velocity`.
    fn acceleration(&self, position: &Point3, velocity: &Vector3) -> Vector3;
}

impl<T: Field + ?Sized> Field for &T {
    fn symmetry(&self) -> Symmetry {
        (**self).symmetry()
    }

    fn acceleration(&self, position: &Point3, velocity: &Vector3) -> Vector3 {
        (**self).acceleration(position, velocity)
    }
}

impl<T: Field + ?Sized> Field for Arc<T> {
    fn symmetry(&self) -> Symmetry {
        (**self).symmetry()
    }

    fn acceleration(&self, position: &Point3, velocity: &Vector3) -> Vector3 {
        (**self).acceleration(position, velocity)
    }
}

impl<T: Field + ?Sized> Field for Box<T> {
    fn symmetry(&self) -> Symmetry {
        (**self).symmetry()
    }

    fn acceleration(&self, position: &Point3, velocity: &Vector3) -> Vector3 {
        (**self).acceleration(position, velocity)
    }
}

/// A field given directly as an acceleration function.
pub struct FnField<F> {
    symmetry: Symmetry,
    f: F,
}

impl<F> FnField<F>
where
    F: Fn(&Point3, &Vector3) -> Vector3 + Send + Sync,
{
    /// Wraps an acceleration function.
    #[must_use]
    pub fn new(symmetry: Symmetry, f: F) -> Self {
        Self { symmetry, f }
    }
}

impl<F> fmt::Debug for FnField<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnField")
            .field("symmetry", &self.symmetry)
            .finish_non_exhaustive()
    }
}

impl<F> Field for FnField<F>
where
    F: Fn(&Point3, &Vector3) -> Vector3 + Send + Sync,
{
    fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    fn acceleration(&self, position: &Point3, velocity: &Vector3) -> Vector3 {
        (self.f)(position, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_field_through_pointers() {
        let field = FnField::new(Symmetry::ThreeD, |_p: &Point3, v: &Vector3| {
            v.cross(&Vector3::z())
        });
        let shared: Arc<dyn Field> = Arc::new(field);
        let boxed: Box<dyn Field> = Box::new(FnField::new(
            Symmetry::Radial,
            |_: &Point3, _: &Vector3| Vector3::zeros(),
        ));

        let a = shared.acceleration(&Point3::origin(), &Vector3::y());
        assert_eq!(a, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!((&shared).symmetry(), Symmetry::ThreeD);
        assert_eq!(boxed.symmetry().dimensions(), 2);
    }
}
