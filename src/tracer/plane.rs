use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use nalgebra::DVector;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, TracingError};
use crate::field::{Field, Symmetry};

use super::{velocity_vec_xz_plane, xy_plane_intersection, Bounds, Tracer, TracerConfig};

/// Intersections of a batch of particles with the target plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneIntersections {
    /// Interpolated state at the plane, all zeros where `mask` is `false`.
    pub intersections: Vec<DVector<f64>>,
    /// Whether the particle reached the plane.
    pub mask: Vec<bool>,
}

impl PlaneIntersections {
    /// States of the particles that reached the plane.
    pub fn valid(&self) -> impl Iterator<Item = &DVector<f64>> {
        self.intersections
            .iter()
            .zip(&self.mask)
            .filter_map(|(state, hit)| hit.then_some(state))
    }
}

/// Traces particles leaving a start plane `z = z0` in the xz-plane and
/// records where they cross the target plane `z = zfinal`.
///
/// Particles start at `x = r` (on the axis by default) and move towards the
/// target plane, or downwards when both planes coincide.
pub struct PlaneTracer<F> {
    field: F,
    z0: f64,
    zfinal: f64,
    rmax: f64,
    config: TracerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<F: Field> PlaneTracer<F> {
    /// Creates a plane tracer bounding particles to `|r| <= rmax`.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is not finite or `rmax` is not
    /// positive.
    pub fn new(field: F, z0: f64, zfinal: f64, rmax: f64) -> Result<Self> {
        if !(z0.is_finite() && zfinal.is_finite()) {
            return Err(TracingError::InvalidParameters(
                "plane coordinates must be finite".into(),
            )
            .into());
        }
        if rmax <= 0.0 || rmax.is_nan() {
            return Err(TracingError::InvalidParameters(
                format!("rmax must be positive, got {rmax}"),
            )
            .into());
        }
        Ok(Self {
            field,
            z0,
            zfinal,
            rmax,
            config: TracerConfig::default(),
            cancel: None,
        })
    }

    /// Replaces the integrator configuration.
    #[must_use]
    pub fn with_config(mut self, config: TracerConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs a flag that stops a running batch once set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Starting plane.
    #[must_use]
    pub fn z0(&self) -> f64 {
        self.z0
    }

    /// Target plane.
    #[must_use]
    pub fn zfinal(&self) -> f64 {
        self.zfinal
    }

    fn downward(&self) -> bool {
        self.zfinal <= self.z0
    }

    /// Axial tracing range enclosing both planes with a margin.
    fn z_bounds(&self) -> (f64, f64) {
        let (low, high) = (self.z0.min(self.zfinal), self.z0.max(self.zfinal));
        if high < 0.0 {
            (low - 1.0, 1.0)
        } else if low > 0.0 {
            (-1.0, high + 1.0)
        } else {
            (low - 1.0, high + 1.0)
        }
    }

    fn tracer(&self) -> Result<Tracer<&F>> {
        let r = (-self.rmax, self.rmax);
        let bounds = match self.field.symmetry() {
            Symmetry::Radial => Bounds::radial(r, self.z_bounds())?,
            Symmetry::ThreeD => Bounds::three_d(r, r, self.z_bounds())?,
        };
        let tracer = Tracer::new(&self.field, bounds)?.with_config(self.config)?;
        Ok(match &self.cancel {
            Some(flag) => tracer.with_cancel_flag(Arc::clone(flag)),
            None => tracer,
        })
    }

    /// Traces particles starting on the axis with the given angles to the
    /// z-axis (radians) and energies (eV).
    ///
    /// # Errors
    ///
    /// Returns an error if the slices differ in length, an energy is not
    /// positive, or any trace fails.
    pub fn trace(&self, angles: &[f64], energies: &[f64]) -> Result<PlaneIntersections> {
        self.trace_from(&vec![0.0; angles.len()], angles, energies)
    }

    /// Traces particles starting at the radii `r` of the start plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the slices differ in length, an energy is not
    /// positive, or any trace fails. Failing to reach the target plane is not
    /// an error and only clears the particle's mask entry.
    pub fn trace_from(
        &self,
        r: &[f64],
        angles: &[f64],
        energies: &[f64],
    ) -> Result<PlaneIntersections> {
        if angles.len() != energies.len() || r.len() != angles.len() {
            return Err(TracingError::InvalidParameters(format!(
                "got {} radii, {} angles and {} energies",
                r.len(),
                angles.len(),
                energies.len()
            ))
            .into());
        }
        let tracer = self.tracer()?;
        let three_dimensional = self.field.symmetry() == Symmetry::ThreeD;
        let downward = self.downward();

        let hits = r
            .par_iter()
            .zip(angles)
            .zip(energies)
            .map(|((&r, &angle), &energy)| {
                let velocity = velocity_vec_xz_plane(energy, angle, downward, three_dimensional)?;
                let position = if three_dimensional {
                    vec![r, 0.0, self.z0]
                } else {
                    vec![r, self.z0]
                };
                let trajectory = tracer.trace(&position, &velocity)?;
                Ok(xy_plane_intersection(&trajectory, self.zfinal))
            })
            .collect::<Result<Vec<_>>>()?;

        let width = 2 * self.field.symmetry().dimensions();
        let mask: Vec<bool> = hits.iter().map(Option::is_some).collect();
        debug!(
            particles = hits.len(),
            hits = mask.iter().filter(|hit| **hit).count(),
            "traced particles to plane"
        );
        Ok(PlaneIntersections {
            intersections: hits
                .into_iter()
                .map(|hit| hit.unwrap_or_else(|| DVector::zeros(width)))
                .collect(),
            mask,
        })
    }
}
