mod intersection;
mod plane;
mod rkf45;
mod velocity;

pub use intersection::{axis_intersection, plane_intersection, xy_plane_intersection};
pub use plane::{PlaneIntersections, PlaneTracer};
pub use velocity::{velocity_vec, velocity_vec_spherical, velocity_vec_xz_plane};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nalgebra::DVector;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Result, TracingError};
use crate::field::{Field, Symmetry};
use crate::math::{Point3, Vector3};

use rkf45::State;

/// Parameters of the adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerConfig {
    /// Largest accepted local error of any state component.
    pub atol: f64,
    /// Distance (mm) the particle may travel in one step at its initial speed.
    pub max_step_length: f64,
    /// Smallest step as a fraction of the largest.
    pub min_step_ratio: f64,
    /// Largest number of states in a trajectory.
    pub max_steps: usize,
    /// Wall-clock budget of a single trace.
    pub timeout: Option<Duration>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            atol: 1e-10,
            max_step_length: 0.01,
            min_step_ratio: 1e-10,
            max_steps: 1_000_000,
            timeout: None,
        }
    }
}

impl TracerConfig {
    fn validate(&self) -> Result<()> {
        let positive = |v: f64| v > 0.0 && v.is_finite();
        if !positive(self.atol) {
            return Err(TracingError::InvalidParameters(
                format!("atol must be positive, got {}", self.atol),
            )
            .into());
        }
        if !positive(self.max_step_length) {
            return Err(TracingError::InvalidParameters(format!(
                "max_step_length must be positive, got {}",
                self.max_step_length
            ))
            .into());
        }
        if !(positive(self.min_step_ratio) && self.min_step_ratio < 1.0) {
            return Err(TracingError::InvalidParameters(format!(
                "min_step_ratio must lie in (0, 1), got {}",
                self.min_step_ratio
            ))
            .into());
        }
        if self.max_steps < 2 {
            return Err(TracingError::InvalidParameters(
                "max_steps must be at least 2".into(),
            )
            .into());
        }
        Ok(())
    }
}

/// Closed axis-aligned box the particle is traced in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    symmetry: Symmetry,
    ranges: [(f64, f64); 3],
}

impl Bounds {
    fn checked(symmetry: Symmetry, ranges: [(f64, f64); 3]) -> Result<Self> {
        if let Some((min, max)) = ranges
            .iter()
            .find(|(min, max)| min.is_nan() || max.is_nan() || min > max)
        {
            return Err(TracingError::InvalidParameters(
                format!("empty bounds [{min}, {max}]"),
            )
            .into());
        }
        Ok(Self { symmetry, ranges })
    }

    /// Bounds `r` in `r_range` and `z` in `z_range` for radially symmetric fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a range is empty.
    pub fn radial(r_range: (f64, f64), z_range: (f64, f64)) -> Result<Self> {
        Self::checked(
            Symmetry::Radial,
            [r_range, z_range, (f64::NEG_INFINITY, f64::INFINITY)],
        )
    }

    /// Bounds for three-dimensional fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a range is empty.
    pub fn three_d(x_range: (f64, f64), y_range: (f64, f64), z_range: (f64, f64)) -> Result<Self> {
        Self::checked(Symmetry::ThreeD, [x_range, y_range, z_range])
    }

    /// Coordinate convention of the bounds.
    #[must_use]
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    fn contains(&self, y: &State) -> bool {
        self.ranges
            .iter()
            .zip(y)
            .all(|((min, max), v)| *min <= *v && *v <= *max)
    }
}

/// Times and states of a traced particle.
///
/// States are `(r, z, vr, vz)` for radial symmetry and
/// `(x, y, z, vx, vy, vz)` in three dimensions. The first state is the
/// initial condition at time zero; the last one lies outside the bounds
/// unless tracing stopped early.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    symmetry: Symmetry,
    times: Vec<f64>,
    states: Vec<DVector<f64>>,
}

impl Trajectory {
    /// Builds a trajectory from recorded times and states.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengths differ, a state has the wrong number of
    /// components, or the times are not strictly increasing.
    pub fn new(symmetry: Symmetry, times: Vec<f64>, states: Vec<DVector<f64>>) -> Result<Self> {
        let expected = 2 * symmetry.dimensions();
        if times.len() != states.len() {
            return Err(TracingError::InvalidParameters(format!(
                "{} times but {} states",
                times.len(),
                states.len()
            ))
            .into());
        }
        if let Some(state) = states.iter().find(|s| s.len() != expected) {
            return Err(TracingError::DimensionMismatch {
                expected,
                found: state.len(),
            }
            .into());
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TracingError::InvalidParameters(
                "times must be strictly increasing".into(),
            )
            .into());
        }
        Ok(Self {
            symmetry,
            times,
            states,
        })
    }

    /// Coordinate convention of the states.
    #[must_use]
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Number of recorded states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Times (ns) of the states.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Recorded states.
    #[must_use]
    pub fn states(&self) -> &[DVector<f64>] {
        &self.states
    }

    /// The last recorded state.
    #[must_use]
    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.states.last()
    }

    fn record(&mut self, time: f64, y: &State) {
        self.times.push(time);
        self.states.push(compress(self.symmetry, y));
    }
}

fn compress(symmetry: Symmetry, y: &State) -> DVector<f64> {
    match symmetry {
        Symmetry::Radial => DVector::from_row_slice(&[y[0], y[1], y[3], y[4]]),
        Symmetry::ThreeD => DVector::from_row_slice(y),
    }
}

fn expand(symmetry: Symmetry, position: &[f64], velocity: &[f64]) -> Result<State> {
    let dims = symmetry.dimensions();
    for v in [position, velocity] {
        if v.len() != dims {
            return Err(TracingError::DimensionMismatch {
                expected: dims,
                found: v.len(),
            }
            .into());
        }
    }
    if position.iter().chain(velocity).any(|v| !v.is_finite()) {
        return Err(TracingError::InvalidParameters("initial state must be finite".into()).into());
    }
    let mut y = [0.0; 6];
    y[..dims].copy_from_slice(position);
    y[3..3 + dims].copy_from_slice(velocity);
    Ok(y)
}

/// Traces charged particles through a field with adaptive RKF45 steps.
///
/// Tracing stops at the first state outside the bounds, which is kept in
/// the trajectory.
pub struct Tracer<F> {
    field: F,
    bounds: Bounds,
    config: TracerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<F: Field> Tracer<F> {
    /// Creates a tracer with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds do not match the symmetry of the field.
    pub fn new(field: F, bounds: Bounds) -> Result<Self> {
        if field.symmetry() != bounds.symmetry() {
            return Err(TracingError::DimensionMismatch {
                expected: field.symmetry().dimensions(),
                found: bounds.symmetry().dimensions(),
            }
            .into());
        }
        Ok(Self {
            field,
            bounds,
            config: TracerConfig::default(),
            cancel: None,
        })
    }

    /// Replaces the integrator configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is out of range.
    pub fn with_config(mut self, config: TracerConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Installs a flag that stops running traces once set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The field traced through.
    #[must_use]
    pub fn field(&self) -> &F {
        &self.field
    }

    /// The tracing bounds.
    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The integrator configuration.
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Traces a particle from `position` with `velocity` (mm/ns).
    ///
    /// Both have two components `(r, z)` for radially symmetric fields and
    /// three otherwise.
    ///
    /// # Errors
    ///
    /// - [`TracingError::DimensionMismatch`] for vectors of the wrong length.
    /// - [`TracingError::StationaryParticle`] if the particle is at rest where
    ///   the field vanishes.
    /// - [`TracingError::StepSizeUnderflow`] if a step at the minimum size
    ///   still misses the tolerance, or the step no longer moves the clock.
    /// - [`TracingError::StepLimit`] with the partial trajectory if the
    ///   particle is still inside after `max_steps` states.
    /// - [`TracingError::Cancelled`] and [`TracingError::TimedOut`].
    pub fn trace(&self, position: &[f64], velocity: &[f64]) -> Result<Trajectory> {
        let symmetry = self.field.symmetry();
        let mut y = expand(symmetry, position, velocity)?;
        let started = Instant::now();

        let h_max = self.config.max_step_length / self.initial_speed(&y)?;
        let h_min = h_max * self.config.min_step_ratio;
        let mut h = h_max;
        let mut time = 0.0;
        let mut rejected = 0_usize;

        let mut trajectory = Trajectory {
            symmetry,
            times: Vec::new(),
            states: Vec::new(),
        };
        trajectory.record(time, &y);

        while self.bounds.contains(&y) {
            if self.cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(TracingError::Cancelled.into());
            }
            if self.config.timeout.is_some_and(|t| started.elapsed() >= t) {
                return Err(TracingError::TimedOut.into());
            }
            if trajectory.len() >= self.config.max_steps {
                return Err(TracingError::StepLimit {
                    trajectory: Box::new(trajectory),
                }
                .into());
            }

            let step = rkf45::attempt(&self.field, &y, h);
            if step.error <= self.config.atol {
                time = advance(time, h)?;
                for (v, dv) in y.iter_mut().zip(&step.increment) {
                    *v += dv;
                }
                trajectory.record(time, &y);
            } else if h <= h_min {
                return Err(TracingError::StepSizeUnderflow { time, step: h }.into());
            } else {
                rejected += 1;
                trace!(time, step = h, error = step.error, "rejected step");
            }
            h = rkf45::next_step_size(h, step.error, self.config.atol, h_max).max(h_min);
        }

        debug!(
            states = trajectory.len(),
            rejected,
            final_time = time,
            elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
            "traced particle"
        );
        Ok(trajectory)
    }

    /// Speed setting the largest time step.
    ///
    /// A particle at rest uses the speed it would gain over one maximal step
    /// length under its initial acceleration.
    fn initial_speed(&self, y: &State) -> Result<f64> {
        let speed = (y[3] * y[3] + y[4] * y[4] + y[5] * y[5]).sqrt();
        if speed > 0.0 {
            return Ok(speed);
        }
        let position = Point3::new(y[0], y[1], y[2]);
        let acceleration = self.field.acceleration(&position, &Vector3::zeros()).norm();
        if acceleration > 0.0 && acceleration.is_finite() {
            Ok((2.0 * acceleration * self.config.max_step_length).sqrt())
        } else {
            Err(TracingError::StationaryParticle.into())
        }
    }

    /// Traces many particles in parallel.
    ///
    /// Results are returned in the order of `starts`, each given as
    /// `(position, velocity)`.
    pub fn trace_many<P, V>(&self, starts: &[(P, V)]) -> Vec<Result<Trajectory>>
    where
        P: AsRef<[f64]> + Sync,
        V: AsRef<[f64]> + Sync,
    {
        starts
            .par_iter()
            .map(|(p, v)| self.trace(p.as_ref(), v.as_ref()))
            .collect()
    }
}

/// Clock after an accepted step of `h`, failing once `h` is lost in rounding.
fn advance(time: f64, h: f64) -> Result<f64> {
    let next = time + h;
    if next > time {
        Ok(next)
    } else {
        Err(TracingError::StepSizeUnderflow { time, step: h }.into())
    }
}
