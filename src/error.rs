use thiserror::Error;

use crate::math::Point3;
use crate::tracer::Trajectory;

/// Top-level error type for the eoptic kernel.
#[derive(Debug, Error)]
pub enum EopticError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Tracing(#[from] TracingError),
}

/// Errors raised while constructing or combining paths and surfaces.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{what} must have a positive length, got {value}")]
    NonPositiveLength { what: &'static str, value: f64 },

    #[error("endpoint {end} does not coincide with starting point {start}")]
    EndpointMismatch { end: Point3, start: Point3 },

    #[error("path is not closed")]
    NotClosed,

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while discretizing geometry into a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh size must be a positive finite number, got {0}")]
    InvalidMeshSize(f64),

    #[error("{samples} samples cannot be grouped into higher-order line elements")]
    HigherOrderLayout { samples: usize },

    #[error("unsupported meshing request: {0}")]
    Unsupported(String),

    #[error("{kind} {element} references point {index}, which does not exist")]
    IndexOutOfRange {
        kind: &'static str,
        element: usize,
        index: usize,
    },
}

/// Errors raised by the particle tracer.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("expected a {expected}-dimensional vector, got {found} components")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid tracer parameters: {0}")]
    InvalidParameters(String),

    #[error("particle is at rest in a vanishing field")]
    StationaryParticle,

    #[error("step size {step} fell below the minimum at t = {time} without meeting the tolerance")]
    StepSizeUnderflow { time: f64, step: f64 },

    #[error("step limit of {} reached before leaving the bounds", .trajectory.len())]
    StepLimit { trajectory: Box<Trajectory> },

    #[error("tracing was cancelled")]
    Cancelled,

    #[error("tracing exceeded its time budget")]
    TimedOut,
}

/// Convenience type alias for results using [`EopticError`].
pub type Result<T> = std::result::Result<T, EopticError>;
