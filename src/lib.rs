pub mod error;
pub mod field;
pub mod geometry;
pub mod math;
pub mod mesh;
pub mod tracer;

pub use error::{EopticError, Result};
