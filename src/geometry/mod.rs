pub mod collection;
pub mod path;
pub mod surface;
pub mod transform;

pub use collection::{PathCollection, SurfaceCollection};
pub use path::{CircularArc, LineSegment, Path, DEFAULT_IRREGULAR_SAMPLES};
pub use surface::{Axis, Surface};
pub use transform::PointMap;
