mod arc;
mod line;
mod reparam;

pub use arc::CircularArc;
pub use line::LineSegment;

use std::ops::Shr;
use std::sync::Arc;

use reparam::{IrregularSource, Reparametrized};

use crate::error::{GeometryError, Result};
use crate::math::{
    integrate, points_close, Point3, SplineCurve3, Vector3, POINT_TOLERANCE, TOLERANCE,
};

use super::transform::PointMap;

/// Number of samples used by [`Path::ellipse`] and the default for
/// [`Path::spline_through_points`].
pub const DEFAULT_IRREGULAR_SAMPLES: usize = 100;

/// How a path computes its points.
#[derive(Debug, Clone)]
enum PathKind {
    Line(LineSegment),
    Arc(CircularArc),
    Reparametrized(Arc<Reparametrized>),
    /// Two paths joined end to start.
    Composite(Arc<Path>, Arc<Path>),
    /// A closed path whose parametrization starts `phase` further along.
    Phased { inner: Arc<Path>, phase: f64 },
    /// A piece of a longer path starting at `offset`.
    Slice { inner: Arc<Path>, offset: f64 },
    /// Every point of `inner` passed through `map`.
    Mapped { inner: Arc<Path>, map: PointMap },
}

/// A curve in 3D space parametrized by arc length over `[0, length]`.
///
/// Breakpoints mark parameter values where the curve is not differentiable;
/// they always end up as mesh nodes. Paths are immutable: every combinator
/// returns a new path and leaves its operands untouched.
#[derive(Debug, Clone)]
pub struct Path {
    kind: PathKind,
    length: f64,
    breakpoints: Vec<f64>,
    name: Option<String>,
}

impl Path {
    fn build(kind: PathKind, length: f64, mut breakpoints: Vec<f64>) -> Result<Self> {
        if !(length > 0.0 && length.is_finite()) {
            return Err(GeometryError::NonPositiveLength {
                what: "path",
                value: length,
            }
            .into());
        }
        if let Some(&b) = breakpoints
            .iter()
            .find(|&&b| !(b >= 0.0 && b <= length))
        {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "breakpoint",
                value: b,
                min: 0.0,
                max: length,
            }
            .into());
        }
        breakpoints.sort_by(f64::total_cmp);
        breakpoints.dedup();
        Ok(Self {
            kind,
            length,
            breakpoints,
            name: None,
        })
    }

    /// Creates a straight line between two points.
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide.
    pub fn line(from: Point3, to: Point3) -> Result<Self> {
        let segment = LineSegment::new(from, to)?;
        let length = segment.length();
        Self::build(PathKind::Line(segment), length, Vec::new())
    }

    /// Creates an arc around `center` from `start` to `end`.
    ///
    /// With `reverse` the arc takes the other way round the circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the three points do not define a plane.
    pub fn arc(center: Point3, start: Point3, end: Point3, reverse: bool) -> Result<Self> {
        let arc = CircularArc::through(center, start, end, reverse)?;
        let length = arc.length();
        Self::build(PathKind::Arc(arc), length, Vec::new())
    }

    fn circle(
        center: Point3,
        radius: f64,
        x_unit: Vector3,
        y_unit: Vector3,
        angle: f64,
    ) -> Result<Self> {
        let arc = CircularArc::in_plane(center, radius, x_unit, y_unit, angle)?;
        let length = arc.length();
        Self::build(PathKind::Arc(arc), length, Vec::new())
    }

    /// Creates (part of) a circle in the XY plane, starting on the positive x-axis.
    ///
    /// `angle` is the swept angle in radians; `TAU` gives a full circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or angle vanishes.
    pub fn circle_xy(x0: f64, y0: f64, radius: f64, angle: f64) -> Result<Self> {
        Self::circle(Point3::new(x0, y0, 0.0), radius, Vector3::x(), Vector3::y(), angle)
    }

    /// Creates (part of) a circle in the XZ plane, starting on the positive x-axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or angle vanishes.
    pub fn circle_xz(x0: f64, z0: f64, radius: f64, angle: f64) -> Result<Self> {
        Self::circle(Point3::new(x0, 0.0, z0), radius, Vector3::x(), Vector3::z(), angle)
    }

    /// Creates (part of) a circle in the YZ plane, starting on the positive y-axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or angle vanishes.
    pub fn circle_yz(y0: f64, z0: f64, radius: f64, angle: f64) -> Result<Self> {
        Self::circle(Point3::new(0.0, y0, z0), radius, Vector3::y(), Vector3::z(), angle)
    }

    fn from_source(
        source: IrregularSource,
        samples: usize,
        breakpoints: &[f64],
    ) -> Result<Self> {
        if let Some(&b) = breakpoints.iter().find(|&&b| !(0.0..=1.0).contains(&b)) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "breakpoint",
                value: b,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        let curve = Reparametrized::new(source, samples)?;
        let length = curve.length();
        let breakpoints = breakpoints
            .iter()
            .map(|&b| curve.arc_length_at(b).clamp(0.0, length))
            .collect();
        Self::build(PathKind::Reparametrized(Arc::new(curve)), length, breakpoints)
    }

    /// Creates a path from a function `u -> point` over `0 <= u <= 1` whose
    /// speed is not uniform.
    ///
    /// The length is found by integrating the speed of a cubic spline through
    /// `samples` uniform samples, and the result is re-parametrized by arc
    /// length. `breakpoints` are given in the unit parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 3 samples are requested, a breakpoint
    /// lies outside `[0, 1]`, or the curve has vanishing speed.
    pub fn from_irregular_function<F>(f: F, samples: usize, breakpoints: &[f64]) -> Result<Self>
    where
        F: Fn(f64) -> Point3 + Send + Sync + 'static,
    {
        Self::from_source(IrregularSource::Function(Arc::new(f)), samples, breakpoints)
    }

    /// Fits a cubic spline through `points` and re-parametrizes it by arc length.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given or consecutive
    /// points produce a curve with vanishing speed.
    #[allow(clippy::cast_precision_loss)]
    pub fn spline_through_points(points: &[Point3], samples: usize) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::InvalidInput(
                "a spline path needs at least two points".into(),
            )
            .into());
        }
        let last = (points.len() - 1) as f64;
        let ts: Vec<f64> = (0..points.len()).map(|i| i as f64 / last).collect();
        let curve = SplineCurve3::new(&ts, points)?;
        Self::from_source(IrregularSource::Spline(curve), samples, &[])
    }

    /// Creates an ellipse in the XY plane starting on the positive x-axis.
    ///
    /// There is no closed form from arc length to a point on an ellipse, so
    /// the path is built through [`Path::from_irregular_function`].
    ///
    /// # Errors
    ///
    /// Returns an error if either axis is not positive.
    pub fn ellipse(major: f64, minor: f64) -> Result<Self> {
        if major < TOLERANCE || minor < TOLERANCE {
            return Err(
                GeometryError::Degenerate("ellipse axes must be positive".into()).into(),
            );
        }
        Self::from_source(
            IrregularSource::Ellipse { major, minor },
            DEFAULT_IRREGULAR_SAMPLES,
            &[],
        )
    }

    /// Creates a closed rectangle in the XY plane starting at `(xmin, ymin, 0)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is degenerate.
    pub fn rectangle_xy(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        Self::line(Point3::new(xmin, ymin, 0.0), Point3::new(xmin, ymax, 0.0))?
            .line_to(Point3::new(xmax, ymax, 0.0))?
            .line_to(Point3::new(xmax, ymin, 0.0))?
            .close()
    }

    /// Creates a closed rectangle in the XZ plane starting at `(xmin, 0, zmin)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is degenerate.
    pub fn rectangle_xz(xmin: f64, xmax: f64, zmin: f64, zmax: f64) -> Result<Self> {
        Self::line(Point3::new(xmin, 0.0, zmin), Point3::new(xmax, 0.0, zmin))?
            .line_to(Point3::new(xmax, 0.0, zmax))?
            .line_to(Point3::new(xmin, 0.0, zmax))?
            .close()
    }

    /// Creates a closed rectangle in the YZ plane starting at `(0, ymin, zmin)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is degenerate.
    pub fn rectangle_yz(ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Result<Self> {
        Self::line(Point3::new(0.0, ymin, zmin), Point3::new(0.0, ymin, zmax))?
            .line_to(Point3::new(0.0, ymax, zmax))?
            .line_to(Point3::new(0.0, ymax, zmin))?
            .close()
    }

    /// Creates the profile of an aperture in the XZ plane: a rectangle of the
    /// given `height` between `radius` and `extent` with the outer side open,
    /// centered at `z`. Revolving it around the z-axis gives a plate with a
    /// cylindrical hole.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is degenerate.
    pub fn aperture(height: f64, radius: f64, extent: f64, z: f64) -> Result<Self> {
        Self::line(
            Point3::new(extent, 0.0, -height / 2.0),
            Point3::new(radius, 0.0, -height / 2.0),
        )?
        .line_to(Point3::new(radius, 0.0, height / 2.0))?
        .line_to(Point3::new(extent, 0.0, height / 2.0))
        .map(|p| p.move_by(0.0, 0.0, z))
    }

    /// Returns the arc length of the path.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns the sorted breakpoints of the path.
    #[must_use]
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Returns the element-group name of the path, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns a copy of the path tagged with an element-group name.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    /// Evaluates the path at arc length `s`.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` lies outside `[0, length]`.
    pub fn evaluate(&self, s: f64) -> Result<Point3> {
        let slack = TOLERANCE * self.length.max(1.0);
        if !(s >= -slack && s <= self.length + slack) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "s",
                value: s,
                min: 0.0,
                max: self.length,
            }
            .into());
        }
        Ok(self.point_at(s.clamp(0.0, self.length)))
    }

    /// Evaluates the path without range checking; `s` must lie in `[0, length]`.
    pub(crate) fn point_at(&self, s: f64) -> Point3 {
        match &self.kind {
            PathKind::Line(segment) => segment.point_at(s),
            PathKind::Arc(arc) => arc.point_at(s),
            PathKind::Reparametrized(curve) => curve.point_at(s),
            PathKind::Composite(first, second) => {
                if s <= first.length {
                    first.point_at(s)
                } else {
                    second.point_at((s - first.length).min(second.length))
                }
            }
            PathKind::Phased { inner, phase } => {
                inner.point_at((phase + s).rem_euclid(inner.length))
            }
            PathKind::Slice { inner, offset } => inner.point_at((offset + s).min(inner.length)),
            PathKind::Mapped { inner, map } => map.apply(&inner.point_at(s)),
        }
    }

    /// Returns the point at arc length zero.
    #[must_use]
    pub fn starting_point(&self) -> Point3 {
        self.point_at(0.0)
    }

    /// Returns the point halfway along the path.
    #[must_use]
    pub fn middle_point(&self) -> Point3 {
        self.point_at(self.length / 2.0)
    }

    /// Returns the point at the full arc length.
    #[must_use]
    pub fn endpoint(&self) -> Point3 {
        self.point_at(self.length)
    }

    /// Returns whether the starting point and endpoint coincide.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        points_close(&self.starting_point(), &self.endpoint(), POINT_TOLERANCE)
    }

    /// Averages `f` along the path: the integral of `f(path(s))` over
    /// `[0, length]` divided by the length.
    ///
    /// Breakpoints are used as forced quadrature interval ends.
    ///
    /// # Errors
    ///
    /// Returns an error if `f` is not finite somewhere along the path.
    pub fn average<F>(&self, f: F) -> Result<f64>
    where
        F: Fn(&Point3) -> f64,
    {
        Ok(integrate(|s| f(&self.point_at(s)), 0.0, self.length, &self.breakpoints)? / self.length)
    }

    /// Joins `other` to the end of this path.
    ///
    /// The junction becomes a breakpoint and the breakpoints of `other` are
    /// shifted by this path's length. The name of `self` is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if this path's endpoint does not coincide with the
    /// starting point of `other` within [`POINT_TOLERANCE`].
    pub fn concat(&self, other: &Path) -> Result<Path> {
        let end = self.endpoint();
        let start = other.starting_point();
        if !points_close(&end, &start, POINT_TOLERANCE) {
            return Err(GeometryError::EndpointMismatch { end, start }.into());
        }

        let breakpoints = self
            .breakpoints
            .iter()
            .copied()
            .chain(std::iter::once(self.length))
            .chain(other.breakpoints.iter().map(|b| b + self.length))
            .collect();
        let mut path = Self::build(
            PathKind::Composite(Arc::new(self.clone()), Arc::new(other.clone())),
            self.length + other.length,
            breakpoints,
        )?;
        path.name.clone_from(&self.name);
        Ok(path)
    }

    /// Extends the path by a straight line to `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if `point` coincides with the current endpoint.
    pub fn line_to(&self, point: Point3) -> Result<Path> {
        self.concat(&Path::line(self.endpoint(), point)?)
    }

    /// Extends the path by an arc around `center` ending in `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc is degenerate.
    pub fn arc_to(&self, center: Point3, end: Point3, reverse: bool) -> Result<Path> {
        self.concat(&Path::arc(center, self.endpoint(), end, reverse)?)
    }

    /// Closes the path by a straight line back to the starting point.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is already closed.
    pub fn close(&self) -> Result<Path> {
        self.line_to(self.starting_point())
    }

    /// Re-roots a closed path so that it starts `phase` further along.
    ///
    /// Breakpoints (and the old starting point) are shifted modulo the length.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotClosed`] if the path is not closed.
    pub fn add_phase(&self, phase: f64) -> Result<Path> {
        if !self.is_closed() {
            return Err(GeometryError::NotClosed.into());
        }
        let phase = phase.rem_euclid(self.length);
        let breakpoints = self
            .breakpoints
            .iter()
            .chain(std::iter::once(&0.0))
            .map(|b| (b - phase).rem_euclid(self.length))
            .collect();
        let mut path = Self::build(
            PathKind::Phased {
                inner: Arc::new(self.clone()),
                phase,
            },
            self.length,
            breakpoints,
        )?;
        path.name.clone_from(&self.name);
        Ok(path)
    }

    /// Cuts the path in two at arc length `at`.
    ///
    /// The first piece keeps the breakpoints up to and including `at`, the
    /// second keeps those from `at` on, shifted to its own parametrization.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < at < length`.
    pub fn cut(&self, at: f64) -> Result<(Path, Path)> {
        if !(at > 0.0 && at < self.length) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "cut",
                value: at,
                min: 0.0,
                max: self.length,
            }
            .into());
        }
        let (inner, base) = match &self.kind {
            PathKind::Slice { inner, offset } => (Arc::clone(inner), *offset),
            _ => (Arc::new(self.clone()), 0.0),
        };

        let left_breakpoints = self.breakpoints.iter().copied().filter(|&b| b <= at).collect();
        let right_breakpoints = self
            .breakpoints
            .iter()
            .filter(|&&b| b >= at)
            .map(|b| b - at)
            .collect();

        let mut left = Self::build(
            PathKind::Slice {
                inner: Arc::clone(&inner),
                offset: base,
            },
            at,
            left_breakpoints,
        )?;
        let mut right = Self::build(
            PathKind::Slice {
                inner,
                offset: base + at,
            },
            self.length - at,
            right_breakpoints,
        )?;
        left.name.clone_from(&self.name);
        right.name.clone_from(&self.name);
        Ok((left, right))
    }

    /// Applies a point mapping to every point of the path.
    ///
    /// The length and breakpoints are kept, so the mapping should preserve
    /// distances along the path (rigid motions do).
    #[must_use]
    pub fn transform(&self, map: &PointMap) -> Path {
        let kind = match &self.kind {
            PathKind::Mapped { inner, map: first } => PathKind::Mapped {
                inner: Arc::clone(inner),
                map: first.then(map),
            },
            _ => PathKind::Mapped {
                inner: Arc::new(self.clone()),
                map: map.clone(),
            },
        };
        Self {
            kind,
            length: self.length,
            breakpoints: self.breakpoints.clone(),
            name: self.name.clone(),
        }
    }

    /// Maps every point of the path through `f`.
    #[must_use]
    pub fn map_points<F>(&self, f: F) -> Path
    where
        F: Fn(&Point3) -> Point3 + Send + Sync + 'static,
    {
        self.transform(&PointMap::custom(f))
    }

    /// Translates the path.
    #[must_use]
    pub fn move_by(&self, dx: f64, dy: f64, dz: f64) -> Path {
        self.transform(&PointMap::translation(dx, dy, dz))
    }

    /// Rotates the path by `angle` radians around the axis through `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis` is zero-length.
    pub fn rotate(&self, axis: &Vector3, angle: f64, origin: &Point3) -> Result<Path> {
        Ok(self.transform(&PointMap::rotation(axis, angle, origin)?))
    }

    /// Mirrors the path in the plane through `origin` with the given `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if `normal` is zero-length.
    pub fn mirror(&self, normal: &Vector3, origin: &Point3) -> Result<Path> {
        Ok(self.transform(&PointMap::mirror(normal, origin)?))
    }
}

impl Shr<&Path> for &Path {
    type Output = Result<Path>;

    /// `p1 >> p2` is [`Path::concat`].
    fn shr(self, rhs: &Path) -> Self::Output {
        self.concat(rhs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::{PI, TAU};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn line_length_is_distance() {
        let path = Path::line(p(1.0, 2.0, 3.0), p(4.0, 6.0, 3.0)).unwrap();
        assert_abs_diff_eq!(path.length(), 5.0, epsilon = 1e-14);
        assert!(path.breakpoints().is_empty());
    }

    #[test]
    fn endpoints_match_evaluation() {
        let path = Path::circle_xz(0.3, -0.2, 1.5, PI)
            .unwrap()
            .line_to(p(5.0, 0.0, 5.0))
            .unwrap();
        assert_eq!(path.evaluate(0.0).unwrap(), path.starting_point());
        assert_eq!(path.evaluate(path.length()).unwrap(), path.endpoint());
    }

    #[test]
    fn circle_length_is_circumference() {
        let circle = Path::circle_xz(0.0, 0.0, 2.5, TAU).unwrap();
        assert_abs_diff_eq!(circle.length(), 5.0 * PI, epsilon = 1e-12);
        assert!(circle.is_closed());
        assert_abs_diff_eq!(circle.middle_point(), p(-2.5, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn circle_planes_start_on_first_axis() {
        let xy = Path::circle_xy(1.0, 1.0, 1.0, TAU).unwrap();
        assert_abs_diff_eq!(xy.starting_point(), p(2.0, 1.0, 0.0), epsilon = 1e-14);
        let yz = Path::circle_yz(0.0, 0.0, 1.0, TAU).unwrap();
        assert_abs_diff_eq!(yz.starting_point(), p(0.0, 1.0, 0.0), epsilon = 1e-14);
        assert_abs_diff_eq!(yz.evaluate(PI / 2.0).unwrap(), p(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn concatenation_adds_lengths_and_junction_breakpoint() {
        let p1 = Path::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        let p2 = Path::line(p(1.0, 0.0, 0.0), p(1.0, 2.0, 0.0))
            .unwrap()
            .line_to(p(0.0, 2.0, 0.0))
            .unwrap();
        let joined = (&p1 >> &p2).unwrap();

        assert_abs_diff_eq!(joined.length(), p1.length() + p2.length(), epsilon = 1e-14);
        assert_eq!(joined.evaluate(p1.length()).unwrap(), p1.endpoint());
        assert_eq!(joined.breakpoints(), &[1.0, 3.0]);
    }

    #[test]
    fn concatenation_requires_matching_endpoints() {
        let p1 = Path::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        let p2 = Path::line(p(1.0, 1e-6, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        assert!(p1.concat(&p2).is_err());
        let p3 = Path::line(p(1.0, 1e-9, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        assert!(p1.concat(&p3).is_ok());
    }

    #[test]
    fn evaluate_out_of_range() {
        let path = Path::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        assert!(path.evaluate(-0.1).is_err());
        assert!(path.evaluate(1.1).is_err());
    }

    #[test]
    fn rectangle_is_closed_with_corner_breakpoints() {
        let rect = Path::rectangle_xz(0.0, 2.0, 0.0, 1.0).unwrap();
        assert!(rect.is_closed());
        assert_abs_diff_eq!(rect.length(), 6.0, epsilon = 1e-14);
        assert_eq!(rect.breakpoints(), &[2.0, 3.0, 5.0]);
    }

    #[test]
    fn add_phase_reroots_closed_path() {
        let rect = Path::rectangle_xy(0.0, 1.0, 0.0, 1.0).unwrap();
        let shifted = rect.add_phase(0.5).unwrap();

        assert_abs_diff_eq!(shifted.starting_point(), p(0.0, 0.5, 0.0), epsilon = 1e-14);
        assert_abs_diff_eq!(shifted.endpoint(), p(0.0, 0.5, 0.0), epsilon = 1e-14);
        assert_eq!(shifted.breakpoints(), &[0.5, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn add_phase_rejects_open_path() {
        let line = Path::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        assert!(line.add_phase(0.2).is_err());
    }

    #[test]
    fn cut_partitions_breakpoints() {
        let path = Path::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0))
            .unwrap()
            .line_to(p(1.0, 1.0, 0.0))
            .unwrap()
            .line_to(p(2.0, 1.0, 0.0))
            .unwrap();
        let (left, right) = path.cut(1.0).unwrap();

        assert_abs_diff_eq!(left.length(), 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(right.length(), 2.0, epsilon = 1e-14);
        assert_eq!(left.breakpoints(), &[1.0]);
        assert_eq!(right.breakpoints(), &[0.0, 1.0]);
        assert_abs_diff_eq!(right.starting_point(), p(1.0, 0.0, 0.0), epsilon = 1e-14);
        assert_abs_diff_eq!(right.endpoint(), p(2.0, 1.0, 0.0), epsilon = 1e-14);

        let (middle, last) = right.cut(1.0).unwrap();
        assert_abs_diff_eq!(middle.endpoint(), p(1.0, 1.0, 0.0), epsilon = 1e-14);
        assert_abs_diff_eq!(last.starting_point(), p(1.0, 1.0, 0.0), epsilon = 1e-14);
        assert!(path.cut(0.0).is_err());
        assert!(path.cut(3.0).is_err());
    }

    #[test]
    fn ellipse_perimeter() {
        let ellipse = Path::ellipse(3.0, 2.0).unwrap();
        // Ramanujan's second approximation is accurate far beyond this tolerance
        let h: f64 = (3.0_f64 - 2.0).powi(2) / (3.0_f64 + 2.0).powi(2);
        let expected = PI * 5.0 * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()));
        assert_relative_eq!(ellipse.length(), expected, max_relative = 2e-7);
        assert!(ellipse.is_closed());
        assert_abs_diff_eq!(ellipse.starting_point(), p(3.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn ellipse_has_uniform_speed_near_start() {
        let ellipse = Path::ellipse(3.0, 2.0).unwrap();
        let ds = 0.01;
        for k in 0..50 {
            let s = f64::from(k) * ds;
            let chord = (ellipse.point_at(s + ds) - ellipse.point_at(s)).norm();
            assert_relative_eq!(chord, ds, max_relative = 1e-4);
        }
    }

    #[test]
    fn irregular_function_breakpoints_follow_arc_length() {
        let path =
            Path::from_irregular_function(|u| Point3::new(4.0 * u, 0.0, 0.0), 50, &[0.25]).unwrap();
        assert_abs_diff_eq!(path.length(), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(path.breakpoints()[0], 1.0, epsilon = 1e-9);
        assert!(Path::from_irregular_function(|u| Point3::new(u, 0.0, 0.0), 50, &[1.5]).is_err());
    }

    #[test]
    fn spline_through_collinear_points() {
        let points = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        let path = Path::spline_through_points(&points, DEFAULT_IRREGULAR_SAMPLES).unwrap();
        assert_abs_diff_eq!(path.length(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(path.middle_point(), p(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn average_radius_of_offset_line() {
        let line = Path::line(p(1.0, 0.0, 0.0), p(3.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(line.average(|q| q.x).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn transforms_keep_length_and_name() {
        let line = Path::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0))
            .unwrap()
            .with_name("electrode");
        let moved = line.move_by(0.0, 0.0, 2.0);
        let rotated = moved
            .rotate(&Vector3::z(), PI / 2.0, &Point3::origin())
            .unwrap();

        assert_eq!(rotated.name(), Some("electrode"));
        assert_abs_diff_eq!(rotated.length(), 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(rotated.endpoint(), p(0.0, 1.0, 2.0), epsilon = 1e-12);

        let mirrored = line.mirror(&Vector3::x(), &p(0.5, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(mirrored.starting_point(), p(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn aperture_profile() {
        let aperture = Path::aperture(0.2, 1.0, 2.0, 5.0).unwrap();
        assert_abs_diff_eq!(aperture.starting_point(), p(2.0, 0.0, 4.9), epsilon = 1e-12);
        assert_abs_diff_eq!(aperture.endpoint(), p(2.0, 0.0, 5.1), epsilon = 1e-12);
        assert_abs_diff_eq!(aperture.length(), 2.2, epsilon = 1e-12);
    }

    #[test]
    fn arc_to_extends_path() {
        let path = Path::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0))
            .unwrap()
            .arc_to(p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0), false)
            .unwrap();
        assert_abs_diff_eq!(path.length(), 1.0 + PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(path.endpoint(), p(2.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
