//! Not-a-knot cubic splines through tabulated data.
//!
//! Besides plain interpolation the splines expose their first derivative and the
//! cumulative integral over the knots, which is what arc-length re-parametrization
//! of sampled curves needs.

use crate::error::{GeometryError, Result};

use super::{Point3, Vector3};

/// A not-a-knot cubic spline interpolator for real-valued data.
///
/// Given `n` data points `(x_i, y_i)`, constructs piecewise cubic polynomials
/// with continuous first and second derivatives. The third derivative is also
/// continuous across the second and the second-to-last knot, so cubic data is
/// reproduced exactly. Three points give the interpolating parabola and two
/// points a straight line.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Strictly increasing knots.
    xs: Vec<f64>,
    /// Values at the knots.
    ys: Vec<f64>,
    /// Second derivatives at the knots.
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Constructs a not-a-knot cubic spline from data points.
    ///
    /// # Errors
    ///
    /// Returns an error if `xs` and `ys` differ in length, fewer than two
    /// points are given, or `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(GeometryError::InvalidInput(format!(
                "spline needs as many values ({}) as knots ({})",
                ys.len(),
                xs.len()
            ))
            .into());
        }
        if xs.len() < 2 {
            return Err(
                GeometryError::InvalidInput("spline needs at least 2 data points".into()).into(),
            );
        }
        if let Some(i) = (1..xs.len()).find(|&i| xs[i] <= xs[i - 1] || !xs[i].is_finite()) {
            return Err(GeometryError::Degenerate(format!(
                "spline knots must be strictly increasing (violated at index {i})"
            ))
            .into());
        }

        let y2s = not_a_knot_curvatures(&xs, &ys);

        Ok(Self { xs, ys, y2s })
    }

    /// Returns the knots of the spline.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.xs
    }

    /// Returns the values at the knots.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.ys
    }

    /// Finds the interval `[lo, lo + 1]` used to evaluate at `x`.
    ///
    /// Values outside the knot range map to the boundary intervals.
    fn interval(&self, x: f64) -> usize {
        let mut lo = 0;
        let mut hi = self.xs.len() - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] > x {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        lo
    }

    /// Evaluates the spline at `x`.
    ///
    /// Extrapolation beyond the data range uses the boundary polynomial.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let lo = self.interval(x);
        let hi = lo + 1;
        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0
    }

    /// Evaluates the first derivative of the spline at `x`.
    #[must_use]
    pub fn derivative(&self, x: f64) -> f64 {
        let lo = self.interval(x);
        let hi = lo + 1;
        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        (self.ys[hi] - self.ys[lo]) / h - (3.0 * a * a - 1.0) / 6.0 * h * self.y2s[lo]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.y2s[hi]
    }

    /// Returns the integral of the spline from the first knot up to every knot.
    ///
    /// The first entry is always zero.
    #[must_use]
    pub fn cumulative_integral(&self) -> Vec<f64> {
        let mut total = 0.0;
        let mut result = Vec::with_capacity(self.xs.len());
        result.push(0.0);
        for i in 0..self.xs.len() - 1 {
            let h = self.xs[i + 1] - self.xs[i];
            total += h * (self.ys[i] + self.ys[i + 1]) / 2.0
                - h * h * h * (self.y2s[i] + self.y2s[i + 1]) / 24.0;
            result.push(total);
        }
        result
    }
}

/// Second derivatives at the knots of the not-a-knot spline through the data.
///
/// The end conditions eliminate the first and last unknown, leaving a
/// tridiagonal system over the interior knots.
fn not_a_knot_curvatures(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let slopes: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    match n {
        2 => return vec![0.0; 2],
        3 => return vec![2.0 * (slopes[1] - slopes[0]) / (h[0] + h[1]); 3],
        _ => {}
    }

    // Row i - 1 couples the interior knots i - 1, i and i + 1
    let m = n - 2;
    let mut lower = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut upper = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for i in 1..=m {
        lower[i - 1] = h[i - 1];
        diag[i - 1] = 2.0 * (h[i - 1] + h[i]);
        upper[i - 1] = h[i];
        rhs[i - 1] = 6.0 * (slopes[i] - slopes[i - 1]);
    }
    let (h0, h1) = (h[0], h[1]);
    diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
    upper[0] = (h1 - h0) * (h1 + h0) / h1;
    let (a, b) = (h[n - 3], h[n - 2]);
    diag[m - 1] = (a + b) * (2.0 * a + b) / a;
    lower[m - 1] = (a - b) * (a + b) / a;

    // Thomas algorithm
    for i in 1..m {
        let w = lower[i] / diag[i - 1];
        diag[i] -= w * upper[i - 1];
        rhs[i] -= w * rhs[i - 1];
    }
    let mut interior = vec![0.0; m];
    interior[m - 1] = rhs[m - 1] / diag[m - 1];
    for i in (0..m - 1).rev() {
        interior[i] = (rhs[i] - upper[i] * interior[i + 1]) / diag[i];
    }

    let first = ((h0 + h1) * interior[0] - h0 * interior[1]) / h1;
    let last = ((a + b) * interior[m - 1] - b * interior[m - 2]) / a;
    let mut y2s = Vec::with_capacity(n);
    y2s.push(first);
    y2s.extend(interior);
    y2s.push(last);
    y2s
}

/// A cubic spline through 3D points, one [`CubicSpline`] per coordinate.
#[derive(Debug, Clone)]
pub struct SplineCurve3 {
    x: CubicSpline,
    y: CubicSpline,
    z: CubicSpline,
}

impl SplineCurve3 {
    /// Fits a spline through `points` sampled at the parameters `ts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengths differ, fewer than two points are given,
    /// or `ts` is not strictly increasing.
    pub fn new(ts: &[f64], points: &[Point3]) -> Result<Self> {
        let coords = |i: usize| points.iter().map(|p| p[i]).collect::<Vec<_>>();
        Ok(Self {
            x: CubicSpline::new(ts.to_vec(), coords(0))?,
            y: CubicSpline::new(ts.to_vec(), coords(1))?,
            z: CubicSpline::new(ts.to_vec(), coords(2))?,
        })
    }

    /// Evaluates the curve at parameter `t`.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> Point3 {
        Point3::new(self.x.evaluate(t), self.y.evaluate(t), self.z.evaluate(t))
    }

    /// Evaluates the parametric derivative at `t`.
    #[must_use]
    pub fn derivative(&self, t: f64) -> Vector3 {
        Vector3::new(
            self.x.derivative(t),
            self.y.derivative(t),
            self.z.derivative(t),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn passes_through_data_points() {
        let xs = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = vec![2.0, 3.0, 5.0, 4.0, 1.0];
        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();

        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_abs_diff_eq!(spline.evaluate(*x), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn linear_data_is_reproduced_exactly() {
        let xs: Vec<f64> = (0..6).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();

        assert_abs_diff_eq!(spline.evaluate(2.5), 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.derivative(3.7), 2.0, epsilon = 1e-12);
        let integral = spline.cumulative_integral();
        // integral of 2x + 1 over [0, 5]
        assert_abs_diff_eq!(integral[5], 30.0, epsilon = 1e-12);
    }

    #[test]
    fn derivative_of_smooth_function() {
        let xs: Vec<f64> = (0..=200).map(|i| f64::from(i) / 200.0 * 3.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();

        assert_abs_diff_eq!(spline.derivative(1.3), 1.3_f64.cos(), epsilon = 1e-5);
        let integral = spline.cumulative_integral();
        assert_abs_diff_eq!(*integral.last().unwrap(), 1.0 - 3.0_f64.cos(), epsilon = 1e-6);
    }

    #[test]
    fn cubic_data_is_reproduced_exactly() {
        let xs = vec![0.0, 0.3, 1.0, 1.2, 2.0, 3.5];
        let cubic = |x: f64| x * x * x - 2.0 * x + 1.0;
        let ys: Vec<f64> = xs.iter().map(|&x| cubic(x)).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();

        for x in [0.05, 0.7, 1.1, 2.9, 3.4] {
            assert_abs_diff_eq!(spline.evaluate(x), cubic(x), epsilon = 1e-10);
            assert_abs_diff_eq!(spline.derivative(x), 3.0 * x * x - 2.0, epsilon = 1e-10);
        }
        // integral of x^3 - 2x + 1 over [0, 3.5]
        let expected = 3.5_f64.powi(4) / 4.0 - 3.5 * 3.5 + 3.5;
        assert_abs_diff_eq!(
            *spline.cumulative_integral().last().unwrap(),
            expected,
            epsilon = 1e-10
        );
    }

    #[test]
    fn three_points_give_a_parabola() {
        let spline = CubicSpline::new(vec![0.0, 1.0, 3.0], vec![0.0, 1.0, 9.0]).unwrap();
        assert_abs_diff_eq!(spline.evaluate(2.0), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.derivative(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.derivative(2.5), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_unsorted_knots() {
        assert!(CubicSpline::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 2.0]).is_err());
        assert!(CubicSpline::new(vec![0.0], vec![0.0]).is_err());
        assert!(CubicSpline::new(vec![0.0, 1.0], vec![0.0]).is_err());
    }

    #[test]
    fn curve_through_points() {
        let ts = [0.0, 0.5, 1.0];
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let curve = SplineCurve3::new(&ts, &points).unwrap();
        assert_abs_diff_eq!(curve.evaluate(0.5), points[1], epsilon = 1e-12);
        assert_abs_diff_eq!(curve.derivative(0.5).x, 2.0, epsilon = 1e-12);
    }
}
