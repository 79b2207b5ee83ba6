//! Adaptive Gauss–Kronrod quadrature.

use crate::error::{GeometryError, Result};

/// Kronrod abscissae of the 15-point rule (positive half, descending).
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

/// Weights of the 15-point Kronrod rule.
const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_2,
    0.140_653_259_715_525_9,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_8,
];

/// Weights of the embedded 7-point Gauss rule (at the odd Kronrod abscissae).
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

const ABSOLUTE_TOLERANCE: f64 = 1.49e-8;
const RELATIVE_TOLERANCE: f64 = 1.49e-8;
const MAX_DEPTH: u32 = 30;

/// Integrates `f` over `[a, b]`.
///
/// The points in `break_points` that fall strictly inside the interval are
/// used as forced subinterval ends, so kinks in the integrand never sit
/// inside a single quadrature panel.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] as soon as a panel evaluates to a
/// non-finite value.
pub fn integrate<F>(f: F, a: f64, b: f64, break_points: &[f64]) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut ends: Vec<f64> = break_points
        .iter()
        .copied()
        .filter(|&p| p > a && p < b)
        .collect();
    ends.sort_by(f64::total_cmp);
    ends.dedup();

    let mut lower = a;
    let mut total = 0.0;
    for upper in ends.into_iter().chain(std::iter::once(b)) {
        if upper > lower {
            let (estimate, _) = panel(&f, lower, upper)?;
            total += adapt(&f, lower, upper, estimate, MAX_DEPTH)?;
        }
        lower = upper;
    }
    Ok(total)
}

fn adapt<F>(f: &F, a: f64, b: f64, whole: f64, depth: u32) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mid = 0.5 * (a + b);
    let (left, left_err) = panel(f, a, mid)?;
    let (right, right_err) = panel(f, mid, b)?;
    let refined = left + right;
    let tolerance = ABSOLUTE_TOLERANCE.max(RELATIVE_TOLERANCE * refined.abs());

    if depth == 0 || (left_err + right_err <= tolerance && (refined - whole).abs() <= tolerance) {
        Ok(refined)
    } else {
        Ok(adapt(f, a, mid, left, depth - 1)? + adapt(f, mid, b, right, depth - 1)?)
    }
}

/// [`kronrod15`] rejecting non-finite results.
fn panel<F>(f: &F, a: f64, b: f64) -> Result<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let (estimate, error) = kronrod15(f, a, b);
    if estimate.is_finite() && error.is_finite() {
        Ok((estimate, error))
    } else {
        Err(GeometryError::Degenerate(format!("integrand is not finite on [{a}, {b}]")).into())
    }
}

/// Applies the 15-point Kronrod rule, returning the estimate and the
/// difference to the embedded Gauss rule as error estimate.
fn kronrod15<F>(f: &F, a: f64, b: f64) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let fc = f(center);
    let mut kronrod = fc * WGK[7];
    let mut gauss = fc * WG[3];

    for j in 0..7 {
        let dx = half * XGK[j];
        let pair = f(center - dx) + f(center + dx);
        kronrod += WGK[j] * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    (kronrod * half, ((kronrod - gauss) * half).abs())
}
