use crate::error::Result;

use super::MeshSize;

/// Smallest number of elements per interval between breakpoints.
const MIN_ELEMENTS: f64 = 3.0;

/// Computes the parameter values at which a path of `length` is sampled.
///
/// The range is split at every breakpoint. Each interval receives
/// `N >= 3` elements, `N = ceil(interval / size)` for an absolute size and
/// `N = 3 * max(factor, 1)` (rounded up) for a factor. Every element is
/// sampled `node_multiplier` times, so interval ends (and therefore all
/// breakpoints) are always hit exactly. The final value is `length`.
///
/// # Errors
///
/// Returns an error if the mesh size is not a positive finite number.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn discretize(
    length: f64,
    breakpoints: &[f64],
    size: MeshSize,
    node_multiplier: usize,
) -> Result<Vec<f64>> {
    let size = size.validate()?;
    let multiplier = node_multiplier.max(1);

    let edges: Vec<f64> = std::iter::once(0.0)
        .chain(breakpoints.iter().copied())
        .chain(std::iter::once(length))
        .collect();

    let mut samples = Vec::new();
    for pair in edges.windows(2) {
        let (u0, u1) = (pair[0], pair[1]);
        if u1 <= u0 {
            continue;
        }
        let elements = match size {
            MeshSize::Absolute(s) => ((u1 - u0) / s).ceil().max(MIN_ELEMENTS),
            MeshSize::Factor(f) => (MIN_ELEMENTS * f.max(1.0)).ceil(),
        } as usize;

        let count = elements * multiplier;
        let step = (u1 - u0) / count as f64;
        samples.extend((0..count).map(|i| u0 + i as f64 * step));
    }
    samples.push(length);
    Ok(samples)
}
