//! Shared mass grid and linear interpolation for the two-curve band.

use thiserror::Error;

/// Number of points on the shared grid used by the two-curve fill.
pub const GRID_POINTS: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("log grid needs positive bounds, got [{lo}, {hi}]")]
    NonPositive { lo: f64, hi: f64 },
    #[error("log grid needs at least 2 points, got {0}")]
    TooFewPoints(usize),
}

/// `n` points spaced evenly in log10 between `lo` and `hi`, both included.
pub fn log_grid(lo: f64, hi: f64, n: usize) -> Result<Vec<f64>, GridError> {
    if !(lo > 0.0 && hi > 0.0) || !lo.is_finite() || !hi.is_finite() {
        return Err(GridError::NonPositive { lo, hi });
    }
    if n < 2 {
        return Err(GridError::TooFewPoints(n));
    }

    let (a, b) = (lo.log10(), hi.log10());
    let step = (b - a) / (n - 1) as f64;
    let mut grid: Vec<f64> = (0..n).map(|i| 10f64.powf(a + step * i as f64)).collect();
    // powf round-trips are not exact at the ends
    grid[0] = lo;
    grid[n - 1] = hi;
    Ok(grid)
}

/// Piecewise-linear interpolation of `(xp, fp)` at each of `x`.
///
/// `xp` is expected to be increasing; it is not sorted here. Points left of
/// `xp[0]` take `fp[0]` and points right of the last sample take the last
/// value. An empty table yields NaN.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    let len = xp.len().min(fp.len());
    if len == 0 {
        return vec![f64::NAN; x.len()];
    }
    let (xp, fp) = (&xp[..len], &fp[..len]);

    x.iter()
        .map(|&target| {
            if target.is_nan() {
                return f64::NAN;
            }
            if target <= xp[0] {
                return fp[0];
            }
            if target >= xp[len - 1] {
                return fp[len - 1];
            }
            // first index with xp[i] > target; target is strictly inside
            let i = xp.partition_point(|&v| v <= target);
            let (x0, x1) = (xp[i - 1], xp[i]);
            let (y0, y1) = (fp[i - 1], fp[i]);
            if x1 == x0 {
                return y1;
            }
            y0 + (y1 - y0) * (target - x0) / (x1 - x0)
        })
        .collect()
}
