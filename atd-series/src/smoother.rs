//! Local polynomial (Savitzky-Golay) smoothing.
//!
//! Interior points are the value at the window centre of a least squares
//! polynomial fitted to the surrounding window. The first and last
//! `window / 2` points are evaluated on a single polynomial fitted to the
//! first (last) `window` samples, so no padding or mirroring is involved.

use crate::config::SmoothingConfig;
use crate::error::{Result, SeriesError};

/// Smooth `values` with the given window and polynomial degree.
///
/// The window must be odd, non-zero, no longer than `values` and larger
/// than `degree`.
pub fn smooth(values: &[f64], config: SmoothingConfig) -> Result<Vec<f64>> {
    let SmoothingConfig { window, degree } = config;
    let len = values.len();
    if window == 0 || window % 2 == 0 || window > len || degree >= window {
        return Err(SeriesError::InvalidSmoothingWindow {
            window,
            degree,
            len,
        });
    }

    let half = window / 2;
    let centre = fit_weights(window, degree, 0.0);
    let mut out = vec![0.0; len];

    for i in half..len - half {
        out[i] = dot(&centre, &values[i - half..=i + half]);
    }

    let head = &values[..window];
    for (i, slot) in out.iter_mut().enumerate().take(half) {
        let weights = fit_weights(window, degree, i as f64 - half as f64);
        *slot = dot(&weights, head);
    }

    let tail_start = len - window;
    let tail = &values[tail_start..];
    for i in len - half..len {
        let offset = (i - tail_start) as f64 - half as f64;
        let weights = fit_weights(window, degree, offset);
        out[i] = dot(&weights, tail);
    }

    Ok(out)
}

/// Smooth and clip negative results to zero.
pub fn smooth_non_negative(values: &[f64], config: SmoothingConfig) -> Result<Vec<f64>> {
    let mut out = smooth(values, config)?;
    clip_negative(&mut out);
    Ok(out)
}

pub fn clip_negative(values: &mut [f64]) {
    for v in values.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}

/// Weights `w` such that `w · y` is the least squares polynomial fit of
/// `y` (sampled at x = -half..=half) evaluated at `x = at`.
///
/// With Vandermonde matrix `A`, the fitted value is `v^T (A^T A)^-1 A^T y`
/// where `v = [1, at, at^2, ..]`, so `w = A z` with `(A^T A) z = v`.
fn fit_weights(window: usize, degree: usize, at: f64) -> Vec<f64> {
    let half = (window / 2) as f64;
    let xs: Vec<f64> = (0..window).map(|j| j as f64 - half).collect();
    let terms = degree + 1;

    let mut normal = vec![vec![0.0; terms]; terms];
    for (row, normal_row) in normal.iter_mut().enumerate() {
        for (col, cell) in normal_row.iter_mut().enumerate() {
            *cell = xs.iter().map(|x| x.powi((row + col) as i32)).sum();
        }
    }
    let rhs: Vec<f64> = (0..terms).map(|k| at.powi(k as i32)).collect();
    let z = solve(normal, rhs);

    xs.iter()
        .map(|x| z.iter().enumerate().map(|(k, zk)| zk * x.powi(k as i32)).sum())
        .collect()
}

/// Gaussian elimination with partial pivoting. The normal matrix of
/// distinct sample points is symmetric positive definite whenever the
/// window exceeds the degree, so pivots are never zero.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x
}
