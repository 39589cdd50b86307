//! Gauss-Legendre nodes and weights on [-1, 1].

use crate::error::{AngleError, AngleResult};
use std::f64::consts::PI;

const MAX_NEWTON: usize = 100;

/// Positive Gauss-Legendre nodes of a rule of order `2 * half`, largest
/// first, with their weights. The returned weights sum to one.
pub fn positive_half(half: usize) -> AngleResult<(Vec<f64>, Vec<f64>)> {
    let n = 2 * half;
    let mut nodes = Vec::with_capacity(half);
    let mut weights = Vec::with_capacity(half);
    for i in 0..half {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut converged = false;
        for _ in 0..MAX_NEWTON {
            let (p, dp) = legendre(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() <= 1e-15 * x.abs().max(1.0) {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(AngleError::RootSearch { order: n });
        }
        let (_, dp) = legendre(n, x);
        nodes.push(x);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }
    Ok((nodes, weights))
}

/// P_n(x) and its derivative by the three-term recurrence.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_point_rule() {
        let (x, w) = positive_half(1).unwrap();
        assert!((x[0] - 1.0 / 3.0_f64.sqrt()).abs() < 1e-15);
        assert!((w[0] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn half_weights_sum_to_one() {
        for half in 1..=8 {
            let (x, w) = positive_half(half).unwrap();
            let sum: f64 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-13, "half={half} sum={sum}");
            assert!(x.windows(2).all(|p| p[0] > p[1]));
        }
    }

    #[test]
    fn integrates_even_polynomials() {
        // Order 2n integrates x^(4n-2) exactly; check x^2 with four points.
        let (x, w) = positive_half(2).unwrap();
        let integral: f64 = 2.0 * x.iter().zip(&w).map(|(x, w)| w * x * x).sum::<f64>();
        assert!((integral - 2.0 / 3.0).abs() < 1e-14);
    }
}
