//! Restarted GMRES for matrix-free operators.
//!
//! Arnoldi with modified Gram-Schmidt builds the Krylov basis; Givens
//! rotations keep the Hessenberg least-squares problem triangular so the
//! residual norm is available after every step without forming x.

use nalgebra::DMatrix;
use sn_core::{axpy, dot, norm_l2};

use crate::error::{SolverResult, ensure_size};
use crate::monitor::{IterationMonitor, SolveReport};
use crate::operator::LinearOperator;

const BREAKDOWN: f64 = 1e-30;

/// Solve `A x = b` starting from the guess in `x`.
///
/// Residuals are reported to `monitor` with `‖b‖` as the reference, so a
/// relative tolerance is relative to the right-hand side. `restart` is the
/// Krylov subspace size between restarts.
pub fn gmres(
    op: &mut dyn LinearOperator,
    b: &[f64],
    x: &mut [f64],
    restart: usize,
    monitor: &mut IterationMonitor,
) -> SolverResult<SolveReport> {
    let n = op.size();
    ensure_size("gmres right-hand side", n, b.len())?;
    ensure_size("gmres solution", n, x.len())?;

    if monitor.monitor_init(norm_l2(b)) {
        x.fill(0.0);
        return Ok(monitor.report());
    }

    let m = restart.max(1).min(n.max(1));
    let mut ax = vec![0.0; n];
    let mut total = 0;

    loop {
        // r = b - A x
        op.apply(x, &mut ax)?;
        let mut r: Vec<f64> = b.iter().zip(&ax).map(|(bi, ai)| bi - ai).collect();
        let beta = norm_l2(&r);
        if monitor.monitor(total, beta) || beta < BREAKDOWN {
            break;
        }

        let mut basis: Vec<Vec<f64>> = Vec::with_capacity(m + 1);
        r.iter_mut().for_each(|ri| *ri /= beta);
        basis.push(r);

        let mut h = DMatrix::<f64>::zeros(m + 1, m);
        let mut g = vec![0.0; m + 1];
        g[0] = beta;
        let mut cs = vec![0.0; m];
        let mut sn = vec![0.0; m];

        let mut k = 0;
        let mut stop = false;
        while k < m {
            total += 1;
            let mut w = vec![0.0; n];
            op.apply(&basis[k], &mut w)?;

            for (j, v) in basis.iter().enumerate() {
                let hjk = dot(v, &w);
                h[(j, k)] = hjk;
                axpy(-hjk, v, &mut w);
            }
            let w_norm = norm_l2(&w);
            h[(k + 1, k)] = w_norm;

            for j in 0..k {
                let t = cs[j] * h[(j, k)] + sn[j] * h[(j + 1, k)];
                h[(j + 1, k)] = -sn[j] * h[(j, k)] + cs[j] * h[(j + 1, k)];
                h[(j, k)] = t;
            }
            let (c, s) = givens(h[(k, k)], h[(k + 1, k)]);
            cs[k] = c;
            sn[k] = s;
            h[(k, k)] = c * h[(k, k)] + s * h[(k + 1, k)];
            h[(k + 1, k)] = 0.0;
            g[k + 1] = -s * g[k];
            g[k] *= c;

            k += 1;
            if monitor.monitor(total, g[k].abs()) {
                stop = true;
                break;
            }
            if w_norm < BREAKDOWN {
                // Lucky breakdown: the solution lies in the current basis.
                break;
            }
            w.iter_mut().for_each(|wi| *wi /= w_norm);
            basis.push(w);
        }

        // Back substitution on the triangular k x k block.
        let mut y = vec![0.0; k];
        for i in (0..k).rev() {
            let mut sum = g[i];
            for j in i + 1..k {
                sum -= h[(i, j)] * y[j];
            }
            if h[(i, i)].abs() > BREAKDOWN {
                y[i] = sum / h[(i, i)];
            }
        }
        for (yi, v) in y.iter().zip(&basis) {
            axpy(*yi, v, x);
        }

        if stop {
            break;
        }
    }

    Ok(monitor.report())
}

/// Rotation zeroing `b` in `(a, b)`.
fn givens(a: f64, b: f64) -> (f64, f64) {
    if b == 0.0 {
        (1.0, 0.0)
    } else {
        let r = a.hypot(b);
        (a / r, b / r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{IterationStatus, MonitorConfig};
    use crate::operator::DenseOperator;

    fn monitor(rtol: f64, max: usize) -> IterationMonitor {
        IterationMonitor::new(
            "gmres",
            MonitorConfig {
                atol: 0.0,
                rtol,
                max_iterations: max,
                divergence_factor: 1e6,
            },
        )
    }

    fn nonsymmetric() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            4,
            4,
            &[
                4.0, -1.0, 0.5, 0.0, //
                0.3, 3.0, -0.7, 0.2, //
                0.0, 0.9, 5.0, -1.0, //
                1.0, 0.0, -0.4, 2.5,
            ],
        )
    }

    #[test]
    fn matches_direct_solve() {
        let a = nonsymmetric();
        let b = [1.0, -2.0, 0.5, 3.0];
        let expected = a
            .clone()
            .lu()
            .solve(&nalgebra::DVector::from_column_slice(&b))
            .unwrap();

        let mut op = DenseOperator::new(a);
        let mut x = vec![0.0; 4];
        let mut mon = monitor(1e-12, 50);
        let report = gmres(&mut op, &b, &mut x, 10, &mut mon).unwrap();
        assert_eq!(report.status, IterationStatus::Converged);
        assert!(report.iterations <= 4);
        for i in 0..4 {
            assert!((x[i] - expected[i]).abs() < 1e-10, "{} vs {}", x[i], expected[i]);
        }
    }

    #[test]
    fn restarted_solve_converges() {
        let a = nonsymmetric();
        let b = [0.0, 1.0, 0.0, -1.0];
        let mut op = DenseOperator::new(a.clone());
        let mut x = vec![0.0; 4];
        let mut mon = monitor(1e-10, 200);
        let report = gmres(&mut op, &b, &mut x, 2, &mut mon).unwrap();
        assert!(report.converged());

        let ax = &a * nalgebra::DVector::from_column_slice(&x);
        for i in 0..4 {
            assert!((ax[i] - b[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn zero_rhs_returns_zero() {
        let mut op = DenseOperator::new(nonsymmetric());
        let mut x = vec![1.0; 4];
        let mut mon = IterationMonitor::new("gmres", MonitorConfig::default());
        let report = gmres(&mut op, &[0.0; 4], &mut x, 5, &mut mon).unwrap();
        assert!(report.converged());
        assert_eq!(report.iterations, 0);
        assert_eq!(x, vec![0.0; 4]);
    }

    #[test]
    fn exact_initial_guess_needs_no_iterations() {
        let a = DMatrix::<f64>::identity(3, 3) * 2.0;
        let mut op = DenseOperator::new(a);
        let mut x = vec![0.5, 1.0, 1.5];
        let mut mon = monitor(1e-12, 10);
        let report = gmres(&mut op, &[1.0, 2.0, 3.0], &mut x, 5, &mut mon).unwrap();
        assert!(report.converged());
        assert_eq!(report.iterations, 0);
        assert_eq!(x, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let mut op = DenseOperator::new(nonsymmetric());
        let mut x = vec![0.0; 3];
        let mut mon = monitor(1e-8, 10);
        assert!(gmres(&mut op, &[1.0; 4], &mut x, 5, &mut mon).is_err());
    }
}
