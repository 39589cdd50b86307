/// Floating point type used throughout system
pub type Real = f64;

/// Vector norm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Norm {
    L1,
    #[default]
    L2,
    LInf,
}

/// Dot product, accumulated in index order.
pub fn dot(a: &[Real], b: &[Real]) -> Real {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(v: &[Real], kind: Norm) -> Real {
    match kind {
        Norm::L1 => v.iter().map(|x| x.abs()).sum(),
        Norm::L2 => dot(v, v).sqrt(),
        Norm::LInf => v.iter().fold(0.0, |m, x| m.max(x.abs())),
    }
}

pub fn norm_l2(v: &[Real]) -> Real {
    norm(v, Norm::L2)
}

/// Norm of `a - b` without allocating the difference.
pub fn norm_residual(a: &[Real], b: &[Real], kind: Norm) -> Real {
    debug_assert_eq!(a.len(), b.len());
    let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
    match kind {
        Norm::L1 => diffs.sum(),
        Norm::L2 => diffs.map(|d| d * d).sum::<Real>().sqrt(),
        Norm::LInf => diffs.fold(0.0, Real::max),
    }
}

/// y <- y + alpha * x
pub fn axpy(alpha: Real, x: &[Real], y: &mut [Real]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}
