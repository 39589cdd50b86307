//! Built-in cross-section sets.

use crate::error::MaterialResult;
use crate::material::Material;

/// Single-material, single-group data with χ = 1.
pub fn one_group(sigma_t: f64, sigma_s: f64, nu_sigma_f: f64) -> MaterialResult<Material> {
    let mut mat = Material::new(1, 1)?;
    mat.set_sigma_t(0, 0, sigma_t)?;
    mat.set_sigma_s(0, 0, 0, sigma_s)?;
    mat.set_nu_sigma_f(0, 0, nu_sigma_f)?;
    mat.set_chi(0, 0, 1.0)?;
    mat.compute_sigma_a();
    mat.finalize()?;
    Ok(mat)
}

const UO2_SIGMA_T: [f64; 7] = [
    1.77949e-01,
    3.29805e-01,
    4.80388e-01,
    5.54367e-01,
    3.11801e-01,
    3.95168e-01,
    5.64406e-01,
];

const UO2_SIGMA_F: [f64; 7] = [
    7.21206e-03,
    8.19301e-04,
    6.45320e-03,
    1.85648e-02,
    1.78084e-02,
    8.30348e-02,
    2.16004e-01,
];

const UO2_NU: [f64; 7] = [2.78145, 2.47443, 2.43383, 2.43380, 2.43380, 2.43380, 2.43380];

const UO2_CHI: [f64; 7] = [5.87819e-01, 4.11760e-01, 3.39060e-04, 1.17610e-07, 0.0, 0.0, 0.0];

/// Scattering from group g' (row) to group g (column).
const UO2_SCATTER: [[f64; 7]; 7] = [
    [1.27537e-01, 4.23780e-02, 9.43740e-06, 5.51630e-09, 0.0, 0.0, 0.0],
    [0.0, 3.24456e-01, 1.63140e-03, 3.14270e-09, 0.0, 0.0, 0.0],
    [0.0, 0.0, 4.50940e-01, 2.67920e-03, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 4.52565e-01, 5.56640e-03, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.25250e-04, 2.71401e-01, 1.02550e-02, 1.00210e-08],
    [0.0, 0.0, 0.0, 0.0, 1.29680e-03, 2.65802e-01, 1.68090e-02],
    [0.0, 0.0, 0.0, 0.0, 0.0, 8.54580e-03, 2.73080e-01],
];

/// Seven-group UO2 fuel data from the C5G7 benchmark.
pub fn c5g7_uo2() -> MaterialResult<Material> {
    let mut mat = Material::new(1, 7)?;
    for g in 0..7 {
        mat.set_sigma_t(0, g, UO2_SIGMA_T[g])?;
        mat.set_nu_sigma_f(0, g, UO2_NU[g] * UO2_SIGMA_F[g])?;
        mat.set_chi(0, g, UO2_CHI[g])?;
        for (gp, row) in UO2_SCATTER.iter().enumerate() {
            mat.set_sigma_s(0, g, gp, row[g])?;
        }
    }
    mat.compute_sigma_a();
    mat.finalize()?;
    Ok(mat)
}

/// Look up a built-in set by name.
pub fn by_name(name: &str) -> Option<MaterialResult<Material>> {
    match name {
        "c5g7_uo2" | "uo2" => Some(c5g7_uo2()),
        _ => None,
    }
}
