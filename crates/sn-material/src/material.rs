//! Multigroup cross-section container.

use tracing::debug;

use crate::error::{MaterialError, MaterialResult};

/// Cross sections for `number_materials` materials in `number_groups` groups.
///
/// Scattering is stored as σs(m, g ← g'), i.e. indexed by destination group
/// first.
#[derive(Debug, Clone)]
pub struct Material {
    number_materials: usize,
    number_groups: usize,
    sigma_t: Vec<f64>,
    sigma_a: Vec<f64>,
    nu_sigma_f: Vec<f64>,
    chi: Vec<f64>,
    sigma_s: Vec<f64>,
    lower: Vec<usize>,
    upper: Vec<usize>,
    upscatter_cutoff: usize,
    finalized: bool,
}

impl Material {
    pub fn new(number_materials: usize, number_groups: usize) -> MaterialResult<Self> {
        if number_materials == 0 || number_groups == 0 {
            return Err(MaterialError::Empty);
        }
        let n = number_materials * number_groups;
        Ok(Self {
            number_materials,
            number_groups,
            sigma_t: vec![0.0; n],
            sigma_a: vec![0.0; n],
            nu_sigma_f: vec![0.0; n],
            chi: vec![0.0; n],
            sigma_s: vec![0.0; n * number_groups],
            lower: (0..number_groups).collect(),
            upper: (0..number_groups).collect(),
            upscatter_cutoff: number_groups,
            finalized: false,
        })
    }

    pub fn number_materials(&self) -> usize {
        self.number_materials
    }

    pub fn number_groups(&self) -> usize {
        self.number_groups
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn check(&self, m: usize, g: usize) -> MaterialResult<usize> {
        if m >= self.number_materials {
            return Err(MaterialError::IndexOob {
                what: "material",
                index: m,
                len: self.number_materials,
            });
        }
        if g >= self.number_groups {
            return Err(MaterialError::IndexOob {
                what: "group",
                index: g,
                len: self.number_groups,
            });
        }
        Ok(m * self.number_groups + g)
    }

    fn set(
        &mut self,
        field: Field,
        m: usize,
        g: usize,
        value: f64,
    ) -> MaterialResult<()> {
        let i = self.check(m, g)?;
        if !value.is_finite() {
            return Err(MaterialError::InvalidValue {
                what: field.name(),
                material: m,
                group: g,
                value,
            });
        }
        let data = match field {
            Field::Total => &mut self.sigma_t,
            Field::Absorption => &mut self.sigma_a,
            Field::NuFission => &mut self.nu_sigma_f,
            Field::Chi => &mut self.chi,
        };
        data[i] = value;
        self.finalized = false;
        Ok(())
    }

    pub fn set_sigma_t(&mut self, m: usize, g: usize, value: f64) -> MaterialResult<()> {
        self.set(Field::Total, m, g, value)
    }

    pub fn set_sigma_a(&mut self, m: usize, g: usize, value: f64) -> MaterialResult<()> {
        self.set(Field::Absorption, m, g, value)
    }

    pub fn set_nu_sigma_f(&mut self, m: usize, g: usize, value: f64) -> MaterialResult<()> {
        self.set(Field::NuFission, m, g, value)
    }

    pub fn set_chi(&mut self, m: usize, g: usize, value: f64) -> MaterialResult<()> {
        self.set(Field::Chi, m, g, value)
    }

    /// Set σs(m, g ← gp).
    pub fn set_sigma_s(&mut self, m: usize, g: usize, gp: usize, value: f64) -> MaterialResult<()> {
        let i = self.check(m, g)?;
        self.check(m, gp)?;
        if !value.is_finite() {
            return Err(MaterialError::InvalidValue {
                what: "sigma_s",
                material: m,
                group: g,
                value,
            });
        }
        self.sigma_s[i * self.number_groups + gp] = value;
        self.finalized = false;
        Ok(())
    }

    #[inline]
    pub fn sigma_t(&self, m: usize, g: usize) -> f64 {
        self.sigma_t[m * self.number_groups + g]
    }

    #[inline]
    pub fn sigma_a(&self, m: usize, g: usize) -> f64 {
        self.sigma_a[m * self.number_groups + g]
    }

    #[inline]
    pub fn nu_sigma_f(&self, m: usize, g: usize) -> f64 {
        self.nu_sigma_f[m * self.number_groups + g]
    }

    #[inline]
    pub fn chi(&self, m: usize, g: usize) -> f64 {
        self.chi[m * self.number_groups + g]
    }

    /// σs(m, g ← gp).
    #[inline]
    pub fn sigma_s(&self, m: usize, g: usize, gp: usize) -> f64 {
        self.sigma_s[(m * self.number_groups + g) * self.number_groups + gp]
    }

    /// Lowest group scattering into `g` in any material.
    pub fn lower(&self, g: usize) -> usize {
        self.lower[g]
    }

    /// Highest group scattering into `g` in any material.
    pub fn upper(&self, g: usize) -> usize {
        self.upper[g]
    }

    /// Smallest group receiving upscatter from a higher group, or
    /// `number_groups` when scattering is downscatter only.
    ///
    /// Groups below the cutoff are solved once each: in ascending order
    /// before the coupled block for forward problems, in descending order
    /// after it for adjoint problems.
    pub fn upscatter_cutoff(&self) -> usize {
        self.upscatter_cutoff
    }

    /// σa = σt − Σ_g' σs(g' ← g).
    pub fn compute_sigma_a(&mut self) {
        let ng = self.number_groups;
        for m in 0..self.number_materials {
            for g in 0..ng {
                let out: f64 = (0..ng).map(|gp| self.sigma_s(m, gp, g)).sum();
                self.sigma_a[m * ng + g] = self.sigma_t(m, g) - out;
            }
        }
    }

    /// Validate data and derive scatter bounds and the upscatter cutoff.
    pub fn finalize(&mut self) -> MaterialResult<()> {
        let ng = self.number_groups;
        for m in 0..self.number_materials {
            for g in 0..ng {
                let st = self.sigma_t(m, g);
                if st < 0.0 {
                    return Err(MaterialError::InvalidValue {
                        what: "sigma_t",
                        material: m,
                        group: g,
                        value: st,
                    });
                }
                for gp in 0..ng {
                    let ss = self.sigma_s(m, g, gp);
                    if ss < 0.0 {
                        return Err(MaterialError::InvalidValue {
                            what: "sigma_s",
                            material: m,
                            group: g,
                            value: ss,
                        });
                    }
                }
            }
        }

        let scatters = |g: usize, gp: usize| {
            (0..self.number_materials).any(|m| self.sigma_s(m, g, gp) != 0.0)
        };
        let mut lower: Vec<usize> = (0..ng).collect();
        let mut upper: Vec<usize> = (0..ng).collect();
        for g in 0..ng {
            if let Some(gp) = (0..ng).find(|&gp| scatters(g, gp)) {
                lower[g] = gp;
            }
            if let Some(gp) = (0..ng).rev().find(|&gp| scatters(g, gp)) {
                upper[g] = gp;
            }
        }
        let cutoff = (0..ng).find(|&g| upper[g] > g).unwrap_or(ng);

        self.lower = lower;
        self.upper = upper;
        self.upscatter_cutoff = cutoff;
        self.finalized = true;
        debug!(
            "Finalized {} materials, {} groups: upscatter cutoff {}",
            self.number_materials, ng, cutoff
        );
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Field {
    Total,
    Absorption,
    NuFission,
    Chi,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Total => "sigma_t",
            Field::Absorption => "sigma_a",
            Field::NuFission => "nu_sigma_f",
            Field::Chi => "chi",
        }
    }
}
