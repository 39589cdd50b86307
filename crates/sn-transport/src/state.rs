//! Flux moments and optional angular flux for every group.

use crate::error::{TransportError, TransportResult, ensure_size};

/// Session-scoped unknowns.
///
/// Scattering is isotropic, so each group carries one spatial moment per
/// cell and `moments_size()` equals the number of cells.
#[derive(Debug, Clone)]
pub struct State {
    moments_size: usize,
    phi: Vec<Vec<f64>>,
    psi: Option<Vec<Vec<Vec<f64>>>>,
    eigenvalue: f64,
    adjoint: bool,
}

impl State {
    /// `number_angles` sizes the angular flux store when `store_psi` is set.
    pub fn new(
        number_groups: usize,
        number_cells: usize,
        number_angles: usize,
        store_psi: bool,
        adjoint: bool,
    ) -> Self {
        let psi = store_psi
            .then(|| vec![vec![vec![0.0; number_cells]; number_angles]; number_groups]);
        Self {
            moments_size: number_cells,
            phi: vec![vec![0.0; number_cells]; number_groups],
            psi,
            eigenvalue: 1.0,
            adjoint,
        }
    }

    pub fn number_groups(&self) -> usize {
        self.phi.len()
    }

    pub fn moments_size(&self) -> usize {
        self.moments_size
    }

    pub fn adjoint(&self) -> bool {
        self.adjoint
    }

    pub fn eigenvalue(&self) -> f64 {
        self.eigenvalue
    }

    pub fn set_eigenvalue(&mut self, k: f64) {
        self.eigenvalue = k;
    }

    pub fn phi(&self, g: usize) -> &[f64] {
        &self.phi[g]
    }

    pub fn phi_mut(&mut self, g: usize) -> &mut [f64] {
        &mut self.phi[g]
    }

    pub fn all_phi(&self) -> &[Vec<f64>] {
        &self.phi
    }

    pub fn set_phi(&mut self, g: usize, phi: Vec<f64>) -> TransportResult<()> {
        if g >= self.phi.len() {
            return Err(TransportError::GroupOutOfRange {
                group: g,
                groups: self.phi.len(),
            });
        }
        ensure_size("group flux moments", self.moments_size, phi.len())?;
        self.phi[g] = phi;
        Ok(())
    }

    pub fn store_psi(&self) -> bool {
        self.psi.is_some()
    }

    /// Angular flux of group `g`, indexed `[angle_index][cell]`.
    pub fn psi(&self, g: usize) -> Option<&[Vec<f64>]> {
        self.psi.as_ref().map(|p| p[g].as_slice())
    }

    /// Split borrow of group `g`: flux moments and angular flux store.
    pub fn phi_and_psi_mut(&mut self, g: usize) -> (&mut [f64], Option<&mut [Vec<f64>]>) {
        let psi = self.psi.as_mut().map(|p| p[g].as_mut_slice());
        (&mut self.phi[g], psi)
    }

    /// Zero all flux.
    pub fn clear(&mut self) {
        for phi in &mut self.phi {
            phi.fill(0.0);
        }
        if let Some(psi) = &mut self.psi {
            psi.iter_mut().flatten().for_each(|v| v.fill(0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_setters() {
        let mut state = State::new(3, 4, 2, false, false);
        assert_eq!(state.number_groups(), 3);
        assert_eq!(state.moments_size(), 4);
        assert!(!state.store_psi());
        state.set_phi(1, vec![1.0; 4]).unwrap();
        assert_eq!(state.phi(1), &[1.0; 4]);
        assert!(state.set_phi(1, vec![1.0; 3]).is_err());
        assert!(matches!(
            state.set_phi(3, vec![1.0; 4]),
            Err(TransportError::GroupOutOfRange { group: 3, groups: 3 })
        ));
    }

    #[test]
    fn psi_store_is_optional() {
        let mut state = State::new(2, 3, 4, true, true);
        assert!(state.adjoint());
        {
            let (phi, psi) = state.phi_and_psi_mut(1);
            phi[0] = 2.0;
            psi.unwrap()[3][2] = 5.0;
        }
        assert_eq!(state.psi(1).unwrap()[3][2], 5.0);
        state.clear();
        assert_eq!(state.psi(1).unwrap()[3][2], 0.0);
        assert_eq!(state.phi(1)[0], 0.0);
    }
}
