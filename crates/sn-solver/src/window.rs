//! Active group window of the multigroup operator.

use crate::error::{SolverError, SolverResult};

/// Groups `[cutoff, G)` in solve order: ascending for forward problems,
/// descending for adjoint problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupWindow {
    cutoff: usize,
    number_groups: usize,
    adjoint: bool,
    groups: Vec<usize>,
}

impl GroupWindow {
    pub fn new(cutoff: usize, number_groups: usize, adjoint: bool) -> SolverResult<Self> {
        if cutoff > number_groups {
            return Err(SolverError::ProblemSetup {
                what: format!("upscatter cutoff {cutoff} exceeds {number_groups} groups"),
            });
        }
        let groups = if adjoint {
            (cutoff..number_groups).rev().collect()
        } else {
            (cutoff..number_groups).collect()
        };
        Ok(Self {
            cutoff,
            number_groups,
            adjoint,
            groups,
        })
    }

    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    pub fn number_groups(&self) -> usize {
        self.number_groups
    }

    pub fn adjoint(&self) -> bool {
        self.adjoint
    }

    /// Window groups in solve order.
    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains(&self, g: usize) -> bool {
        g >= self.cutoff && g < self.number_groups
    }

    /// Block position of group `g` in the packed operator vector.
    pub fn position(&self, g: usize) -> Option<usize> {
        if !self.contains(g) {
            return None;
        }
        Some(if self.adjoint {
            self.number_groups - 1 - g
        } else {
            g - self.cutoff
        })
    }

    /// Groups outside the window, in the order they are solved once by
    /// Gauss-Seidel: ascending before the window for forward problems,
    /// descending after it for adjoint problems.
    pub fn outside(&self) -> Vec<usize> {
        if self.adjoint {
            (0..self.cutoff).rev().collect()
        } else {
            (0..self.cutoff).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_adjoint_orders() {
        let fwd = GroupWindow::new(3, 7, false).unwrap();
        assert_eq!(fwd.groups(), &[3, 4, 5, 6]);
        assert_eq!(fwd.outside(), vec![0, 1, 2]);
        assert_eq!(fwd.position(5), Some(2));
        assert_eq!(fwd.position(2), None);

        let adj = GroupWindow::new(3, 7, true).unwrap();
        assert_eq!(adj.groups(), &[6, 5, 4, 3]);
        assert_eq!(adj.outside(), vec![2, 1, 0]);
        assert_eq!(adj.position(6), Some(0));
        assert_eq!(adj.position(3), Some(3));
    }

    #[test]
    fn cutoff_bounds() {
        assert!(GroupWindow::new(8, 7, false).is_err());
        let empty = GroupWindow::new(7, 7, true).unwrap();
        assert!(empty.is_empty());
        let all = GroupWindow::new(0, 2, false).unwrap();
        assert_eq!(all.groups(), &[0, 1]);
    }
}
