//! Boundary angular flux storage and the reflective update.
//!
//! Every side keeps an incident and an outgoing buffer per group. Both are
//! indexed by a half-angle index `h = slot * angles_per_octant + a`, where
//! `slot` is the position of the octant among the side's incident (or
//! outgoing) octants. Outgoing octants are listed as the reflections of the
//! incident ones, so incident `h` and outgoing `h` form a specular pair and
//! reflection is a plain copy. Within a half-angle block, faces follow
//! [`Mesh::face_index`].

use serde::{Deserialize, Serialize};
use sn_angle::Quadrature;
use sn_geometry::{Mesh, Side};

use crate::error::{TransportError, TransportResult, ensure_size};

/// Condition applied on one side of the domain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "psi", rename_all = "snake_case")]
pub enum BoundaryCondition {
    #[default]
    Vacuum,
    Reflective,
    /// Isotropic incident angular flux, one value per group.
    FixedIncident(Vec<f64>),
}

/// Incident or outgoing half of a side's boundary flux.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Incident,
    Outgoing,
}

#[derive(Debug, Clone)]
struct SideFlux {
    side: Side,
    condition: BoundaryCondition,
    face_size: usize,
    incident: Vec<Vec<f64>>,
    outgoing: Vec<Vec<f64>>,
}

impl SideFlux {
    fn buffer(&self, direction: Direction, g: usize) -> &[f64] {
        match direction {
            Direction::Incident => &self.incident[g],
            Direction::Outgoing => &self.outgoing[g],
        }
    }

    fn buffer_mut(&mut self, direction: Direction, g: usize) -> &mut [f64] {
        match direction {
            Direction::Incident => &mut self.incident[g],
            Direction::Outgoing => &mut self.outgoing[g],
        }
    }
}

/// Boundary flux for all sides and groups.
#[derive(Debug, Clone)]
pub struct BoundaryManager {
    sides: Vec<SideFlux>,
    number_groups: usize,
    angles_octant: usize,
    half_size: usize,
    // slot[o][side]: position of octant o among the side's incident or
    // outgoing octants.
    slot: Vec<[usize; 6]>,
    has_reflective: bool,
}

impl BoundaryManager {
    /// `conditions` lists one condition per side in [`Side::all`] order.
    pub fn new(
        mesh: &Mesh,
        quadrature: &Quadrature,
        conditions: Vec<BoundaryCondition>,
        number_groups: usize,
    ) -> TransportResult<Self> {
        let dim = mesh.dimension();
        if quadrature.dimension() != dim {
            return Err(TransportError::DimensionMismatch {
                what: "quadrature",
                mesh: dim.axes(),
                other: quadrature.dimension().axes(),
            });
        }
        ensure_size("boundary conditions", dim.number_sides(), conditions.len())?;

        let angles_octant = quadrature.number_angles_octant();
        let half_size = quadrature.number_angles() / 2;
        let mut slot = vec![[0usize; 6]; quadrature.number_octants()];
        let mut sides = Vec::with_capacity(conditions.len());
        for (&side, condition) in Side::all(dim).iter().zip(conditions) {
            if let BoundaryCondition::FixedIncident(values) = &condition {
                ensure_size("fixed incident flux", number_groups, values.len())?;
                if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(TransportError::InvalidArg {
                        what: "fixed incident flux must be finite and non-negative",
                    });
                }
            }
            let axis = side.axis();
            let inward = quadrature.octants_along(axis, side.is_low());
            for (i, &o) in inward.iter().enumerate() {
                slot[o][side.index()] = i;
                slot[quadrature.reflect(o, axis)][side.index()] = i;
            }
            let face_size = mesh.face_size(side);
            let n = half_size * face_size;
            sides.push(SideFlux {
                side,
                condition,
                face_size,
                incident: vec![vec![0.0; n]; number_groups],
                outgoing: vec![vec![0.0; n]; number_groups],
            });
        }
        let has_reflective = sides
            .iter()
            .any(|s| s.condition == BoundaryCondition::Reflective);

        let mut manager = Self {
            sides,
            number_groups,
            angles_octant,
            half_size,
            slot,
            has_reflective,
        };
        for g in 0..number_groups {
            manager.set(g);
        }
        Ok(manager)
    }

    pub fn number_groups(&self) -> usize {
        self.number_groups
    }

    pub fn condition(&self, side: Side) -> &BoundaryCondition {
        &self.sides[side.index()].condition
    }

    pub fn is_reflective(&self, side: Side) -> bool {
        self.sides
            .get(side.index())
            .is_some_and(|s| s.condition == BoundaryCondition::Reflective)
    }

    pub fn has_reflective(&self) -> bool {
        self.has_reflective
    }

    /// Values per side for both halves: angles times faces.
    pub fn boundary_flux_size(&self, side: Side) -> usize {
        2 * self.half_size * self.sides[side.index()].face_size
    }

    /// Length of one group's packed incident (or outgoing) flux.
    pub fn psi_size(&self, only_reflective: bool) -> usize {
        self.packed_sides(only_reflective)
            .map(|s| self.half_size * s.face_size)
            .sum()
    }

    /// Zero the outgoing flux of group `g` ahead of a sweep.
    pub fn clear(&mut self, g: usize) {
        for side in &mut self.sides {
            side.outgoing[g].fill(0.0);
        }
    }

    /// Reset the incident flux of non-reflective sides to their condition.
    pub fn set(&mut self, g: usize) {
        for side in &mut self.sides {
            match &side.condition {
                BoundaryCondition::Vacuum => side.incident[g].fill(0.0),
                BoundaryCondition::FixedIncident(values) => side.incident[g].fill(values[g]),
                BoundaryCondition::Reflective => {}
            }
        }
    }

    /// Zero the incident flux of every non-reflective side so that a sweep
    /// depends linearly on the remaining unknowns.
    pub fn homogenize(&mut self, g: usize) {
        for side in &mut self.sides {
            if side.condition != BoundaryCondition::Reflective {
                side.incident[g].fill(0.0);
            }
        }
    }

    /// Reflect outgoing flux into the incident flux on reflective sides.
    pub fn update(&mut self, g: usize) {
        for side in &mut self.sides {
            if side.condition == BoundaryCondition::Reflective {
                let SideFlux {
                    incident, outgoing, ..
                } = side;
                incident[g].copy_from_slice(&outgoing[g]);
            }
        }
    }

    #[inline]
    fn range(&self, side: Side, o: usize, a: usize) -> std::ops::Range<usize> {
        let face = self.sides[side.index()].face_size;
        let h = self.slot[o][side.index()] * self.angles_octant + a;
        h * face..(h + 1) * face
    }

    /// Incident face flux on `side` for angle `a` of octant `o`.
    pub fn incident(&self, side: Side, g: usize, o: usize, a: usize) -> &[f64] {
        let r = self.range(side, o, a);
        &self.sides[side.index()].incident[g][r]
    }

    /// Outgoing face flux on `side` for angle `a` of octant `o`.
    pub fn outgoing(&self, side: Side, g: usize, o: usize, a: usize) -> &[f64] {
        let r = self.range(side, o, a);
        &self.sides[side.index()].outgoing[g][r]
    }

    pub fn outgoing_mut(&mut self, side: Side, g: usize, o: usize, a: usize) -> &mut [f64] {
        let r = self.range(side, o, a);
        &mut self.sides[side.index()].outgoing[g][r]
    }

    fn packed_sides(&self, only_reflective: bool) -> impl Iterator<Item = &SideFlux> {
        self.sides
            .iter()
            .filter(move |s| !only_reflective || s.condition == BoundaryCondition::Reflective)
    }

    /// Pack group `g`'s flux in side order into `out`.
    pub fn get_psi(
        &self,
        g: usize,
        direction: Direction,
        only_reflective: bool,
        out: &mut [f64],
    ) -> TransportResult<()> {
        ensure_size("packed boundary flux", self.psi_size(only_reflective), out.len())?;
        let mut offset = 0;
        for side in self.packed_sides(only_reflective) {
            let src = side.buffer(direction, g);
            out[offset..offset + src.len()].copy_from_slice(src);
            offset += src.len();
        }
        Ok(())
    }

    /// Inverse of [`BoundaryManager::get_psi`].
    pub fn set_psi(
        &mut self,
        g: usize,
        direction: Direction,
        only_reflective: bool,
        input: &[f64],
    ) -> TransportResult<()> {
        ensure_size("packed boundary flux", self.psi_size(only_reflective), input.len())?;
        let mut offset = 0;
        for side in &mut self.sides {
            if only_reflective && side.condition != BoundaryCondition::Reflective {
                continue;
            }
            let dst = side.buffer_mut(direction, g);
            let n = dst.len();
            dst.copy_from_slice(&input[offset..offset + n]);
            offset += n;
        }
        Ok(())
    }

    /// Sides in index order with their conditions.
    pub fn sides(&self) -> impl Iterator<Item = (Side, &BoundaryCondition)> {
        self.sides.iter().map(|s| (s.side, &s.condition))
    }
}
