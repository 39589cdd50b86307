//! Assembled transport session.
//!
//! The session owns every piece of mutable solve state: flux moments,
//! boundary flux, the sweep source, the fission source and the sweeper.
//! Solvers and operators borrow the session for the duration of a call and
//! reach the pieces through disjoint field borrows.

use sn_angle::Quadrature;
use sn_geometry::Mesh;
use sn_material::Material;
use sn_transport::{
    BoundaryCondition, BoundaryManager, FissionSource, State, SweepSource, Sweeper,
};
use std::sync::Arc;
use tracing::info;

use crate::error::SolverResult;
use crate::problem::TransportProblem;
use crate::settings::SolverSettings;

pub struct TransportSession {
    pub(crate) mesh: Arc<Mesh>,
    pub(crate) material: Arc<Material>,
    pub(crate) quadrature: Arc<Quadrature>,
    pub(crate) settings: SolverSettings,
    pub(crate) state: State,
    pub(crate) boundary: BoundaryManager,
    pub(crate) sweep_source: SweepSource,
    pub(crate) sweeper: Sweeper,
    pub(crate) fission: FissionSource,
    pub(crate) cutoff: usize,
    // Fission enters group sources from the fission source (eigenvalue
    // outers and Gauss-Seidel multiplying solves).
    pub(crate) include_fission: bool,
}

impl TransportSession {
    pub fn new(problem: &TransportProblem) -> SolverResult<Self> {
        problem.validate()?;
        let settings = problem.settings.clone();
        let mesh = problem.mesh.clone();
        let material = problem.material.clone();
        let quadrature = problem.quadrature.clone();
        let groups = material.number_groups();

        // Fission couples every group, so a multiplying solve treats the
        // whole range as one block.
        let cutoff = if settings.multiply {
            0
        } else {
            settings
                .upscatter_cutoff
                .unwrap_or_else(|| material.upscatter_cutoff())
        };

        let state = State::new(
            groups,
            mesh.number_cells(),
            quadrature.number_angles(),
            settings.store_angular_flux,
            settings.adjoint,
        );
        let boundary =
            BoundaryManager::new(&mesh, &quadrature, problem.boundary.clone(), groups)?;
        let sweep_source = SweepSource::new(
            mesh.clone(),
            material.clone(),
            &quadrature,
            problem.external.clone(),
            settings.adjoint,
        )?;
        let equation =
            settings
                .equation
                .build(mesh.clone(), material.clone(), quadrature.clone())?;
        let sweeper = Sweeper::new(mesh.clone(), quadrature.clone(), equation)?;
        let fission = FissionSource::new(mesh.clone(), material.clone(), settings.adjoint)?;

        info!(
            "Transport session: {} cells, {} groups, {} angles, upscatter cutoff {}{}",
            mesh.number_cells(),
            groups,
            quadrature.number_angles(),
            cutoff,
            if settings.adjoint { " (adjoint)" } else { "" }
        );

        Ok(Self {
            mesh,
            material,
            quadrature,
            settings,
            state,
            boundary,
            sweep_source,
            sweeper,
            fission,
            cutoff,
            include_fission: false,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn quadrature(&self) -> &Quadrature {
        &self.quadrature
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn boundary(&self) -> &BoundaryManager {
        &self.boundary
    }

    pub fn boundary_mut(&mut self) -> &mut BoundaryManager {
        &mut self.boundary
    }

    pub fn sweeper(&self) -> &Sweeper {
        &self.sweeper
    }

    /// Attach a [`sn_transport::CurrentTally`] here.
    pub fn sweeper_mut(&mut self) -> &mut Sweeper {
        &mut self.sweeper
    }

    pub fn fission(&self) -> &FissionSource {
        &self.fission
    }

    pub fn fission_mut(&mut self) -> &mut FissionSource {
        &mut self.fission
    }

    /// First group of the coupled block.
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    pub fn number_groups(&self) -> usize {
        self.state.number_groups()
    }

    pub fn include_fission(&self) -> bool {
        self.include_fission
    }

    pub fn set_include_fission(&mut self, include: bool) {
        self.include_fission = include;
    }

    /// Whether an external source or fixed incident flux drives the problem.
    pub fn has_fixed_source(&self) -> bool {
        self.sweep_source.has_external()
            || self
                .boundary
                .sides()
                .any(|(_, c)| matches!(c, BoundaryCondition::FixedIncident(_)))
    }

    /// Fixed source of group `g` for a Gauss-Seidel style solve: fission
    /// (when included) plus in-scatter from every other group at the
    /// current flux.
    pub(crate) fn set_group_source(&mut self, g: usize) -> SolverResult<()> {
        let fission = self.include_fission.then_some(&mut self.fission);
        self.sweep_source
            .set_fixed_with_scatter(g, self.state.all_phi(), fission)?;
        Ok(())
    }

    /// One sweep of group `g` with its full source at the current flux,
    /// writing flux moments (and angular flux when stored) to the state.
    pub(crate) fn sweep_group(&mut self, g: usize) -> SolverResult<()> {
        self.set_group_source(g)?;
        self.sweep_source
            .build_within_group_scatter(g, self.state.phi(g))?;
        self.boundary.clear(g);
        let (phi, psi) = self.state.phi_and_psi_mut(g);
        self.sweeper
            .sweep(g, &mut self.sweep_source, &mut self.boundary, phi, psi)?;
        self.boundary.update(g);
        Ok(())
    }
}
