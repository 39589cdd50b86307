//! Problem definition for a discrete-ordinates transport solve.

use sn_angle::Quadrature;
use sn_geometry::{Mesh, Side};
use sn_material::Material;
use sn_transport::{BoundaryCondition, ExternalSource};
use std::sync::Arc;

use crate::error::{SolverError, SolverResult};
use crate::settings::SolverSettings;

/// Everything needed to assemble a transport session.
///
/// Collaborators are shared behind `Arc` so a problem can be solved more
/// than once (forward and adjoint, say) without rebuilding its inputs.
#[derive(Clone)]
pub struct TransportProblem {
    /// Spatial mesh with per-cell material ids
    pub mesh: Arc<Mesh>,

    /// Finalized cross sections
    pub material: Arc<Material>,

    /// Angular quadrature matching the mesh dimension
    pub quadrature: Arc<Quadrature>,

    /// One condition per side in [`Side::all`] order
    pub boundary: Vec<BoundaryCondition>,

    /// Volumetric source (None = source free, e.g. eigenvalue problems)
    pub external: Option<Arc<dyn ExternalSource>>,

    /// Solver configuration
    pub settings: SolverSettings,
}

impl TransportProblem {
    /// Problem with vacuum on every side, no external source and default
    /// settings.
    pub fn new(mesh: Arc<Mesh>, material: Arc<Material>, quadrature: Arc<Quadrature>) -> Self {
        let sides = mesh.dimension().number_sides();
        Self {
            mesh,
            material,
            quadrature,
            boundary: vec![BoundaryCondition::Vacuum; sides],
            external: None,
            settings: SolverSettings::default(),
        }
    }

    /// Set the condition on one side.
    pub fn set_boundary(&mut self, side: Side, condition: BoundaryCondition) -> SolverResult<()> {
        let sides = Side::all(self.mesh.dimension());
        if !sides.contains(&side) {
            return Err(SolverError::ProblemSetup {
                what: format!("side {:?} does not exist in a {}-D mesh", side, sides.len() / 2),
            });
        }
        self.boundary[side.index()] = condition;
        Ok(())
    }

    pub fn with_external(mut self, source: Arc<dyn ExternalSource>) -> Self {
        self.external = Some(source);
        self
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validate problem setup.
    pub fn validate(&self) -> SolverResult<()> {
        if !self.material.is_finalized() {
            return Err(SolverError::ProblemSetup {
                what: "material must be finalized before solving".to_string(),
            });
        }

        let dim = self.mesh.dimension();
        if self.quadrature.dimension() != dim {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "quadrature is {}-D but the mesh is {}-D",
                    self.quadrature.dimension().axes(),
                    dim.axes()
                ),
            });
        }

        if self.boundary.len() != dim.number_sides() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "boundary condition count mismatch: {} != {}",
                    self.boundary.len(),
                    dim.number_sides()
                ),
            });
        }

        let materials = self.material.number_materials();
        if let Some(cell) = self
            .mesh
            .material_map()
            .iter()
            .position(|&m| m >= materials)
        {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "cell {} uses material {} but only {} are defined",
                    cell,
                    self.mesh.material(cell),
                    materials
                ),
            });
        }

        let groups = self.material.number_groups();
        if let Some(q) = &self.external {
            if q.number_groups() != groups {
                return Err(SolverError::ProblemSetup {
                    what: format!(
                        "external source has {} groups, material has {}",
                        q.number_groups(),
                        groups
                    ),
                });
            }
        }

        let s = &self.settings;
        if let Some(cutoff) = s.upscatter_cutoff {
            if cutoff > groups {
                return Err(SolverError::ProblemSetup {
                    what: format!("upscatter cutoff {cutoff} exceeds {groups} groups"),
                });
            }
        }
        for (name, tol) in [
            ("inner_tolerance", s.inner_tolerance),
            ("outer_tolerance", s.outer_tolerance),
            ("eigen_tolerance", s.eigen_tolerance),
        ] {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(SolverError::ProblemSetup {
                    what: format!("{name} must be positive, got {tol}"),
                });
            }
        }
        if s.gmres_restart == 0 {
            return Err(SolverError::ProblemSetup {
                what: "gmres_restart must be at least 1".to_string(),
            });
        }
        if s.divergence_factor.is_nan() || s.divergence_factor <= 1.0 {
            return Err(SolverError::ProblemSetup {
                what: format!("divergence_factor must exceed 1, got {}", s.divergence_factor),
            });
        }

        Ok(())
    }
}
