//! YAML problem deck.

use serde::{Deserialize, Serialize};
use sn_angle::QuadratureSpec;
use sn_geometry::{Axis, Dimension, Mesh, MeshBuilder, Side};
use sn_material::{Material, library};
use sn_solver::{SolverSettings, TransportProblem};
use sn_transport::{BoundaryCondition, ConstantSource, ExternalSource, RegionSource};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Fixed,
    Eigen,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deck {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Mode,
    pub mesh: MeshDef,
    pub materials: MaterialsDef,
    pub quadrature: QuadratureSpec,
    /// Sides left out are vacuum.
    #[serde(default)]
    pub boundary: HashMap<Side, BoundaryCondition>,
    #[serde(default)]
    pub source: Option<SourceDef>,
    #[serde(default)]
    pub settings: SolverSettings,
}

/// Coarse edges and fine cell counts along one axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AxisDef {
    pub edges: Vec<f64>,
    pub cells: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeshDef {
    pub dimension: Dimension,
    pub x: AxisDef,
    #[serde(default)]
    pub y: Option<AxisDef>,
    #[serde(default)]
    pub z: Option<AxisDef>,
    /// Material id per coarse region (all zero when omitted)
    #[serde(default)]
    pub materials: Option<Vec<usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MaterialsDef {
    Library { library: String },
    Inline { groups: usize, materials: Vec<MaterialDef> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    pub sigma_t: Vec<f64>,
    #[serde(default)]
    pub sigma_a: Option<Vec<f64>>,
    #[serde(default)]
    pub nu_sigma_f: Option<Vec<f64>>,
    #[serde(default)]
    pub chi: Option<Vec<f64>>,
    /// `sigma_s[g][gp]` scatters from `gp` into `g`
    #[serde(default)]
    pub sigma_s: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDef {
    /// Same spectrum in every cell
    Constant { strength: Vec<f64> },
    /// One spectrum per material id
    ByMaterial { spectra: Vec<Vec<f64>> },
    /// Region id per fine cell
    Region {
        regions: Vec<usize>,
        spectra: Vec<Vec<f64>>,
    },
}

pub fn load_deck(path: &Path) -> CliResult<Deck> {
    let content = std::fs::read_to_string(path)?;
    let deck: Deck = serde_yaml::from_str(&content)?;
    Ok(deck)
}

fn deck_error(what: impl Into<String>) -> CliError {
    CliError::Deck { what: what.into() }
}

impl MeshDef {
    pub fn build(&self) -> CliResult<Mesh> {
        let mut builder = MeshBuilder::new(self.dimension);
        let mut regions = 1;
        for (axis, def) in [
            (Axis::X, Some(&self.x)),
            (Axis::Y, self.y.as_ref()),
            (Axis::Z, self.z.as_ref()),
        ] {
            if let Some(def) = def {
                regions *= def.edges.len().saturating_sub(1);
                builder = builder.axis(axis, def.edges.clone(), def.cells.clone());
            }
        }
        let materials = self.materials.clone().unwrap_or_else(|| vec![0; regions]);
        Ok(builder.materials(materials).build()?)
    }
}

fn check_len(what: &str, m: usize, expected: usize, actual: usize) -> CliResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(deck_error(format!(
            "material {m} {what} has {actual} values, expected {expected}"
        )))
    }
}

impl MaterialsDef {
    pub fn build(&self) -> CliResult<Material> {
        match self {
            MaterialsDef::Library { library: name } => library::by_name(name)
                .ok_or_else(|| deck_error(format!("unknown material library '{name}'")))?
                .map_err(CliError::from),
            MaterialsDef::Inline { groups, materials } => build_inline(*groups, materials),
        }
    }
}

fn build_inline(groups: usize, defs: &[MaterialDef]) -> CliResult<Material> {
    let mut mat = Material::new(defs.len(), groups)?;
    for (m, def) in defs.iter().enumerate() {
        check_len("sigma_t", m, groups, def.sigma_t.len())?;
        for (g, &v) in def.sigma_t.iter().enumerate() {
            mat.set_sigma_t(m, g, v)?;
        }
        if let Some(sigma_a) = &def.sigma_a {
            check_len("sigma_a", m, groups, sigma_a.len())?;
            for (g, &v) in sigma_a.iter().enumerate() {
                mat.set_sigma_a(m, g, v)?;
            }
        }
        if let Some(nu) = &def.nu_sigma_f {
            check_len("nu_sigma_f", m, groups, nu.len())?;
            for (g, &v) in nu.iter().enumerate() {
                mat.set_nu_sigma_f(m, g, v)?;
            }
        }
        if let Some(chi) = &def.chi {
            check_len("chi", m, groups, chi.len())?;
            for (g, &v) in chi.iter().enumerate() {
                mat.set_chi(m, g, v)?;
            }
        }
        if let Some(scatter) = &def.sigma_s {
            check_len("sigma_s", m, groups, scatter.len())?;
            for (g, row) in scatter.iter().enumerate() {
                check_len("sigma_s row", m, groups, row.len())?;
                for (gp, &v) in row.iter().enumerate() {
                    mat.set_sigma_s(m, g, gp, v)?;
                }
            }
        }
    }
    if defs.iter().all(|d| d.sigma_a.is_none()) {
        mat.compute_sigma_a();
    }
    mat.finalize()?;
    Ok(mat)
}

impl SourceDef {
    pub fn build(&self, mesh: &Mesh) -> CliResult<Arc<dyn ExternalSource>> {
        let dim = mesh.dimension();
        let source: Arc<dyn ExternalSource> = match self {
            SourceDef::Constant { strength } => {
                Arc::new(ConstantSource::new(dim, strength.clone())?)
            }
            SourceDef::ByMaterial { spectra } => Arc::new(RegionSource::new(
                dim,
                mesh.material_map().to_vec(),
                spectra.clone(),
            )?),
            SourceDef::Region { regions, spectra } => {
                if regions.len() != mesh.number_cells() {
                    return Err(deck_error(format!(
                        "source regions cover {} cells, mesh has {}",
                        regions.len(),
                        mesh.number_cells()
                    )));
                }
                Arc::new(RegionSource::new(dim, regions.clone(), spectra.clone())?)
            }
        };
        Ok(source)
    }
}

impl Deck {
    /// Assemble and validate the transport problem.
    pub fn problem(&self) -> CliResult<TransportProblem> {
        let mesh = Arc::new(self.mesh.build()?);
        let material = Arc::new(self.materials.build()?);
        let quadrature = Arc::new(self.quadrature.build(mesh.dimension())?);

        let mut problem = TransportProblem::new(mesh.clone(), material, quadrature)
            .with_settings(self.settings.clone());
        for (side, condition) in &self.boundary {
            problem.set_boundary(*side, condition.clone())?;
        }
        if let Some(source) = &self.source {
            problem.external = Some(source.build(&mesh)?);
        }
        let fixed_incident = self
            .boundary
            .values()
            .any(|c| matches!(c, BoundaryCondition::FixedIncident(_)));
        match self.mode {
            Mode::Fixed if problem.external.is_none() && !fixed_incident => {
                return Err(deck_error(
                    "fixed-source mode needs a source or a fixed incident boundary",
                ));
            }
            Mode::Eigen if problem.external.is_some() || fixed_incident => {
                return Err(deck_error(
                    "eigen mode takes neither a source nor a fixed incident boundary",
                ));
            }
            _ => {}
        }
        problem.validate()?;
        Ok(problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLAB: &str = include_str!("../decks/uo2_slab.yaml");

    #[test]
    fn bundled_deck_builds() {
        let deck: Deck = serde_yaml::from_str(SLAB).unwrap();
        assert_eq!(deck.mode, Mode::Fixed);
        let problem = deck.problem().unwrap();
        assert_eq!(problem.mesh.number_cells(), 10);
        assert_eq!(problem.material.number_groups(), 7);
        assert_eq!(problem.boundary[0], BoundaryCondition::Reflective);
        assert!(problem.external.is_some());
    }

    #[test]
    fn inline_materials_and_defaults() {
        let yaml = r#"
mode: eigen
mesh:
  dimension: two
  x: { edges: [0.0, 1.0, 2.0], cells: [2, 2] }
  y: { edges: [0.0, 2.0], cells: [4] }
  materials: [0, 1]
materials:
  groups: 1
  materials:
    - { sigma_t: [1.0], sigma_s: [[0.5]], nu_sigma_f: [0.6], chi: [1.0] }
    - { sigma_t: [2.0], sigma_s: [[1.9]] }
quadrature: { kind: product, azimuths: 2, polars: 1 }
boundary:
  west: { type: reflective }
settings:
  inner_solver: gmres
"#;
        let deck: Deck = serde_yaml::from_str(yaml).unwrap();
        let problem = deck.problem().unwrap();
        assert_eq!(problem.mesh.number_cells(), 16);
        assert_eq!(problem.mesh.material(3), 1);
        assert_eq!(problem.boundary[0], BoundaryCondition::Reflective);
        assert_eq!(problem.boundary[1], BoundaryCondition::Vacuum);
        assert!((problem.material.sigma_a(1, 0) - 0.1).abs() < 1e-12);
        assert_eq!(
            problem.settings.inner_solver,
            sn_solver::InnerSolverKind::Gmres
        );
    }

    #[test]
    fn rejects_bad_decks() {
        let base = r#"
mesh:
  dimension: one
  x: { edges: [0.0, 1.0], cells: [4] }
materials: { library: c5g7_uo2 }
quadrature: { kind: gauss_legendre, angles: 2 }
"#;
        // Fixed-source deck without any source.
        let deck: Deck = serde_yaml::from_str(base).unwrap();
        assert!(deck.problem().is_err());

        let unknown = base.replace("c5g7_uo2", "mox");
        let deck: Deck = serde_yaml::from_str(&unknown).unwrap();
        assert!(matches!(deck.materials.build(), Err(CliError::Deck { .. })));

        let eigen_with_source = format!(
            "{base}mode: eigen\nsource: {{ type: constant, strength: [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0] }}\n"
        );
        let deck: Deck = serde_yaml::from_str(&eigen_with_source).unwrap();
        assert!(matches!(deck.problem(), Err(CliError::Deck { .. })));

        let north = format!("{base}boundary:\n  north: {{ type: reflective }}\n");
        let deck: Deck = serde_yaml::from_str(&north).unwrap();
        assert!(deck.problem().is_err());
    }
}
