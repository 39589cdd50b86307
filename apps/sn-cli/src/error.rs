use sn_solver::SolverError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid deck: {what}")]
    Deck { what: String },

    #[error("Mesh error: {0}")]
    Geometry(#[from] sn_geometry::GeometryError),

    #[error("Quadrature error: {0}")]
    Angle(#[from] sn_angle::AngleError),

    #[error("Material error: {0}")]
    Material(#[from] sn_material::MaterialError),

    #[error("Transport error: {0}")]
    Transport(#[from] sn_transport::TransportError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}
