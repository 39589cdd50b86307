use thiserror::Error;

pub type MaterialResult<T> = Result<T, MaterialError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    #[error("Material must have at least one material and one group")]
    Empty,

    #[error("{what} index {index} out of range (len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid {what} for material {material}, group {group}: {value}")]
    InvalidValue {
        what: &'static str,
        material: usize,
        group: usize,
        value: f64,
    },

    #[error("Cross sections used before finalize()")]
    NotFinalized,
}
