use thiserror::Error;

pub type AngleResult<T> = Result<T, AngleError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AngleError {
    #[error("Quadrature needs at least one {what} per octant")]
    Empty { what: &'static str },

    #[error("{set} quadrature does not support {dimension}-D problems")]
    Dimension { set: &'static str, dimension: usize },

    #[error("Legendre root search did not converge for order {order}")]
    RootSearch { order: usize },
}
