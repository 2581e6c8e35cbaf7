use thiserror::Error;

use crate::comm::CommError;
use crate::matrix::error::SparseVecError;

/// Failure modes of the reducers.
#[derive(Debug, Error)]
pub enum ReduceError {
    /// The reducers are collectives; a group of one has nothing to sum with.
    #[error("reducer requires at least 2 ranks, group has {size}")]
    InsufficientRanks { size: usize },

    #[error(transparent)]
    Comm(#[from] CommError),

    #[error(transparent)]
    Sparse(#[from] SparseVecError),
}
