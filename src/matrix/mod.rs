pub mod access;
pub mod builder;
pub mod csc;
pub mod dense;
pub mod error;
pub mod sparse_vec;

pub use access::{CscLike, RawCsc};
pub use builder::CscBuilder;
pub use csc::CscMatrix;
pub use dense::DenseVec;
pub use error::{CscError, SparseVecError};
pub use sparse_vec::SparseVec;

/// Matrix dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dim {
    pub nrows: usize,
    pub ncols: usize,
}

/// Geometric growth factor for amortised appends.
pub(crate) const GROWTH: f64 = 1.675;
