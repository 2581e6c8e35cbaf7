//! Distributed element-wise summation of sparse matrices.
//!
//! Each rank of a group holds a CSC matrix with the same dimensions but its
//! own population of non-zeros. [`reduce::dense`] and [`reduce::gather`]
//! compute the element-wise sum across the group column by column, delivering
//! the result to one rank ([`Root::Rank`]) or to every rank ([`Root::All`])
//! while preserving the CSC representation.
//!
//! The containers ([`DenseVec`], [`SparseVec`], [`CscMatrix`]) are plain
//! owned structures. Anything CSC-shaped can be reduced through the
//! [`CscLike`] view (see [`RawCsc`] for borrowed foreign buffers), and any
//! transport implementing [`Communicator`] can carry the collectives;
//! [`LocalComm`] runs a whole group inside one process on threads.

pub mod comm;
pub mod error;
pub mod generate;
pub mod matrix;
pub mod reduce;
mod scalar;

pub use comm::{CommScalar, Communicator, Datatype, LocalComm, ReduceOp, Root};
pub use error::ReduceError;
pub use matrix::{CscBuilder, CscLike, CscMatrix, DenseVec, Dim, RawCsc, SparseVec};
pub use scalar::Scalar;
