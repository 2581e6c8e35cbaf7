//! Column-by-column distributed (all)reduce of CSC matrices.
//!
//! Both reducers walk the columns in ascending order and run the same
//! collective sequence on every rank — that ordering is the whole
//! coordination protocol. [`dense`] moves each column as a full dense vector
//! through one reduce; [`gather`] moves only the stored entries through an
//! all-gather of counts plus two gathervs, then merges on the receiving side.

use num_traits::Zero;

use crate::comm::{CommScalar, Communicator, ReduceOp, Root};
use crate::error::ReduceError;
use crate::matrix::{CscLike, CscMatrix, DenseVec, Dim, GROWTH, SparseVec};

/// Floor for the scratch and output allocations, in entries.
const MIN_REDUCE_LEN: usize = 32;

fn initial_len<S, M>(x: &M) -> usize
where
    S: CommScalar,
    M: CscLike<S>,
{
    MIN_REDUCE_LEN.max((x.max_col_nnz() as f64 * GROWTH) as usize)
}

fn check_size<C: Communicator>(comm: &C) -> Result<(), ReduceError> {
    let size = comm.size();
    if size < 2 {
        return Err(ReduceError::InsufficientRanks { size });
    }
    Ok(())
}

/// Sum a CSC matrix across ranks, one dense column reduce at a time.
///
/// Every rank calls this with a matrix of identical dimensions; the summed
/// matrix lands on `root`, or on every rank with [`Root::All`]. Ranks that do
/// not receive get back an empty matrix of the right shape.
///
/// Per column this moves `nrows` scalars regardless of how sparse the column
/// is; [`gather`] trades that for traffic proportional to the column's
/// population.
pub fn dense<S, M, C>(root: Root, x: &M, comm: &C) -> Result<CscMatrix<S>, ReduceError>
where
    S: CommScalar,
    M: CscLike<S>,
    C: Communicator,
{
    check_size(comm)?;
    let receiving = root.receives(comm.rank());
    let Dim { nrows, ncols } = x.dim();

    let len = initial_len(x);
    let mut a = SparseVec::with_len(len);
    let mut d = DenseVec::with_len(nrows);

    let mut s = CscMatrix::with_len(nrows, ncols, 0);
    if receiving {
        s.resize(len);
    }

    for j in 0..ncols {
        x.col_into(j, &mut a);
        a.densify(&mut d)?;

        comm.reduce(root, ReduceOp::Sum, d.as_mut_slice())?;

        if receiving {
            d.update_nnz();
            a.set_dense(&d);
            s.insert(j, &a);
        }
    }

    Ok(s)
}

/// Sum a CSC matrix across ranks by gathering each column's sparse entries
/// and merging them locally.
///
/// Per column: an all-gather of the local entry counts, then two gathervs
/// (row indices, values) into rank-offset slots on the receiving side, then a
/// sort and a merge-sum of equal indices. Columns empty on every rank cost
/// only the count exchange.
pub fn gather<S, M, C>(root: Root, x: &M, comm: &C) -> Result<CscMatrix<S>, ReduceError>
where
    S: CommScalar,
    M: CscLike<S>,
    C: Communicator,
{
    check_size(comm)?;
    let receiving = root.receives(comm.rank());
    let Dim { nrows, ncols } = x.dim();
    let size = comm.size();

    let len = initial_len(x);
    let mut a = SparseVec::with_len(len);
    let mut s = CscMatrix::with_len(nrows, ncols, 0);

    let mut counts = vec![0usize; size];
    let mut displs = vec![0usize; size];

    let mut indices: Vec<usize> = Vec::new();
    let mut values: Vec<S> = Vec::new();
    let mut pairs: Vec<(usize, S)> = Vec::new();

    if receiving {
        s.resize(len);
        indices.resize(len, 0);
        values.resize(len, S::zero());
        pairs.resize(len, (0, S::zero()));
    }

    for j in 0..ncols {
        x.col_into(j, &mut a);

        comm.gather(Root::All, &[a.nnz()], &mut counts)?;

        let count: usize = counts.iter().sum();
        if count == 0 {
            continue;
        }
        if receiving && indices.len() < count {
            indices.resize(count, 0);
            values.resize(count, S::zero());
            pairs.resize(count, (0, S::zero()));
        }

        for r in 1..size {
            displs[r] = displs[r - 1] + counts[r - 1];
        }

        comm.gatherv(root, a.indices(), &mut indices, &counts, &displs)?;
        comm.gatherv(root, a.values(), &mut values, &counts, &displs)?;

        if receiving {
            for k in 0..count {
                pairs[k] = (indices[k], values[k]);
            }
            pairs[..count].sort_unstable_by_key(|&(i, _)| i);

            // fold runs of equal indices into single entries
            let mut nnz = 0;
            indices[0] = pairs[0].0;
            values[0] = pairs[0].1;
            for k in 1..count {
                let (i, v) = pairs[k];
                if i == indices[nnz] {
                    values[nnz] += v;
                } else {
                    nnz += 1;
                    indices[nnz] = i;
                    values[nnz] = v;
                }
            }

            a.set_parts(nnz + 1, &indices, &values);
            s.insert(j, &a);
        }
    }

    Ok(s)
}
