use num_traits::Zero;

use crate::matrix::Dim;
use crate::matrix::csc::CscMatrix;
use crate::matrix::error::CscError;
use crate::scalar::Scalar;

/// Builder from COO triplets.
///
/// Entries may arrive in any order and may repeat; duplicates are summed,
/// matching the element-wise-sum character of the rest of the crate, and
/// entries that cancel to zero are dropped. `build` produces a canonical
/// [`CscMatrix`].
///
/// ```
/// use spreduce::CscBuilder;
///
/// let mut b = CscBuilder::new(3, 3);
/// b.push(0, 0, 10.0)?;
/// b.push(2, 2, 30.0)?;
/// b.push(2, 2, 5.0)?;
/// let a = b.build();
/// assert_eq!(a.nnz(), 2);
/// # Ok::<(), spreduce::matrix::CscError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CscBuilder<S> {
    dim: Dim,
    /// Triplets keyed `(col, row)`, kept sorted on insertion.
    entries: Vec<(usize, usize, S)>,
}

impl<S: Scalar> CscBuilder<S> {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            dim: Dim { nrows, ncols },
            entries: Vec::new(),
        }
    }

    pub fn reserve(&mut self, nnz: usize) {
        self.entries.reserve(nnz);
    }

    /// Record `value` at `(row, col)`.
    pub fn push(&mut self, row: usize, col: usize, value: S) -> Result<(), CscError> {
        if row >= self.dim.nrows {
            return Err(CscError::RowOutOfBounds {
                row,
                nrows: self.dim.nrows,
            });
        }
        if col >= self.dim.ncols {
            return Err(CscError::ColumnOutOfBounds {
                col,
                ncols: self.dim.ncols,
            });
        }
        if value.is_zero() {
            return Ok(());
        }
        let key = (col, row);
        let at = match self
            .entries
            .binary_search_by(|&(c, r, _)| (c, r).cmp(&key))
        {
            Ok(pos) | Err(pos) => pos,
        };
        self.entries.insert(at, (col, row, value));
        Ok(())
    }

    /// Assemble the canonical CSC matrix: duplicates summed, zero sums
    /// dropped, rows strictly ascending within each column.
    pub fn build(self) -> CscMatrix<S> {
        let Dim { nrows, ncols } = self.dim;

        // entries are already sorted by (col, row); fold duplicate cells
        let mut combined: Vec<(usize, usize, S)> = Vec::with_capacity(self.entries.len());
        for (c, r, v) in self.entries {
            match combined.last_mut() {
                Some((lc, lr, lv)) if *lc == c && *lr == r => *lv += v,
                _ => combined.push((c, r, v)),
            }
        }
        combined.retain(|(_, _, v)| !v.is_zero());

        let mut col_ptr = vec![0usize; ncols + 1];
        for &(c, _, _) in &combined {
            col_ptr[c + 1] += 1;
        }
        for j in 0..ncols {
            col_ptr[j + 1] += col_ptr[j];
        }

        let nnz = combined.len();
        let mut row_idx = vec![0usize; nnz];
        let mut values = vec![S::zero(); nnz];
        let mut next = col_ptr.clone();
        for (c, r, v) in combined {
            let p = next[c];
            row_idx[p] = r;
            values[p] = v;
            next[c] += 1;
        }

        CscMatrix::assemble(Dim { nrows, ncols }, col_ptr, row_idx, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_from_shuffled_triplets() {
        let mut b = CscBuilder::new(3, 3);
        b.push(2, 2, 30.0).expect("push");
        b.push(0, 0, 10.0).expect("push");
        b.push(1, 1, 20.0).expect("push");
        b.push(2, 0, 3.0).expect("push");
        b.push(0, 2, 2.0).expect("push");

        let a = b.build();
        assert_eq!(a.nnz(), 5);
        assert_eq!(a.col_ptr(), &[0, 2, 3, 5]);
        assert_eq!(a.row_idx(), &[0, 2, 1, 0, 2]);
        assert_eq!(a.values(), &[10.0, 3.0, 20.0, 2.0, 30.0]);
        a.check_invariants().expect("csc invariants");
    }

    #[test]
    fn duplicates_are_summed_and_cancellations_dropped() {
        let mut b = CscBuilder::new(2, 2);
        b.push(0, 0, 1).expect("push");
        b.push(0, 0, 2).expect("push");
        b.push(1, 1, 5).expect("push");
        b.push(1, 1, -5).expect("push");

        let a = b.build();
        assert_eq!(a.nnz(), 1);
        assert_eq!(a.row_idx(), &[0]);
        assert_eq!(a.values(), &[3]);
        a.check_invariants().expect("csc invariants");
    }

    #[test]
    fn explicit_zero_pushes_are_ignored() {
        let mut b = CscBuilder::new(2, 2);
        b.push(0, 1, 0).expect("push");
        let a = b.build();
        assert_eq!(a.nnz(), 0);
        assert_eq!(a.col_ptr(), &[0, 0, 0]);
    }

    #[test]
    fn out_of_bounds_pushes_are_rejected() {
        let mut b = CscBuilder::new(2, 3);
        let err = b.push(2, 0, 1.0).unwrap_err();
        assert!(matches!(err, CscError::RowOutOfBounds { row: 2, nrows: 2 }));
        let err = b.push(0, 3, 1.0).unwrap_err();
        assert!(matches!(err, CscError::ColumnOutOfBounds { col: 3, ncols: 3 }));
    }

    #[test]
    fn empty_builder_yields_an_empty_matrix() {
        let a = CscBuilder::<f64>::new(4, 5).build();
        assert_eq!((a.nrows(), a.ncols(), a.nnz()), (4, 5, 0));
        assert_eq!(a.col_ptr(), &[0; 6]);
    }
}
