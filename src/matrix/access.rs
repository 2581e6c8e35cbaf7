use crate::matrix::Dim;
use crate::matrix::csc::CscMatrix;
use crate::matrix::error::CscError;
use crate::matrix::sparse_vec::SparseVec;
use crate::scalar::Scalar;

/// Column-view capability over any CSC-shaped matrix.
///
/// The reducers only ever need the dimensions, one column at a time as a
/// sparse vector, and the widest column for sizing their scratch storage, so
/// any representation that can answer those three questions can be reduced.
pub trait CscLike<S: Scalar> {
    fn dim(&self) -> Dim;

    /// Copy column `j` into `out`.
    fn col_into(&self, j: usize, out: &mut SparseVec<S>);

    /// Largest per-column entry count.
    fn max_col_nnz(&self) -> usize;
}

impl<S: Scalar> CscLike<S> for CscMatrix<S> {
    fn dim(&self) -> Dim {
        self.dim()
    }

    fn col_into(&self, j: usize, out: &mut SparseVec<S>) {
        self.get_col(j, out);
    }

    fn max_col_nnz(&self) -> usize {
        max_col_nnz(self.col_ptr())
    }
}

/// Borrowed view over foreign CSC buffers.
///
/// Lets a matrix owned by another library participate in the reducers without
/// copying: the caller hands over the three CSC arrays and the constructor
/// validates the shape once.
#[derive(Debug, Clone, Copy)]
pub struct RawCsc<'a, S> {
    dim: Dim,
    col_ptr: &'a [usize],
    row_idx: &'a [usize],
    values: &'a [S],
}

impl<'a, S: Scalar> RawCsc<'a, S> {
    pub fn new(
        nrows: usize,
        ncols: usize,
        col_ptr: &'a [usize],
        row_idx: &'a [usize],
        values: &'a [S],
    ) -> Result<Self, CscError> {
        if col_ptr.len() != ncols + 1 {
            return Err(CscError::ColumnPointerLength {
                expected: ncols + 1,
                actual: col_ptr.len(),
            });
        }
        if col_ptr[0] != 0 {
            return Err(CscError::ColumnPointerMismatch {
                col: 0,
                expected: 0,
                actual: col_ptr[0],
            });
        }
        if row_idx.len() != values.len() {
            return Err(CscError::IndexValueLengthMismatch {
                row_idx: row_idx.len(),
                values: values.len(),
            });
        }
        if col_ptr[ncols] != row_idx.len() {
            return Err(CscError::ColumnPointerMismatch {
                col: ncols,
                expected: row_idx.len(),
                actual: col_ptr[ncols],
            });
        }
        for j in 0..ncols {
            let (start, end) = (col_ptr[j], col_ptr[j + 1]);
            if start > end || end > row_idx.len() {
                return Err(CscError::ColumnPointerMismatch {
                    col: j,
                    expected: start,
                    actual: end,
                });
            }
            let mut prev = None;
            for &r in &row_idx[start..end] {
                if r >= nrows {
                    return Err(CscError::RowOutOfBounds { row: r, nrows });
                }
                if let Some(p) = prev {
                    if r <= p {
                        return Err(CscError::RowsNotAscending {
                            col: j,
                            prev: p,
                            row: r,
                        });
                    }
                }
                prev = Some(r);
            }
        }
        Ok(Self {
            dim: Dim { nrows, ncols },
            col_ptr,
            row_idx,
            values,
        })
    }
}

impl<'a, S: Scalar> CscLike<S> for RawCsc<'a, S> {
    fn dim(&self) -> Dim {
        self.dim
    }

    fn col_into(&self, j: usize, out: &mut SparseVec<S>) {
        let (start, end) = (self.col_ptr[j], self.col_ptr[j + 1]);
        if start == end {
            out.zero();
        } else {
            out.set_parts(
                end - start,
                &self.row_idx[start..end],
                &self.values[start..end],
            );
        }
    }

    fn max_col_nnz(&self) -> usize {
        max_col_nnz(self.col_ptr)
    }
}

fn max_col_nnz(col_ptr: &[usize]) -> usize {
    col_ptr.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_matrix_answers_the_view() {
        let mut x = CscMatrix::with_len(6, 4, 8);
        let mut s = SparseVec::with_len(3);
        s.insert(0, 1.0);
        s.insert(5, 2.0);
        x.insert(1, &s);
        s.zero();
        s.insert(2, 3.0);
        s.insert(3, 4.0);
        s.insert(4, 5.0);
        x.insert(3, &s);

        assert_eq!(CscLike::dim(&x), Dim { nrows: 6, ncols: 4 });
        assert_eq!(CscLike::max_col_nnz(&x), 3);
        let mut out = SparseVec::new();
        x.col_into(1, &mut out);
        assert_eq!(out.indices(), &[0, 5]);
        x.col_into(0, &mut out);
        assert_eq!(out.nnz(), 0);
    }

    #[test]
    fn raw_csc_adapts_foreign_arrays() {
        let col_ptr = [0usize, 2, 2, 3];
        let row_idx = [0usize, 3, 1];
        let values = [1.5f64, 2.5, -1.0];
        let x = RawCsc::new(4, 3, &col_ptr, &row_idx, &values).expect("valid csc");

        assert_eq!(x.dim(), Dim { nrows: 4, ncols: 3 });
        assert_eq!(x.max_col_nnz(), 2);

        let mut s = SparseVec::new();
        x.col_into(0, &mut s);
        assert_eq!(s.indices(), &[0, 3]);
        assert_eq!(s.values(), &[1.5, 2.5]);
        x.col_into(1, &mut s);
        assert_eq!(s.nnz(), 0);
        x.col_into(2, &mut s);
        assert_eq!(s.indices(), &[1]);
        assert_eq!(s.values(), &[-1.0]);
    }

    #[test]
    fn raw_csc_rejects_malformed_shapes() {
        let values = [1.0f64, 2.0];

        let err = RawCsc::new(4, 2, &[0, 1], &[0, 1], &values).unwrap_err();
        assert!(matches!(err, CscError::ColumnPointerLength { expected: 3, .. }));

        let err = RawCsc::new(4, 2, &[1, 1, 2], &[0, 1], &values).unwrap_err();
        assert!(matches!(err, CscError::ColumnPointerMismatch { col: 0, .. }));

        let err = RawCsc::new(4, 2, &[0, 1, 3], &[0, 1], &values).unwrap_err();
        assert!(matches!(err, CscError::ColumnPointerMismatch { col: 2, .. }));

        let err = RawCsc::new(4, 2, &[0, 2, 2], &[3, 1], &values).unwrap_err();
        assert!(matches!(err, CscError::RowsNotAscending { col: 0, .. }));

        let err = RawCsc::new(2, 2, &[0, 2, 2], &[0, 3], &values).unwrap_err();
        assert!(matches!(err, CscError::RowOutOfBounds { row: 3, nrows: 2 }));
    }
}
