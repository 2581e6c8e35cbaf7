use std::fmt;

use num_traits::Zero;

use crate::matrix::access::RawCsc;
use crate::matrix::error::CscError;
use crate::matrix::sparse_vec::SparseVec;
use crate::matrix::{Dim, GROWTH};
use crate::scalar::Scalar;

/// Compressed Sparse Column matrix built column by column.
///
/// `col_ptr[j]..col_ptr[j + 1]` delimits column `j` inside `row_idx` and
/// `values`. The entry arrays are kept at an allocated length `len` with a
/// live prefix of `nnz` entries and grow geometrically as columns arrive
/// through [`insert`](CscMatrix::insert).
#[derive(Debug, Clone)]
pub struct CscMatrix<S> {
    dim: Dim,
    /// Column pointers, len = ncols + 1.
    col_ptr: Vec<usize>,
    /// Row indices of the stored entries.
    row_idx: Vec<usize>,
    /// Stored values.
    values: Vec<S>,
    nnz: usize,
}

impl<S: Scalar> CscMatrix<S> {
    pub fn with_len(nrows: usize, ncols: usize, len: usize) -> Self {
        Self {
            dim: Dim { nrows, ncols },
            col_ptr: vec![0; ncols + 1],
            row_idx: vec![0; len],
            values: vec![S::zero(); len],
            nnz: 0,
        }
    }

    /// Build from raw CSC parts, validating the shape once.
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<S>,
    ) -> Result<Self, CscError> {
        RawCsc::new(nrows, ncols, &col_ptr, &row_idx, &values)?;
        Ok(Self::assemble(Dim { nrows, ncols }, col_ptr, row_idx, values))
    }

    /// Disassemble into `(dim, col_ptr, row_idx, values)` with the entry
    /// arrays trimmed to the stored entries.
    pub fn into_parts(mut self) -> (Dim, Vec<usize>, Vec<usize>, Vec<S>) {
        self.row_idx.truncate(self.nnz);
        self.values.truncate(self.nnz);
        (self.dim, self.col_ptr, self.row_idx, self.values)
    }

    /// Assemble from canonical parts the caller has already validated.
    pub(crate) fn assemble(
        dim: Dim,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<S>,
    ) -> Self {
        let nnz = row_idx.len();
        Self {
            dim,
            col_ptr,
            row_idx,
            values,
            nnz,
        }
    }

    pub fn dim(&self) -> Dim {
        self.dim
    }

    pub fn nrows(&self) -> usize {
        self.dim.nrows
    }

    pub fn ncols(&self) -> usize {
        self.dim.ncols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Allocated entry capacity.
    pub fn len(&self) -> usize {
        self.row_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nnz == 0
    }

    /// Column pointers, `ncols + 1` of them.
    pub fn col_ptr(&self) -> &[usize] {
        &self.col_ptr
    }

    /// Live row indices.
    pub fn row_idx(&self) -> &[usize] {
        &self.row_idx[..self.nnz]
    }

    /// Live values.
    pub fn values(&self) -> &[S] {
        &self.values[..self.nnz]
    }

    /// Grow or shrink the entry storage; the column pointers are untouched.
    /// No-op when the length already matches.
    pub fn resize(&mut self, len: usize) {
        debug_assert!(len >= self.nnz, "cannot shrink below the stored entries");
        if len == self.row_idx.len() {
            return;
        }
        self.row_idx.resize(len, 0);
        self.values.resize(len, S::zero());
    }

    /// Drop all entries, keeping dimensions and storage.
    pub fn zero(&mut self) {
        if self.nnz > 0 {
            self.row_idx[..self.nnz].fill(0);
            self.values[..self.nnz].fill(S::zero());
            self.col_ptr.fill(0);
            self.nnz = 0;
        }
    }

    /// Append `v` as column `col`.
    ///
    /// Entries land at the tail of the arrays, so columns must arrive in
    /// ascending order with `col` itself still empty; anything else corrupts
    /// the pointer array. Grows the backing storage when `v` does not fit.
    pub fn insert(&mut self, col: usize, v: &SparseVec<S>) {
        debug_assert!(col < self.dim.ncols);
        debug_assert_eq!(
            self.col_ptr[col], self.nnz,
            "column inserted out of order or already populated"
        );
        let vnnz = v.nnz();
        let free = self.row_idx.len() - self.nnz;
        if vnnz > free {
            let needed = vnnz - free;
            let len = ((self.row_idx.len() + needed) as f64 * GROWTH).ceil() as usize;
            self.resize(len);
        }
        let start = self.col_ptr[col];
        self.row_idx[start..start + vnnz].copy_from_slice(v.indices());
        self.values[start..start + vnnz].copy_from_slice(v.values());
        for p in &mut self.col_ptr[col + 1..] {
            *p += vnnz;
        }
        self.nnz += vnnz;
    }

    /// Copy column `col` out into `v`.
    pub fn get_col(&self, col: usize, v: &mut SparseVec<S>) {
        let (start, end) = (self.col_ptr[col], self.col_ptr[col + 1]);
        if start == end {
            v.zero();
        } else {
            v.set_parts(
                end - start,
                &self.row_idx[start..end],
                &self.values[start..end],
            );
        }
    }

    /// Recount `nnz` from the column pointers.
    pub fn update_nnz(&mut self) {
        self.nnz = self.col_ptr[self.dim.ncols];
    }

    /// Fraction of cells that are stored: `nnz / (nrows * ncols)`.
    pub fn sparsity(&self) -> f64 {
        self.nnz as f64 / (self.dim.nrows as f64 * self.dim.ncols as f64)
    }

    pub fn density(&self) -> f64 {
        1.0 - self.sparsity()
    }

    /// Verify the CSC shape: pointers start at 0, end at `nnz`, never
    /// decrease, and every column holds in-range strictly ascending rows.
    pub fn check_invariants(&self) -> Result<(), CscError> {
        if self.nnz > self.row_idx.len() {
            return Err(CscError::EntryCountExceedsStorage {
                nnz: self.nnz,
                len: self.row_idx.len(),
            });
        }
        if self.row_idx.len() != self.values.len() {
            return Err(CscError::IndexValueLengthMismatch {
                row_idx: self.row_idx.len(),
                values: self.values.len(),
            });
        }
        RawCsc::new(
            self.dim.nrows,
            self.dim.ncols,
            &self.col_ptr,
            self.row_idx(),
            self.values(),
        )
        .map(|_| ())
    }
}

impl<S: Scalar> fmt::Display for CscMatrix<S> {
    /// Logical dense form, one text row per matrix row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.dim.nrows {
            for j in 0..self.dim.ncols {
                if j > 0 {
                    f.write_str(" ")?;
                }
                let (start, end) = (self.col_ptr[j], self.col_ptr[j + 1]);
                let v = match self.row_idx[start..end].binary_search(&i) {
                    Ok(k) => self.values[start + k],
                    Err(_) => S::zero(),
                };
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
