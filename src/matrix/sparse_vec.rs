use std::fmt;

use num_traits::Zero;

use crate::matrix::dense::DenseVec;
use crate::matrix::error::SparseVecError;
use crate::scalar::Scalar;

/// Growable sparse vector: parallel index/value arrays whose live prefix
/// holds `nnz` entries with strictly ascending indices.
///
/// Storage is kept at an explicit allocated length with a zeroed dead tail,
/// so capacity is part of the observable contract: [`SparseVec::add`] refuses
/// to grow on its own and instead reports how many slots the caller must
/// provide before retrying.
#[derive(Debug, Clone)]
pub struct SparseVec<S> {
    indices: Vec<usize>,
    values: Vec<S>,
    nnz: usize,
}

impl<S: Scalar> SparseVec<S> {
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
            nnz: 0,
        }
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            indices: vec![0; len],
            values: vec![S::zero(); len],
            nnz: 0,
        }
    }

    /// Allocated length of the index/value arrays.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nnz == 0
    }

    /// Number of live entries.
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Live index prefix, strictly ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices[..self.nnz]
    }

    /// Values parallel to [`indices`](Self::indices).
    pub fn values(&self) -> &[S] {
        &self.values[..self.nnz]
    }

    /// Grow or shrink the backing storage; a grown tail is zeroed.
    pub fn resize(&mut self, len: usize) {
        if len == self.indices.len() {
            return;
        }
        self.indices.resize(len, 0);
        self.values.resize(len, S::zero());
        if self.nnz > len {
            self.nnz = len;
        }
    }

    /// Zero the live prefix and reset `nnz`. No allocation.
    pub fn zero(&mut self) {
        if self.nnz > 0 {
            self.indices[..self.nnz].fill(0);
            self.values[..self.nnz].fill(S::zero());
            self.nnz = 0;
        }
    }

    /// Insert `s` at index `i`, keeping the index order. Inserting at an
    /// index already present overwrites the stored value. Grows by one slot
    /// when the storage is full.
    pub fn insert(&mut self, i: usize, s: S) {
        let pos = self.indices[..self.nnz]
            .iter()
            .position(|&ix| ix >= i)
            .unwrap_or(self.nnz);
        if pos < self.nnz && self.indices[pos] == i {
            self.values[pos] = s;
            return;
        }
        if self.nnz == self.indices.len() {
            let len = self.indices.len();
            self.resize(len + 1);
        }
        self.shift_in(pos, i, s);
    }

    /// Value at logical index `i`, zero when absent.
    pub fn get(&self, i: usize) -> S {
        match self.indices[..self.nnz].iter().position(|&ix| ix == i) {
            Some(pos) => self.values[pos],
            None => S::zero(),
        }
    }

    /// Recount `nnz` as the length of the leading run of non-zero values.
    /// Needed after a third party wrote the arrays directly.
    pub fn update_nnz(&mut self) {
        self.nnz = self.values.iter().take_while(|x| !x.is_zero()).count();
    }

    /// Element-wise add `other` into `self`.
    ///
    /// A first pass counts the indices of `other` that are missing here; when
    /// they do not fit in the free tail that count is returned and nothing is
    /// mutated, so the caller can `resize` and retry. Returns 0 on success.
    pub fn add(&mut self, other: &SparseVec<S>) -> usize {
        let mut num_new = 0;
        let mut ind = 0;
        for &oi in other.indices() {
            while ind < self.nnz && self.indices[ind] < oi {
                ind += 1;
            }
            if ind >= self.nnz || self.indices[ind] > oi {
                num_new += 1;
            }
        }
        if num_new > self.indices.len() - self.nnz {
            return num_new;
        }

        let mut ind = 0;
        for k in 0..other.nnz {
            let oi = other.indices[k];
            while ind < self.nnz && self.indices[ind] < oi {
                ind += 1;
            }
            if ind < self.nnz && self.indices[ind] == oi {
                self.values[ind] += other.values[k];
                ind += 1;
            } else {
                self.shift_in(ind, oi, other.values[k]);
            }
        }
        0
    }

    /// Add a dense slice, skipping its zeros. Same capacity contract as
    /// [`add`](Self::add).
    pub fn add_dense(&mut self, x: &[S]) -> usize {
        let mut num_new = 0;
        let mut ind = 0;
        for (xi, xv) in x.iter().enumerate() {
            if xv.is_zero() {
                continue;
            }
            while ind < self.nnz && self.indices[ind] < xi {
                ind += 1;
            }
            if ind >= self.nnz || self.indices[ind] > xi {
                num_new += 1;
            }
        }
        if num_new > self.indices.len() - self.nnz {
            return num_new;
        }

        let mut ind = 0;
        for (xi, &xv) in x.iter().enumerate() {
            if xv.is_zero() {
                continue;
            }
            while ind < self.nnz && self.indices[ind] < xi {
                ind += 1;
            }
            if ind < self.nnz && self.indices[ind] == xi {
                self.values[ind] += xv;
                ind += 1;
            } else {
                self.shift_in(ind, xi, xv);
            }
        }
        0
    }

    /// Scatter into the dense vector `d`.
    ///
    /// `d` must be long enough to address every stored index; on a too-small
    /// target an error is returned and `d` is untouched.
    pub fn densify(&self, d: &mut DenseVec<S>) -> Result<(), SparseVecError> {
        if self.nnz > 0 {
            let max_index = self.indices[self.nnz - 1];
            if d.len() <= max_index {
                return Err(SparseVecError::DenseTooSmall {
                    max_index,
                    dense_len: d.len(),
                });
            }
        }
        d.zero();
        for k in 0..self.nnz {
            d.insert(self.indices[k], self.values[k]);
        }
        Ok(())
    }

    /// Bulk-replace the contents with `nnz` entries taken from parallel
    /// slices of ascending indices and values. Grows as needed; when
    /// shrinking, the abandoned tail is zeroed.
    pub fn set_parts(&mut self, nnz: usize, indices: &[usize], values: &[S]) {
        if self.indices.len() < nnz {
            self.resize(nnz);
        } else if self.nnz > nnz {
            self.indices[nnz..self.nnz].fill(0);
            self.values[nnz..self.nnz].fill(S::zero());
        }
        self.indices[..nnz].copy_from_slice(&indices[..nnz]);
        self.values[..nnz].copy_from_slice(&values[..nnz]);
        self.nnz = nnz;
    }

    /// Sparsify `d`: keep its non-zero entries, in index order.
    pub fn set_dense(&mut self, d: &DenseVec<S>) {
        let dnnz = d.nnz();
        if dnnz > self.indices.len() {
            self.resize(dnnz);
        } else if self.nnz > dnnz {
            self.indices[dnnz..self.nnz].fill(0);
            self.values[dnnz..self.nnz].fill(S::zero());
        }
        let mut pos = 0;
        for (i, &v) in d.as_slice().iter().enumerate() {
            if !v.is_zero() {
                self.indices[pos] = i;
                self.values[pos] = v;
                pos += 1;
            }
        }
        self.nnz = dnnz;
    }

    fn shift_in(&mut self, pos: usize, i: usize, s: S) {
        for k in (pos..self.nnz).rev() {
            self.indices[k + 1] = self.indices[k];
            self.values[k + 1] = self.values[k];
        }
        self.indices[pos] = i;
        self.values[pos] = s;
        self.nnz += 1;
    }
}

impl<S: Scalar> Default for SparseVec<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar> fmt::Display for SparseVec<S> {
    /// Conceptual dense rendering up to the highest stored index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nnz == 0 {
            return Ok(());
        }
        let top = self.indices[self.nnz - 1];
        let mut pos = 0;
        for i in 0..=top {
            if i > 0 {
                f.write_str(" ")?;
            }
            if pos < self.nnz && self.indices[pos] == i {
                write!(f, "{}", self.values[pos])?;
                pos += 1;
            } else {
                write!(f, "{}", S::zero())?;
            }
        }
        Ok(())
    }
}
