//! Seeded CSC test-data generators.

use num_traits::One;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::matrix::{CscMatrix, SparseVec};
use crate::scalar::Scalar;

/// Banded 0/1 matrix: ones exactly where `|i - j| < band`.
pub fn banded<S: Scalar>(band: usize, nrows: usize, ncols: usize) -> CscMatrix<S> {
    let nnz: usize = (0..ncols).map(|j| band_rows(band, nrows, j).len()).sum();
    let mut x = CscMatrix::with_len(nrows, ncols, nnz);
    let mut s = SparseVec::with_len(2 * band);
    for j in 0..ncols {
        s.zero();
        for i in band_rows(band, nrows, j) {
            s.insert(i, S::one());
        }
        x.insert(j, &s);
    }
    x
}

/// Band-concentrated Bernoulli matrix: cell `(i, j)` is one with probability
/// `max(1 - 2|i - j|/m - 2/m, 0)` where `m` is the row count. Reproducible
/// for a given `seed`.
pub fn bandish<S: Scalar>(seed: u64, nrows: usize, ncols: usize) -> CscMatrix<S> {
    let slen = nrows / 2;
    let mut x = CscMatrix::with_len(nrows, ncols, slen * nrows.min(ncols));
    let mut s = SparseVec::with_len(slen);
    let mut rng = StdRng::seed_from_u64(seed);
    for j in 0..ncols {
        s.zero();
        for i in 0..nrows {
            if rng.gen_bool(band_weight(i, j, nrows)) {
                s.insert(i, S::one());
            }
        }
        x.insert(j, &s);
    }
    x
}

/// Random 0/1 matrix with roughly `clamp(p, 0, 1) * nrows * ncols` entries.
///
/// With `exact` the entry count is hit exactly: positions are a uniform
/// sample without replacement, drawn by reservoir over the flat column-major
/// index space. Otherwise every cell is an independent Bernoulli draw.
/// Reproducible for a given `seed`.
pub fn random<S: Scalar>(seed: u64, p: f64, nrows: usize, ncols: usize, exact: bool) -> CscMatrix<S> {
    let cells = nrows * ncols;
    let p = p.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(seed);

    if exact {
        let target = (p * cells as f64).floor() as usize;
        let mut picks: Vec<usize> = (0..target).collect();
        for t in target..cells {
            let k = rng.gen_range(0..=t);
            if k < target {
                picks[k] = t;
            }
        }
        picks.sort_unstable();

        let mut x = CscMatrix::with_len(nrows, ncols, target);
        let mut s = SparseVec::with_len(target.min(nrows));
        let mut at = 0;
        for j in 0..ncols {
            s.zero();
            let end = (j + 1) * nrows;
            while at < picks.len() && picks[at] < end {
                s.insert(picks[at] - j * nrows, S::one());
                at += 1;
            }
            x.insert(j, &s);
        }
        x
    } else {
        let mut x = CscMatrix::with_len(nrows, ncols, (p * cells as f64) as usize);
        let mut s = SparseVec::with_len(nrows);
        for j in 0..ncols {
            s.zero();
            for i in 0..nrows {
                if rng.gen_bool(p) {
                    s.insert(i, S::one());
                }
            }
            x.insert(j, &s);
        }
        x
    }
}

fn band_rows(band: usize, nrows: usize, j: usize) -> std::ops::Range<usize> {
    if band == 0 || nrows == 0 {
        return 0..0;
    }
    let lo = j.saturating_sub(band - 1);
    let hi = (j + band).min(nrows);
    if lo >= hi { 0..0 } else { lo..hi }
}

/// Probability that cell `(i, j)` of a band-ish matrix is populated, fading
/// linearly with the distance from the diagonal and clamped at zero.
fn band_weight(i: usize, j: usize, nrows: usize) -> f64 {
    let m = nrows as f64;
    let dist = (i as f64 - j as f64).abs() / m;
    (1.0 - 2.0 * dist - 2.0 / m).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2, 5, 5, 13)]
    #[case(1, 4, 4, 4)]
    #[case(3, 6, 6, 24)]
    #[case(2, 3, 6, 8)]
    #[case(0, 4, 4, 0)]
    fn banded_has_closed_form_nnz(
        #[case] band: usize,
        #[case] nrows: usize,
        #[case] ncols: usize,
        #[case] nnz: usize,
    ) {
        let x = banded::<i32>(band, nrows, ncols);
        assert_eq!(x.nrows(), nrows);
        assert_eq!(x.ncols(), ncols);
        assert_eq!(x.nnz(), nnz);
        x.check_invariants().expect("csc invariants");
    }

    #[test]
    fn banded_2_is_tridiagonal() {
        let x = banded::<i32>(2, 5, 5);
        assert_eq!(x.col_ptr(), &[0, 2, 5, 8, 11, 13]);
        let mut s = SparseVec::new();
        x.get_col(0, &mut s);
        assert_eq!(s.indices(), &[0, 1]);
        x.get_col(2, &mut s);
        assert_eq!(s.indices(), &[1, 2, 3]);
        assert_eq!(s.values(), &[1, 1, 1]);
        x.get_col(4, &mut s);
        assert_eq!(s.indices(), &[3, 4]);
    }

    #[test]
    fn bandish_is_seed_reproducible() {
        let a = bandish::<i64>(42, 24, 16);
        let b = bandish::<i64>(42, 24, 16);
        assert_eq!(a.col_ptr(), b.col_ptr());
        assert_eq!(a.row_idx(), b.row_idx());
        assert_eq!(a.values(), b.values());
        a.check_invariants().expect("csc invariants");
    }

    #[test]
    fn bandish_concentrates_on_the_band() {
        let x = bandish::<i64>(7, 40, 40);
        for (k, &i) in x.row_idx().iter().enumerate() {
            let j = x.col_ptr().iter().filter(|&&p| p <= k).count() - 1;
            let dist = i.abs_diff(j) as f64;
            // weight is zero outside |i - j| / m >= 1/2 - 1/m
            assert!(dist / 40.0 < 0.5, "entry ({i}, {j}) far off the band");
        }
        x.check_invariants().expect("csc invariants");
    }

    #[test]
    fn random_exact_hits_the_target_count() {
        let x = random::<f64>(3, 0.2, 30, 20, true);
        assert_eq!(x.nnz(), 120);
        x.check_invariants().expect("csc invariants");
    }

    #[test]
    fn random_is_seed_reproducible() {
        let a = random::<f64>(11, 0.15, 25, 25, true);
        let b = random::<f64>(11, 0.15, 25, 25, true);
        assert_eq!(a.col_ptr(), b.col_ptr());
        assert_eq!(a.row_idx(), b.row_idx());

        let c = random::<f64>(11, 0.15, 25, 25, false);
        let d = random::<f64>(11, 0.15, 25, 25, false);
        assert_eq!(c.col_ptr(), d.col_ptr());
        assert_eq!(c.row_idx(), d.row_idx());
        c.check_invariants().expect("csc invariants");
    }

    #[test]
    fn random_approximate_lands_near_the_target() {
        let x = random::<i32>(5, 0.3, 50, 50, false);
        let target = 0.3 * 50.0 * 50.0;
        let nnz = x.nnz() as f64;
        assert!((nnz - target).abs() < target * 0.25, "nnz {nnz} vs target {target}");
    }

    #[test]
    fn random_clamps_probability() {
        let full = random::<i32>(1, 2.0, 6, 6, true);
        assert_eq!(full.nnz(), 36);
        let empty = random::<i32>(1, -1.0, 6, 6, true);
        assert_eq!(empty.nnz(), 0);
    }
}
