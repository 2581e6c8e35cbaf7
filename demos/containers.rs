//! Container walkthrough: sparse vectors, densify, CSC assembly, builder.

use spreduce::{CscBuilder, CscMatrix, DenseVec, SparseVec};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut s = SparseVec::with_len(4);
    s.insert(0, 1.0);
    s.insert(5, 2.5);
    s.insert(9, -1.0);
    println!("sparse vector ({} stored): {s}", s.nnz());

    let mut d = DenseVec::with_len(10);
    s.densify(&mut d)?;
    println!("densified sum: {}", d.sum());

    // first-difference matrix, one column at a time
    let mut x = CscMatrix::with_len(4, 4, 8);
    let mut col = SparseVec::with_len(2);
    for j in 0..4 {
        col.zero();
        col.insert(j, 1.0);
        if j + 1 < 4 {
            col.insert(j + 1, -1.0);
        }
        x.insert(j, &col);
    }
    println!(
        "difference matrix ({} stored, sparsity {:.3}):",
        x.nnz(),
        x.sparsity()
    );
    print!("{x}");

    let mut b = CscBuilder::new(3, 3);
    b.push(0, 0, 2.0)?;
    b.push(1, 1, 2.0)?;
    b.push(2, 2, 2.0)?;
    b.push(0, 0, -2.0)?;
    let y = b.build();
    println!("builder kept {} entries after cancellation", y.nnz());
    Ok(())
}
