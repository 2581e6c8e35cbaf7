//! Reduce a band-ish matrix across four in-process ranks and compare the two
//! algorithms.

use std::thread;

use spreduce::{LocalComm, Root, generate, reduce};

fn main() {
    let n = 64;
    let comms = LocalComm::group(4);
    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .enumerate()
            .map(|(rank, comm)| {
                s.spawn(move || {
                    let x = generate::bandish::<f64>(rank as u64 + 1, n, n);
                    let local_nnz = x.nnz();
                    let d = reduce::dense(Root::All, &x, &comm).expect("dense reduce");
                    let g = reduce::gather(Root::All, &x, &comm).expect("gather reduce");
                    assert_eq!(d.col_ptr(), g.col_ptr());
                    assert_eq!(d.values(), g.values());
                    (rank, local_nnz, d.nnz())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread"))
            .collect()
    });

    for (rank, local_nnz, sum_nnz) in results {
        println!("rank {rank}: {local_nnz} local entries -> {sum_nnz} in the sum");
    }
}
