use std::any::Any;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use num_traits::Zero;

use super::error::CommError;
use super::{CommScalar, Communicator, ReduceOp, Root};

/// In-process communicator: one handle per rank, collectives rendezvous
/// through shared memory.
///
/// The group is the unit of construction ([`LocalComm::group`]); each handle
/// is moved into the thread that plays its rank. A rank that panics inside a
/// collective poisons the group, and every peer observes a communication
/// failure instead of blocking forever.
pub struct LocalComm {
    rank: usize,
    shared: Arc<Shared>,
}

struct Shared {
    size: usize,
    round: Mutex<Round>,
    cv: Condvar,
}

/// One collective in flight. Ranks deposit a payload, the last arrival
/// publishes the assembled round, and everyone drains it before the next
/// round may start.
struct Round {
    payloads: Vec<Option<Box<dyn Any + Send>>>,
    published: Option<Arc<dyn Any + Send + Sync>>,
    arrived: usize,
    draining: usize,
    generation: u64,
}

impl LocalComm {
    /// Create a group of `size` connected handles, one per rank, in rank
    /// order.
    pub fn group(size: usize) -> Vec<LocalComm> {
        let shared = Arc::new(Shared {
            size,
            round: Mutex::new(Round {
                payloads: (0..size).map(|_| None).collect(),
                published: None,
                arrived: 0,
                draining: 0,
                generation: 0,
            }),
            cv: Condvar::new(),
        });
        (0..size)
            .map(|rank| LocalComm {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// Deposit `payload` and receive every rank's payload for this round,
    /// in rank order.
    fn exchange<T: CommScalar>(&self, payload: Vec<T>) -> Result<Arc<Vec<Vec<T>>>, CommError> {
        let sh = &self.shared;
        let mut round = lock(&sh.round)?;
        while round.draining > 0 {
            round = wait(&sh.cv, round)?;
        }
        let started = round.generation;
        round.payloads[self.rank] = Some(Box::new(payload));
        round.arrived += 1;
        if round.arrived == sh.size {
            let mut all = Vec::with_capacity(sh.size);
            for slot in round.payloads.iter_mut() {
                let boxed = slot.take().ok_or_else(|| CommError::Substrate {
                    message: "rank payload missing from collective round".to_string(),
                })?;
                let vec = boxed
                    .downcast::<Vec<T>>()
                    .map_err(|_| CommError::TypeMismatch {
                        expected: T::DATATYPE,
                    })?;
                all.push(*vec);
            }
            round.published = Some(Arc::new(all));
            round.generation += 1;
            round.arrived = 0;
            round.draining = sh.size;
            sh.cv.notify_all();
        } else {
            while round.generation == started {
                round = wait(&sh.cv, round)?;
            }
        }
        let published = round.published.clone().ok_or_else(|| CommError::Substrate {
            message: "collective round vanished before pickup".to_string(),
        })?;
        round.draining -= 1;
        if round.draining == 0 {
            round.published = None;
            sh.cv.notify_all();
        }
        drop(round);
        published
            .downcast::<Vec<Vec<T>>>()
            .map_err(|_| CommError::TypeMismatch {
                expected: T::DATATYPE,
            })
    }
}

impl fmt::Debug for LocalComm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalComm")
            .field("rank", &self.rank)
            .field("size", &self.shared.size)
            .finish()
    }
}

fn lock(m: &Mutex<Round>) -> Result<MutexGuard<'_, Round>, CommError> {
    m.lock().map_err(|_| poisoned())
}

fn wait<'a>(cv: &Condvar, guard: MutexGuard<'a, Round>) -> Result<MutexGuard<'a, Round>, CommError> {
    cv.wait(guard).map_err(|_| poisoned())
}

fn poisoned() -> CommError {
    CommError::Substrate {
        message: "a rank panicked inside a collective and poisoned the group".to_string(),
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn barrier(&self) -> Result<(), CommError> {
        self.exchange::<u8>(Vec::new()).map(|_| ())
    }

    fn reduce<T: CommScalar>(
        &self,
        root: Root,
        op: ReduceOp,
        buf: &mut [T],
    ) -> Result<(), CommError> {
        let all = self.exchange(buf.to_vec())?;
        for part in all.iter() {
            if part.len() != buf.len() {
                return Err(CommError::LengthMismatch {
                    expected: buf.len(),
                    actual: part.len(),
                });
            }
        }
        if root.receives(self.rank) {
            match op {
                ReduceOp::Sum => {
                    for (k, out) in buf.iter_mut().enumerate() {
                        let mut acc = T::zero();
                        for part in all.iter() {
                            acc += part[k];
                        }
                        *out = acc;
                    }
                }
            }
        }
        Ok(())
    }

    fn gather<T: CommScalar>(
        &self,
        root: Root,
        send: &[T],
        recv: &mut [T],
    ) -> Result<(), CommError> {
        let all = self.exchange(send.to_vec())?;
        if root.receives(self.rank) {
            let total: usize = all.iter().map(Vec::len).sum();
            if recv.len() < total {
                return Err(CommError::LengthMismatch {
                    expected: total,
                    actual: recv.len(),
                });
            }
            let mut at = 0;
            for part in all.iter() {
                recv[at..at + part.len()].copy_from_slice(part);
                at += part.len();
            }
        }
        Ok(())
    }

    fn gatherv<T: CommScalar>(
        &self,
        root: Root,
        send: &[T],
        recv: &mut [T],
        counts: &[usize],
        displs: &[usize],
    ) -> Result<(), CommError> {
        let all = self.exchange(send.to_vec())?;
        if root.receives(self.rank) {
            if counts.len() != self.shared.size || displs.len() != self.shared.size {
                return Err(CommError::LengthMismatch {
                    expected: self.shared.size,
                    actual: counts.len().min(displs.len()),
                });
            }
            for (r, part) in all.iter().enumerate() {
                if part.len() != counts[r] {
                    return Err(CommError::LengthMismatch {
                        expected: counts[r],
                        actual: part.len(),
                    });
                }
                let at = displs[r];
                if at + part.len() > recv.len() {
                    return Err(CommError::LengthMismatch {
                        expected: at + part.len(),
                        actual: recv.len(),
                    });
                }
                recv[at..at + part.len()].copy_from_slice(part);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run<T, F>(size: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(LocalComm) -> T + Sync,
    {
        let comms = LocalComm::group(size);
        thread::scope(|s| {
            let f = &f;
            let handles: Vec<_> = comms.into_iter().map(|c| s.spawn(move || f(c))).collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("rank thread"))
                .collect()
        })
    }

    #[test]
    fn group_assigns_ranks_in_order() {
        let comms = LocalComm::group(3);
        let ranks: Vec<_> = comms.iter().map(|c| c.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
        assert!(comms.iter().all(|c| c.size() == 3));
    }

    #[test]
    fn barrier_releases_every_rank() {
        let out = run(4, |comm| comm.barrier().is_ok());
        assert_eq!(out, vec![true; 4]);
    }

    #[test]
    fn reduce_sums_on_the_root_only() {
        let out = run(3, |comm| {
            let mut buf = vec![(comm.rank() + 1) as i64; 4];
            comm.reduce(Root::Rank(1), ReduceOp::Sum, &mut buf)
                .expect("reduce");
            buf
        });
        assert_eq!(out[0], vec![1; 4]);
        assert_eq!(out[1], vec![6; 4]);
        assert_eq!(out[2], vec![3; 4]);
    }

    #[test]
    fn allreduce_delivers_everywhere() {
        let out = run(3, |comm| {
            let mut buf = vec![comm.rank() as f64, 1.0];
            comm.reduce(Root::All, ReduceOp::Sum, &mut buf).expect("reduce");
            buf
        });
        for buf in out {
            assert_eq!(buf, vec![3.0, 3.0]);
        }
    }

    #[test]
    fn gather_orders_contributions_by_rank() {
        let out = run(3, |comm| {
            let send = [comm.rank() as u32 * 10, comm.rank() as u32 * 10 + 1];
            let mut recv = vec![0u32; 6];
            comm.gather(Root::Rank(2), &send, &mut recv).expect("gather");
            recv
        });
        assert_eq!(out[2], vec![0, 1, 10, 11, 20, 21]);
        assert_eq!(out[0], vec![0; 6]);
    }

    #[test]
    fn gatherv_places_at_displacements() {
        let out = run(3, |comm| {
            let send: Vec<u64> = (0..comm.rank() + 1).map(|k| k as u64 + 100).collect();
            let counts = [1, 2, 3];
            let displs = [0, 1, 3];
            let mut recv = vec![0u64; 6];
            comm.gatherv(Root::All, &send, &mut recv, &counts, &displs)
                .expect("gatherv");
            recv
        });
        for recv in out {
            assert_eq!(recv, vec![100, 100, 101, 100, 101, 102]);
        }
    }

    #[test]
    fn collectives_pipeline_back_to_back() {
        let out = run(2, |comm| {
            let mut total = 0i64;
            for round in 0..50 {
                let mut buf = [comm.rank() as i64 + round];
                comm.reduce(Root::All, ReduceOp::Sum, &mut buf).expect("reduce");
                total += buf[0];
            }
            total
        });
        // sum over rounds of (0 + r) + (1 + r) = 2r + 1
        let expected: i64 = (0..50).map(|r| 2 * r + 1).sum();
        assert_eq!(out, vec![expected; 2]);
    }

    #[test]
    fn poisoned_group_surfaces_a_comm_failure() {
        let comms = LocalComm::group(2);
        let (a, b) = {
            let mut it = comms.into_iter();
            (it.next().expect("rank 0"), it.next().expect("rank 1"))
        };
        // rank 1 panics while holding the round lock; rank 0 must get an
        // error rather than hang
        let h = thread::spawn(move || {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let _guard = b.shared.round.lock().expect("lock");
                panic!("rank died mid-collective");
            }));
            drop(b);
        });
        h.join().expect("panicking rank thread");
        let err = a.barrier().unwrap_err();
        assert!(matches!(err, CommError::Substrate { .. }));
    }
}
