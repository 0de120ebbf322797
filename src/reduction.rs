//! Process groups that collective reductions run over
//!
//! [`SerialReduction`] is a group with a single process. [`ThreadGroup`] runs
//! several ranks as threads of one process, which lets multi-process behaviour
//! be exercised without MPI. With the `mpi` feature, [`CommunicatorReduction`]
//! wraps an MPI communicator.
use crate::traits::ProcessReduction;
use crate::types::{Error, RealScalar, Result};
use std::sync::{Arc, Barrier, Mutex, MutexGuard, PoisonError};

#[cfg(feature = "mpi")]
use mpi::{
    collective::SystemOperation,
    datatype::PartitionMut,
    traits::{Communicator, CommunicatorCollectives},
    Count,
};

/// A group containing only the calling process
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialReduction;

impl ProcessReduction for SerialReduction {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn sum_reduce<T: RealScalar>(&self, _buffer: &mut [T]) -> Result<()> {
        Ok(())
    }
    fn all_gather<T: RealScalar>(&self, local: &[T]) -> Vec<T> {
        local.to_vec()
    }
}

#[derive(Default)]
struct ExchangeState {
    lengths: Vec<usize>,
    sum: Vec<f64>,
    slices: Vec<Vec<f64>>,
}

struct Exchange {
    barrier: Barrier,
    state: Mutex<ExchangeState>,
}

impl Exchange {
    fn lock(&self) -> MutexGuard<'_, ExchangeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_f64<T: RealScalar>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn from_f64<T: RealScalar>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// A group of ranks that run as threads of the calling process
pub struct ThreadGroup {
    exchange: Arc<Exchange>,
    size: usize,
}

impl ThreadGroup {
    /// Create a group with `size` ranks
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "A group needs at least one rank");
        Self {
            exchange: Arc::new(Exchange {
                barrier: Barrier::new(size),
                state: Mutex::new(ExchangeState {
                    lengths: vec![0; size],
                    sum: vec![],
                    slices: vec![vec![]; size],
                }),
            }),
            size,
        }
    }

    /// The handles of all ranks, in rank order
    ///
    /// Every handle must be moved to its own thread: collective operations
    /// block until all ranks have entered them.
    pub fn ranks(&self) -> Vec<ThreadRank> {
        (0..self.size)
            .map(|rank| ThreadRank {
                rank,
                size: self.size,
                exchange: Arc::clone(&self.exchange),
            })
            .collect()
    }

    /// Run `f` on `size` ranks, each on its own thread, and return the results in rank order
    pub fn run<R: Send>(size: usize, f: impl Fn(ThreadRank) -> R + Sync) -> Vec<R> {
        let group = Self::new(size);
        std::thread::scope(|scope| {
            let handles = group
                .ranks()
                .into_iter()
                .map(|rank| {
                    let f = &f;
                    scope.spawn(move || f(rank))
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|e| std::panic::resume_unwind(e))
                })
                .collect()
        })
    }
}

/// One rank of a [`ThreadGroup`]
pub struct ThreadRank {
    rank: usize,
    size: usize,
    exchange: Arc<Exchange>,
}

impl ProcessReduction for ThreadRank {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }

    fn sum_reduce<T: RealScalar>(&self, buffer: &mut [T]) -> Result<()> {
        let exchange = &self.exchange;
        let len = buffer.len();

        exchange.lock().lengths[self.rank] = len;
        exchange.barrier.wait();
        let (min, max) = {
            let state = exchange.lock();
            let min = state.lengths.iter().copied().min().unwrap_or(len);
            let max = state.lengths.iter().copied().max().unwrap_or(len);
            (min, max)
        };
        // Lengths must not be overwritten by a later call before every rank has read them
        exchange.barrier.wait();
        if min != max {
            return Err(Error::ShapeMismatch {
                local: len,
                min,
                max,
            });
        }

        {
            let mut state = exchange.lock();
            if state.sum.is_empty() {
                state.sum = vec![0.0; len];
            }
            for (s, b) in state.sum.iter_mut().zip(buffer.iter()) {
                *s += to_f64(*b);
            }
        }
        exchange.barrier.wait();
        {
            let state = exchange.lock();
            for (b, s) in buffer.iter_mut().zip(&state.sum) {
                *b = from_f64(*s);
            }
        }
        if exchange.barrier.wait().is_leader() {
            exchange.lock().sum.clear();
        }
        Ok(())
    }

    fn all_gather<T: RealScalar>(&self, local: &[T]) -> Vec<T> {
        let exchange = &self.exchange;

        exchange.lock().slices[self.rank] = local.iter().map(|v| to_f64(*v)).collect();
        exchange.barrier.wait();
        let result: Vec<T> = exchange
            .lock()
            .slices
            .iter()
            .flatten()
            .map(|v| from_f64(*v))
            .collect();
        exchange.barrier.wait();
        result
    }
}

#[cfg(feature = "mpi")]
/// A group formed by an MPI communicator
pub struct CommunicatorReduction<'a, C: Communicator> {
    comm: &'a C,
}

#[cfg(feature = "mpi")]
impl<'a, C: Communicator> CommunicatorReduction<'a, C> {
    /// Create new
    pub fn new(comm: &'a C) -> Self {
        Self { comm }
    }

    /// The communicator
    pub fn comm(&self) -> &'a C {
        self.comm
    }
}

#[cfg(feature = "mpi")]
impl<'a, C: Communicator> ProcessReduction for CommunicatorReduction<'a, C> {
    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }
    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn sum_reduce<T: RealScalar>(&self, buffer: &mut [T]) -> Result<()> {
        let local = buffer.len() as u64;
        let mut min = 0u64;
        let mut max = 0u64;
        self.comm
            .all_reduce_into(&local, &mut min, SystemOperation::min());
        self.comm
            .all_reduce_into(&local, &mut max, SystemOperation::max());
        if min != max {
            return Err(Error::ShapeMismatch {
                local: local as usize,
                min: min as usize,
                max: max as usize,
            });
        }

        let send = buffer.to_vec();
        self.comm
            .all_reduce_into(&send[..], buffer, SystemOperation::sum());
        Ok(())
    }

    fn all_gather<T: RealScalar>(&self, local: &[T]) -> Vec<T> {
        let count = local.len() as Count;
        let mut counts = vec![0 as Count; self.size()];
        self.comm.all_gather_into(&count, &mut counts[..]);

        let displacements = counts
            .iter()
            .scan(0 as Count, |offset, c| {
                let d = *offset;
                *offset += c;
                Some(d)
            })
            .collect::<Vec<_>>();
        let total = counts.iter().map(|c| *c as usize).sum::<usize>();

        let mut result = vec![T::zero(); total];
        {
            let mut partition = PartitionMut::new(&mut result[..], counts, &displacements[..]);
            self.comm.all_gather_varcount_into(local, &mut partition);
        }
        result
    }
}
