//! Collective operations across processes
use crate::types::{RealScalar, Result};

pub trait ProcessReduction {
    //! A group of processes that take part in collective operations
    //!
    //! Every method is collective: all processes in the group must call it the
    //! same number of times and in the same order.

    /// The rank of this process
    fn rank(&self) -> usize;

    /// The number of processes
    fn size(&self) -> usize;

    /// Element-wise sum of `buffer` over all processes, written back into `buffer`
    ///
    /// The buffer lengths are compared first. If they differ, every process
    /// returns [`crate::types::Error::ShapeMismatch`] and `buffer` is unchanged.
    fn sum_reduce<T: RealScalar>(&self, buffer: &mut [T]) -> Result<()>;

    /// Concatenation of the `local` slices of all processes in rank order
    fn all_gather<T: RealScalar>(&self, local: &[T]) -> Vec<T>;
}
