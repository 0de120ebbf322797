//! Shared accumulator storage
use crate::types::RealScalar;

pub trait AccumulatorStorage: Sync {
    //! A vector that can be updated by many threads at once
    //!
    //! Every update of a single index is atomic. Indexing out of bounds panics.

    /// Scalar type
    type T: RealScalar;

    /// The number of entries
    fn len(&self) -> usize;

    /// Check if there are no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add `delta` to an entry
    fn add_at(&self, index: usize, delta: Self::T);

    /// Overwrite an entry
    fn set_at(&self, index: usize, value: Self::T);

    /// Read an entry
    fn read_at(&self, index: usize) -> Self::T;

    /// Copy of all entries
    fn to_vec(&self) -> Vec<Self::T> {
        (0..self.len()).map(|i| self.read_at(i)).collect()
    }
}
