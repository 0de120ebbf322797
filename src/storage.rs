//! Shared vectors that indicator contributions are accumulated into
use crate::traits::AccumulatorStorage;
use crate::types::RealScalar;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A scalar type with a lock-free atomic representation
pub trait AtomicScalar: RealScalar {
    /// Atomic storage for a value
    type Atomic: Send + Sync;

    /// Create atomic storage holding a value
    fn new_atomic(value: Self) -> Self::Atomic;
    /// Read the value
    fn load(atomic: &Self::Atomic) -> Self;
    /// Overwrite the value
    fn store(atomic: &Self::Atomic, value: Self);
    /// Add to the value
    fn fetch_add(atomic: &Self::Atomic, delta: Self);
}

macro_rules! atomic_scalar {
    ($dtype:ty, $atomic:ty) => {
        impl AtomicScalar for $dtype {
            type Atomic = $atomic;

            fn new_atomic(value: Self) -> Self::Atomic {
                <$atomic>::new(value.to_bits())
            }
            fn load(atomic: &Self::Atomic) -> Self {
                <$dtype>::from_bits(atomic.load(Ordering::Acquire))
            }
            fn store(atomic: &Self::Atomic, value: Self) {
                atomic.store(value.to_bits(), Ordering::Release)
            }
            fn fetch_add(atomic: &Self::Atomic, delta: Self) {
                // The closure never declines, so the update always succeeds
                let _ = atomic.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                    Some((<$dtype>::from_bits(bits) + delta).to_bits())
                });
            }
        }
    };
}

atomic_scalar!(f32, AtomicU32);
atomic_scalar!(f64, AtomicU64);

/// A vector with a lock-free atomic add on every entry
pub struct AtomicVector<T: AtomicScalar> {
    data: Vec<T::Atomic>,
}

impl<T: AtomicScalar> AtomicVector<T> {
    /// Create a vector of zeros
    pub fn new(len: usize) -> Self {
        Self::from_vec(vec![T::zero(); len])
    }

    /// Create a vector holding the given values
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            data: values.into_iter().map(T::new_atomic).collect(),
        }
    }

    /// Consume the vector and return its values
    pub fn into_vec(self) -> Vec<T> {
        self.data.iter().map(T::load).collect()
    }
}

impl<T: AtomicScalar> AccumulatorStorage for AtomicVector<T> {
    type T = T;

    fn len(&self) -> usize {
        self.data.len()
    }
    fn add_at(&self, index: usize, delta: T) {
        T::fetch_add(&self.data[index], delta)
    }
    fn set_at(&self, index: usize, value: T) {
        T::store(&self.data[index], value)
    }
    fn read_at(&self, index: usize) -> T {
        T::load(&self.data[index])
    }
}

/// A vector protected by a table of locks, each guarding a contiguous stripe of indices
pub struct StripedVector<T: RealScalar> {
    stripes: Vec<Mutex<Vec<T>>>,
    stripe_size: usize,
    len: usize,
}

impl<T: RealScalar> StripedVector<T> {
    /// Create a vector of zeros split into stripes of at most `stripe_size` entries
    pub fn new(len: usize, stripe_size: usize) -> Self {
        Self::from_vec(vec![T::zero(); len], stripe_size)
    }

    /// Create a vector holding the given values
    pub fn from_vec(values: Vec<T>, stripe_size: usize) -> Self {
        assert!(stripe_size > 0, "Stripe size must be positive");
        let len = values.len();
        let stripes = values
            .chunks(stripe_size)
            .map(|chunk| Mutex::new(chunk.to_vec()))
            .collect();
        Self {
            stripes,
            stripe_size,
            len,
        }
    }

    /// The number of locks
    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Consume the vector and return its values
    pub fn into_vec(self) -> Vec<T> {
        self.stripes
            .into_iter()
            .flat_map(|stripe| stripe.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    fn lock(&self, index: usize) -> (MutexGuard<'_, Vec<T>>, usize) {
        if index >= self.len {
            panic!("Index {index} out of range for vector of length {}", self.len);
        }
        let guard = self.stripes[index / self.stripe_size]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        (guard, index % self.stripe_size)
    }
}

impl<T: RealScalar> AccumulatorStorage for StripedVector<T> {
    type T = T;

    fn len(&self) -> usize {
        self.len
    }
    fn add_at(&self, index: usize, delta: T) {
        let (mut stripe, i) = self.lock(index);
        stripe[i] = stripe[i] + delta;
    }
    fn set_at(&self, index: usize, value: T) {
        let (mut stripe, i) = self.lock(index);
        stripe[i] = value;
    }
    fn read_at(&self, index: usize) -> T {
        let (stripe, i) = self.lock(index);
        stripe[i]
    }
}
