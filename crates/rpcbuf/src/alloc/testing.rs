// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Utilities for testing buffer logic under allocation pressure.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::AllocError;
use crate::alloc::{Allocator, GlobalAllocator};

/// An allocator that refuses to grow storage beyond a fixed capacity limit.
///
/// Growth within the limit is delegated to the [`GlobalAllocator`]. Every call to
/// [`grow()`][Allocator::grow] is counted, whether it succeeds or not, so tests can verify how
/// often a buffer reallocates.
#[derive(Debug)]
pub struct LimitedAllocator {
    limit: usize,
    grow_calls: AtomicUsize,
}

impl LimitedAllocator {
    /// Creates an allocator that provides at most `limit` bytes of capacity per buffer.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            grow_calls: AtomicUsize::new(0),
        }
    }

    /// Creates an allocator that never provides any capacity.
    #[must_use]
    pub const fn exhausted() -> Self {
        Self::new(0)
    }

    /// The number of times storage growth has been requested from this allocator.
    #[must_use]
    pub fn grow_calls(&self) -> usize {
        self.grow_calls.load(Ordering::Relaxed)
    }
}

impl Allocator for LimitedAllocator {
    fn grow(&self, storage: &mut Vec<u8>, new_capacity: usize) -> Result<(), AllocError> {
        self.grow_calls.fetch_add(1, Ordering::Relaxed);

        if new_capacity > self.limit {
            return Err(AllocError::new(new_capacity));
        }

        GlobalAllocator.grow(storage, new_capacity)
    }
}
