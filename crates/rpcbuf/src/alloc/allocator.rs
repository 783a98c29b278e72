// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

use crate::AllocError;

/// Provides storage capacity for an [`RpcBuf`][crate::RpcBuf].
///
/// The buffer keeps its bytes in a `Vec<u8>` whose length is the buffer capacity. When a write
/// needs more room, the buffer asks its allocator to [`grow()`][Self::grow] that vector to a
/// larger, chunk-aligned capacity. Releasing storage is done by the buffer itself, by dropping
/// the vector.
///
/// Allocators must be fallible: running out of memory is reported as an [`AllocError`] instead
/// of aborting the process, so the buffer can enter its failed state and let the caller decide
/// what to do with the request.
pub trait Allocator: Debug {
    /// Grows `storage` so that its length is exactly `new_capacity` bytes.
    ///
    /// The existing contents must be preserved. Bytes added at the end must be zero.
    ///
    /// The buffer only calls this with `new_capacity` greater than `storage.len()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity cannot be provided. `storage` must then be left
    /// unchanged.
    fn grow(&self, storage: &mut Vec<u8>, new_capacity: usize) -> Result<(), AllocError>;
}

impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn grow(&self, storage: &mut Vec<u8>, new_capacity: usize) -> Result<(), AllocError> {
        (*self).grow(storage, new_capacity)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::Allocator;
    use crate::AllocError;
    use crate::alloc::GlobalAllocator;

    #[derive(Debug)]
    struct CountingAllocator {
        grow_calls: AtomicUsize,
        inner: GlobalAllocator,
    }

    impl Allocator for CountingAllocator {
        fn grow(&self, storage: &mut Vec<u8>, new_capacity: usize) -> Result<(), AllocError> {
            self.grow_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.grow(storage, new_capacity)
        }
    }

    fn grow_with_generic<A: Allocator>(allocator: A, storage: &mut Vec<u8>, new_capacity: usize) -> Result<(), AllocError> {
        allocator.grow(storage, new_capacity)
    }

    #[test]
    fn allocator_impl_for_reference_forwards_grow_to_underlying() {
        let allocator = CountingAllocator {
            grow_calls: AtomicUsize::new(0),
            inner: GlobalAllocator,
        };
        let mut storage = Vec::new();

        grow_with_generic(&allocator, &mut storage, 64).unwrap();

        assert_eq!(allocator.grow_calls.load(Ordering::SeqCst), 1);
        assert_eq!(storage.len(), 64);
    }
}
