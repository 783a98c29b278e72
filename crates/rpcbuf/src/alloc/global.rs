// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::AllocError;
use crate::alloc::Allocator;

/// An allocator that obtains storage from the Rust global allocator.
///
/// Growth goes through [`Vec::try_reserve_exact()`], so an exhausted heap is reported as an
/// [`AllocError`] rather than aborting the process.
///
/// This is the allocator used by [`RpcBuf::new()`][crate::RpcBuf::new].
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalAllocator;

impl Allocator for GlobalAllocator {
    fn grow(&self, storage: &mut Vec<u8>, new_capacity: usize) -> Result<(), AllocError> {
        let additional = new_capacity.saturating_sub(storage.len());

        storage
            .try_reserve_exact(additional)
            .map_err(|source| AllocError::from_try_reserve(new_capacity, source))?;

        // Capacity is already there, so this only zero-fills.
        storage.resize(new_capacity, 0);

        Ok(())
    }
}
