// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::AllocError;
use crate::alloc::Allocator;

/// Implements [`Allocator`] by delegating to a closure.
///
/// This can be used to construct wrapping allocators that add accounting, limits or fault
/// injection on top of an existing allocator.
///
/// # Example
///
/// ```
/// use rpcbuf::alloc::{Allocator, CallbackAllocator, GlobalAllocator};
/// use rpcbuf::{AllocError, RpcBuf};
///
/// // Refuses to hold more than 8 KiB per buffer.
/// let capped = CallbackAllocator::new(|storage: &mut Vec<u8>, new_capacity| {
///     if new_capacity > 8192 {
///         return Err(AllocError::new(new_capacity));
///     }
///     GlobalAllocator.grow(storage, new_capacity)
/// });
///
/// let mut buf = RpcBuf::builder().with_allocator(capped).build();
///
/// assert!(buf.put_raw(&[0; 8192]).is_ok());
/// assert!(buf.put_u8(1).is_err());
/// assert!(buf.is_failed());
/// ```
pub struct CallbackAllocator<FGrow>
where
    FGrow: Fn(&mut Vec<u8>, usize) -> Result<(), AllocError> + Send + Sync + 'static,
{
    grow_fn: Arc<FGrow>,
}

impl<FGrow> CallbackAllocator<FGrow>
where
    FGrow: Fn(&mut Vec<u8>, usize) -> Result<(), AllocError> + Send + Sync + 'static,
{
    /// Creates a new instance implemented via the provided callback.
    pub fn new(grow_fn: FGrow) -> Self {
        Self { grow_fn: Arc::new(grow_fn) }
    }
}

impl<FGrow> Allocator for CallbackAllocator<FGrow>
where
    FGrow: Fn(&mut Vec<u8>, usize) -> Result<(), AllocError> + Send + Sync + 'static,
{
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn grow(&self, storage: &mut Vec<u8>, new_capacity: usize) -> Result<(), AllocError> {
        (self.grow_fn)(storage, new_capacity)
    }
}

impl<FGrow> Clone for CallbackAllocator<FGrow>
where
    FGrow: Fn(&mut Vec<u8>, usize) -> Result<(), AllocError> + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            grow_fn: Arc::clone(&self.grow_fn),
        }
    }
}

impl<FGrow> fmt::Debug for CallbackAllocator<FGrow>
where
    FGrow: Fn(&mut Vec<u8>, usize) -> Result<(), AllocError> + Send + Sync + 'static,
{
    #[cfg_attr(test, mutants::skip)] // We have no API contract for this.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("grow_fn", &"Fn(&mut Vec<u8>, usize) -> Result<(), AllocError>")
            .finish()
    }
}
