// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::alloc::{Allocator, GlobalAllocator};
use crate::{ByteOrder, RpcBuf};

/// What an [`RpcBuf`] does with its storage when an allocation fails.
///
/// Either way the buffer enters the failed state and rejects further writes until it is
/// released or reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorPolicy {
    /// Keep the storage and the bytes committed so far. The caller can still inspect them.
    #[default]
    Retain,

    /// Release the storage immediately, resetting capacity and length to zero.
    ///
    /// Use this when a failed payload is always discarded, to give memory back as early as
    /// possible under memory pressure.
    Release,
}

/// Collects the construction-time configuration of an [`RpcBuf`].
///
/// Obtain an instance via [`RpcBuf::builder()`]. The configuration is fixed for the lifetime of
/// the buffer and survives [`release()`][RpcBuf::release] and
/// [`soft_reset()`][RpcBuf::soft_reset].
///
/// # Example
///
/// ```
/// use rpcbuf::{ByteOrder, ErrorPolicy, RpcBuf};
///
/// let buf = RpcBuf::builder()
///     .with_byte_order(ByteOrder::Swapped)
///     .with_error_policy(ErrorPolicy::Release)
///     .build();
///
/// assert!(buf.byte_order().swaps_bytes());
/// assert_eq!(buf.error_policy(), ErrorPolicy::Release);
/// assert_eq!(buf.capacity(), 0);
/// ```
#[derive(Debug)]
#[must_use]
pub struct RpcBufBuilder<A = GlobalAllocator> {
    byte_order: ByteOrder,
    error_policy: ErrorPolicy,
    allocator: A,
}

impl RpcBufBuilder<GlobalAllocator> {
    pub(crate) const fn new() -> Self {
        Self {
            byte_order: ByteOrder::Native,
            error_policy: ErrorPolicy::Retain,
            allocator: GlobalAllocator,
        }
    }
}

impl<A: Allocator> RpcBufBuilder<A> {
    /// Sets the byte order of multi-byte values written into the buffer.
    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Sets what happens to the storage when an allocation fails.
    pub const fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    /// Sets the allocator that provides storage for the buffer.
    pub fn with_allocator<B: Allocator>(self, allocator: B) -> RpcBufBuilder<B> {
        RpcBufBuilder {
            byte_order: self.byte_order,
            error_policy: self.error_policy,
            allocator,
        }
    }

    /// Creates an empty buffer with the collected configuration.
    ///
    /// No storage is allocated until the first write.
    pub fn build(self) -> RpcBuf<A> {
        RpcBuf::from_parts(self.byte_order, self.error_policy, self.allocator)
    }
}
