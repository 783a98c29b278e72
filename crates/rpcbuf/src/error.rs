// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::TryReserveError;
use std::io;

/// A specialized `Result` for operations on an [`RpcBuf`][crate::RpcBuf].
pub type Result<T> = std::result::Result<T, Error>;

/// An error returned by a mutating operation on an [`RpcBuf`][crate::RpcBuf].
///
/// Every failure traces back to an allocation that could not be satisfied. The first such
/// failure is reported as [`Error::Allocation`]; from then on the buffer is in the failed state
/// and every further mutating operation reports [`Error::Failed`] until the buffer is released
/// or reset.
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The allocator could not provide the capacity needed for the write.
    #[error(transparent)]
    Allocation(#[from] AllocError),

    /// The buffer is in the failed state because of an earlier allocation failure, either its
    /// own or one inherited from a failed buffer appended into it.
    #[error("buffer is unusable after an earlier allocation failure")]
    Failed,
}

/// Represents a buffer failure as a standard I/O error.
///
/// This is often used when handing a payload over to transport code that speaks `std::io`.
impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        Self::new(io::ErrorKind::OutOfMemory, value)
    }
}

/// The allocator refused to grow buffer storage to the requested capacity.
///
/// Arithmetic overflow while computing the new capacity is reported the same way, with
/// `requested` saturated to `usize::MAX`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("failed to grow buffer storage to {requested} bytes")]
pub struct AllocError {
    requested: usize,

    #[source]
    source: Option<TryReserveError>,
}

impl AllocError {
    /// Creates an error for a refused growth to `requested` bytes of capacity.
    #[must_use]
    pub const fn new(requested: usize) -> Self {
        Self { requested, source: None }
    }

    pub(crate) const fn from_try_reserve(requested: usize, source: TryReserveError) -> Self {
        Self {
            requested,
            source: Some(source),
        }
    }

    /// The total capacity, in bytes, that could not be provided.
    #[must_use]
    pub const fn requested(&self) -> usize {
        self.requested
    }
}
