// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use nm::{Event, Magnitude};

use crate::alloc::{Allocator, GlobalAllocator};
use crate::{AllocError, ByteOrder, CHUNK_SIZE, Error, ErrorPolicy, Result, RpcBufBuilder};

/// Assembles an outgoing wire payload in a single contiguous, growable block of memory.
///
/// Writers append typed values, strings and byte spans at the end of the committed data. Storage
/// grows in [`CHUNK_SIZE`] steps when a write does not fit, so appending is amortized O(1).
///
/// Multi-byte values are laid out according to the [`ByteOrder`] chosen when the buffer is
/// built. Padded writers fill with zero bytes up to the next [`ALIGNMENT`][crate::ALIGNMENT]
/// boundary of the whole payload.
///
/// # Failure
///
/// If the allocator cannot provide more storage, the write fails with [`Error::Allocation`] and
/// the buffer enters the failed state. Every later mutating operation then fails with
/// [`Error::Failed`] without touching the buffer, so a payload is never silently truncated. What
/// happens to the existing storage is decided by the [`ErrorPolicy`]. The failed state lasts
/// until [`release()`][Self::release] or [`soft_reset()`][Self::soft_reset].
///
/// # Example
///
/// ```
/// use rpcbuf::RpcBuf;
///
/// let mut buf = RpcBuf::new();
///
/// buf.put_u8(1)?;
/// buf.put_u8(0)?;
/// buf.put_u16(7)?;
/// buf.put_str_padded(c"hello")?;
///
/// assert_eq!(buf.len(), 12);
/// assert_eq!(buf.alignment_units(), 3);
///
/// let payload = buf.into_vec()?;
/// assert_eq!(&payload[4..9], b"hello");
/// # Ok::<(), rpcbuf::Error>(())
/// ```
///
/// # Thread safety
///
/// The buffer is `Send` if its allocator is, so it can move between threads, but it is only
/// ever mutated by its single owner.
#[derive(Debug)]
pub struct RpcBuf<A = GlobalAllocator> {
    // The vector length is the buffer capacity. Bytes past `len` are zero or stale.
    storage: Vec<u8>,

    // Committed bytes, always <= storage.len().
    len: usize,

    byte_order: ByteOrder,
    error_policy: ErrorPolicy,
    state: State,
    allocator: A,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Ready,
    Failed,
}

impl RpcBuf<GlobalAllocator> {
    /// Creates an empty buffer in native byte order that retains its storage on failure.
    ///
    /// No memory is allocated until the first write.
    #[must_use]
    pub const fn new() -> Self {
        Self::from_parts(ByteOrder::Native, ErrorPolicy::Retain, GlobalAllocator)
    }

    /// Starts building a buffer with a non-default configuration.
    pub const fn builder() -> RpcBufBuilder {
        RpcBufBuilder::new()
    }
}

impl Default for RpcBuf<GlobalAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> RpcBuf<A> {
    pub(crate) const fn from_parts(byte_order: ByteOrder, error_policy: ErrorPolicy, allocator: A) -> Self {
        Self {
            storage: Vec::new(),
            len: 0,
            byte_order,
            error_policy,
            state: State::Ready,
            allocator,
        }
    }

    /// Number of bytes committed so far. This is also the position of the next write.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bytes have been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total bytes of storage currently allocated.
    ///
    /// After any growth this is a positive multiple of [`CHUNK_SIZE`].
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes that can still be written without growing the storage.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        // Will never underflow because len never exceeds the storage length.
        self.storage.len().wrapping_sub(self.len)
    }

    /// Whether an allocation failure has put the buffer into the failed state.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state == State::Failed
    }

    /// The byte order of multi-byte values written into the buffer.
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// What happens to the storage when an allocation fails.
    #[must_use]
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// The allocator that provides storage for this buffer.
    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// The committed bytes, ready to be handed to the transport.
    ///
    /// Check [`is_failed()`][Self::is_failed] before transmitting: a failed buffer does not hold
    /// a complete payload.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Consumes the buffer and returns the committed bytes.
    ///
    /// The returned vector reuses the buffer storage; no bytes are copied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Failed`] if the buffer is in the failed state, as its content is not a
    /// complete payload.
    pub fn into_vec(self) -> Result<Vec<u8>> {
        self.ensure_ready()?;

        let mut storage = self.storage;
        storage.truncate(self.len);
        Ok(storage)
    }

    /// Makes sure at least `needed` bytes can be written without growing the storage.
    ///
    /// When growth is needed, the new capacity is the smallest multiple of [`CHUNK_SIZE`] that
    /// fits all committed bytes plus `needed`. Committed bytes are preserved. Capacity never
    /// shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Failed`] if the buffer is already in the failed state. Returns
    /// [`Error::Allocation`] if the storage cannot grow; the buffer then enters the failed state
    /// and applies its [`ErrorPolicy`].
    pub fn ensure_room(&mut self, needed: usize) -> Result<()> {
        self.ensure_ready()?;

        if self.remaining_capacity() >= needed {
            return Ok(());
        }

        let Some(new_capacity) = self
            .len
            .checked_add(needed)
            .and_then(|required| required.checked_next_multiple_of(CHUNK_SIZE))
        else {
            return Err(self.fail(AllocError::new(usize::MAX)));
        };

        let old_capacity = self.capacity();

        if let Err(error) = self.allocator.grow(&mut self.storage, new_capacity) {
            return Err(self.fail(error));
        }

        if self.storage.len() < new_capacity {
            // The allocator reported success without providing the room.
            return Err(self.fail(AllocError::new(new_capacity)));
        }

        tracing::debug!(old_capacity, new_capacity, "rpc buffer storage grown");
        GROWN_CAPACITY.with(|e| e.observe(new_capacity));

        Ok(())
    }

    /// Commits the next `needed` bytes and returns them for direct writing.
    ///
    /// The content of the returned region is unspecified. Use
    /// [`reserve_zeroed()`][Self::reserve_zeroed] if parts of it may be left unwritten.
    ///
    /// # Example
    ///
    /// ```
    /// use rpcbuf::RpcBuf;
    ///
    /// let mut buf = RpcBuf::new();
    ///
    /// let header = buf.reserve(4)?;
    /// header.copy_from_slice(&[1, 2, 3, 4]);
    ///
    /// assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    /// # Ok::<(), rpcbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails as [`ensure_room()`][Self::ensure_room] does. The length is unchanged on failure.
    pub fn reserve(&mut self, needed: usize) -> Result<&mut [u8]> {
        self.ensure_room(needed)?;

        let start = self.len;
        // Cannot overflow, ensure_room() checked that start + needed fits in the storage.
        self.len = start.wrapping_add(needed);

        Ok(&mut self.storage[start..self.len])
    }

    /// Commits the next `needed` bytes, zero-filled, and returns them for direct writing.
    ///
    /// # Errors
    ///
    /// Fails as [`ensure_room()`][Self::ensure_room] does. The length is unchanged on failure.
    pub fn reserve_zeroed(&mut self, needed: usize) -> Result<&mut [u8]> {
        let region = self.reserve(needed)?;
        region.fill(0);
        Ok(region)
    }

    /// Frees the storage and returns the buffer to its empty, non-failed state.
    ///
    /// The byte order, error policy and allocator are kept. Calling this on an empty buffer does
    /// nothing.
    pub fn release(&mut self) {
        self.storage = Vec::new();
        self.len = 0;
        self.state = State::Ready;
    }

    /// Empties the buffer for reuse, keeping its storage.
    ///
    /// The previously committed bytes are zeroed, so nothing from the old payload can leak into
    /// the next one. Clears the failed state.
    pub fn soft_reset(&mut self) {
        self.storage[..self.len].fill(0);
        self.len = 0;
        self.state = State::Ready;
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        match self.state {
            State::Ready => Ok(()),
            State::Failed => Err(Error::Failed),
        }
    }

    /// Enters the failed state without an allocation of our own failing, e.g. when a failed
    /// buffer is appended into this one.
    pub(crate) fn mark_failed(&mut self) {
        self.state = State::Failed;

        match self.error_policy {
            ErrorPolicy::Release => {
                self.storage = Vec::new();
                self.len = 0;
            }
            // A misbehaving allocator may have shrunk the storage under the committed bytes.
            ErrorPolicy::Retain => self.len = self.len.min(self.storage.len()),
        }
    }

    fn fail(&mut self, error: AllocError) -> Error {
        tracing::warn!(
            requested = error.requested(),
            capacity = self.capacity(),
            policy = ?self.error_policy,
            "rpc buffer allocation failed"
        );
        if let Some(magnitude) = failed_capacity_magnitude(error.requested()) {
            ALLOCATION_FAILED_CAPACITY.with(|e| e.observe(magnitude));
        }

        self.mark_failed();
        Error::Allocation(error)
    }

    pub(crate) fn swaps_bytes(&self) -> bool {
        self.byte_order.swaps_bytes()
    }
}

impl<A: Allocator> AsRef<[u8]> for RpcBuf<A> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Capacities beyond the histogram range come from overflowing size arithmetic, not from an
/// allocator refusing a real request. They are not recorded.
fn failed_capacity_magnitude(requested: usize) -> Option<Magnitude> {
    Magnitude::try_from(requested).ok()
}

const CAPACITY_BUCKETS: &[Magnitude] = &[4096, 8192, 16_384, 65_536, 262_144, 1_048_576];

thread_local! {
    static GROWN_CAPACITY: Event = Event::builder()
        .name("rpcbuf_grown_capacity")
        .histogram(CAPACITY_BUCKETS)
        .build();

    static ALLOCATION_FAILED_CAPACITY: Event = Event::builder()
        .name("rpcbuf_allocation_failed_capacity")
        .histogram(CAPACITY_BUCKETS)
        .build();
}
