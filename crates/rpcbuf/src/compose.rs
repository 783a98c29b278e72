// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Writers that combine other writes into larger protocol structures.

use crate::alloc::Allocator;
use crate::{Error, Result, RpcBuf};

impl<A: Allocator> RpcBuf<A> {
    /// Appends the committed content of `source` as one padded byte span and releases `source`.
    ///
    /// This lets variable-length parts of a payload be assembled in a scratch buffer and then
    /// spliced into the parent. The bytes are copied, after which `source` is released whether
    /// or not the append succeeded.
    ///
    /// If `source` is in the failed state, its failure carries over: this buffer enters the
    /// failed state too (applying its own [`ErrorPolicy`][crate::ErrorPolicy]) and
    /// [`Error::Failed`] is returned. A payload assembled from parts therefore only succeeds if
    /// every part did.
    ///
    /// # Example
    ///
    /// ```
    /// use rpcbuf::RpcBuf;
    ///
    /// let mut atoms = RpcBuf::new();
    /// atoms.put_u32s(&[1, 2, 3])?;
    /// atoms.put_u8(0xFF)?;
    ///
    /// let mut reply = RpcBuf::new();
    /// reply.put_rpcbuf_padded(&mut atoms)?;
    ///
    /// assert_eq!(reply.len(), 16);
    /// assert_eq!(atoms.capacity(), 0);
    /// # Ok::<(), rpcbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Failed`] if either buffer is in the failed state, or an allocation error
    /// if this buffer cannot grow.
    pub fn put_rpcbuf_padded<B: Allocator>(&mut self, source: &mut RpcBuf<B>) -> Result<()> {
        let result = if source.is_failed() {
            tracing::debug!(
                dest_len = self.len(),
                policy = ?self.error_policy(),
                "appended rpc buffer had failed, failing destination"
            );

            self.mark_failed();
            Err(Error::Failed)
        } else {
            self.put_raw_padded(source.as_slice())
        };

        source.release();
        result
    }

    /// Appends an X11 `RECTANGLE`: `INT16` x, `INT16` y, `CARD16` width, `CARD16` height.
    ///
    /// The four fields are written back to back in the byte order of the buffer, 8 bytes in
    /// total, with no padding.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    pub fn put_rect(&mut self, x: i16, y: i16, width: u16, height: u16) -> Result<()> {
        self.ensure_room(8)?;

        self.put_i16(x)?;
        self.put_i16(y)?;
        self.put_u16(width)?;
        self.put_u16(height)
    }
}
