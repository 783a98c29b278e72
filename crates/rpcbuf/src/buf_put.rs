// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Unpadded writers for scalars and arrays of scalars.

use num_traits::ToBytes;

use crate::alloc::Allocator;
use crate::{Result, RpcBuf};

impl<A: Allocator> RpcBuf<A> {
    /// Appends a number of type `T` in the byte order of the buffer.
    ///
    /// No padding is added.
    ///
    /// # Example
    ///
    /// ```
    /// use rpcbuf::{ByteOrder, Endian, RpcBuf};
    ///
    /// let mut buf = RpcBuf::builder()
    ///     .with_byte_order(ByteOrder::for_target(Endian::Big))
    ///     .build();
    ///
    /// buf.put_num(0xCAFE_u16)?;
    /// buf.put_num(0xDEAD_BEEF_u32)?;
    ///
    /// assert_eq!(buf.as_slice(), &[0xCA, 0xFE, 0xDE, 0xAD, 0xBE, 0xEF]);
    /// # Ok::<(), rpcbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    #[expect(clippy::needless_pass_by_value, reason = "tiny numeric types, fine to always pass by value")]
    pub fn put_num<T: ToBytes>(&mut self, value: T) -> Result<()> {
        let mut bytes = value.to_ne_bytes();

        if self.swaps_bytes() {
            bytes.as_mut().reverse();
        }

        let src = bytes.as_ref();
        self.reserve(src.len())?.copy_from_slice(src);
        Ok(())
    }

    /// Appends consecutive numbers of type `T`, each in the byte order of the buffer.
    ///
    /// An empty slice writes nothing. No padding is added.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    pub fn put_nums<T: ToBytes>(&mut self, values: &[T]) -> Result<()> {
        // Every value of `T` encodes to the same number of bytes, which need not be its size in
        // memory.
        let width = values.first().map_or(0, |value| value.to_ne_bytes().as_ref().len());

        if width == 0 {
            return self.ensure_ready();
        }

        // An unrepresentable total fails in reserve() like any other capacity overflow.
        let total = width.checked_mul(values.len()).unwrap_or(usize::MAX);
        let swap = self.swaps_bytes();

        let dst = self.reserve(total)?;

        for (chunk, value) in dst.chunks_exact_mut(width).zip(values) {
            let mut bytes = value.to_ne_bytes();

            if swap {
                bytes.as_mut().reverse();
            }

            chunk.copy_from_slice(bytes.as_ref());
        }

        Ok(())
    }

    /// Appends a `CARD8`. Single bytes are never reordered.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?[0] = value;
        Ok(())
    }

    /// Appends a `CARD16` in the byte order of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put_num(value)
    }

    /// Appends an `INT16` in the byte order of the buffer.
    ///
    /// The two's-complement bit pattern is written as is, exactly like the `CARD16` with the
    /// same bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_i16(&mut self, value: i16) -> Result<()> {
        self.put_u16(value.cast_unsigned())
    }

    /// Appends a `CARD32` in the byte order of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put_num(value)
    }

    /// Appends an `INT32` in the byte order of the buffer.
    ///
    /// The two's-complement bit pattern is written as is, exactly like the `CARD32` with the
    /// same bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_i32(&mut self, value: i32) -> Result<()> {
        self.put_u32(value.cast_unsigned())
    }

    /// Appends a list of `CARD8`s verbatim. No padding is added.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_u8s(&mut self, values: &[u8]) -> Result<()> {
        self.put_raw(values)
    }

    /// Appends a list of `CARD16`s in the byte order of the buffer. No padding is added.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_u16s(&mut self, values: &[u16]) -> Result<()> {
        self.put_nums(values)
    }

    /// Appends a list of `CARD32`s in the byte order of the buffer. No padding is added.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn put_u32s(&mut self, values: &[u32]) -> Result<()> {
        self.put_nums(values)
    }
}
