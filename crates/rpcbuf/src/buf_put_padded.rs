// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Writers for byte spans and strings that keep the payload aligned to protocol units.

use std::ffi::CStr;

use crate::alloc::Allocator;
use crate::{ALIGNMENT, Result, RpcBuf};

/// How an absent string is written by [`RpcBuf::put_str0_padded()`].
const ABSENT_STRING: [u8; 4] = [0; 4];

/// Zero bytes needed to bring `len` up to the next protocol unit boundary.
const fn padding_for(len: usize) -> usize {
    (ALIGNMENT - len % ALIGNMENT) % ALIGNMENT
}

impl<A: Allocator> RpcBuf<A> {
    /// Number of 4-byte protocol units the committed bytes occupy, rounding up.
    ///
    /// This is the value of a protocol length field covering the whole buffer.
    #[must_use]
    pub fn alignment_units(&self) -> usize {
        self.len().div_ceil(ALIGNMENT)
    }

    /// Appends zero bytes up to the next 4-byte boundary. Does nothing if already aligned.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow.
    pub fn pad_to_alignment(&mut self) -> Result<()> {
        self.reserve_zeroed(padding_for(self.len()))?;
        Ok(())
    }

    /// Appends a slice of bytes verbatim. No padding is added.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    pub fn put_raw(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Appends a slice of bytes verbatim, followed by zero bytes up to the next 4-byte boundary.
    ///
    /// Padding is measured from the start of the buffer, so the result is aligned no matter
    /// what was written before. An empty slice writes nothing, not even padding.
    ///
    /// # Example
    ///
    /// ```
    /// use rpcbuf::RpcBuf;
    ///
    /// let mut buf = RpcBuf::new();
    /// buf.put_u8(0xFF)?;
    /// buf.put_raw_padded(&[1, 2])?;
    ///
    /// assert_eq!(buf.as_slice(), &[0xFF, 1, 2, 0]);
    /// # Ok::<(), rpcbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    pub fn put_raw_padded(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return self.ensure_ready();
        }

        self.put_spans_padded(&[data])
    }

    /// Appends the bytes of a C string without its terminator, padded to a 4-byte boundary.
    ///
    /// An empty string writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    pub fn put_str_padded(&mut self, value: &CStr) -> Result<()> {
        self.put_raw_padded(value.to_bytes())
    }

    /// Appends the bytes of a C string including its terminator, padded to a 4-byte boundary.
    ///
    /// An absent string is written as a single 4-byte zero value, which the protocol reads as
    /// "no string". An empty string produces the same bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use rpcbuf::RpcBuf;
    ///
    /// let mut buf = RpcBuf::new();
    /// buf.put_str0_padded(Some(c"abcd"))?;
    /// buf.put_str0_padded(None)?;
    ///
    /// assert_eq!(buf.as_slice(), b"abcd\0\0\0\0\0\0\0\0");
    /// # Ok::<(), rpcbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    pub fn put_str0_padded(&mut self, value: Option<&CStr>) -> Result<()> {
        match value {
            Some(value) => self.put_spans_padded(&[value.to_bytes_with_nul()]),
            None => self.put_spans_padded(&[&ABSENT_STRING[..]]),
        }
    }

    /// Appends a counted string: a `CARD16` byte count in the byte order of the buffer, the
    /// string bytes without terminator, and zero bytes up to the next 4-byte boundary.
    ///
    /// An absent string writes nothing, not even the count. Strings longer than `u16::MAX`
    /// bytes are truncated to that length so the count always matches the bytes that follow.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has failed or cannot grow. Nothing is committed then.
    pub fn put_counted_str_padded(&mut self, value: Option<&CStr>) -> Result<()> {
        let Some(value) = value else {
            return self.ensure_ready();
        };

        let mut bytes = value.to_bytes();

        let count = u16::try_from(bytes.len()).unwrap_or_else(|_| {
            tracing::warn!(len = bytes.len(), "counted string truncated to {} bytes", u16::MAX);
            bytes = &bytes[..usize::from(u16::MAX)];
            u16::MAX
        });

        let count = if self.swaps_bytes() { count.swap_bytes() } else { count };
        let count = count.to_ne_bytes();

        self.put_spans_padded(&[&count[..], bytes])
    }

    /// Appends the spans back to back followed by padding, growing at most once so that either
    /// everything or nothing is committed.
    fn put_spans_padded(&mut self, spans: &[&[u8]]) -> Result<()> {
        let data_len = spans.iter().map(|span| span.len()).fold(0_usize, usize::saturating_add);
        let padding = padding_for(self.len().wrapping_add(data_len));

        self.ensure_room(data_len.saturating_add(padding))?;

        for span in spans {
            self.put_raw(span)?;
        }

        self.reserve_zeroed(padding)?;
        Ok(())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::alloc::testing::LimitedAllocator;
    use crate::{ByteOrder, CHUNK_SIZE, Error, ErrorPolicy};

    #[test]
    fn padding_for_each_remainder() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 3);
        assert_eq!(padding_for(2), 2);
        assert_eq!(padding_for(3), 1);
        assert_eq!(padding_for(4), 0);
        assert_eq!(padding_for(usize::MAX), 1);
    }

    #[test]
    fn alignment_units_rounds_up() {
        let mut buf = RpcBuf::new();
        assert_eq!(buf.alignment_units(), 0);

        for len in 1..=9_usize {
            buf.put_u8(0).unwrap();
            assert_eq!(buf.alignment_units(), len.div_ceil(4));
        }
    }

    #[test]
    fn pad_to_alignment_fills_with_zeros() {
        let mut buf = RpcBuf::new();
        buf.put_raw(&[0xFF; 5]).unwrap();

        buf.pad_to_alignment().unwrap();
        assert_eq!(buf.as_slice(), &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0]);

        // Already aligned.
        buf.pad_to_alignment().unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn pad_to_alignment_overwrites_stale_bytes() {
        let mut buf = RpcBuf::new();
        buf.put_raw(&[0xFF; 8]).unwrap();
        buf.soft_reset();
        buf.put_u8(1).unwrap();

        buf.pad_to_alignment().unwrap();

        assert_eq!(buf.as_slice(), &[1, 0, 0, 0]);
    }

    #[test]
    fn put_raw_is_unpadded() {
        let mut buf = RpcBuf::new();

        buf.put_raw(b"abc").unwrap();
        buf.put_raw(&[]).unwrap();

        assert_eq!(buf.as_slice(), b"abc");
    }

    #[test]
    fn put_raw_padded_measures_from_buffer_start() {
        let mut buf = RpcBuf::new();
        buf.put_raw(&[9; 3]).unwrap();

        buf.put_raw_padded(&[1, 2, 3, 4]).unwrap();

        assert_eq!(buf.as_slice(), &[9, 9, 9, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn put_raw_padded_empty_writes_nothing() {
        let mut buf = RpcBuf::new();
        buf.put_u8(1).unwrap();

        buf.put_raw_padded(&[]).unwrap();

        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn put_str_padded_pads_short_string() {
        let mut buf = RpcBuf::new();

        buf.put_str_padded(c"ab").unwrap();

        assert_eq!(buf.len(), 4);
        assert_eq!(buf.as_slice(), &[b'a', b'b', 0, 0]);
    }

    #[test]
    fn put_str_padded_empty_writes_nothing() {
        let mut buf = RpcBuf::new();

        buf.put_str_padded(c"").unwrap();

        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn put_str0_padded_includes_terminator() {
        let mut buf = RpcBuf::new();

        buf.put_str0_padded(Some(c"abc")).unwrap();
        assert_eq!(buf.as_slice(), b"abc\0");

        buf.put_str0_padded(Some(c"de")).unwrap();
        assert_eq!(buf.as_slice(), b"abc\0de\0\0");
    }

    #[test]
    fn put_str0_padded_absent_is_four_zero_bytes() {
        let mut buf = RpcBuf::new();

        buf.put_str0_padded(None).unwrap();

        assert_eq!(buf.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn put_str0_padded_absent_stays_aligned() {
        let mut buf = RpcBuf::new();
        buf.put_u8(7).unwrap();

        buf.put_str0_padded(None).unwrap();

        assert_eq!(buf.as_slice(), &[7, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn put_counted_str_padded_layout() {
        let mut buf = RpcBuf::new();

        buf.put_counted_str_padded(Some(c"abc")).unwrap();

        let bytes = buf.as_slice();
        assert_eq!(u16::from_ne_bytes([bytes[0], bytes[1]]), 3);
        assert_eq!(&bytes[2..5], b"abc");
        assert_eq!(&bytes[5..], &[0, 0, 0]);
        assert_eq!(buf.len() % 4, 0);
    }

    #[test]
    fn put_counted_str_padded_swaps_count() {
        let mut buf = RpcBuf::builder().with_byte_order(ByteOrder::Swapped).build();

        buf.put_counted_str_padded(Some(c"abc")).unwrap();

        assert_eq!(&buf.as_slice()[..2], &0x0300_u16.to_ne_bytes());
    }

    #[test]
    fn put_counted_str_padded_absent_writes_nothing() {
        let mut buf = RpcBuf::new();

        buf.put_counted_str_padded(None).unwrap();

        assert!(buf.is_empty());
    }

    #[test]
    fn put_counted_str_padded_empty_writes_count_only() {
        let mut buf = RpcBuf::new();

        buf.put_counted_str_padded(Some(c"")).unwrap();

        assert_eq!(buf.as_slice(), &[0, 0, 0, 0]);
    }

    #[traced_test]
    #[test]
    fn put_counted_str_padded_truncates_overlong_string() {
        let long = std::ffi::CString::new(vec![b'x'; usize::from(u16::MAX) + 10]).unwrap();
        let mut buf = RpcBuf::new();

        buf.put_counted_str_padded(Some(&long)).unwrap();

        let bytes = buf.as_slice();
        assert_eq!(u16::from_ne_bytes([bytes[0], bytes[1]]), u16::MAX);
        assert_eq!(buf.len(), (2 + usize::from(u16::MAX)).next_multiple_of(4));
        assert!(logs_contain("counted string truncated"));
    }

    #[test]
    fn padded_writes_are_all_or_nothing() {
        let mut buf = RpcBuf::builder()
            .with_error_policy(ErrorPolicy::Retain)
            .with_allocator(LimitedAllocator::new(CHUNK_SIZE))
            .build();
        buf.reserve(CHUNK_SIZE - 4).unwrap();

        // The count would fit, but not the string bytes after it.
        buf.put_counted_str_padded(Some(c"abcdef")).unwrap_err();

        assert!(buf.is_failed());
        assert_eq!(buf.len(), CHUNK_SIZE - 4);
    }

    #[test]
    fn nothing_to_write_still_rejected_after_failure() {
        let mut buf = RpcBuf::builder().with_allocator(LimitedAllocator::exhausted()).build();
        buf.put_u8(1).unwrap_err();

        assert_eq!(buf.put_raw(&[]).unwrap_err(), Error::Failed);
        assert_eq!(buf.put_raw_padded(&[]).unwrap_err(), Error::Failed);
        assert_eq!(buf.put_str_padded(c"").unwrap_err(), Error::Failed);
        assert_eq!(buf.put_counted_str_padded(None).unwrap_err(), Error::Failed);
        assert_eq!(buf.put_str0_padded(None).unwrap_err(), Error::Failed);
        assert_eq!(buf.pad_to_alignment().unwrap_err(), Error::Failed);
        assert!(buf.is_empty());
    }
}
