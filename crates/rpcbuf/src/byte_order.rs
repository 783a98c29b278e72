// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Byte order of a peer, as announced in its connection setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Least significant byte first.
    Little,

    /// Most significant byte first.
    Big,
}

impl Endian {
    /// The byte order of the host this code runs on.
    pub const HOST: Self = if cfg!(target_endian = "big") { Self::Big } else { Self::Little };
}

/// How multi-byte values are laid out in an [`RpcBuf`][crate::RpcBuf], relative to the host.
///
/// The byte order is fixed when the buffer is built and applies to every multi-byte scalar and
/// array written into it. Single bytes and raw byte spans are never reordered.
///
/// # Example
///
/// ```
/// use rpcbuf::{ByteOrder, Endian, RpcBuf};
///
/// // The client announced itself as MSB-first during connection setup.
/// let order = ByteOrder::from_setup_byte(b'B').unwrap();
/// assert_eq!(order, ByteOrder::for_target(Endian::Big));
///
/// let mut buf = RpcBuf::builder().with_byte_order(order).build();
/// buf.put_u16(0x1234).unwrap();
///
/// assert_eq!(buf.as_slice(), &[0x12, 0x34]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Values are stored in host byte order.
    #[default]
    Native,

    /// Values are stored with their bytes reversed relative to host byte order.
    Swapped,
}

impl ByteOrder {
    /// Returns the byte order that produces `target` endianness on this host.
    #[must_use]
    pub const fn for_target(target: Endian) -> Self {
        match (target, Endian::HOST) {
            (Endian::Little, Endian::Little) | (Endian::Big, Endian::Big) => Self::Native,
            _ => Self::Swapped,
        }
    }

    /// Decodes the byte-order marker that opens an X11 connection setup request.
    ///
    /// `b'B'` (0x42) means MSB first and `b'l'` (0x6C) means LSB first. Any other value is not a
    /// valid marker and yields `None`.
    #[must_use]
    pub const fn from_setup_byte(marker: u8) -> Option<Self> {
        match marker {
            b'B' => Some(Self::for_target(Endian::Big)),
            b'l' => Some(Self::for_target(Endian::Little)),
            _ => None,
        }
    }

    /// Whether multi-byte values have their bytes reversed.
    #[must_use]
    pub const fn swaps_bytes(self) -> bool {
        matches!(self, Self::Swapped)
    }

    /// The endianness of values written with this byte order.
    #[must_use]
    pub const fn target(self) -> Endian {
        match (self, Endian::HOST) {
            (Self::Native, host) => host,
            (Self::Swapped, Endian::Little) => Endian::Big,
            (Self::Swapped, Endian::Big) => Endian::Little,
        }
    }
}
