// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Assemble X11-style wire payloads in a growable, byte-order aware buffer.
//!
//! An [`RpcBuf`] accumulates the binary body of a protocol request, reply or event before it is
//! handed to the transport. It takes care of the three things every encoder of such a protocol
//! has to get right:
//!
//! * **Byte order.** Multi-byte values are written in the byte order of the peer, chosen once
//!   when the buffer is built (see [`ByteOrder`]).
//! * **Alignment.** The protocol measures lengths in 4-byte units. Padded writers append zero
//!   bytes up to the next [`ALIGNMENT`] boundary of the whole payload, and
//!   [`alignment_units()`][RpcBuf::alignment_units] gives the length field value.
//! * **Allocation failure.** Storage grows in [`CHUNK_SIZE`] steps through a fallible
//!   [`Allocator`][alloc::Allocator]. The first failure puts the buffer into a sticky failed
//!   state in which every further write is rejected, so a truncated payload can never be
//!   mistaken for a complete one.
//!
//! # Writing a payload
//!
//! ```
//! use rpcbuf::RpcBuf;
//!
//! let mut buf = RpcBuf::new();
//!
//! buf.put_u32(0x0000_0001)?;
//! buf.put_counted_str_padded(Some(c"fixed"))?;
//! buf.put_rect(-5, 10, 640, 480)?;
//!
//! // 4 + (2 + 5 + 1 pad) + 8
//! assert_eq!(buf.len(), 20);
//! assert_eq!(buf.alignment_units(), 5);
//! # Ok::<(), rpcbuf::Error>(())
//! ```
//!
//! # Composing payloads
//!
//! Variable-length parts are often easier to build in a scratch buffer first. Appending the
//! scratch buffer with [`put_rpcbuf_padded()`][RpcBuf::put_rpcbuf_padded] copies its content
//! as one padded span and releases it. A failure in the scratch buffer carries over into the
//! destination, so the whole payload either succeeds or fails.
//!
//! ```
//! use rpcbuf::RpcBuf;
//!
//! let mut names = RpcBuf::new();
//! for name in [c"cursor", c"fixed", c"9x15"] {
//!     names.put_counted_str_padded(Some(name))?;
//! }
//!
//! let mut reply = RpcBuf::new();
//! reply.put_u16(3)?;
//! reply.put_rpcbuf_padded(&mut names)?;
//!
//! assert!(names.is_empty());
//! assert_eq!(reply.len() % 4, 0);
//! # Ok::<(), rpcbuf::Error>(())
//! ```
//!
//! # Handing over to the transport
//!
//! Read the committed bytes with [`as_slice()`][RpcBuf::as_slice] (after checking
//! [`is_failed()`][RpcBuf::is_failed]) or take ownership of them with
//! [`into_vec()`][RpcBuf::into_vec]. To reuse a buffer for the next payload without giving its
//! memory back, call [`soft_reset()`][RpcBuf::soft_reset]; to free it, call
//! [`release()`][RpcBuf::release] or drop the buffer.

pub mod alloc;

mod buf;
mod buf_put;
mod buf_put_padded;
mod builder;
mod byte_order;
mod compose;
mod error;

pub use buf::RpcBuf;
pub use builder::{ErrorPolicy, RpcBufBuilder};
pub use byte_order::{ByteOrder, Endian};
pub use error::{AllocError, Error, Result};

/// Storage grows in multiples of this many bytes.
pub const CHUNK_SIZE: usize = 4096;

/// Padded writers align the payload length to a multiple of this many bytes, the size of one
/// protocol unit.
pub const ALIGNMENT: usize = 4;
