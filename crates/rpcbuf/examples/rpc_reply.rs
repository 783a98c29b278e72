// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Assembles a `GetGeometry`-style reply for a client that announced itself as MSB-first.
//!
//! 1. We pick the byte order from the client's connection setup marker.
//! 2. We build a variable-length part in a scratch buffer and splice it into the reply.
//! 3. We patch the reply length field and hand the bytes to the (pretend) transport.

use rpcbuf::{ByteOrder, ErrorPolicy, RpcBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let byte_order = ByteOrder::from_setup_byte(b'B').ok_or("invalid byte order marker")?;

    let mut reply = RpcBuf::builder()
        .with_byte_order(byte_order)
        .with_error_policy(ErrorPolicy::Release)
        .build();

    // Reply header: type, depth, sequence number, length placeholder.
    reply.put_u8(1)?;
    reply.put_u8(24)?;
    reply.put_u16(42)?;
    reply.put_u32(0)?;

    // Root window and geometry.
    reply.put_u32(0x0000_0123)?;
    reply.put_rect(0, 0, 1920, 1080)?;
    reply.put_u16(0)?;
    reply.put_raw(&[0; 10])?;

    // A variable-length trailer built separately, e.g. by another layer.
    let mut trailer = RpcBuf::builder().with_byte_order(byte_order).build();
    trailer.put_str0_padded(Some(c"root"))?;
    trailer.put_counted_str_padded(Some(c"default-screen"))?;
    reply.put_rpcbuf_padded(&mut trailer)?;

    // The length field counts 4-byte units beyond the fixed 32-byte header.
    let extra_units = u32::try_from(reply.alignment_units() - 8)?;
    let mut payload = reply.into_vec()?;
    let length_field = if byte_order.swaps_bytes() { extra_units.swap_bytes() } else { extra_units };
    payload[4..8].copy_from_slice(&length_field.to_ne_bytes());

    transmit(&payload);

    Ok(())
}

fn transmit(payload: &[u8]) {
    println!("Sending {} bytes ({} protocol units):", payload.len(), payload.len() / 4);

    for unit in payload.chunks(4) {
        println!("  {unit:02X?}");
    }
}
