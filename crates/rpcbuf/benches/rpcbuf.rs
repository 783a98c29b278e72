// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![expect(missing_docs, reason = "Benchmark code")]

use std::alloc::System;
use std::hint::black_box;

use alloc_tracker::{Allocator, Session};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rpcbuf::{ByteOrder, CHUNK_SIZE, RpcBuf};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<System> = Allocator::system();

// A typical property reply is a few hundred 32-bit values.
const VALUES: &[u32] = &[0x0102_0304; 256];

fn entrypoint(c: &mut Criterion) {
    let allocs = Session::new();

    let mut group = c.benchmark_group("RpcBuf");

    let allocs_op = allocs.operation("put_u32_native");
    group.bench_function("put_u32_native", |b| {
        b.iter_batched_ref(
            RpcBuf::new,
            |buf| {
                let _span = allocs_op.measure_thread();
                for value in VALUES {
                    buf.put_u32(black_box(*value)).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });

    let allocs_op = allocs.operation("put_u32_swapped");
    group.bench_function("put_u32_swapped", |b| {
        b.iter_batched_ref(
            || RpcBuf::builder().with_byte_order(ByteOrder::Swapped).build(),
            |buf| {
                let _span = allocs_op.measure_thread();
                for value in VALUES {
                    buf.put_u32(black_box(*value)).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });

    let allocs_op = allocs.operation("put_u32s_swapped");
    group.bench_function("put_u32s_swapped", |b| {
        b.iter_batched_ref(
            || RpcBuf::builder().with_byte_order(ByteOrder::Swapped).build(),
            |buf| {
                let _span = allocs_op.measure_thread();
                buf.put_u32s(black_box(VALUES)).unwrap();
            },
            BatchSize::SmallInput,
        );
    });

    let allocs_op = allocs.operation("counted_strings_reused");
    group.bench_function("counted_strings_reused", |b| {
        let mut buf = RpcBuf::new();
        buf.ensure_room(CHUNK_SIZE).unwrap();

        b.iter(|| {
            let _span = allocs_op.measure_thread();
            buf.soft_reset();
            for _ in 0..64 {
                buf.put_counted_str_padded(Some(black_box(c"-misc-fixed-medium-r-normal--13"))).unwrap();
            }
        });
    });

    let allocs_op = allocs.operation("compose_padded");
    group.bench_function("compose_padded", |b| {
        b.iter_batched_ref(
            || {
                let mut part = RpcBuf::new();
                part.put_u32s(VALUES).unwrap();
                part.put_u8(1).unwrap();
                (RpcBuf::new(), part)
            },
            |(dest, part)| {
                let _span = allocs_op.measure_thread();
                dest.put_rpcbuf_padded(part).unwrap();
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();

    allocs.print_to_stdout();
}
