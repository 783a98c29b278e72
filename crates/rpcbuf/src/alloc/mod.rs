// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Types for using and implementing storage allocators.

mod allocator;
mod callback;
mod global;

pub use allocator::Allocator;
pub use callback::CallbackAllocator;
pub use global::GlobalAllocator;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
