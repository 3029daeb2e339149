//! Batch buffer allocation.
//!
//! Callers register logical buffers over time, then finalize once. Finalize
//! picks a memory type for every buffer, makes one real allocation per
//! memory type, and binds each buffer at a running offset inside it.

mod allocation;
mod allocator;
mod descriptor;
mod mismatch;

use {
    crate::{logging::PrettyList, vulkan::DriverError},
    ash::vk,
    thiserror::Error,
};

pub use self::{
    allocation::{Allocation, BindingInfo},
    allocator::{BufferHandle, MemoryAllocator},
    descriptor::{effective_size, ResourceDescriptor, UsageClass},
    mismatch::MemoryTypeMismatch,
};

#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error("Unable to create buffer {name} with {size} bytes")]
    UnableToCreateBuffer {
        name: String,
        size: u64,
        #[source]
        source: DriverError,
    },

    #[error("Buffer {0} must hold at least one byte")]
    EmptyBuffer(String),

    #[error(
        "No memory type can hold buffer {name} which requires {required:?}. \
         Available memory types: {}",
        PrettyList(.mismatches)
    )]
    NoSuitableMemoryType {
        name: String,
        required: vk::MemoryPropertyFlags,
        mismatches: Vec<MemoryTypeMismatch>,
    },

    #[error(
        "Unable to allocate {size} bytes of memory type {memory_type_index}"
    )]
    UnableToAllocateMemory {
        memory_type_index: u32,
        size: u64,
        #[source]
        source: DriverError,
    },

    #[error("Unable to bind memory for buffer {name}")]
    UnableToBindMemory {
        name: String,
        #[source]
        source: DriverError,
    },

    #[error("The allocator has already been finalized")]
    AlreadyFinalized,

    #[error("Buffers are not bound until the allocator is finalized")]
    NotFinalized,

    #[error("Buffer {0} was never bound to memory")]
    NotBound(String),

    #[error("{0:?} does not belong to this allocator")]
    UnknownBuffer(BufferHandle),
}
