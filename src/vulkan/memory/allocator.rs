use {
    super::{
        mismatch::mismatch_table, Allocation, AllocatorError, BindingInfo,
        ResourceDescriptor, UsageClass,
    },
    crate::{
        logging::PrettyList,
        vulkan::{MemoryDriver, MemoryType},
    },
    ash::vk,
    indoc::indoc,
    std::sync::atomic::{AtomicU64, Ordering},
};

static NEXT_ALLOCATOR_ID: AtomicU64 = AtomicU64::new(0);

/// Refers to a buffer registered with a specific allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    allocator_id: u64,
    index: usize,
}

/// The buffers assigned to one memory type during finalize.
#[derive(Debug)]
struct MemoryTypeBin {
    memory_type_index: u32,
    descriptors: Vec<usize>,
    total_bytes: u64,
}

/// Packs every registered buffer into as few device memory allocations as
/// possible.
///
/// Buffers are created as soon as they are registered, but no memory is
/// allocated until finalize. Finalize runs exactly once. Dropping the
/// allocator destroys every buffer and frees every allocation.
pub struct MemoryAllocator<Driver: MemoryDriver> {
    id: u64,
    driver: Driver,
    descriptors: Vec<ResourceDescriptor>,
    allocations: Vec<Allocation>,
    is_finalized: bool,
}

// Public API
// ----------

impl<Driver: MemoryDriver> MemoryAllocator<Driver> {
    pub fn new(driver: Driver) -> Self {
        Self {
            id: NEXT_ALLOCATOR_ID.fetch_add(1, Ordering::Relaxed),
            driver,
            descriptors: vec![],
            allocations: vec![],
            is_finalized: false,
        }
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Create a buffer with the usage class's default memory properties.
    ///
    /// # Params
    ///
    /// * `name` - used in logs and error messages
    /// * `size_in_bytes` - the number of bytes the buffer must hold
    /// * `usage` - decides the buffer usage flags and memory properties
    pub fn register_buffer(
        &mut self,
        name: impl Into<String>,
        size_in_bytes: u64,
        usage: UsageClass,
    ) -> Result<BufferHandle, AllocatorError> {
        self.register_buffer_with_properties(
            name,
            size_in_bytes,
            usage,
            vk::MemoryPropertyFlags::empty(),
            vk::MemoryPropertyFlags::empty(),
        )
    }

    /// Create a buffer, adding extra properties to the usage class's
    /// defaults. The optimal properties always include the required ones.
    pub fn register_buffer_with_properties(
        &mut self,
        name: impl Into<String>,
        size_in_bytes: u64,
        usage: UsageClass,
        extra_optimal: vk::MemoryPropertyFlags,
        extra_required: vk::MemoryPropertyFlags,
    ) -> Result<BufferHandle, AllocatorError> {
        let name = name.into();
        if self.is_finalized {
            return Err(AllocatorError::AlreadyFinalized);
        }
        if size_in_bytes == 0 {
            return Err(AllocatorError::EmptyBuffer(name));
        }

        let buffer = self
            .driver
            .create_buffer(
                size_in_bytes,
                usage.buffer_usage(),
                usage.sharing_mode(),
            )
            .map_err(|source| AllocatorError::UnableToCreateBuffer {
                name: name.clone(),
                size: size_in_bytes,
                source,
            })?;
        let requirements = self.driver.buffer_requirements(buffer);

        let required = usage.required_properties() | extra_required;
        let optimal = usage.optimal_properties() | extra_optimal | required;
        let descriptor = ResourceDescriptor::new(
            name, size_in_bytes, usage, optimal, required, buffer, requirements,
        );

        log::debug!(
            indoc!(
                "
                Registered buffer {}
                  requested: {} bytes
                  driver size: {} bytes, alignment {}
                  effective size: {} bytes
                  optimal: {:?}
                  required: {:?}
                  memory types: {:#b}
                "
            ),
            descriptor.name(),
            descriptor.requested_size(),
            descriptor.raw_size(),
            descriptor.alignment(),
            descriptor.effective_size(),
            descriptor.optimal_properties(),
            descriptor.required_properties(),
            descriptor.memory_type_bits(),
        );

        self.descriptors.push(descriptor);
        Ok(BufferHandle {
            allocator_id: self.id,
            index: self.descriptors.len() - 1,
        })
    }

    /// Assign every buffer to a memory type, allocate one block of memory per
    /// used type, and bind each buffer at its offset.
    ///
    /// If any buffer has no usable memory type then nothing is allocated.
    /// Driver failures part way through leave earlier allocations in place,
    /// they are released when the allocator is dropped.
    pub fn finalize(&mut self) -> Result<(), AllocatorError> {
        if self.is_finalized {
            return Err(AllocatorError::AlreadyFinalized);
        }

        let memory_types = self.driver.memory_types();
        log::debug!("Device memory types {:#?}", PrettyList(&memory_types));

        let bins = self.classify(&memory_types)?;
        self.is_finalized = true;

        for bin in &bins {
            for &index in &bin.descriptors {
                self.descriptors[index]
                    .assign_memory_type(bin.memory_type_index);
            }
        }
        for bin in &bins {
            self.commit(bin)?;
        }

        log::info!(
            "Bound {} buffers in {} allocations",
            self.descriptors.len(),
            self.allocations.len()
        );
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.is_finalized
    }

    pub fn descriptor(
        &self,
        handle: BufferHandle,
    ) -> Result<&ResourceDescriptor, AllocatorError> {
        if handle.allocator_id != self.id {
            return Err(AllocatorError::UnknownBuffer(handle));
        }
        self.descriptors
            .get(handle.index)
            .ok_or(AllocatorError::UnknownBuffer(handle))
    }

    /// Where the buffer was bound. Only available after finalize.
    pub fn binding_info(
        &self,
        handle: BufferHandle,
    ) -> Result<BindingInfo, AllocatorError> {
        let descriptor = self.descriptor(handle)?;
        if !self.is_finalized {
            return Err(AllocatorError::NotFinalized);
        }
        let (memory, offset) = descriptor.binding().ok_or_else(|| {
            AllocatorError::NotBound(descriptor.name().to_owned())
        })?;
        Ok(BindingInfo {
            buffer: descriptor.buffer(),
            memory,
            offset,
            range: descriptor.requested_size(),
        })
    }

    /// Every real allocation, in the order they were made.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }
}

// Private API
// -----------

impl<Driver: MemoryDriver> MemoryAllocator<Driver> {
    /// Decide a memory type for every descriptor without touching the
    /// driver.
    fn classify(
        &self,
        memory_types: &[MemoryType],
    ) -> Result<Vec<MemoryTypeBin>, AllocatorError> {
        let mut bins: Vec<MemoryTypeBin> = vec![];
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            let memory_type_index = find_memory_type(descriptor, memory_types)
                .ok_or_else(|| AllocatorError::NoSuitableMemoryType {
                    name: descriptor.name().to_owned(),
                    required: descriptor.required_properties(),
                    mismatches: mismatch_table(descriptor, memory_types),
                })?;

            match bins
                .iter_mut()
                .find(|bin| bin.memory_type_index == memory_type_index)
            {
                Some(bin) => {
                    bin.descriptors.push(index);
                    bin.total_bytes += descriptor.effective_size();
                }
                None => bins.push(MemoryTypeBin {
                    memory_type_index,
                    descriptors: vec![index],
                    total_bytes: descriptor.effective_size(),
                }),
            }
        }
        Ok(bins)
    }

    /// Allocate the bin's memory and bind each buffer at a running offset.
    fn commit(&mut self, bin: &MemoryTypeBin) -> Result<(), AllocatorError> {
        let memory = self
            .driver
            .allocate_memory(bin.total_bytes, bin.memory_type_index)
            .map_err(|source| AllocatorError::UnableToAllocateMemory {
                memory_type_index: bin.memory_type_index,
                size: bin.total_bytes,
                source,
            })?;
        self.allocations.push(Allocation::new(
            memory,
            bin.total_bytes,
            bin.memory_type_index,
        ));

        let mut offset = 0;
        for &index in &bin.descriptors {
            let descriptor = &mut self.descriptors[index];
            if offset % descriptor.alignment().max(1) != 0 {
                log::warn!(
                    "Buffer {} is bound at offset {} which is not a multiple \
                     of its alignment {}",
                    descriptor.name(),
                    offset,
                    descriptor.alignment()
                );
            }
            self.driver
                .bind_buffer_memory(descriptor.buffer(), memory, offset)
                .map_err(|source| AllocatorError::UnableToBindMemory {
                    name: descriptor.name().to_owned(),
                    source,
                })?;
            descriptor.bind(memory, offset);

            log::trace!(
                "Bound {} to memory type {} at offset {}",
                descriptor.name(),
                bin.memory_type_index,
                offset
            );
            offset += descriptor.effective_size();
        }
        Ok(())
    }
}

/// The first optimal memory type, or failing that the first acceptable one.
fn find_memory_type(
    descriptor: &ResourceDescriptor,
    memory_types: &[MemoryType],
) -> Option<u32> {
    if let Some(optimal) = memory_types
        .iter()
        .find(|memory_type| descriptor.is_optimal(memory_type))
    {
        log::trace!(
            "{} uses optimal memory type {}",
            descriptor.name(),
            optimal.index
        );
        return Some(optimal.index);
    }

    memory_types
        .iter()
        .find(|memory_type| descriptor.is_acceptable(memory_type))
        .map(|acceptable| {
            log::trace!(
                "{} falls back to memory type {}",
                descriptor.name(),
                acceptable.index
            );
            acceptable.index
        })
}

impl<Driver: MemoryDriver> Drop for MemoryAllocator<Driver> {
    fn drop(&mut self) {
        unsafe {
            for descriptor in &self.descriptors {
                self.driver.destroy_buffer(descriptor.buffer());
            }
            for allocation in &self.allocations {
                self.driver.free_memory(allocation.memory());
            }
        }
    }
}
