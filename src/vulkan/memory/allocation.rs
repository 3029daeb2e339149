use ash::vk;

/// A single real device memory allocation, shared by every buffer which was
/// assigned to its memory type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    device_memory: vk::DeviceMemory,
    size_in_bytes: u64,
    memory_type_index: u32,
}

impl Allocation {
    pub(super) fn new(
        device_memory: vk::DeviceMemory,
        size_in_bytes: u64,
        memory_type_index: u32,
    ) -> Self {
        Self {
            device_memory,
            size_in_bytes,
            memory_type_index,
        }
    }

    pub fn memory(&self) -> vk::DeviceMemory {
        self.device_memory
    }

    pub fn size_in_bytes(&self) -> u64 {
        self.size_in_bytes
    }

    pub fn memory_type_index(&self) -> u32 {
        self.memory_type_index
    }
}

/// Where a buffer ended up after finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingInfo {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,

    /// The buffer's offset inside `memory`.
    pub offset: u64,

    /// The number of bytes the caller requested.
    pub range: u64,
}

impl BindingInfo {
    /// The whole buffer, for use in descriptor set writes.
    pub fn descriptor_buffer_info(&self) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo::default()
            .buffer(self.buffer)
            .offset(0)
            .range(self.range)
    }
}
