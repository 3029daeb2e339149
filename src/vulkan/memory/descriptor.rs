use {
    crate::vulkan::{BufferRequirements, MemoryType},
    ash::vk,
};

/// How a buffer will be used. Decides the buffer usage flags and the default
/// memory property masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageClass {
    /// A storage buffer used by one queue family at a time.
    ExclusiveStorage,

    /// A uniform buffer updated from the host.
    Uniform,

    /// A host-visible source for transfers.
    Staging,
}

impl UsageClass {
    pub fn buffer_usage(self) -> vk::BufferUsageFlags {
        match self {
            UsageClass::ExclusiveStorage => {
                vk::BufferUsageFlags::STORAGE_BUFFER
            }
            UsageClass::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
            UsageClass::Staging => vk::BufferUsageFlags::TRANSFER_SRC,
        }
    }

    pub fn sharing_mode(self) -> vk::SharingMode {
        vk::SharingMode::EXCLUSIVE
    }

    /// Properties which make the memory fast for this usage.
    pub fn optimal_properties(self) -> vk::MemoryPropertyFlags {
        match self {
            UsageClass::ExclusiveStorage => {
                vk::MemoryPropertyFlags::DEVICE_LOCAL
            }
            UsageClass::Uniform => {
                vk::MemoryPropertyFlags::DEVICE_LOCAL
                    | vk::MemoryPropertyFlags::HOST_VISIBLE
                    | vk::MemoryPropertyFlags::HOST_COHERENT
            }
            UsageClass::Staging => {
                vk::MemoryPropertyFlags::HOST_VISIBLE
                    | vk::MemoryPropertyFlags::HOST_COHERENT
            }
        }
    }

    /// Properties without which the usage cannot work at all.
    pub fn required_properties(self) -> vk::MemoryPropertyFlags {
        match self {
            UsageClass::ExclusiveStorage => vk::MemoryPropertyFlags::empty(),
            UsageClass::Uniform => {
                vk::MemoryPropertyFlags::HOST_VISIBLE
                    | vk::MemoryPropertyFlags::HOST_COHERENT
            }
            UsageClass::Staging => vk::MemoryPropertyFlags::HOST_VISIBLE,
        }
    }
}

/// Round `raw_size` up to the next multiple of `alignment`.
pub fn effective_size(raw_size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    raw_size.div_ceil(alignment) * alignment
}

/// A registered buffer and everything the allocator knows about it.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    name: String,
    requested_size: u64,
    usage: UsageClass,
    optimal_properties: vk::MemoryPropertyFlags,
    required_properties: vk::MemoryPropertyFlags,
    buffer: vk::Buffer,
    requirements: BufferRequirements,
    memory_type_index: Option<u32>,
    binding: Option<(vk::DeviceMemory, u64)>,
}

impl ResourceDescriptor {
    pub(super) fn new(
        name: String,
        requested_size: u64,
        usage: UsageClass,
        optimal_properties: vk::MemoryPropertyFlags,
        required_properties: vk::MemoryPropertyFlags,
        buffer: vk::Buffer,
        requirements: BufferRequirements,
    ) -> Self {
        Self {
            name,
            requested_size,
            usage,
            optimal_properties,
            required_properties,
            buffer,
            requirements,
            memory_type_index: None,
            binding: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The size the caller asked for.
    pub fn requested_size(&self) -> u64 {
        self.requested_size
    }

    /// The size the driver says the buffer needs.
    pub fn raw_size(&self) -> u64 {
        self.requirements.size
    }

    pub fn alignment(&self) -> u64 {
        self.requirements.alignment
    }

    /// The space the buffer takes up inside an allocation.
    pub fn effective_size(&self) -> u64 {
        effective_size(self.requirements.size, self.requirements.alignment)
    }

    pub fn usage(&self) -> UsageClass {
        self.usage
    }

    pub fn optimal_properties(&self) -> vk::MemoryPropertyFlags {
        self.optimal_properties
    }

    pub fn required_properties(&self) -> vk::MemoryPropertyFlags {
        self.required_properties
    }

    pub fn buffer(&self) -> vk::Buffer {
        self.buffer
    }

    pub fn memory_type_bits(&self) -> u32 {
        self.requirements.memory_type_bits
    }

    /// The memory type chosen by finalize, None until then.
    pub fn memory_type_index(&self) -> Option<u32> {
        self.memory_type_index
    }

    pub(super) fn binding(&self) -> Option<(vk::DeviceMemory, u64)> {
        self.binding
    }

    /// True when the driver allows the buffer to live in the memory type.
    pub fn is_compatible(&self, memory_type: &MemoryType) -> bool {
        let bit = 1u32.checked_shl(memory_type.index).unwrap_or(0);
        self.requirements.memory_type_bits & bit != 0
    }

    pub fn is_optimal(&self, memory_type: &MemoryType) -> bool {
        self.is_compatible(memory_type)
            && memory_type.property_flags.contains(self.optimal_properties)
    }

    pub fn is_acceptable(&self, memory_type: &MemoryType) -> bool {
        self.is_compatible(memory_type)
            && memory_type.property_flags.contains(self.required_properties)
    }

    pub(super) fn assign_memory_type(&mut self, memory_type_index: u32) {
        self.memory_type_index = Some(memory_type_index);
    }

    pub(super) fn bind(&mut self, memory: vk::DeviceMemory, offset: u64) {
        self.binding = Some((memory, offset));
    }
}
