use {
    super::ResourceDescriptor,
    crate::vulkan::MemoryType,
    ash::vk,
    std::fmt,
};

/// Why a memory type cannot hold a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTypeMismatch {
    pub memory_type_index: u32,
    pub heap_index: u32,
    pub property_flags: vk::MemoryPropertyFlags,

    /// Required properties the memory type lacks.
    pub missing_properties: vk::MemoryPropertyFlags,

    /// False when the driver does not allow the buffer in this type at all.
    pub is_compatible: bool,
}

impl MemoryTypeMismatch {
    pub(super) fn new(
        descriptor: &ResourceDescriptor,
        memory_type: &MemoryType,
    ) -> Self {
        Self {
            memory_type_index: memory_type.index,
            heap_index: memory_type.heap_index,
            property_flags: memory_type.property_flags,
            missing_properties: vk::MemoryPropertyFlags::from_raw(
                descriptor.required_properties().as_raw()
                    & !memory_type.property_flags.as_raw(),
            ),
            is_compatible: descriptor.is_compatible(memory_type),
        }
    }
}

impl fmt::Display for MemoryTypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type {} (heap {}) has {:?}, missing {:?}",
            self.memory_type_index,
            self.heap_index,
            self.property_flags,
            self.missing_properties
        )?;
        if !self.is_compatible {
            f.write_str(", not allowed for this buffer")?;
        }
        Ok(())
    }
}

/// One row per memory type.
pub(super) fn mismatch_table(
    descriptor: &ResourceDescriptor,
    memory_types: &[MemoryType],
) -> Vec<MemoryTypeMismatch> {
    memory_types
        .iter()
        .map(|memory_type| MemoryTypeMismatch::new(descriptor, memory_type))
        .collect()
}
