use {
    super::{
        BufferRequirements, DeviceSummary, DriverError, InstanceDriver,
        MemoryDriver, MemoryType, QueueFamily, SurfaceDriver,
    },
    crate::ffi,
    ash::{khr, vk},
};

/// Lists the extensions and layers the Vulkan loader makes available.
pub struct AshInstanceDriver<'entry> {
    entry: &'entry ash::Entry,
}

impl<'entry> AshInstanceDriver<'entry> {
    pub fn new(entry: &'entry ash::Entry) -> Self {
        Self { entry }
    }
}

impl InstanceDriver for AshInstanceDriver<'_> {
    fn enumerate_instance_extensions(
        &self,
    ) -> Result<Vec<String>, DriverError> {
        let properties =
            unsafe { self.entry.enumerate_instance_extension_properties(None) }
                .map_err(|err| {
                    DriverError::new(
                        "vkEnumerateInstanceExtensionProperties",
                        err,
                    )
                })?;
        Ok(properties
            .iter()
            .filter_map(|ext| ffi::name_from_raw(&ext.extension_name))
            .collect())
    }

    fn enumerate_instance_layers(&self) -> Result<Vec<String>, DriverError> {
        let properties =
            unsafe { self.entry.enumerate_instance_layer_properties() }
                .map_err(|err| {
                    DriverError::new("vkEnumerateInstanceLayerProperties", err)
                })?;
        Ok(properties
            .iter()
            .filter_map(|layer| ffi::name_from_raw(&layer.layer_name))
            .collect())
    }
}

/// Answers physical device and surface queries for a live instance.
pub struct AshSurfaceDriver {
    instance: ash::Instance,
    surface_loader: khr::surface::Instance,
}

impl AshSurfaceDriver {
    /// The driver clones the instance's function table. It must not be used
    /// after the instance is destroyed.
    pub fn new(entry: &ash::Entry, instance: &ash::Instance) -> Self {
        Self {
            instance: instance.clone(),
            surface_loader: khr::surface::Instance::new(entry, instance),
        }
    }

    /// The surface extension loader, useful for destroying surfaces.
    pub fn surface_loader(&self) -> &khr::surface::Instance {
        &self.surface_loader
    }
}

impl SurfaceDriver for AshSurfaceDriver {
    fn enumerate_physical_devices(
        &self,
    ) -> Result<Vec<vk::PhysicalDevice>, DriverError> {
        unsafe { self.instance.enumerate_physical_devices() }
            .map_err(|err| DriverError::new("vkEnumeratePhysicalDevices", err))
    }

    fn device_summary(&self, device: vk::PhysicalDevice) -> DeviceSummary {
        let properties =
            unsafe { self.instance.get_physical_device_properties(device) };
        DeviceSummary {
            name: ffi::name_from_raw(&properties.device_name)
                .unwrap_or_else(|| "<unnamed>".to_owned()),
            device_type: properties.device_type,
            api_version: properties.api_version,
        }
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<QueueFamily> {
        let properties = unsafe {
            self.instance
                .get_physical_device_queue_family_properties(device)
        };
        properties
            .iter()
            .enumerate()
            .map(|(index, family)| QueueFamily {
                index: index as u32,
                flags: family.queue_flags,
                queue_count: family.queue_count,
            })
            .collect()
    }

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, DriverError> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(device, surface)
        }
        .map_err(|err| {
            DriverError::new("vkGetPhysicalDeviceSurfaceFormatsKHR", err)
        })
    }

    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, DriverError> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(device, surface)
        }
        .map_err(|err| {
            DriverError::new("vkGetPhysicalDeviceSurfacePresentModesKHR", err)
        })
    }

    fn queue_supports_presentation(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> Result<bool, DriverError> {
        unsafe {
            self.surface_loader.get_physical_device_surface_support(
                device,
                queue_family_index,
                surface,
            )
        }
        .map_err(|err| {
            DriverError::new("vkGetPhysicalDeviceSurfaceSupportKHR", err)
        })
    }
}

/// Creates buffers and allocates device memory directly with the logical
/// device.
pub struct AshMemoryDriver {
    device: ash::Device,
    memory_types: Vec<MemoryType>,
}

impl AshMemoryDriver {
    /// Snapshot the physical device's memory types and wrap the logical
    /// device.
    ///
    /// # Safety
    ///
    /// Unsafe because:
    ///   - the driver clones the device's function table, every object it
    ///     creates must be destroyed before the logical device is destroyed
    pub unsafe fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: &ash::Device,
    ) -> Self {
        let properties =
            instance.get_physical_device_memory_properties(physical_device);
        let memory_types = properties.memory_types
            [..properties.memory_type_count as usize]
            .iter()
            .enumerate()
            .map(|(index, memory_type)| MemoryType {
                index: index as u32,
                property_flags: memory_type.property_flags,
                heap_index: memory_type.heap_index,
            })
            .collect();
        Self {
            device: device.clone(),
            memory_types,
        }
    }
}

impl MemoryDriver for AshMemoryDriver {
    fn create_buffer(
        &self,
        size_in_bytes: u64,
        usage: vk::BufferUsageFlags,
        sharing_mode: vk::SharingMode,
    ) -> Result<vk::Buffer, DriverError> {
        let create_info = vk::BufferCreateInfo::default()
            .size(size_in_bytes)
            .usage(usage)
            .sharing_mode(sharing_mode);
        unsafe { self.device.create_buffer(&create_info, None) }
            .map_err(|err| DriverError::new("vkCreateBuffer", err))
    }

    fn buffer_requirements(&self, buffer: vk::Buffer) -> BufferRequirements {
        let requirements =
            unsafe { self.device.get_buffer_memory_requirements(buffer) };
        BufferRequirements {
            size: requirements.size,
            alignment: requirements.alignment,
            memory_type_bits: requirements.memory_type_bits,
        }
    }

    fn memory_types(&self) -> Vec<MemoryType> {
        self.memory_types.clone()
    }

    fn allocate_memory(
        &self,
        size_in_bytes: u64,
        memory_type_index: u32,
    ) -> Result<vk::DeviceMemory, DriverError> {
        let allocate_info = vk::MemoryAllocateInfo::default()
            .allocation_size(size_in_bytes)
            .memory_type_index(memory_type_index);
        unsafe { self.device.allocate_memory(&allocate_info, None) }
            .map_err(|err| DriverError::new("vkAllocateMemory", err))
    }

    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset_in_bytes: u64,
    ) -> Result<(), DriverError> {
        unsafe {
            self.device
                .bind_buffer_memory(buffer, memory, offset_in_bytes)
        }
        .map_err(|err| DriverError::new("vkBindBufferMemory", err))
    }

    unsafe fn destroy_buffer(&self, buffer: vk::Buffer) {
        self.device.destroy_buffer(buffer, None);
    }

    unsafe fn free_memory(&self, memory: vk::DeviceMemory) {
        self.device.free_memory(memory, None);
    }
}
