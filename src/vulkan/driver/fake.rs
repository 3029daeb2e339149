//! In-memory drivers for tests.

use {
    super::{
        BufferRequirements, DeviceSummary, DriverError, InstanceDriver,
        MemoryDriver, MemoryType, QueueFamily, SurfaceDriver,
    },
    ash::vk::{self, Handle},
    std::{
        cell::{Ref, RefCell, RefMut},
        collections::{HashMap, VecDeque},
        rc::Rc,
    },
};

pub struct FakeInstanceDriver {
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
    pub fail_with: Option<vk::Result>,
}

impl FakeInstanceDriver {
    pub fn new(extensions: &[&str], layers: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            layers: layers.iter().map(|s| s.to_string()).collect(),
            fail_with: None,
        }
    }
}

impl InstanceDriver for FakeInstanceDriver {
    fn enumerate_instance_extensions(
        &self,
    ) -> Result<Vec<String>, DriverError> {
        match self.fail_with {
            Some(result) => Err(DriverError::new(
                "vkEnumerateInstanceExtensionProperties",
                result,
            )),
            None => Ok(self.extensions.clone()),
        }
    }

    fn enumerate_instance_layers(&self) -> Result<Vec<String>, DriverError> {
        match self.fail_with {
            Some(result) => Err(DriverError::new(
                "vkEnumerateInstanceLayerProperties",
                result,
            )),
            None => Ok(self.layers.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub handle: vk::PhysicalDevice,
    pub summary: DeviceSummary,
    pub queue_families: Vec<QueueFamily>,
    pub presentable_families: Vec<u32>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub fail_surface_queries: bool,
    pub fail_presentation_queries: bool,
}

impl FakeDevice {
    /// A device with a single presentable graphics+compute family, one sRGB
    /// format, and FIFO presentation.
    pub fn new(
        raw: u64,
        device_type: vk::PhysicalDeviceType,
        api_version: u32,
    ) -> Self {
        Self {
            handle: vk::PhysicalDevice::from_raw(raw),
            summary: DeviceSummary {
                name: format!("fake device {}", raw),
                device_type,
                api_version,
            },
            queue_families: vec![QueueFamily {
                index: 0,
                flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE,
                queue_count: 1,
            }],
            presentable_families: vec![0],
            formats: vec![surface_format(vk::Format::B8G8R8A8_SRGB)],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            fail_surface_queries: false,
            fail_presentation_queries: false,
        }
    }

    pub fn with_formats(mut self, formats: &[vk::Format]) -> Self {
        self.formats = formats.iter().copied().map(surface_format).collect();
        self
    }

    pub fn with_present_modes(mut self, modes: &[vk::PresentModeKHR]) -> Self {
        self.present_modes = modes.to_vec();
        self
    }

    /// Each entry is (flags, queue count, supports presentation).
    pub fn with_queue_families(
        mut self,
        families: &[(vk::QueueFlags, u32, bool)],
    ) -> Self {
        self.queue_families = families
            .iter()
            .enumerate()
            .map(|(index, (flags, queue_count, _))| QueueFamily {
                index: index as u32,
                flags: *flags,
                queue_count: *queue_count,
            })
            .collect();
        self.presentable_families = families
            .iter()
            .enumerate()
            .filter(|(_, (_, _, presentable))| *presentable)
            .map(|(index, _)| index as u32)
            .collect();
        self
    }

    pub fn failing_surface_queries(mut self) -> Self {
        self.fail_surface_queries = true;
        self
    }

    pub fn failing_presentation_queries(mut self) -> Self {
        self.fail_presentation_queries = true;
        self
    }
}

pub fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

#[derive(Debug, Clone)]
pub struct FakeSurfaceDriver {
    pub devices: Vec<FakeDevice>,
}

impl FakeSurfaceDriver {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self { devices }
    }

    fn device(&self, handle: vk::PhysicalDevice) -> &FakeDevice {
        self.devices
            .iter()
            .find(|device| device.handle == handle)
            .expect("unknown fake device")
    }
}

impl SurfaceDriver for FakeSurfaceDriver {
    fn enumerate_physical_devices(
        &self,
    ) -> Result<Vec<vk::PhysicalDevice>, DriverError> {
        Ok(self.devices.iter().map(|device| device.handle).collect())
    }

    fn device_summary(&self, device: vk::PhysicalDevice) -> DeviceSummary {
        self.device(device).summary.clone()
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<QueueFamily> {
        self.device(device).queue_families.clone()
    }

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, DriverError> {
        let device = self.device(device);
        if device.fail_surface_queries {
            return Err(DriverError::new(
                "vkGetPhysicalDeviceSurfaceFormatsKHR",
                vk::Result::ERROR_SURFACE_LOST_KHR,
            ));
        }
        Ok(device.formats.clone())
    }

    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, DriverError> {
        let device = self.device(device);
        if device.fail_surface_queries {
            return Err(DriverError::new(
                "vkGetPhysicalDeviceSurfacePresentModesKHR",
                vk::Result::ERROR_SURFACE_LOST_KHR,
            ));
        }
        Ok(device.present_modes.clone())
    }

    fn queue_supports_presentation(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> Result<bool, DriverError> {
        let device = self.device(device);
        if device.fail_presentation_queries {
            return Err(DriverError::new(
                "vkGetPhysicalDeviceSurfaceSupportKHR",
                vk::Result::ERROR_SURFACE_LOST_KHR,
            ));
        }
        Ok(device.presentable_families.contains(&queue_family_index))
    }
}

#[derive(Debug, Default)]
pub struct FakeMemoryState {
    pub memory_types: Vec<MemoryType>,
    pub default_alignment: u64,
    pub default_memory_type_bits: u32,

    /// Consumed one per created buffer, in creation order, before falling
    /// back to the defaults.
    pub pending_requirements: VecDeque<BufferRequirements>,

    pub buffers: HashMap<vk::Buffer, BufferRequirements>,
    pub created_buffers: Vec<vk::Buffer>,
    pub destroyed_buffers: Vec<vk::Buffer>,
    pub allocations: Vec<(vk::DeviceMemory, u64, u32)>,
    pub freed_memory: Vec<vk::DeviceMemory>,
    pub bindings: Vec<(vk::Buffer, vk::DeviceMemory, u64)>,

    pub fail_allocation_for_type: Option<u32>,

    /// The zero-based bind call which fails.
    pub fail_bind_on_call: Option<usize>,

    bind_calls: usize,
    next_handle: u64,
}

impl FakeMemoryState {
    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Cloning the driver shares its state, so tests can keep a clone to
/// inspect what an allocator did after it has been dropped.
#[derive(Debug, Clone, Default)]
pub struct FakeMemoryDriver {
    state: Rc<RefCell<FakeMemoryState>>,
}

impl FakeMemoryDriver {
    /// Memory types are reported in the given order, all on heap 0.
    pub fn new(memory_types: &[vk::MemoryPropertyFlags]) -> Self {
        let state = FakeMemoryState {
            memory_types: memory_types
                .iter()
                .enumerate()
                .map(|(index, flags)| MemoryType {
                    index: index as u32,
                    property_flags: *flags,
                    heap_index: 0,
                })
                .collect(),
            default_alignment: 256,
            default_memory_type_bits: u32::MAX,
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn state(&self) -> Ref<'_, FakeMemoryState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, FakeMemoryState> {
        self.state.borrow_mut()
    }

    pub fn next_requirements(&self, requirements: BufferRequirements) {
        self.state_mut().pending_requirements.push_back(requirements);
    }
}

impl MemoryDriver for FakeMemoryDriver {
    fn create_buffer(
        &self,
        size_in_bytes: u64,
        _usage: vk::BufferUsageFlags,
        _sharing_mode: vk::SharingMode,
    ) -> Result<vk::Buffer, DriverError> {
        let mut state = self.state_mut();
        let requirements =
            state.pending_requirements.pop_front().unwrap_or(
                BufferRequirements {
                    size: size_in_bytes,
                    alignment: state.default_alignment,
                    memory_type_bits: state.default_memory_type_bits,
                },
            );
        let buffer = vk::Buffer::from_raw(state.next_handle());
        state.buffers.insert(buffer, requirements);
        state.created_buffers.push(buffer);
        Ok(buffer)
    }

    fn buffer_requirements(&self, buffer: vk::Buffer) -> BufferRequirements {
        self.state().buffers[&buffer]
    }

    fn memory_types(&self) -> Vec<MemoryType> {
        self.state().memory_types.clone()
    }

    fn allocate_memory(
        &self,
        size_in_bytes: u64,
        memory_type_index: u32,
    ) -> Result<vk::DeviceMemory, DriverError> {
        let mut state = self.state_mut();
        if state.fail_allocation_for_type == Some(memory_type_index) {
            return Err(DriverError::new(
                "vkAllocateMemory",
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            ));
        }
        let memory = vk::DeviceMemory::from_raw(state.next_handle());
        state
            .allocations
            .push((memory, size_in_bytes, memory_type_index));
        Ok(memory)
    }

    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset_in_bytes: u64,
    ) -> Result<(), DriverError> {
        let mut state = self.state_mut();
        let call = state.bind_calls;
        state.bind_calls += 1;
        if state.fail_bind_on_call == Some(call) {
            return Err(DriverError::new(
                "vkBindBufferMemory",
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            ));
        }
        state.bindings.push((buffer, memory, offset_in_bytes));
        Ok(())
    }

    unsafe fn destroy_buffer(&self, buffer: vk::Buffer) {
        self.state_mut().destroyed_buffers.push(buffer);
    }

    unsafe fn free_memory(&self, memory: vk::DeviceMemory) {
        self.state_mut().freed_memory.push(memory);
    }
}
