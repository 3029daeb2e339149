//! The boundary between negotiation logic and the native Vulkan driver.
//!
//! Every query or mutation which reaches the driver goes through one of the
//! traits in this module. The ash-backed implementations live alongside,
//! tests use the in-memory fakes.

mod ash_driver;
mod result_codes;

#[cfg(test)]
pub(crate) mod fake;

use {ash::vk, thiserror::Error};

pub use self::{
    ash_driver::{AshInstanceDriver, AshMemoryDriver, AshSurfaceDriver},
    result_codes::describe_result,
};

/// A native Vulkan call returned something other than VK_SUCCESS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{call} failed with {result:?}: {description}")]
pub struct DriverError {
    pub call: &'static str,
    pub description: &'static str,
    #[source]
    pub result: vk::Result,
}

impl DriverError {
    pub fn new(call: &'static str, result: vk::Result) -> Self {
        Self {
            call,
            description: describe_result(result),
            result,
        }
    }
}

/// The properties of a physical device which matter for ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub flags: vk::QueueFlags,
    pub queue_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    pub index: u32,
    pub property_flags: vk::MemoryPropertyFlags,
    pub heap_index: u32,
}

/// What the driver reports about a buffer once it has been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRequirements {
    pub size: u64,
    pub alignment: u64,

    /// Bit `i` is set when memory type `i` may back the buffer.
    pub memory_type_bits: u32,
}

/// Instance-level capability enumeration.
pub trait InstanceDriver {
    fn enumerate_instance_extensions(&self) -> Result<Vec<String>, DriverError>;

    fn enumerate_instance_layers(&self) -> Result<Vec<String>, DriverError>;
}

/// Physical device and surface queries.
pub trait SurfaceDriver {
    fn enumerate_physical_devices(
        &self,
    ) -> Result<Vec<vk::PhysicalDevice>, DriverError>;

    fn device_summary(&self, device: vk::PhysicalDevice) -> DeviceSummary;

    /// Every queue family in the driver's list order.
    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<QueueFamily>;

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, DriverError>;

    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, DriverError>;

    fn queue_supports_presentation(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> Result<bool, DriverError>;
}

/// Buffer and device memory management for a single logical device.
pub trait MemoryDriver {
    fn create_buffer(
        &self,
        size_in_bytes: u64,
        usage: vk::BufferUsageFlags,
        sharing_mode: vk::SharingMode,
    ) -> Result<vk::Buffer, DriverError>;

    fn buffer_requirements(&self, buffer: vk::Buffer) -> BufferRequirements;

    /// The device's memory types in the order the driver reports them.
    fn memory_types(&self) -> Vec<MemoryType>;

    fn allocate_memory(
        &self,
        size_in_bytes: u64,
        memory_type_index: u32,
    ) -> Result<vk::DeviceMemory, DriverError>;

    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset_in_bytes: u64,
    ) -> Result<(), DriverError>;

    /// # Safety
    ///
    /// Unsafe because:
    ///   - the buffer must not be in use by the GPU
    ///   - the buffer must have been created by this driver and not already
    ///     destroyed
    unsafe fn destroy_buffer(&self, buffer: vk::Buffer);

    /// # Safety
    ///
    /// Unsafe because:
    ///   - no resource bound to the memory may be used after it is freed
    ///   - the memory must have been allocated by this driver and not
    ///     already freed
    unsafe fn free_memory(&self, memory: vk::DeviceMemory);
}
