//! Negotiates a Vulkan configuration and allocates buffer memory in
//! batches.
//!
//! Setup runs in three phases: instance negotiation ([`Instance::new`]),
//! possibility enumeration and ranking ([`CapabilityEnumerator`]), and
//! batch memory allocation ([`MemoryAllocator`]).

mod driver;
mod features;
mod instance;
mod logical_device;
mod memory;
mod physical_device;
mod requirements;

pub use self::{
    driver::{
        describe_result, AshInstanceDriver, AshMemoryDriver, AshSurfaceDriver,
        BufferRequirements, DeviceSummary, DriverError, InstanceDriver,
        MemoryDriver, MemoryType, QueueFamily, SurfaceDriver,
    },
    features::{
        accepts_device, merged_queue_needs, ContributesExtensionRequirements,
        ContributesLayerRequirements, ContributesQueueRequirements, Feature,
        FiltersPhysicalDevices, QueueNeeds, DEBUG_UTILS_EXTENSION,
        HEADLESS_SURFACE_EXTENSION, SURFACE_EXTENSION, VALIDATION_LAYER,
    },
    instance::{
        load_entry, EnabledNames, Instance, InstanceConfig, InstanceError,
        Negotiation, NegotiationScope,
    },
    logical_device::{LogicalDevice, LogicalDeviceError},
    memory::{
        effective_size, Allocation, AllocatorError, BindingInfo, BufferHandle,
        MemoryAllocator, MemoryTypeMismatch, ResourceDescriptor, UsageClass,
    },
    physical_device::{
        buffering_depth, can_tear, format_info, rank, select_best,
        CapabilityEnumerator, FormatInfo, Possibility, Selection,
        SelectionError,
    },
    requirements::{Requirement, RequirementError, RequirementLedger},
};
