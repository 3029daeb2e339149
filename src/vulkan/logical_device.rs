use {
    crate::{
        ffi,
        vulkan::{
            AshMemoryDriver, DriverError, Instance, Possibility, QueueFamily,
            QueueNeeds,
        },
    },
    ash::vk,
    std::{collections::BTreeMap, ffi::NulError},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum LogicalDeviceError {
    #[error("A device extension name contains a nul byte")]
    InvalidExtensionName(#[source] NulError),

    #[error("Unable to create the logical device")]
    UnableToCreateLogicalDevice(#[source] DriverError),
}

/// The logical device created for a selected possibility, along with the
/// queue families it was created with.
pub struct LogicalDevice {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    graphics_family_index: u32,
    present_family_index: u32,
    compute_family_index: u32,
}

impl LogicalDevice {
    /// Create the logical device.
    ///
    /// # Safety
    ///
    /// Unsafe because:
    ///   - the logical device must be dropped before the instance
    pub(crate) unsafe fn new(
        instance: &Instance,
        selection: &Possibility,
        queue_needs: QueueNeeds,
        device_extensions: &[String],
    ) -> Result<Self, LogicalDeviceError> {
        let families: Vec<QueueFamily> = instance
            .ash()
            .get_physical_device_queue_family_properties(selection.device)
            .iter()
            .enumerate()
            .map(|(index, family)| QueueFamily {
                index: index as u32,
                flags: family.queue_flags,
                queue_count: family.queue_count,
            })
            .collect();
        let counts = queue_counts(selection, &families, queue_needs);

        let priorities: Vec<Vec<f32>> = counts
            .iter()
            .map(|(_, count)| vec![1.0; *count as usize])
            .collect();
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = counts
            .iter()
            .zip(priorities.iter())
            .map(|((family_index, _), priorities)| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(*family_index)
                    .queue_priorities(priorities)
            })
            .collect();

        let (_extension_names, extension_ptrs) =
            ffi::to_os_ptrs(device_extensions)
                .map_err(LogicalDeviceError::InvalidExtensionName)?;
        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extension_ptrs);

        let device = instance
            .ash()
            .create_device(selection.device, &create_info, None)
            .map_err(|err| {
                LogicalDeviceError::UnableToCreateLogicalDevice(
                    DriverError::new("vkCreateDevice", err),
                )
            })?;

        log::info!(
            "Created logical device for {} with queues {:?}",
            selection.summary.name,
            counts
        );

        Ok(Self {
            device,
            physical_device: selection.device,
            graphics_family_index: selection.graphics_queue,
            present_family_index: selection.present_queue,
            compute_family_index: selection.compute_queue,
        })
    }

    pub fn raw(&self) -> &ash::Device {
        &self.device
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn graphics_family_index(&self) -> u32 {
        self.graphics_family_index
    }

    pub fn present_family_index(&self) -> u32 {
        self.present_family_index
    }

    pub fn compute_family_index(&self) -> u32 {
        self.compute_family_index
    }

    /// A memory driver for allocating buffers on this device.
    ///
    /// # Safety
    ///
    /// Unsafe because:
    ///   - everything allocated through the driver must be released before
    ///     the logical device is dropped
    pub unsafe fn memory_driver(&self, instance: &Instance) -> AshMemoryDriver {
        AshMemoryDriver::new(instance.ash(), self.physical_device, &self.device)
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            // wait for all operations to finish before destroying anything
            if let Err(err) = self.device.device_wait_idle() {
                log::error!("Error while waiting for the device: {:?}", err);
            }
            self.device.destroy_device(None);
        }
    }
}

/// One (family, queue count) pair per distinct family used by the
/// selection.
///
/// Each count is the largest need mapped to that family, at least one and
/// no more than the family offers.
fn queue_counts(
    selection: &Possibility,
    families: &[QueueFamily],
    queue_needs: QueueNeeds,
) -> Vec<(u32, u32)> {
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for (family_index, need) in [
        (selection.graphics_queue, queue_needs.graphics),
        (selection.present_queue, queue_needs.present),
        (selection.compute_queue, queue_needs.compute),
    ] {
        let count = counts.entry(family_index).or_insert(1);
        *count = (*count).max(need);
    }
    counts
        .into_iter()
        .map(|(family_index, count)| {
            let available = families
                .iter()
                .find(|family| family.index == family_index)
                .map(|family| family.queue_count)
                .unwrap_or(1)
                .max(1);
            (family_index, count.min(available))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use {super::*, crate::vulkan::DeviceSummary};

    fn selection(graphics: u32, present: u32, compute: u32) -> Possibility {
        Possibility {
            device: vk::PhysicalDevice::null(),
            summary: DeviceSummary {
                name: "test".to_owned(),
                device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
                api_version: 0,
            },
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            present_mode: vk::PresentModeKHR::FIFO,
            graphics_queue: graphics,
            present_queue: present,
            compute_queue: compute,
            ordinal: 0,
        }
    }

    fn families(counts: &[u32]) -> Vec<QueueFamily> {
        counts
            .iter()
            .enumerate()
            .map(|(index, queue_count)| QueueFamily {
                index: index as u32,
                flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE,
                queue_count: *queue_count,
            })
            .collect()
    }

    #[test]
    fn shared_families_get_a_single_create_info() {
        let counts = queue_counts(
            &selection(0, 0, 0),
            &families(&[4]),
            QueueNeeds {
                graphics: 1,
                present: 1,
                compute: 2,
                ..Default::default()
            },
        );

        assert_eq!(counts, vec![(0, 2)]);
    }

    #[test]
    fn distinct_families_each_get_a_queue() {
        let counts = queue_counts(
            &selection(2, 0, 1),
            &families(&[1, 1, 1]),
            QueueNeeds::default(),
        );

        assert_eq!(counts, vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn counts_are_clamped_to_the_family() {
        let counts = queue_counts(
            &selection(0, 0, 1),
            &families(&[2, 1]),
            QueueNeeds {
                graphics: 8,
                compute: 3,
                ..Default::default()
            },
        );

        assert_eq!(counts, vec![(0, 2), (1, 1)]);
    }
}
