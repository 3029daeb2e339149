mod enumerate;
mod ranking;

use {
    crate::vulkan::{
        DeviceSummary, DriverError, Instance, LogicalDevice,
        LogicalDeviceError, QueueNeeds,
    },
    ash::vk,
    std::{cmp::Ordering, collections::BTreeSet},
    thiserror::Error,
};

pub use self::{
    enumerate::CapabilityEnumerator,
    ranking::{buffering_depth, can_tear, format_info, FormatInfo},
};

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error(
        "No device offers a usable combination of format, present mode, and \
         queues for surface {surface:?} ({devices} devices examined)"
    )]
    NoSuitableConfiguration {
        devices: usize,
        surface: vk::SurfaceKHR,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// One concrete configuration a device can offer for a surface.
///
/// Possibilities are ordered best-first, so the first entry of a sorted
/// collection is the one to use.
#[derive(Debug, Clone)]
pub struct Possibility {
    pub device: vk::PhysicalDevice,
    pub summary: DeviceSummary,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub present_mode: vk::PresentModeKHR,
    pub graphics_queue: u32,
    pub present_queue: u32,
    pub compute_queue: u32,

    /// The order in which the possibility was produced. Used as the final
    /// tie-break.
    pub ordinal: usize,
}

impl Ord for Possibility {
    fn cmp(&self, other: &Self) -> Ordering {
        ranking::compare(self, other)
    }
}

impl PartialOrd for Possibility {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Possibility {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Possibility {}

/// The winning possibility for a surface.
#[derive(Debug, Clone)]
pub struct Selection {
    best: Possibility,
    ranked: Vec<Possibility>,
}

impl Selection {
    pub fn possibility(&self) -> &Possibility {
        &self.best
    }

    /// Every possibility that was considered, best-first. The first entry
    /// is the selected possibility.
    pub fn candidates(&self) -> &[Possibility] {
        &self.ranked
    }

    /// Create a logical device with queues from the selected families.
    ///
    /// # Params
    ///
    /// * `instance` - the instance which enumerated the selected device
    /// * `queue_needs` - how many queues of each kind to create
    /// * `device_extensions` - device extensions to enable
    ///
    /// # Safety
    ///
    /// Unsafe because:
    ///   - the logical device must be dropped before the instance
    pub unsafe fn create_logical_device(
        &self,
        instance: &Instance,
        queue_needs: QueueNeeds,
        device_extensions: &[String],
    ) -> Result<LogicalDevice, LogicalDeviceError> {
        LogicalDevice::new(instance, &self.best, queue_needs, device_extensions)
    }
}

/// Sort possibilities best-first.
pub fn rank(possibilities: Vec<Possibility>) -> Vec<Possibility> {
    possibilities
        .into_iter()
        .collect::<BTreeSet<Possibility>>()
        .into_iter()
        .collect()
}

/// Pick the best possibility.
///
/// # Params
///
/// * `devices` - how many devices were examined, for diagnostics
/// * `surface` - the target surface, for diagnostics
pub fn select_best(
    possibilities: Vec<Possibility>,
    devices: usize,
    surface: vk::SurfaceKHR,
) -> Result<Selection, SelectionError> {
    let ranked = rank(possibilities);
    let best = ranked
        .first()
        .cloned()
        .ok_or(SelectionError::NoSuitableConfiguration { devices, surface })?;

    log::info!(
        "Selected {} ({:?}) out of {} possibilities\n  format: {:?} / {:?}\n  \
         present mode: {:?}\n  queues: graphics={} present={} compute={}",
        best.summary.name,
        best.summary.device_type,
        ranked.len(),
        best.format,
        best.color_space,
        best.present_mode,
        best.graphics_queue,
        best.present_queue,
        best.compute_queue,
    );

    Ok(Selection { best, ranked })
}
