use {
    super::{select_best, Possibility, Selection, SelectionError},
    crate::{
        logging::PrettyList,
        vulkan::{
            features, DeviceSummary, DriverError, Feature, QueueFamily,
            SurfaceDriver,
        },
    },
    ash::vk,
    indoc::indoc,
};

type DeviceFilter<'a> = Box<dyn Fn(&DeviceSummary) -> bool + 'a>;
type Acceptability<'a> = Box<dyn Fn(&Possibility) -> bool + 'a>;

/// Produces every format, present mode, and queue combination the
/// instance's devices offer for a surface.
pub struct CapabilityEnumerator<'a> {
    driver: &'a dyn SurfaceDriver,
    surface: vk::SurfaceKHR,
    device_filter: DeviceFilter<'a>,
    acceptability: Acceptability<'a>,
}

// Public API
// ----------

impl<'a> CapabilityEnumerator<'a> {
    /// Create an enumerator which considers every device and accepts every
    /// combination.
    pub fn new(driver: &'a dyn SurfaceDriver, surface: vk::SurfaceKHR) -> Self {
        Self {
            driver,
            surface,
            device_filter: Box::new(|_| true),
            acceptability: Box::new(|_| true),
        }
    }

    /// Skip devices for which the filter returns false. Skipped devices are
    /// never queried for surface support.
    pub fn with_device_filter(
        mut self,
        filter: impl Fn(&DeviceSummary) -> bool + 'a,
    ) -> Self {
        self.device_filter = Box::new(filter);
        self
    }

    /// Only emit possibilities for which the predicate returns true.
    pub fn with_acceptability(
        mut self,
        predicate: impl Fn(&Possibility) -> bool + 'a,
    ) -> Self {
        self.acceptability = Box::new(predicate);
        self
    }

    /// Use the device filters and queue constraints of every feature.
    pub fn for_features(self, features: &'a [Feature]) -> Self {
        let queue_needs = features::merged_queue_needs(features);
        self.with_device_filter(move |device| {
            features::accepts_device(features, device)
        })
        .with_acceptability(move |possibility| queue_needs.accepts(possibility))
    }

    /// Every acceptable possibility across every device, in enumeration
    /// order.
    ///
    /// Any failed driver query aborts the whole enumeration.
    pub fn enumerate(&self) -> Result<Vec<Possibility>, DriverError> {
        let (possibilities, _) = self.enumerate_all()?;
        Ok(possibilities)
    }

    /// Enumerate, then pick the best possibility.
    pub fn select(&self) -> Result<Selection, SelectionError> {
        let (possibilities, devices) = self.enumerate_all()?;
        select_best(possibilities, devices, self.surface)
    }
}

// Private API
// -----------

impl<'a> CapabilityEnumerator<'a> {
    /// Every possibility, plus the number of devices the driver reported.
    fn enumerate_all(&self) -> Result<(Vec<Possibility>, usize), DriverError> {
        let devices = self.driver.enumerate_physical_devices()?;
        let mut possibilities = vec![];
        for &device in &devices {
            self.enumerate_device(device, &mut possibilities)?;
        }
        Ok((possibilities, devices.len()))
    }

    fn enumerate_device(
        &self,
        device: vk::PhysicalDevice,
        possibilities: &mut Vec<Possibility>,
    ) -> Result<(), DriverError> {
        let summary = self.driver.device_summary(device);
        if !(self.device_filter)(&summary) {
            log::debug!("Skipping filtered device {}", summary.name);
            return Ok(());
        }

        let families: Vec<QueueFamily> = self
            .driver
            .queue_families(device)
            .into_iter()
            .filter(|family| family.queue_count > 0)
            .collect();
        let graphics = indices_with(&families, vk::QueueFlags::GRAPHICS);
        let compute = indices_with(&families, vk::QueueFlags::COMPUTE);
        let mut present = vec![];
        for family in &families {
            if self.supports_presentation(device, family)? {
                present.push(family.index);
            }
        }

        let formats = self.driver.surface_formats(device, self.surface)?;
        let present_modes =
            self.driver.surface_present_modes(device, self.surface)?;

        log::debug!(
            indoc!(
                "
                Device {} ({:?}, api {})
                graphics queues: {:?}
                present queues: {:?}
                compute queues: {:?}

                formats: {:#?}

                present modes: {:?}
                "
            ),
            summary.name,
            summary.device_type,
            summary.api_version,
            graphics,
            present,
            compute,
            PrettyList(&formats),
            PrettyList(&present_modes),
        );

        let first_ordinal = possibilities.len();
        for surface_format in &formats {
            for &present_mode in &present_modes {
                for &graphics_queue in &graphics {
                    for &present_queue in &present {
                        for &compute_queue in &compute {
                            let possibility = Possibility {
                                device,
                                summary: summary.clone(),
                                format: surface_format.format,
                                color_space: surface_format.color_space,
                                present_mode,
                                graphics_queue,
                                present_queue,
                                compute_queue,
                                ordinal: possibilities.len(),
                            };
                            if (self.acceptability)(&possibility) {
                                possibilities.push(possibility);
                            }
                        }
                    }
                }
            }
        }

        log::debug!(
            "Device {} offers {} possibilities",
            summary.name,
            possibilities.len() - first_ordinal
        );
        Ok(())
    }

    fn supports_presentation(
        &self,
        device: vk::PhysicalDevice,
        family: &QueueFamily,
    ) -> Result<bool, DriverError> {
        self.driver.queue_supports_presentation(
            device,
            family.index,
            self.surface,
        )
    }
}

fn indices_with(families: &[QueueFamily], flags: vk::QueueFlags) -> Vec<u32> {
    families
        .iter()
        .filter(|family| family.flags.contains(flags))
        .map(|family| family.index)
        .collect()
}
