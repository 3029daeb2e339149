use {
    crate::vulkan::{
        DeviceSummary, Possibility, Requirement, RequirementError,
        RequirementLedger,
    },
    ash::vk,
};

pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";
pub const SURFACE_EXTENSION: &str = "VK_KHR_surface";
pub const HEADLESS_SURFACE_EXTENSION: &str = "VK_EXT_headless_surface";
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Something which votes on the instance extension ledger.
pub trait ContributesExtensionRequirements {
    fn contribute_extensions(
        &self,
        extensions: &mut RequirementLedger,
    ) -> Result<(), RequirementError>;
}

/// Something which votes on the instance layer ledger.
pub trait ContributesLayerRequirements {
    fn contribute_layers(
        &self,
        layers: &mut RequirementLedger,
    ) -> Result<(), RequirementError>;
}

/// Something which needs queues from the logical device.
pub trait ContributesQueueRequirements {
    fn queue_needs(&self) -> QueueNeeds;
}

/// Something which can rule out a physical device before its surface
/// capabilities are queried.
pub trait FiltersPhysicalDevices {
    fn can_use_physical_device(&self, device: &DeviceSummary) -> bool;
}

/// How many queues of each kind a collaborator needs, and which queue roles
/// must share a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueNeeds {
    pub graphics: u32,
    pub present: u32,
    pub compute: u32,
    pub graphics_present_must_match: bool,
    pub compute_graphics_must_match: bool,
}

impl QueueNeeds {
    /// Counts combine by maximum, constraints by OR.
    pub fn merge(self, other: QueueNeeds) -> QueueNeeds {
        QueueNeeds {
            graphics: self.graphics.max(other.graphics),
            present: self.present.max(other.present),
            compute: self.compute.max(other.compute),
            graphics_present_must_match: self.graphics_present_must_match
                || other.graphics_present_must_match,
            compute_graphics_must_match: self.compute_graphics_must_match
                || other.compute_graphics_must_match,
        }
    }

    /// Accepts every possibility unless a "must match" constraint is set.
    pub fn accepts(&self, possibility: &Possibility) -> bool {
        let graphics_present_ok = !self.graphics_present_must_match
            || possibility.graphics_queue == possibility.present_queue;
        let compute_graphics_ok = !self.compute_graphics_must_match
            || possibility.compute_queue == possibility.graphics_queue;
        graphics_present_ok && compute_graphics_ok
    }
}

/// The closed set of optional behaviors an application can ask for while
/// negotiating an instance and device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    /// Route driver messages into the log through VK_EXT_debug_utils.
    Debug { required: bool },

    /// Enable the Khronos validation layer.
    Validation { required: bool },

    /// Require the platform's surface extensions.
    Surface { extensions: Vec<String> },

    /// Require VK_KHR_surface and VK_EXT_headless_surface.
    Headless,

    Queues(QueueNeeds),

    /// Only accept devices of the listed types.
    DeviceTypes(Vec<vk::PhysicalDeviceType>),

    /// Forbid extensions and layers, even if another feature desires them.
    Exclude {
        extensions: Vec<String>,
        layers: Vec<String>,
    },
}

fn tier(required: bool) -> Requirement {
    if required {
        Requirement::Required
    } else {
        Requirement::Desired
    }
}

impl ContributesExtensionRequirements for Feature {
    fn contribute_extensions(
        &self,
        extensions: &mut RequirementLedger,
    ) -> Result<(), RequirementError> {
        match self {
            Feature::Debug { required } => extensions
                .set_requirement(DEBUG_UTILS_EXTENSION, tier(*required)),
            Feature::Surface { extensions: names } => {
                for name in names {
                    extensions.set_requirement(name, Requirement::Required)?;
                }
                Ok(())
            }
            Feature::Headless => {
                extensions
                    .set_requirement(SURFACE_EXTENSION, Requirement::Required)?;
                extensions.set_requirement(
                    HEADLESS_SURFACE_EXTENSION,
                    Requirement::Required,
                )
            }
            Feature::Exclude {
                extensions: names, ..
            } => {
                for name in names {
                    extensions.set_requirement(name, Requirement::NotDesired)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl ContributesLayerRequirements for Feature {
    fn contribute_layers(
        &self,
        layers: &mut RequirementLedger,
    ) -> Result<(), RequirementError> {
        match self {
            Feature::Validation { required } => {
                layers.set_requirement(VALIDATION_LAYER, tier(*required))
            }
            Feature::Exclude { layers: names, .. } => {
                for name in names {
                    layers.set_requirement(name, Requirement::NotDesired)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl ContributesQueueRequirements for Feature {
    fn queue_needs(&self) -> QueueNeeds {
        match self {
            Feature::Queues(needs) => *needs,
            _ => QueueNeeds::default(),
        }
    }
}

impl FiltersPhysicalDevices for Feature {
    fn can_use_physical_device(&self, device: &DeviceSummary) -> bool {
        match self {
            Feature::DeviceTypes(types) => types.contains(&device.device_type),
            _ => true,
        }
    }
}

/// The combined queue needs of every feature.
pub fn merged_queue_needs(features: &[Feature]) -> QueueNeeds {
    features
        .iter()
        .map(ContributesQueueRequirements::queue_needs)
        .fold(QueueNeeds::default(), QueueNeeds::merge)
}

/// True when no feature rules the device out.
pub fn accepts_device(features: &[Feature], device: &DeviceSummary) -> bool {
    features
        .iter()
        .all(|feature| feature.can_use_physical_device(device))
}
