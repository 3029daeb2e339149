mod debug_callback;
mod negotiation;

use {
    self::debug_callback::DebugMessenger,
    crate::{
        ffi,
        logging::PrettyList,
        vulkan::{
            AshInstanceDriver, AshSurfaceDriver, DriverError, Feature,
            RequirementError, DEBUG_UTILS_EXTENSION,
        },
    },
    ash::vk,
    std::ffi::{CString, NulError},
    thiserror::Error,
};

pub use self::negotiation::{EnabledNames, Negotiation, NegotiationScope};

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Unable to load the Vulkan library")]
    UnableToLoadVulkan(#[source] ash::LoadingError),

    #[error("A negotiation is already active in scope {0}")]
    NegotiationAlreadyActive(String),

    #[error(transparent)]
    Requirement(#[from] RequirementError),

    #[error("Unable to list the available instance extensions and layers")]
    UnableToListAvailableCapabilities(#[source] DriverError),

    #[error("Required extensions are not available: {:?}", .0)]
    RequiredExtensionsNotFound(Vec<String>),

    #[error("Required layers are not available: {:?}", .0)]
    RequiredLayersNotFound(Vec<String>),

    #[error("A name passed to the driver contains a nul byte")]
    InvalidName(#[source] NulError),

    #[error("Unable to create the Vulkan instance")]
    UnableToCreateInstance(#[source] DriverError),

    #[error("Unable to create the Vulkan debug messenger")]
    UnableToCreateDebugMessenger(#[source] DriverError),
}

/// Application details and the features to negotiate.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    pub application_name: String,
    pub application_version: u32,
    pub api_version: u32,
    pub features: Vec<Feature>,
}

impl Default for InstanceConfig {
    /// Debug builds desire the debug messenger and validation layer, release
    /// builds request nothing.
    fn default() -> Self {
        let features = if cfg!(debug_assertions) {
            vec![
                Feature::Debug { required: false },
                Feature::Validation { required: false },
            ]
        } else {
            vec![]
        };
        Self {
            application_name: "vk_negotiate".to_owned(),
            application_version: vk::make_api_version(0, 1, 0, 0),
            api_version: vk::make_api_version(0, 1, 3, 0),
            features,
        }
    }
}

/// Load the Vulkan library at runtime.
pub fn load_entry() -> Result<ash::Entry, InstanceError> {
    unsafe { ash::Entry::load() }.map_err(InstanceError::UnableToLoadVulkan)
}

/// The Vulkan instance and the extensions and layers it was created with.
pub struct Instance {
    debug: Option<DebugMessenger>,
    enabled: EnabledNames,
    ash: ash::Instance,
    entry: ash::Entry,
}

// Public API
// ----------

impl Instance {
    /// Negotiate extensions and layers, then create the instance.
    ///
    /// # Params
    ///
    /// * `scope` - the negotiation only lives for the duration of this call,
    ///   it fails if another negotiation is active in the scope
    /// * `entry` - the loaded Vulkan entry points
    /// * `config` - application info and the features to negotiate
    pub fn new(
        scope: &NegotiationScope,
        entry: ash::Entry,
        config: &InstanceConfig,
    ) -> Result<Self, InstanceError> {
        let enabled = {
            let mut negotiation = scope.begin()?;
            negotiation.observe_available(&AshInstanceDriver::new(&entry))?;
            negotiation.apply(&config.features)?;
            negotiation.lock();
            negotiation.enabled_names()?
        };

        log::info!(
            "Creating instance with extensions {}and layers {}",
            PrettyList(&enabled.extensions),
            PrettyList(&enabled.layers),
        );

        let ash = create_instance(&entry, config, &enabled)?;

        let debug = if enabled
            .extensions
            .iter()
            .any(|name| name == DEBUG_UTILS_EXTENSION)
        {
            match DebugMessenger::new(&entry, &ash) {
                Ok(messenger) => Some(messenger),
                Err(err) => {
                    unsafe { ash.destroy_instance(None) };
                    return Err(err);
                }
            }
        } else {
            None
        };

        Ok(Self {
            debug,
            enabled,
            ash,
            entry,
        })
    }

    pub fn ash(&self) -> &ash::Instance {
        &self.ash
    }

    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    pub fn enabled_extensions(&self) -> &[String] {
        &self.enabled.extensions
    }

    pub fn enabled_layers(&self) -> &[String] {
        &self.enabled.layers
    }

    /// A driver for device and surface queries against this instance.
    ///
    /// The driver must not be used after the instance is dropped.
    pub fn surface_driver(&self) -> AshSurfaceDriver {
        AshSurfaceDriver::new(&self.entry, &self.ash)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            if let Some(debug) = self.debug.as_mut() {
                debug.destroy();
            }
            self.ash.destroy_instance(None);
        }
    }
}

// Private API
// -----------

fn create_instance(
    entry: &ash::Entry,
    config: &InstanceConfig,
    enabled: &EnabledNames,
) -> Result<ash::Instance, InstanceError> {
    let application_name = CString::new(config.application_name.as_str())
        .map_err(InstanceError::InvalidName)?;
    let engine_name =
        CString::new("vk_negotiate").map_err(InstanceError::InvalidName)?;
    let application_info = vk::ApplicationInfo::default()
        .application_name(&application_name)
        .application_version(config.application_version)
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(config.api_version);

    let (_layer_names, layer_ptrs) =
        ffi::to_os_ptrs(&enabled.layers).map_err(InstanceError::InvalidName)?;
    let (_extension_names, extension_ptrs) =
        ffi::to_os_ptrs(&enabled.extensions)
            .map_err(InstanceError::InvalidName)?;

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&application_info)
        .enabled_layer_names(&layer_ptrs)
        .enabled_extension_names(&extension_ptrs);

    unsafe { entry.create_instance(&create_info, None) }.map_err(|err| {
        InstanceError::UnableToCreateInstance(DriverError::new(
            "vkCreateInstance",
            err,
        ))
    })
}
