use {
    super::InstanceError,
    crate::vulkan::DriverError,
    ash::{ext::debug_utils, vk},
    std::{borrow::Cow, ffi::CStr, os::raw::c_void},
};

/// Routes validation and driver messages into the log.
pub(super) struct DebugMessenger {
    loader: debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    pub(super) fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
    ) -> Result<Self, InstanceError> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));
        let loader = debug_utils::Instance::new(entry, instance);
        let messenger = unsafe {
            loader.create_debug_utils_messenger(&create_info, None)
        }
        .map_err(|err| {
            InstanceError::UnableToCreateDebugMessenger(DriverError::new(
                "vkCreateDebugUtilsMessengerEXT",
                err,
            ))
        })?;
        Ok(Self { loader, messenger })
    }

    /// # Safety
    ///
    /// Unsafe because:
    ///   - the messenger must not be used after this call
    ///   - it must be called before the owning instance is destroyed
    pub(super) unsafe fn destroy(&mut self) {
        self.loader
            .destroy_debug_utils_messenger(self.messenger, None);
        self.messenger = vk::DebugUtilsMessengerEXT::null();
    }
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    let message = if p_callback_data.is_null()
        || (*p_callback_data).p_message.is_null()
    {
        Cow::from("<no message>")
    } else {
        CStr::from_ptr((*p_callback_data).p_message).to_string_lossy()
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("{:?} {}", message_type, message)
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("{:?} {}", message_type, message)
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            log::debug!("{:?} {}", message_type, message)
        }
        _ => log::trace!("{:?} {}", message_type, message),
    }

    vk::FALSE
}
