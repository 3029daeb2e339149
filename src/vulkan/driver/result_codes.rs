use ash::vk;

/// A human-readable description of a native result code.
pub fn describe_result(result: vk::Result) -> &'static str {
    match result {
        vk::Result::SUCCESS => "Command successfully completed",
        vk::Result::NOT_READY => "A fence or query has not yet completed",
        vk::Result::TIMEOUT => {
            "A wait operation has not completed in the specified time"
        }
        vk::Result::EVENT_SET => "An event is signaled",
        vk::Result::EVENT_RESET => "An event is unsignaled",
        vk::Result::INCOMPLETE => "A return array was too small for the result",
        vk::Result::SUBOPTIMAL_KHR => {
            "A swapchain no longer matches the surface properties exactly, \
             but can still be used to present to the surface successfully"
        }
        vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
            "A host memory allocation has failed"
        }
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            "A device memory allocation has failed"
        }
        vk::Result::ERROR_INITIALIZATION_FAILED => {
            "Initialization of an object could not be completed for \
             implementation-specific reasons"
        }
        vk::Result::ERROR_DEVICE_LOST => {
            "The logical or physical device has been lost"
        }
        vk::Result::ERROR_MEMORY_MAP_FAILED => {
            "Mapping of a memory object has failed"
        }
        vk::Result::ERROR_LAYER_NOT_PRESENT => {
            "A requested layer is not present or could not be loaded"
        }
        vk::Result::ERROR_EXTENSION_NOT_PRESENT => {
            "A requested extension is not supported"
        }
        vk::Result::ERROR_FEATURE_NOT_PRESENT => {
            "A requested feature is not supported"
        }
        vk::Result::ERROR_INCOMPATIBLE_DRIVER => {
            "The requested version of Vulkan is not supported by the driver \
             or is otherwise incompatible"
        }
        vk::Result::ERROR_TOO_MANY_OBJECTS => {
            "Too many objects of the type have already been created"
        }
        vk::Result::ERROR_FORMAT_NOT_SUPPORTED => {
            "A requested format is not supported on this device"
        }
        vk::Result::ERROR_FRAGMENTED_POOL => {
            "A pool allocation has failed due to fragmentation of the pool's \
             memory"
        }
        vk::Result::ERROR_SURFACE_LOST_KHR => {
            "A surface is no longer available"
        }
        vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR => {
            "The requested window is already connected to a VkSurfaceKHR, or \
             to some other non-Vulkan API"
        }
        vk::Result::ERROR_OUT_OF_DATE_KHR => {
            "A surface has changed in such a way that it is no longer \
             compatible with the swapchain"
        }
        vk::Result::ERROR_INCOMPATIBLE_DISPLAY_KHR => {
            "The display used by a swapchain does not use the same \
             presentable image layout"
        }
        vk::Result::ERROR_VALIDATION_FAILED_EXT => {
            "A validation layer found an error"
        }
        _ => "Unknown Vulkan result",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_are_translated() {
        assert_eq!(
            describe_result(vk::Result::ERROR_LAYER_NOT_PRESENT),
            "A requested layer is not present or could not be loaded"
        );
        assert_eq!(
            describe_result(vk::Result::ERROR_SURFACE_LOST_KHR),
            "A surface is no longer available"
        );
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(
            describe_result(vk::Result::from_raw(-424242)),
            "Unknown Vulkan result"
        );
    }
}
