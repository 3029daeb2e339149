mod ffi;

pub mod logging;
pub mod vulkan;
