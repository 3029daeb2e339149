//! The total order used to pick the best possibility.
//!
//! Criteria are applied in priority order and the first one which
//! distinguishes two possibilities decides. "Less" means "better" so a
//! sorted collection puts the best possibility first.

use {crate::vulkan::Possibility, ash::vk, std::cmp::Ordering};

/// The channel layout of a pixel format, as far as ranking cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatInfo {
    pub channels: u8,

    /// The width of the widest channel.
    pub bits_per_channel: u8,
    pub is_srgb: bool,
}

impl FormatInfo {
    const fn new(channels: u8, bits_per_channel: u8, is_srgb: bool) -> Self {
        Self {
            channels,
            bits_per_channel,
            is_srgb,
        }
    }
}

/// Describe a swapchain-capable format. Formats which are not listed report
/// zero channels and zero bits.
pub fn format_info(format: vk::Format) -> FormatInfo {
    use vk::Format as F;
    match format {
        F::B8G8R8A8_SRGB | F::R8G8B8A8_SRGB | F::A8B8G8R8_SRGB_PACK32 => {
            FormatInfo::new(4, 8, true)
        }
        F::B8G8R8A8_UNORM
        | F::R8G8B8A8_UNORM
        | F::A8B8G8R8_UNORM_PACK32
        | F::B8G8R8A8_SNORM
        | F::R8G8B8A8_SNORM => FormatInfo::new(4, 8, false),
        F::B8G8R8_SRGB | F::R8G8B8_SRGB => FormatInfo::new(3, 8, true),
        F::B8G8R8_UNORM | F::R8G8B8_UNORM => FormatInfo::new(3, 8, false),
        F::A2B10G10R10_UNORM_PACK32 | F::A2R10G10B10_UNORM_PACK32 => {
            FormatInfo::new(4, 10, false)
        }
        F::R16G16B16A16_SFLOAT | F::R16G16B16A16_UNORM => {
            FormatInfo::new(4, 16, false)
        }
        F::R32G32B32A32_SFLOAT => FormatInfo::new(4, 32, false),
        F::B10G11R11_UFLOAT_PACK32 => FormatInfo::new(3, 11, false),
        F::R5G6B5_UNORM_PACK16 | F::B5G6R5_UNORM_PACK16 => {
            FormatInfo::new(3, 6, false)
        }
        F::A1R5G5B5_UNORM_PACK16
        | F::R5G5B5A1_UNORM_PACK16
        | F::B5G5R5A1_UNORM_PACK16 => FormatInfo::new(4, 5, false),
        F::R4G4B4A4_UNORM_PACK16 | F::B4G4R4A4_UNORM_PACK16 => {
            FormatInfo::new(4, 4, false)
        }
        F::R8G8_UNORM => FormatInfo::new(2, 8, false),
        F::R8_UNORM => FormatInfo::new(1, 8, false),
        _ => FormatInfo::default(),
    }
}

/// FIFO and MAILBOX wait for vertical blank, everything else may tear.
pub fn can_tear(mode: vk::PresentModeKHR) -> bool {
    !matches!(
        mode,
        vk::PresentModeKHR::FIFO | vk::PresentModeKHR::MAILBOX
    )
}

/// Roughly how many frames the mode lets the application keep in flight.
pub fn buffering_depth(mode: vk::PresentModeKHR) -> u32 {
    match mode {
        vk::PresentModeKHR::MAILBOX => 3,
        vk::PresentModeKHR::FIFO | vk::PresentModeKHR::FIFO_RELAXED => 2,
        _ => 1,
    }
}

fn device_type_rank(device_type: vk::PhysicalDeviceType) -> u32 {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 2,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 1,
        _ => 0,
    }
}

/// Compare two possibilities, Less when `a` is the better choice.
pub fn compare(a: &Possibility, b: &Possibility) -> Ordering {
    let format_a = format_info(a.format);
    let format_b = format_info(b.format);
    let shares_queue = |p: &Possibility| p.graphics_queue == p.present_queue;

    device_type_rank(b.summary.device_type)
        .cmp(&device_type_rank(a.summary.device_type))
        .then_with(|| b.summary.api_version.cmp(&a.summary.api_version))
        .then_with(|| can_tear(a.present_mode).cmp(&can_tear(b.present_mode)))
        .then_with(|| {
            buffering_depth(b.present_mode)
                .cmp(&buffering_depth(a.present_mode))
        })
        .then_with(|| format_b.is_srgb.cmp(&format_a.is_srgb))
        .then_with(|| format_b.channels.cmp(&format_a.channels))
        .then_with(|| format_b.bits_per_channel.cmp(&format_a.bits_per_channel))
        .then_with(|| shares_queue(b).cmp(&shares_queue(a)))
        .then_with(|| a.ordinal.cmp(&b.ordinal))
}
