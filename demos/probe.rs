//! Negotiate a headless Vulkan configuration, pick the best device, and pack
//! a handful of buffers into device memory.
//!
//! Run with `RUST_LOG=debug cargo run --example probe` to see every
//! enumerated possibility.

use {
    anyhow::{Context, Result},
    ash::{ext::headless_surface, vk},
    vk_negotiate::{
        logging,
        vulkan::{
            load_entry, merged_queue_needs, CapabilityEnumerator, Feature,
            Instance, InstanceConfig, MemoryAllocator, NegotiationScope,
            QueueNeeds, UsageClass,
        },
    },
};

fn main() -> Result<()> {
    let _logger = logging::setup().context("Unable to start logging")?;

    let entry = load_entry()?;
    let scope = NegotiationScope::new("probe");
    let config = InstanceConfig {
        application_name: "vk_negotiate probe".to_owned(),
        features: vec![
            Feature::Debug { required: false },
            Feature::Validation { required: false },
            Feature::Headless,
            Feature::Queues(QueueNeeds {
                graphics: 1,
                present: 1,
                compute: 1,
                ..Default::default()
            }),
        ],
        ..Default::default()
    };
    let instance = Instance::new(&scope, entry, &config)
        .context("Unable to negotiate the Vulkan instance")?;

    let surface_driver = instance.surface_driver();
    let surface = unsafe {
        headless_surface::Instance::new(instance.entry(), instance.ash())
            .create_headless_surface(
                &vk::HeadlessSurfaceCreateInfoEXT::default(),
                None,
            )
            .context("Unable to create a headless surface")?
    };
    scopeguard::defer! {
        unsafe {
            surface_driver
                .surface_loader()
                .destroy_surface(surface, None)
        };
    }

    let selection = CapabilityEnumerator::new(&surface_driver, surface)
        .for_features(&config.features)
        .select()?;
    let device = unsafe {
        selection.create_logical_device(
            &instance,
            merged_queue_needs(&config.features),
            &[],
        )?
    };

    let mut allocator =
        MemoryAllocator::new(unsafe { device.memory_driver(&instance) });
    let mut handles = vec![];
    let storage = [("positions", 4096), ("velocities", 4096), ("ids", 1000)];
    for (name, size) in storage {
        handles.push(allocator.register_buffer(
            name,
            size,
            UsageClass::ExclusiveStorage,
        )?);
    }
    handles.push(allocator.register_buffer(
        "upload",
        9192,
        UsageClass::Staging,
    )?);
    allocator.finalize()?;

    for handle in handles {
        let descriptor = allocator.descriptor(handle)?;
        let binding = allocator.binding_info(handle)?;
        log::info!(
            "{} -> memory type {:?} at offset {} ({} bytes)",
            descriptor.name(),
            descriptor.memory_type_index(),
            binding.offset,
            binding.range
        );
    }

    // buffers and memory must be released before the device
    drop(allocator);
    drop(device);

    Ok(())
}
