use std::sync::Arc;

use wgpu::*;

use crate::app::render::RenderError;

/// Cheap to clone handle on the GPU device.
#[derive(Clone)]
pub struct RenderCore {
    inner: Arc<RenderCoreInner>,
}

impl RenderCore {
    pub fn new() -> Result<Self, RenderError> {
        Ok(Self {
            inner: Arc::new(RenderCoreInner::new()?),
        })
    }

    pub fn instance(&self) -> &Instance {
        &self.inner.instance
    }

    pub fn adapter(&self) -> &Adapter {
        &self.inner.adapter
    }

    pub fn device(&self) -> &Device {
        &self.inner.device
    }

    pub fn queue(&self) -> &Queue {
        &self.inner.queue
    }
}

struct RenderCoreInner {
    queue: Queue,
    device: Device,
    adapter: Adapter,
    instance: Instance,
}

impl RenderCoreInner {
    fn new() -> Result<Self, RenderError> {
        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;
        tracing::info!(adapter = ?adapter.get_info().name, "gpu adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("neurobg device"),
            required_features: wgpu::Features::empty(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        Ok(Self {
            queue,
            device,
            adapter,
            instance,
        })
    }
}
