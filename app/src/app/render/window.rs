use bytemuck::{Pod, Zeroable};
use wgpu::{BindGroupLayout, Device};

/// Surface size in logical pixels, the unit the simulation draws in.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(super) struct WindowUniform {
    pub width: f32,
    pub height: f32,
}

impl WindowUniform {
    pub fn logical(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width: (width as f64 / scale_factor) as f32,
            height: (height as f64 / scale_factor) as f32,
        }
    }

    pub fn bind_group_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Window Bind Group Layout"),
        })
    }
}
