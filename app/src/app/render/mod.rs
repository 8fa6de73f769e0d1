use std::sync::Arc;

use neurobg::{DrawList, Rgb};
use thiserror::Error;
use wgpu::{
    rwh::{HasDisplayHandle, HasWindowHandle},
    util::DeviceExt,
    *,
};
use winit::window::Window;

use crate::app::render::{core::RenderCore, shapes::ShapeRenderer, window::WindowUniform};

pub mod core;
pub mod shapes;
pub mod window;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("window handle unavailable: {0}")]
    Handle(#[from] wgpu::rwh::HandleError),
    #[error("could not create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable gpu adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("could not open gpu device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// The window surface the simulation's draw list is presented on.
pub struct Canvas {
    shapes: ShapeRenderer,
    background: Color,
    window_bind_group: BindGroup,
    window_buffer: Buffer,
    surface_config: SurfaceConfiguration,
    surface: Surface<'static>,
    core: RenderCore,
    window: Arc<Window>,
}

impl Canvas {
    pub fn new(window: Arc<Window>, background: Rgb) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let core = RenderCore::new()?;

        // SAFETY: the surface is dropped before the window it borrows from,
        // both live in this struct and `window` is declared last.
        let surface = unsafe {
            core.instance()
                .create_surface_unsafe(SurfaceTargetUnsafe::RawHandle {
                    raw_display_handle: window.display_handle()?.as_raw(),
                    raw_window_handle: window.window_handle()?.as_raw(),
                })?
        };
        let surface_caps = surface.get_capabilities(core.adapter());
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| matches!(f, TextureFormat::Rgba8UnormSrgb))
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8UnormSrgb);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![surface_format],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(core.device(), &surface_config);

        let window_uniform =
            WindowUniform::logical(surface_config.width, surface_config.height, window.scale_factor());
        let window_buffer = core
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Window Uniform Buffer"),
                contents: bytemuck::cast_slice(&[window_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let window_bind_group_layout = WindowUniform::bind_group_layout(core.device());
        let window_bind_group = core.device().create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &window_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: window_buffer.as_entire_binding(),
            }],
            label: Some("Window Bind Group"),
        });

        let shapes = ShapeRenderer::new(core.clone(), surface_format, &window_bind_group_layout);

        Ok(Self {
            window,
            core,
            surface,
            surface_config,
            window_buffer,
            window_bind_group,
            background: clear_color(background),
            shapes,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface
                .configure(self.core.device(), &self.surface_config);
            self.core.queue().write_buffer(
                &self.window_buffer,
                0,
                bytemuck::cast_slice(&[WindowUniform::logical(
                    width,
                    height,
                    self.window.scale_factor(),
                )]),
            );
        }
    }

    pub fn upload(&mut self, list: &DrawList) {
        self.shapes.upload(list);
    }

    pub fn render(&mut self) {
        match self.render_inner() {
            Ok(_) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height);
            }
            Err(e) => {
                tracing::warn!("unable to render: {e}");
            }
        }
    }

    fn render_inner(&mut self) -> Result<(), SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&TextureViewDescriptor::default());
        let mut encoder = self
            .core
            .device()
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.background),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.shapes.render(&self.window_bind_group, &mut render_pass);
        }

        self.core.queue().submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Palette colors are sRGB, the clear color is linear.
fn clear_color(rgb: Rgb) -> Color {
    let linear = |c: u8| (c as f64 / 255.0).powf(2.2);
    Color {
        r: linear(rgb.0),
        g: linear(rgb.1),
        b: linear(rgb.2),
        a: 1.0,
    }
}
