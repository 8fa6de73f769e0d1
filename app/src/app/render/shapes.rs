use bytemuck::{Pod, Zeroable};
use neurobg::{CircleStyle, DrawCommand, DrawList, GradientStop, Point};
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    *,
};

use crate::app::render::core::RenderCore;

/// A struct that holds a cpu and gpu side buffer and synchronizes them.
pub(super) struct SyncedBuffer<T: Zeroable + Pod> {
    cpu_buf: Vec<T>,
    gpu_buf: Buffer,
    /// In size_of::<T>()
    gpu_len: usize,
    /// In size_of::<T>()
    gpu_cap: usize,
    needs_sync: bool,
    buffer_usages: BufferUsages,
}

impl<T: Zeroable + Pod> SyncedBuffer<T> {
    pub fn new(device: &Device, buffer_usages: BufferUsages) -> Self {
        Self {
            cpu_buf: Vec::new(),
            gpu_buf: device.create_buffer(&BufferDescriptor {
                label: None,
                size: 0,
                usage: buffer_usages | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            gpu_len: 0,
            gpu_cap: 0,
            needs_sync: false,
            buffer_usages,
        }
    }

    pub fn cpu_mut(&mut self) -> &mut Vec<T> {
        self.needs_sync = true;
        &mut self.cpu_buf
    }

    pub fn gpu_maybe_sync(&mut self, device: &Device, queue: &Queue) -> (&Buffer, usize) {
        if self.needs_sync {
            self.sync(device, queue);
        }
        (&self.gpu_buf, self.gpu_len)
    }

    fn sync(&mut self, device: &Device, queue: &Queue) {
        if self.gpu_cap < self.cpu_buf.len() {
            self.gpu_cap = self.cpu_buf.len().next_power_of_two();
            self.gpu_buf = device.create_buffer(&BufferDescriptor {
                label: Some("Shape Instance Buffer"),
                size: self.gpu_cap as u64 * std::mem::size_of::<T>() as u64,
                usage: self.buffer_usages | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        if !self.cpu_buf.is_empty() {
            queue.write_buffer(&self.gpu_buf, 0, bytemuck::cast_slice(&self.cpu_buf));
        }
        self.gpu_len = self.cpu_buf.len();
        self.needs_sync = false;
    }
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable, Pod)]
pub(super) struct Vertex([f32; 2]);

impl Vertex {
    pub const QUAD_VERTICES: [Vertex; 4] = [
        Vertex([-1.0, -1.0]),
        Vertex([1.0, -1.0]),
        Vertex([1.0, 1.0]),
        Vertex([-1.0, 1.0]),
    ];
    pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

    pub const ATTRIBS: [VertexAttribute; 1] = vertex_attr_array![0 => Float32x2];
    pub fn desc() -> VertexBufferLayout<'static> {
        use std::mem;
        VertexBufferLayout {
            array_stride: mem::size_of::<Self>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Must match the `KIND_*` constants in `shape.wgsl`.
#[repr(u32)]
#[derive(Clone, Copy)]
pub(super) enum ShapeKind {
    Disc = 0,
    Ring = 1,
    Glow = 2,
    Line = 3,
}

pub(super) const MAX_STOPS: usize = 4;

/// One draw command. Every shape is an instanced quad, so a single draw
/// call keeps the order the simulation drew in.
#[repr(C)]
#[derive(Clone, Copy, Zeroable, Pod)]
pub(super) struct ShapeInstance {
    pub kind: u32,
    pub stop_count: u32,
    /// Center, or line start
    pub a: [f32; 2],
    /// Line end, unused otherwise
    pub b: [f32; 2],
    /// Radius, or line width
    pub size: f32,
    /// Ring stroke width
    pub stroke: f32,
    pub offsets: [f32; MAX_STOPS],
    pub colors: [[f32; 4]; MAX_STOPS],
}

impl ShapeInstance {
    pub const ATTRIBS: [VertexAttribute; 11] = vertex_attr_array![
        1 => Uint32,
        2 => Uint32,
        3 => Float32x2,
        4 => Float32x2,
        5 => Float32,
        6 => Float32,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
        10 => Float32x4,
        11 => Float32x4,
    ];
    pub fn desc() -> VertexBufferLayout<'static> {
        use std::mem;
        VertexBufferLayout {
            array_stride: mem::size_of::<Self>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    fn new(kind: ShapeKind, a: Point, b: Point, size: f32, stroke: f32) -> Self {
        Self {
            kind: kind as u32,
            stop_count: 0,
            a: [a.x, a.y],
            b: [b.x, b.y],
            size,
            stroke,
            offsets: [0.0; MAX_STOPS],
            colors: [[0.0; 4]; MAX_STOPS],
        }
    }

    /// Extra stops past `MAX_STOPS` are dropped.
    fn with_stops(mut self, stops: &[GradientStop]) -> Self {
        for (i, stop) in stops.iter().take(MAX_STOPS).enumerate() {
            self.offsets[i] = stop.offset;
            self.colors[i] = stop.color.to_array();
            self.stop_count += 1;
        }
        self
    }
}

impl From<&DrawCommand> for ShapeInstance {
    fn from(command: &DrawCommand) -> Self {
        match command {
            DrawCommand::Circle {
                center,
                radius,
                color,
                style,
            } => {
                let (kind, stroke) = match style {
                    CircleStyle::Fill => (ShapeKind::Disc, 0.0),
                    CircleStyle::Stroke { width } => (ShapeKind::Ring, *width),
                };
                Self::new(kind, *center, *center, *radius, stroke)
                    .with_stops(&[GradientStop::new(0.0, *color)])
            }
            DrawCommand::Glow {
                center,
                radius,
                stops,
            } => Self::new(ShapeKind::Glow, *center, *center, *radius, 0.0).with_stops(stops),
            DrawCommand::Line {
                from,
                to,
                width,
                stops,
            } => Self::new(ShapeKind::Line, *from, *to, *width, 0.0).with_stops(stops),
        }
    }
}

pub struct ShapeRenderer {
    core: RenderCore,

    quad_vertices: Buffer,
    quad_indices: Buffer,

    shapes: SyncedBuffer<ShapeInstance>,
    pipeline: RenderPipeline,
}

impl ShapeRenderer {
    pub fn new(
        core: RenderCore,
        surface_format: TextureFormat,
        window_bind_group_layout: &BindGroupLayout,
    ) -> Self {
        let quad_vertices = core.device().create_buffer_init(&BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&Vertex::QUAD_VERTICES),
            usage: BufferUsages::VERTEX,
        });
        let quad_indices = core.device().create_buffer_init(&BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(&Vertex::QUAD_INDICES),
            usage: BufferUsages::INDEX,
        });

        let shapes = SyncedBuffer::<ShapeInstance>::new(core.device(), BufferUsages::VERTEX);

        let shader = core
            .device()
            .create_shader_module(wgpu::include_wgsl!("shaders/shape.wgsl"));
        let pipeline_layout =
            core.device()
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Shape Pipeline Layout"),
                    bind_group_layouts: &[window_bind_group_layout],
                    push_constant_ranges: &[],
                });
        let pipeline = core
            .device()
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("Shape Render Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc(), ShapeInstance::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            });

        Self {
            core,
            quad_vertices,
            quad_indices,
            shapes,
            pipeline,
        }
    }

    /// Replace the instances with this frame's draw list.
    pub fn upload(&mut self, list: &DrawList) {
        let shapes = self.shapes.cpu_mut();
        shapes.clear();
        shapes.extend(list.commands().iter().map(ShapeInstance::from));
    }

    pub fn render(&mut self, window_bind_group: &BindGroup, rp: &mut RenderPass) {
        let (shape_buffer, shape_count) = self
            .shapes
            .gpu_maybe_sync(self.core.device(), self.core.queue());
        if shape_count == 0 {
            return;
        }

        rp.set_pipeline(&self.pipeline);
        rp.set_bind_group(0, window_bind_group, &[]);
        rp.set_vertex_buffer(0, self.quad_vertices.slice(..));
        rp.set_vertex_buffer(1, shape_buffer.slice(..));
        rp.set_index_buffer(self.quad_indices.slice(..), IndexFormat::Uint16);
        rp.draw_indexed(
            0..Vertex::QUAD_INDICES.len() as u32,
            0,
            0..shape_count as u32,
        );
    }
}
