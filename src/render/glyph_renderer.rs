//! Extruded glyph renderer.
//!
//! Draws cached glyph meshes (`text::cache::GlyphMesh<GpuGlyphBuffers>`) with a lit,
//! depth-tested pipeline.
//!
//! Frame flow:
//! - `TextRenderer3D::render_text` fills a `GlyphBatch` (one entry per glyph).
//! - `GlyphPipeline::draw` writes every glyph's uniforms into one dynamic-offset uniform
//!   buffer, then issues one `draw_indexed` per glyph with its own offset.
//!
//! Each glyph needs its own uniform slot: `Queue::write_buffer` lands before the submitted
//! pass runs, so rewriting one slot per draw would leave every glyph with the last transform.

use std::{borrow::Cow, mem};

use glam::Mat4;
use wgpu::util::DeviceExt as _;

use crate::mesh::Vertex3D;
use crate::render::gpu::{DEPTH_FORMAT, Gpu};
use crate::text::cache::MeshUploader;
use crate::text::layout::DrawTarget;

fn round_up_to(v: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (v + (align - 1)) & !(align - 1)
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

/// Uniform layout:
/// - `mvp`: clip_from_local for this glyph
/// - `model`: world rotation shared by the batch (normals only)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct GlyphUniforms {
    mvp: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

/// GPU buffers for one glyph mesh. Dropping this releases both buffers.
#[derive(Debug)]
pub struct GpuGlyphBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
}

/// Uploads glyph meshes with `create_buffer_init`.
#[derive(Debug, Clone)]
pub struct WgpuUploader {
    device: wgpu::Device,
}

impl WgpuUploader {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            device: device.clone(),
        }
    }
}

impl MeshUploader for WgpuUploader {
    type Buffers = GpuGlyphBuffers;

    fn upload(&mut self, label: &str, vertices: &[Vertex3D], indices: &[u32]) -> GpuGlyphBuffers {
        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} vertices")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        GpuGlyphBuffers { vertex, index }
    }
}

/// Per-frame list of glyph draws.
pub struct GlyphBatch<'a> {
    model: Mat4,
    draws: Vec<(&'a GpuGlyphBuffers, u32, Mat4)>,
}

impl<'a> GlyphBatch<'a> {
    /// `model` is the world rotation used to light the normals.
    pub fn new(model: Mat4) -> Self {
        Self {
            model,
            draws: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

impl<'a> DrawTarget<'a, GpuGlyphBuffers> for GlyphBatch<'a> {
    fn draw_indexed(&mut self, buffers: &'a GpuGlyphBuffers, index_count: u32, transform: Mat4) {
        self.draws.push((buffers, index_count, transform));
    }
}

/// Lit, depth-tested pipeline for extruded glyphs.
pub struct GlyphPipeline {
    pipeline: wgpu::RenderPipeline,

    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// In glyph slots.
    uniform_capacity: u64,
    uniform_stride: u64,

    staging: Vec<u8>,
}

impl GlyphPipeline {
    pub fn new(gpu: &Gpu) -> anyhow::Result<Self> {
        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Glyph Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "shaders/extruded_glyph.wgsl"
                ))),
            });

        let uniform_size = mem::size_of::<GlyphUniforms>() as u64;
        let uniform_stride = round_up_to(
            uniform_size,
            gpu.device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        let bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Glyph Uniform BGL"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: wgpu::BufferSize::new(uniform_size),
                        },
                        count: None,
                    }],
                });

        let uniform_capacity = 64;
        let (uniform_buffer, uniform_bind_group) = Self::make_uniforms(
            &gpu.device,
            &bind_group_layout,
            uniform_capacity * uniform_stride,
        );

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Glyph Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Glyph Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.surface_format.add_srgb_suffix(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    // Side walls follow the contour direction, which differs between
                    // outer rings and holes.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity,
            uniform_stride,
            staging: Vec::new(),
        })
    }

    fn make_uniforms(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        size: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glyph Uniform Buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glyph Uniform BG"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(mem::size_of::<GlyphUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Grow the uniform buffer to hold at least `slots` glyphs.
    fn ensure_capacity(&mut self, gpu: &Gpu, slots: u64) {
        if slots <= self.uniform_capacity {
            return;
        }
        let new_capacity = slots.next_power_of_two();
        let (buffer, bind_group) = Self::make_uniforms(
            &gpu.device,
            &self.bind_group_layout,
            new_capacity * self.uniform_stride,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = new_capacity;
        log::debug!("glyph uniforms grown to {new_capacity} slots");
    }

    /// Draw every glyph in `batch` into `pass`.
    ///
    /// The caller owns the pass (clear color, depth attachment).
    pub fn draw(&mut self, gpu: &Gpu, pass: &mut wgpu::RenderPass<'_>, batch: &GlyphBatch<'_>) {
        if batch.is_empty() {
            return;
        }

        self.ensure_capacity(gpu, batch.len() as u64);

        let stride = self.uniform_stride as usize;
        self.staging.clear();
        self.staging.resize(batch.len() * stride, 0);
        let model = batch.model.to_cols_array_2d();
        for (slot, (_, _, mvp)) in batch.draws.iter().enumerate() {
            let uniforms = GlyphUniforms {
                mvp: mvp.to_cols_array_2d(),
                model,
            };
            let start = slot * stride;
            let bytes = bytemuck::bytes_of(&uniforms);
            self.staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, &self.staging);

        pass.set_pipeline(&self.pipeline);
        for (slot, (buffers, index_count, _)) in batch.draws.iter().enumerate() {
            let offset = (slot as u64 * self.uniform_stride) as wgpu::DynamicOffset;
            pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
            pass.set_vertex_buffer(0, buffers.vertex.slice(..));
            pass.set_index_buffer(buffers.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..*index_count, 0, 0..1);
        }
    }
}
