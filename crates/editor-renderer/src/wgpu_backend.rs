//! wgpu implementation of the graphics layer
//!
//! Draw calls are recorded while render items run and replayed into a single
//! render pass by [`WgpuGraphics::flush`]. Each `apply_world_matrix` takes a
//! new slot in a dynamic-offset uniform buffer so every recorded draw keeps
//! its own world matrix.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use editor_core::ModelUniform;

use crate::camera::{Camera, CameraUniform};
use crate::graphics::{
    BlendState, ColoredVertex, DepthComparison, DepthStencilState, FaceCullingMode, GraphicsDevice,
    GraphicsError, MaterialDescription, PipelineStates, PrimitiveTopology, RasterizerState,
    RenderContext, TriangleFillMode,
};
use crate::shaders;

/// World matrix slots available per flush
pub const MAX_OBJECTS: usize = 256;

const MODEL_UNIFORM_SIZE: u64 = std::mem::size_of::<ModelUniform>() as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WgpuVertexBuffer {
    index: usize,
    capacity: usize,
}

impl WgpuVertexBuffer {
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WgpuIndexBuffer {
    index: usize,
    len: u32,
}

impl WgpuIndexBuffer {
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WgpuMaterial {
    index: usize,
}

struct MaterialEntry {
    vertex_entry: &'static str,
    fragment_entry: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    material: usize,
    topology: PrimitiveTopology,
    states: PipelineStates,
}

struct DrawCommand {
    pipeline: PipelineKey,
    vertex_buffer: usize,
    index_buffer: usize,
    object_offset: u32,
    indices: std::ops::Range<u32>,
}

/// Graphics device + render context backed by wgpu
pub struct WgpuGraphics {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,
    object_staging: Vec<u8>,
    object_count: usize,

    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffers: Vec<wgpu::Buffer>,
    materials: Vec<MaterialEntry>,

    states: PipelineStates,
    viewer_position: Vec3,
    bound_vertex: Option<usize>,
    bound_index: Option<WgpuIndexBuffer>,
    bound_material: Option<usize>,
    current_object: Option<u32>,
    commands: Vec<DrawCommand>,
}

impl WgpuGraphics {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Unlit Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::UNLIT_SHADER.into()),
        });

        // Globals (projection + view)
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
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
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        // Per-object world matrices (dynamic offset)
        let object_stride = align_to(
            MODEL_UNIFORM_SIZE,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Per-Object Buffer"),
            size: object_stride * MAX_OBJECTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Per-Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                },
                count: None,
            }],
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Per-Object Bind Group"),
            layout: &object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Unlit Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });

        log::info!(
            "wgpu graphics ready (color: {:?}, depth: {:?}, object stride: {})",
            color_format,
            depth_format,
            object_stride
        );

        Self {
            device,
            queue,
            color_format,
            depth_format,
            shader,
            pipeline_layout,
            pipelines: HashMap::new(),
            globals_buffer,
            globals_bind_group,
            object_buffer,
            object_bind_group,
            object_stride,
            object_staging: vec![0; (object_stride as usize) * MAX_OBJECTS],
            object_count: 0,
            vertex_buffers: Vec::new(),
            index_buffers: Vec::new(),
            materials: Vec::new(),
            states: PipelineStates::default(),
            viewer_position: Vec3::ZERO,
            bound_vertex: None,
            bound_index: None,
            bound_material: None,
            current_object: None,
            commands: Vec::new(),
        }
    }

    /// Upload the camera matrices and remember the viewer position
    pub fn set_camera(&mut self, camera: &Camera) {
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&camera.uniform()));
        self.viewer_position = camera.position;
    }

    /// Number of draws waiting for the next flush
    pub fn pending_draws(&self) -> usize {
        self.commands.len()
    }

    /// Number of cached pipelines
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Replay recorded draws into `color_view` (and `depth_view` when the
    /// backend was created with a depth format). Existing contents are kept.
    /// Returns the number of draws issued.
    pub fn flush(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: Option<&wgpu::TextureView>,
    ) -> usize {
        if self.object_count > 0 {
            let used = self.object_count * self.object_stride as usize;
            self.queue
                .write_buffer(&self.object_buffer, 0, &self.object_staging[..used]);
        }

        let mut issued = 0;
        {
            let depth_stencil_attachment = match (self.depth_format, depth_view) {
                (Some(_), Some(view)) => Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                _ => None,
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Editor Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load, // 既存の描画を保持
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for command in &self.commands {
                let Some(pipeline) = self.pipelines.get(&command.pipeline) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &self.object_bind_group, &[command.object_offset]);
                render_pass.set_vertex_buffer(0, self.vertex_buffers[command.vertex_buffer].slice(..));
                render_pass.set_index_buffer(
                    self.index_buffers[command.index_buffer].slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                render_pass.draw_indexed(command.indices.clone(), 0, 0..1);
                issued += 1;
            }
        }

        log::trace!("Flushed {} draws ({} objects)", issued, self.object_count);

        self.commands.clear();
        self.object_count = 0;
        self.current_object = None;
        self.bound_vertex = None;
        self.bound_index = None;
        self.bound_material = None;
        self.states = PipelineStates::default();
        issued
    }

    fn pipeline(&mut self, key: PipelineKey) -> Result<(), GraphicsError> {
        if self.pipelines.contains_key(&key) {
            return Ok(());
        }

        let material = self.materials.get(key.material).ok_or(GraphicsError::MissingBinding("material"))?;
        let polygon_mode = match key.states.rasterizer.fill_mode {
            TriangleFillMode::Wireframe
                if self.device.features().contains(wgpu::Features::POLYGON_MODE_LINE) =>
            {
                wgpu::PolygonMode::Line
            }
            _ => wgpu::PolygonMode::Fill,
        };
        let depth_stencil = self
            .depth_format
            .map(|format| depth_stencil_state(format, key.states.depth_stencil));

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Unlit Render Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some(material.vertex_entry),
                buffers: &[ColoredVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some(material.fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(blend_state(key.states.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: topology(key.topology),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: cull_mode(key.states.rasterizer.cull_mode),
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        log::debug!("Created pipeline {:?}", key);
        self.pipelines.insert(key, pipeline);
        Ok(())
    }
}

impl GraphicsDevice for WgpuGraphics {
    type VertexBuffer = WgpuVertexBuffer;
    type IndexBuffer = WgpuIndexBuffer;
    type Material = WgpuMaterial;

    fn create_vertex_buffer(&mut self, capacity: usize) -> Result<WgpuVertexBuffer, GraphicsError> {
        if capacity == 0 {
            return Err(GraphicsError::ResourceCreation {
                resource: "vertex buffer",
                reason: "capacity must be non-zero".to_string(),
            });
        }
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Vertex Buffer"),
            size: (capacity * std::mem::size_of::<ColoredVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.vertex_buffers.push(buffer);
        Ok(WgpuVertexBuffer {
            index: self.vertex_buffers.len() - 1,
            capacity,
        })
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<WgpuIndexBuffer, GraphicsError> {
        if indices.is_empty() {
            return Err(GraphicsError::ResourceCreation {
                resource: "index buffer",
                reason: "no indices".to_string(),
            });
        }
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.index_buffers.push(buffer);
        Ok(WgpuIndexBuffer {
            index: self.index_buffers.len() - 1,
            len: indices.len() as u32,
        })
    }

    fn create_material(&mut self, description: &MaterialDescription) -> Result<WgpuMaterial, GraphicsError> {
        let vertex_entry = shaders::vertex_entry_point(&description.vertex_shader)
            .ok_or_else(|| GraphicsError::UnknownShader(description.vertex_shader.clone()))?;
        let fragment_entry = shaders::fragment_entry_point(&description.fragment_shader)
            .ok_or_else(|| GraphicsError::UnknownShader(description.fragment_shader.clone()))?;

        let stride = description.vertex_stride() as usize;
        if stride != std::mem::size_of::<ColoredVertex>() {
            return Err(GraphicsError::ResourceCreation {
                resource: "material",
                reason: format!("unsupported vertex stride {}", stride),
            });
        }
        let per_object: u32 = description.per_object_inputs.iter().map(|input| input.size).sum();
        if per_object as u64 > MODEL_UNIFORM_SIZE {
            return Err(GraphicsError::ResourceCreation {
                resource: "material",
                reason: format!("per-object inputs need {} bytes", per_object),
            });
        }

        self.materials.push(MaterialEntry {
            vertex_entry,
            fragment_entry,
        });
        Ok(WgpuMaterial {
            index: self.materials.len() - 1,
        })
    }

    /// Uploads immediately; every draw in the next flush sees the latest contents
    fn write_vertices(
        &mut self,
        buffer: &mut WgpuVertexBuffer,
        vertices: &[ColoredVertex],
    ) -> Result<(), GraphicsError> {
        if vertices.len() > buffer.capacity {
            return Err(GraphicsError::BufferOverflow {
                len: vertices.len(),
                capacity: buffer.capacity,
            });
        }
        self.queue.write_buffer(
            &self.vertex_buffers[buffer.index],
            0,
            bytemuck::cast_slice(vertices),
        );
        Ok(())
    }
}

impl RenderContext for WgpuGraphics {
    fn set_vertex_buffer(&mut self, buffer: &WgpuVertexBuffer) {
        self.bound_vertex = Some(buffer.index);
    }

    fn set_index_buffer(&mut self, buffer: &WgpuIndexBuffer) {
        self.bound_index = Some(*buffer);
    }

    fn set_material(&mut self, material: &WgpuMaterial) {
        self.bound_material = Some(material.index);
    }

    fn apply_world_matrix(&mut self, world: Mat4) -> Result<(), GraphicsError> {
        if self.object_count >= MAX_OBJECTS {
            return Err(GraphicsError::BufferOverflow {
                len: self.object_count + 1,
                capacity: MAX_OBJECTS,
            });
        }
        let offset = self.object_count * self.object_stride as usize;
        let uniform = ModelUniform::from_mat4(world);
        self.object_staging[offset..offset + MODEL_UNIFORM_SIZE as usize]
            .copy_from_slice(bytemuck::bytes_of(&uniform));
        self.current_object = Some(offset as u32);
        self.object_count += 1;
        Ok(())
    }

    fn depth_stencil_state(&self) -> DepthStencilState {
        self.states.depth_stencil
    }

    fn set_depth_stencil_state(&mut self, state: DepthStencilState) {
        self.states.depth_stencil = state;
    }

    fn rasterizer_state(&self) -> RasterizerState {
        self.states.rasterizer
    }

    fn set_rasterizer_state(&mut self, state: RasterizerState) {
        self.states.rasterizer = state;
    }

    fn blend_state(&self) -> BlendState {
        self.states.blend
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.states.blend = state;
    }

    fn viewer_position(&self) -> Vec3 {
        self.viewer_position
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        start_index: u32,
        topology: PrimitiveTopology,
    ) -> Result<(), GraphicsError> {
        let vertex_buffer = self.bound_vertex.ok_or(GraphicsError::MissingBinding("vertex buffer"))?;
        let index_buffer = self.bound_index.ok_or(GraphicsError::MissingBinding("index buffer"))?;
        let material = self.bound_material.ok_or(GraphicsError::MissingBinding("material"))?;
        let object_offset = self.current_object.ok_or(GraphicsError::MissingBinding("world matrix"))?;

        let end = start_index + index_count;
        if end > index_buffer.len {
            return Err(GraphicsError::InvalidDrawRange {
                start: start_index,
                end,
                len: index_buffer.len,
            });
        }

        let key = PipelineKey {
            material,
            topology,
            states: self.states,
        };
        self.pipeline(key)?;

        self.commands.push(DrawCommand {
            pipeline: key,
            vertex_buffer,
            index_buffer: index_buffer.index,
            object_offset,
            indices: start_index..end,
        });
        Ok(())
    }
}

fn align_to(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

fn topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology {
    match topology {
        PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
    }
}

fn cull_mode(mode: FaceCullingMode) -> Option<wgpu::Face> {
    match mode {
        FaceCullingMode::None => None,
        FaceCullingMode::Front => Some(wgpu::Face::Front),
        FaceCullingMode::Back => Some(wgpu::Face::Back),
    }
}

fn compare_function(comparison: DepthComparison) -> wgpu::CompareFunction {
    match comparison {
        DepthComparison::Never => wgpu::CompareFunction::Never,
        DepthComparison::Less => wgpu::CompareFunction::Less,
        DepthComparison::Equal => wgpu::CompareFunction::Equal,
        DepthComparison::LessEqual => wgpu::CompareFunction::LessEqual,
        DepthComparison::Greater => wgpu::CompareFunction::Greater,
        DepthComparison::NotEqual => wgpu::CompareFunction::NotEqual,
        DepthComparison::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        DepthComparison::Always => wgpu::CompareFunction::Always,
    }
}

/// Depth test off means every fragment passes and nothing is written
fn depth_stencil_state(format: wgpu::TextureFormat, state: DepthStencilState) -> wgpu::DepthStencilState {
    let (depth_write_enabled, depth_compare) = if state.depth_test_enabled {
        (state.depth_write_enabled, compare_function(state.comparison))
    } else {
        (false, wgpu::CompareFunction::Always)
    };
    wgpu::DepthStencilState {
        format,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn blend_state(blend: BlendState) -> wgpu::BlendState {
    match blend {
        BlendState::Opaque => wgpu::BlendState::REPLACE,
        BlendState::AlphaBlend => wgpu::BlendState::ALPHA_BLENDING,
        BlendState::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(64, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(300, 256), 512);
        assert_eq!(align_to(64, 0), 64);
    }

    #[test]
    fn test_depth_disabled_maps_to_always_without_writes() {
        let state = DepthStencilState::new(false, DepthComparison::Less);
        let mapped = depth_stencil_state(wgpu::TextureFormat::Depth24Plus, state);
        assert_eq!(mapped.depth_compare, wgpu::CompareFunction::Always);
        assert!(!mapped.depth_write_enabled);

        let mapped = depth_stencil_state(wgpu::TextureFormat::Depth24Plus, DepthStencilState::DEFAULT);
        assert_eq!(mapped.depth_compare, wgpu::CompareFunction::LessEqual);
        assert!(mapped.depth_write_enabled);
    }

    #[test]
    fn test_blend_mapping() {
        assert_eq!(blend_state(BlendState::Opaque), wgpu::BlendState::REPLACE);
        assert_eq!(blend_state(BlendState::AlphaBlend), wgpu::BlendState::ALPHA_BLENDING);
        assert_eq!(blend_state(BlendState::Additive).color.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn test_cull_and_topology_mapping() {
        assert_eq!(cull_mode(FaceCullingMode::None), None);
        assert_eq!(cull_mode(FaceCullingMode::Back), Some(wgpu::Face::Back));
        assert_eq!(topology(PrimitiveTopology::LineList), wgpu::PrimitiveTopology::LineList);
    }

    #[test]
    fn test_model_uniform_fits_binding() {
        assert_eq!(MODEL_UNIFORM_SIZE, 64);
    }
}
