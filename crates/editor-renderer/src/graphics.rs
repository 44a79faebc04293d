//! Graphics abstraction
//!
//! Resource factory, render context and the fixed-function state values the
//! editor's render items are written against. A backend (see
//! [`crate::wgpu_backend`]) implements the traits on top of a real GPU API.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use thiserror::Error;

/// Errors reported by the graphics layer
#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("Failed to create {resource}: {reason}")]
    ResourceCreation {
        resource: &'static str,
        reason: String,
    },

    #[error("Vertex data ({len} vertices) exceeds buffer capacity ({capacity})")]
    BufferOverflow { len: usize, capacity: usize },

    #[error("Unknown shader: {0}")]
    UnknownShader(String),

    #[error("Draw range {start}..{end} exceeds index buffer length {len}")]
    InvalidDrawRange { start: u32, end: u32, len: u32 },

    #[error("No {0} bound")]
    MissingBinding(&'static str),
}

/// Position + RGBA color vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColoredVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColoredVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Vertex buffer layout
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColoredVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    TriangleList,
    LineList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthComparison {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub comparison: DepthComparison,
}

impl DepthStencilState {
    /// Depth test on, writes on
    pub const DEFAULT: Self = Self {
        depth_test_enabled: true,
        depth_write_enabled: true,
        comparison: DepthComparison::LessEqual,
    };

    /// Matches the factory call used by overlays: test toggle + comparison.
    /// Writes follow the test flag.
    pub fn new(depth_test_enabled: bool, comparison: DepthComparison) -> Self {
        Self {
            depth_test_enabled,
            depth_write_enabled: depth_test_enabled,
            comparison,
        }
    }
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceCullingMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriangleFillMode {
    Solid,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub cull_mode: FaceCullingMode,
    pub fill_mode: TriangleFillMode,
    pub depth_clip_enabled: bool,
    pub scissor_test_enabled: bool,
}

impl RasterizerState {
    pub const DEFAULT: Self = Self {
        cull_mode: FaceCullingMode::Back,
        fill_mode: TriangleFillMode::Solid,
        depth_clip_enabled: true,
        scissor_test_enabled: false,
    };

    pub fn new(
        cull_mode: FaceCullingMode,
        fill_mode: TriangleFillMode,
        depth_clip_enabled: bool,
        scissor_test_enabled: bool,
    ) -> Self {
        Self {
            cull_mode,
            fill_mode,
            depth_clip_enabled,
            scissor_test_enabled,
        }
    }
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendState {
    #[default]
    Opaque,
    AlphaBlend,
    Additive,
}

/// The three pieces of mutable pipeline state a render context carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PipelineStates {
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub blend: BlendState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexSemantic {
    Position,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexElementFormat {
    Float3,
    Float4,
}

impl VertexElementFormat {
    pub fn size(self) -> u32 {
        match self {
            VertexElementFormat::Float3 => 12,
            VertexElementFormat::Float4 => 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexInputElement {
    pub name: String,
    pub semantic: VertexSemantic,
    pub format: VertexElementFormat,
}

impl VertexInputElement {
    pub fn new(name: &str, semantic: VertexSemantic, format: VertexElementFormat) -> Self {
        Self {
            name: name.to_string(),
            semantic,
            format,
        }
    }
}

/// Global (per-frame) shader input, supplied by the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalInput {
    pub buffer_name: String,
    pub source: GlobalSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalSource {
    ProjectionMatrix,
    ViewMatrix,
}

/// Per-object shader input, pushed by the render item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerObjectInput {
    pub buffer_name: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDescription {
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub vertex_inputs: Vec<VertexInputElement>,
    pub global_inputs: Vec<GlobalInput>,
    pub per_object_inputs: Vec<PerObjectInput>,
}

impl MaterialDescription {
    /// Bytes per vertex implied by the vertex inputs
    pub fn vertex_stride(&self) -> u32 {
        self.vertex_inputs.iter().map(|e| e.format.size()).sum()
    }
}

/// Resource factory side of the graphics layer
pub trait GraphicsDevice {
    type VertexBuffer;
    type IndexBuffer;
    type Material;

    /// Dynamic vertex buffer holding up to `capacity` vertices
    fn create_vertex_buffer(&mut self, capacity: usize) -> Result<Self::VertexBuffer, GraphicsError>;

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<Self::IndexBuffer, GraphicsError>;

    fn create_material(
        &mut self,
        description: &MaterialDescription,
    ) -> Result<Self::Material, GraphicsError>;

    /// Overwrite the buffer contents from the start
    fn write_vertices(
        &mut self,
        buffer: &mut Self::VertexBuffer,
        vertices: &[ColoredVertex],
    ) -> Result<(), GraphicsError>;
}

/// Bind-and-draw side of the graphics layer
pub trait RenderContext: GraphicsDevice {
    fn set_vertex_buffer(&mut self, buffer: &Self::VertexBuffer);
    fn set_index_buffer(&mut self, buffer: &Self::IndexBuffer);
    fn set_material(&mut self, material: &Self::Material);

    /// Per-object world matrix for subsequent draws
    fn apply_world_matrix(&mut self, world: Mat4) -> Result<(), GraphicsError>;

    fn depth_stencil_state(&self) -> DepthStencilState;
    fn set_depth_stencil_state(&mut self, state: DepthStencilState);

    fn rasterizer_state(&self) -> RasterizerState;
    fn set_rasterizer_state(&mut self, state: RasterizerState);

    fn blend_state(&self) -> BlendState;
    fn set_blend_state(&mut self, state: BlendState);

    /// World position of the camera the frame is rendered from
    fn viewer_position(&self) -> Vec3;

    fn draw_indexed(
        &mut self,
        index_count: u32,
        start_index: u32,
        topology: PrimitiveTopology,
    ) -> Result<(), GraphicsError>;

    fn pipeline_states(&self) -> PipelineStates {
        PipelineStates {
            depth_stencil: self.depth_stencil_state(),
            rasterizer: self.rasterizer_state(),
            blend: self.blend_state(),
        }
    }

    fn set_pipeline_states(&mut self, states: PipelineStates) {
        self.set_depth_stencil_state(states.depth_stencil);
        self.set_rasterizer_state(states.rasterizer);
        self.set_blend_state(states.blend);
    }
}
