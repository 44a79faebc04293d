//! In-memory render context for unit tests

use glam::{Mat4, Vec3};

use crate::graphics::{
    BlendState, ColoredVertex, DepthStencilState, GraphicsDevice, GraphicsError,
    MaterialDescription, PipelineStates, PrimitiveTopology, RasterizerState, RenderContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHandle {
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub index_count: u32,
    pub start_index: u32,
    pub topology: PrimitiveTopology,
    pub states: PipelineStates,
    pub world: Mat4,
    /// Vertex buffer contents at the time of the draw
    pub vertices: Vec<ColoredVertex>,
}

/// Records resources, bindings and draws
pub struct RecordingContext {
    states: PipelineStates,
    viewer_position: Vec3,
    vertex_buffers: Vec<(usize, Vec<ColoredVertex>)>,
    index_buffers: Vec<Vec<u16>>,
    pub materials: Vec<MaterialDescription>,
    bound_vertex: Option<usize>,
    bound_index: Option<usize>,
    bound_material: Option<usize>,
    world: Option<Mat4>,
    pub draws: Vec<Draw>,
    pub vertex_writes: usize,
    notes: Vec<String>,
    /// Fail the n-th draw call (0-based)
    pub fail_draw_at: Option<usize>,
    draw_calls: usize,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            states: PipelineStates::default(),
            viewer_position: Vec3::new(0.0, 0.0, 10.0),
            vertex_buffers: Vec::new(),
            index_buffers: Vec::new(),
            materials: Vec::new(),
            bound_vertex: None,
            bound_index: None,
            bound_material: None,
            world: None,
            draws: Vec::new(),
            vertex_writes: 0,
            notes: Vec::new(),
            fail_draw_at: None,
            draw_calls: 0,
        }
    }

    pub fn set_viewer_position(&mut self, position: Vec3) {
        self.viewer_position = position;
    }

    pub fn index_buffer(&self, handle: BufferHandle) -> &[u16] {
        &self.index_buffers[handle.id]
    }

    pub fn vertices(&self, handle: BufferHandle) -> &[ColoredVertex] {
        &self.vertex_buffers[handle.id].1
    }

    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffers.len()
    }

    pub fn index_buffer_count(&self) -> usize {
        self.index_buffers.len()
    }

    pub fn note(&mut self, note: String) {
        self.notes.push(note);
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for RecordingContext {
    type VertexBuffer = BufferHandle;
    type IndexBuffer = BufferHandle;
    type Material = BufferHandle;

    fn create_vertex_buffer(&mut self, capacity: usize) -> Result<BufferHandle, GraphicsError> {
        self.vertex_buffers.push((capacity, Vec::new()));
        Ok(BufferHandle {
            id: self.vertex_buffers.len() - 1,
        })
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, GraphicsError> {
        self.index_buffers.push(indices.to_vec());
        Ok(BufferHandle {
            id: self.index_buffers.len() - 1,
        })
    }

    fn create_material(&mut self, description: &MaterialDescription) -> Result<BufferHandle, GraphicsError> {
        self.materials.push(description.clone());
        Ok(BufferHandle {
            id: self.materials.len() - 1,
        })
    }

    fn write_vertices(
        &mut self,
        buffer: &mut BufferHandle,
        vertices: &[ColoredVertex],
    ) -> Result<(), GraphicsError> {
        let (capacity, contents) = &mut self.vertex_buffers[buffer.id];
        if vertices.len() > *capacity {
            return Err(GraphicsError::BufferOverflow {
                len: vertices.len(),
                capacity: *capacity,
            });
        }
        *contents = vertices.to_vec();
        self.vertex_writes += 1;
        Ok(())
    }
}

impl RenderContext for RecordingContext {
    fn set_vertex_buffer(&mut self, buffer: &BufferHandle) {
        self.bound_vertex = Some(buffer.id);
    }

    fn set_index_buffer(&mut self, buffer: &BufferHandle) {
        self.bound_index = Some(buffer.id);
    }

    fn set_material(&mut self, material: &BufferHandle) {
        self.bound_material = Some(material.id);
    }

    fn apply_world_matrix(&mut self, world: Mat4) -> Result<(), GraphicsError> {
        self.world = Some(world);
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
        let call = self.draw_calls;
        self.draw_calls += 1;

        let vertex = self.bound_vertex.ok_or(GraphicsError::MissingBinding("vertex buffer"))?;
        let index = self.bound_index.ok_or(GraphicsError::MissingBinding("index buffer"))?;
        self.bound_material.ok_or(GraphicsError::MissingBinding("material"))?;
        let world = self.world.ok_or(GraphicsError::MissingBinding("world matrix"))?;

        let len = self.index_buffers[index].len() as u32;
        let end = start_index + index_count;
        if end > len {
            return Err(GraphicsError::InvalidDrawRange {
                start: start_index,
                end,
                len,
            });
        }

        if self.fail_draw_at == Some(call) {
            return Err(GraphicsError::ResourceCreation {
                resource: "draw",
                reason: "injected failure".to_string(),
            });
        }

        self.draws.push(Draw {
            index_count,
            start_index,
            topology,
            states: self.states,
            world,
            vertices: self.vertex_buffers[vertex].1.clone(),
        });
        Ok(())
    }
}
