pub mod graphics;
pub mod state;
pub mod bounds;
pub mod camera;
pub mod render_item;
pub mod render_queue;
pub mod gizmo;
pub mod shaders;
pub mod wgpu_backend;

#[cfg(test)]
mod testing;

pub use graphics::{
    BlendState, ColoredVertex, DepthComparison, DepthStencilState, FaceCullingMode,
    GraphicsDevice, GraphicsError, MaterialDescription, PipelineStates, PrimitiveTopology,
    RasterizerState, RenderContext, TriangleFillMode,
};
pub use state::StateScope;
pub use bounds::{BoundingBox, Containment, Frustum, Plane};
pub use camera::{Camera, CameraUniform};
pub use render_item::{RenderItem, RenderOrderKey, STANDARD_STAGE};
pub use render_queue::RenderQueue;
pub use gizmo::{AxesGizmo, GizmoPlane, PlaneOffsets};
pub use wgpu_backend::WgpuGraphics;

// Re-export glam types for consistent version usage
pub use glam;
