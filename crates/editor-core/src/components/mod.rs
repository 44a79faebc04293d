mod model_uniform;
mod transform;

pub use model_uniform::ModelUniform;
pub use transform::Transform;
