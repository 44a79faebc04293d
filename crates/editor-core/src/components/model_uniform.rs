use bytemuck::{Pod, Zeroable};

use super::Transform;
use crate::math::Mat4;

/// オブジェクト単位のUniform
/// World行列を列優先形式で格納
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    /// 単位行列で初期化
    pub fn identity() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }

    /// Mat4から作成
    pub fn from_mat4(mat: Mat4) -> Self {
        Self {
            model: mat.to_cols_array_2d(),
        }
    }

    /// TransformのWorld行列から作成
    pub fn from_transform(transform: &Transform) -> Self {
        Self::from_mat4(transform.to_matrix())
    }
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn test_model_uniform_size() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }

    #[test]
    fn test_from_transform() {
        let t = Transform::from_position(Vec3::new(4.0, 5.0, 6.0));
        let uniform = ModelUniform::from_transform(&t);
        // 平行移動は4列目
        assert_eq!(uniform.model[3], [4.0, 5.0, 6.0, 1.0]);
    }
}
