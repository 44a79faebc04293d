use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::bounds::Frustum;

/// GPU用カメラUniform
/// Projection行列とView行列を列優先形式で格納
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Projection/View行列からCameraUniformを作成
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// 3Dカメラ
/// 位置、注視点、上方向ベクトルを持つ透視投影カメラ
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// ズームの最小距離
    const MIN_DISTANCE: f32 = 0.5;
    /// 極付近で反転しないための仰角の上限
    const MAX_PITCH: f32 = 1.55;

    /// デフォルト値で新しいカメラを作成
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    /// View行列
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection行列（深度 0..1）
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// View-Projection行列を構築
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// 視錐台
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.build_view_projection_matrix())
    }

    /// GPU用のCameraUniformを取得
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::new(self.projection_matrix(), self.view_matrix())
    }

    /// カメラ位置を設定
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// カメラの注視点を設定
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// アスペクト比を設定
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// 注視点からの距離
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// 注視点周りで回転（ラジアン）
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let yaw = offset.x.atan2(offset.z) + delta_yaw;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + delta_pitch)
            .clamp(-Self::MAX_PITCH, Self::MAX_PITCH);

        self.position = self.target
            + Vec3::new(
                radius * pitch.cos() * yaw.sin(),
                radius * pitch.sin(),
                radius * pitch.cos() * yaw.cos(),
            );
    }

    /// 注視点に近づく/離れる（正で近づく）
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let new_distance = (distance - delta).max(Self::MIN_DISTANCE);
        self.position = self.target + offset / distance * new_distance;
    }
}
