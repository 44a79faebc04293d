//! 数学型の再エクスポート
//!
//! 全クレートで同じglamのバージョンを使うためにここから参照する

pub use glam;
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// 符号を -1 / 0 / +1 で返す
/// `f32::signum` は 0.0 に対して 1.0 を返すため別に用意する
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 成分ごとの符号
pub fn sign_vec3(v: Vec3) -> Vec3 {
    Vec3::new(sign(v.x), sign(v.y), sign(v.z))
}
