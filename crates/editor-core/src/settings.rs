//! エディタ設定
//!
//! Gizmoの見た目に関する定数をJSONで上書きできるようにする

use serde::{Deserialize, Serialize};

/// 軸Gizmoの描画設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoSettings {
    /// 平面ハンドルの半辺長（ローカル空間）
    pub plane_length: f32,
    /// 軸線の長さ
    pub axis_length: f32,
    /// 半透明な平面塗りのアルファ
    pub fill_opacity: f32,
    /// 平面枠線のアルファ
    pub border_opacity: f32,
}

impl GizmoSettings {
    pub const DEFAULT_PLANE_LENGTH: f32 = 0.1;
    pub const DEFAULT_AXIS_LENGTH: f32 = 1.0;
    pub const DEFAULT_FILL_OPACITY: f32 = 0.66;
    pub const DEFAULT_BORDER_OPACITY: f32 = 1.0;
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            plane_length: Self::DEFAULT_PLANE_LENGTH,
            axis_length: Self::DEFAULT_AXIS_LENGTH,
            fill_opacity: Self::DEFAULT_FILL_OPACITY,
            border_opacity: Self::DEFAULT_BORDER_OPACITY,
        }
    }
}
